use orgb_frame::WireReader;

use crate::error::Result;

/// Decode a `RequestProfiles` reply: u32 size, u16 count, then that many strings.
pub fn decode_profile_list(payload: &[u8]) -> Result<Vec<String>> {
    let mut reader = WireReader::new(payload);
    let _size = reader.get_u32()?;
    let count = reader.get_u16()? as usize;
    (0..count)
        .map(|_| reader.get_string().map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_names() {
        let payload = [
            0x14, 0, 0, 0, // size
            2, 0, // count
            4, 0, b'd', b'a', b'y', 0, //
            6, 0, b'n', b'i', b'g', b'h', b't', 0,
        ];
        assert_eq!(decode_profile_list(&payload).unwrap(), vec!["day", "night"]);
    }

    #[test]
    fn short_reply_fails() {
        assert!(decode_profile_list(&[0, 0, 0]).is_err());
        assert!(decode_profile_list(&[0, 0, 0, 0, 1, 0]).is_err());
    }
}
