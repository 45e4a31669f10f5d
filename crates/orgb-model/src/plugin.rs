use orgb_frame::WireReader;

use crate::error::Result;

/// A server-side plugin (protocol v4+).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Plugin {
    pub name: String,
    pub description: String,
    pub version: String,
    /// Target id for `PluginSpecific` requests.
    pub index: u32,
    /// SDK protocol version the plugin implements.
    pub protocol_version: u32,
}

impl Plugin {
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        Ok(Self {
            name: reader.get_string()?,
            description: reader.get_string()?,
            version: reader.get_string()?,
            index: reader.get_u32()?,
            protocol_version: reader.get_u32()?,
        })
    }

    /// Decode a `RequestPlugins` reply: u32 size, u16 count, plugins.
    pub fn decode_list(payload: &[u8]) -> Result<Vec<Self>> {
        let mut reader = WireReader::new(payload);
        let _size = reader.get_u32()?;
        let count = reader.get_u16()? as usize;
        (0..count).map(|_| Self::decode(&mut reader)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_string(out: &mut Vec<u8>, s: &str) {
        out.extend_from_slice(&((s.len() + 1) as u16).to_le_bytes());
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }

    #[test]
    fn decodes_plugin_list() {
        let mut body = Vec::new();
        body.extend_from_slice(&2u16.to_le_bytes());
        for (name, index) in [("Effects", 0u32), ("Visual Map", 1)] {
            put_string(&mut body, name);
            put_string(&mut body, "desc");
            put_string(&mut body, "0.9");
            body.extend_from_slice(&index.to_le_bytes());
            body.extend_from_slice(&4u32.to_le_bytes());
        }
        let mut payload = ((body.len() + 4) as u32).to_le_bytes().to_vec();
        payload.extend_from_slice(&body);

        let plugins = Plugin::decode_list(&payload).unwrap();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins[1].name, "Visual Map");
        assert_eq!(plugins[1].index, 1);
        assert_eq!(plugins[0].version, "0.9");
        assert_eq!(plugins[0].protocol_version, 4);
    }

    #[test]
    fn empty_list() {
        let payload = [6, 0, 0, 0, 0, 0];
        assert!(Plugin::decode_list(&payload).unwrap().is_empty());
    }

    #[test]
    fn truncated_plugin_fails() {
        let mut payload = vec![0, 0, 0, 0, 1, 0];
        put_string(&mut payload, "Effects");
        assert!(Plugin::decode_list(&payload).is_err());
    }
}
