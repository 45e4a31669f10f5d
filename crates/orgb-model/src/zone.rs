use orgb_frame::WireReader;

use crate::error::{ModelError, Result};
use crate::version::ProtocolVersion;

/// Shape of a zone or segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ZoneType {
    Single = 0,
    Linear = 1,
    Matrix = 2,
}

impl ZoneType {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::Single,
            1 => Self::Linear,
            2 => Self::Matrix,
            _ => return None,
        })
    }

    fn decode(reader: &mut WireReader<'_>) -> Result<Self> {
        let raw = reader.get_i32()?;
        Self::from_i32(raw).ok_or(ModelError::InvalidEnum {
            field: "zone type",
            value: raw as u32,
        })
    }
}

/// Grid layout of a matrix zone.
///
/// Cells are stored row-major and hold the zone-relative LED index at that
/// position, or [`MatrixMap::NO_LED`] where the grid has a hole.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MatrixMap {
    height: u32,
    width: u32,
    cells: Vec<u32>,
}

impl MatrixMap {
    /// Cell value for "no LED here".
    pub const NO_LED: u32 = u32::MAX;

    /// Decode a matrix map whose byte length was announced as `declared_len`.
    ///
    /// The declared length covers the height and width words plus all cells.
    pub fn decode(reader: &mut WireReader<'_>, declared_len: u16) -> Result<Self> {
        let height = reader.get_u32()?;
        let width = reader.get_u32()?;

        let cell_count = (height as usize)
            .checked_mul(width as usize)
            .filter(|count| {
                count
                    .checked_mul(4)
                    .and_then(|bytes| bytes.checked_add(8))
                    == Some(declared_len as usize)
            })
            .ok_or(ModelError::MatrixLength {
                declared: declared_len,
                height,
                width,
            })?;

        let cells = (0..cell_count)
            .map(|_| reader.get_u32())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            height,
            width,
            cells,
        })
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// LED index at `(row, col)`, or `None` for holes and out-of-range cells.
    pub fn get(&self, row: u32, col: u32) -> Option<u32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let cell = *self
            .cells
            .get((row as usize) * (self.width as usize) + col as usize)?;
        (cell != Self::NO_LED).then_some(cell)
    }

    /// Raw row-major cells.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Iterate rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        // chunks(0) panics; an empty grid has no rows anyway.
        self.cells.chunks(self.width.max(1) as usize)
    }
}

/// A named sub-range of a zone's LEDs (protocol v4+).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    pub index: usize,
    pub name: String,
    pub segment_type: ZoneType,
    pub start_idx: u32,
    pub leds_count: u32,
}

impl Segment {
    pub fn decode(reader: &mut WireReader<'_>, index: usize) -> Result<Self> {
        Ok(Self {
            index,
            name: reader.get_string()?,
            segment_type: ZoneType::decode(reader)?,
            start_idx: reader.get_u32()?,
            leds_count: reader.get_u32()?,
        })
    }
}

/// A named, typed group of LEDs on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Zone {
    pub index: usize,
    pub name: String,
    pub zone_type: ZoneType,
    pub leds_min: u32,
    pub leds_max: u32,
    pub leds_count: u32,
    /// Present only for grid-shaped zones.
    pub matrix_map: Option<MatrixMap>,
    /// Present only when the negotiated version carries segments.
    pub segments: Option<Vec<Segment>>,
}

impl Zone {
    pub fn decode(reader: &mut WireReader<'_>, version: ProtocolVersion, index: usize) -> Result<Self> {
        let name = reader.get_string()?;
        let zone_type = ZoneType::decode(reader)?;
        let leds_min = reader.get_u32()?;
        let leds_max = reader.get_u32()?;
        let leds_count = reader.get_u32()?;

        let matrix_len = reader.get_u16()?;
        let matrix_map = if matrix_len == 0 {
            None
        } else {
            Some(MatrixMap::decode(reader, matrix_len)?)
        };

        let segments = if version.supports_segments_and_plugins() {
            let count = reader.get_u16()? as usize;
            Some(
                (0..count)
                    .map(|i| Segment::decode(reader, i))
                    .collect::<Result<Vec<_>>>()?,
            )
        } else {
            None
        };

        Ok(Self {
            index,
            name,
            zone_type,
            leds_min,
            leds_max,
            leds_count,
            matrix_map,
            segments,
        })
    }

    /// Whether `size` is an acceptable LED count for a resize.
    pub fn accepts_size(&self, size: u32) -> bool {
        (self.leds_min..=self.leds_max).contains(&size)
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

    fn zone_header(out: &mut Vec<u8>, name: &str, zone_type: i32, count: u32) {
        put_string(out, name);
        out.extend_from_slice(&zone_type.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
    }

    fn segment(out: &mut Vec<u8>, name: &str, start: u32, count: u32) {
        put_string(out, name);
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(&start.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
    }

    #[test]
    fn linear_zone_without_matrix() {
        let mut bytes = Vec::new();
        zone_header(&mut bytes, "Strip", 1, 30);
        bytes.extend_from_slice(&0u16.to_le_bytes());

        let mut reader = WireReader::new(&bytes);
        let zone = Zone::decode(&mut reader, ProtocolVersion::V3, 2).unwrap();

        assert!(reader.is_empty());
        assert_eq!(zone.index, 2);
        assert_eq!(zone.name, "Strip");
        assert_eq!(zone.zone_type, ZoneType::Linear);
        assert_eq!((zone.leds_min, zone.leds_max, zone.leds_count), (1, 30, 30));
        assert!(zone.matrix_map.is_none());
        assert!(zone.segments.is_none());
        assert!(zone.accepts_size(12));
        assert!(!zone.accepts_size(31));
    }

    #[test]
    fn matrix_zone_row_major() {
        let mut bytes = Vec::new();
        zone_header(&mut bytes, "Keys", 2, 5);
        bytes.extend_from_slice(&(8u16 + 4 * 6).to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes()); // height
        bytes.extend_from_slice(&3u32.to_le_bytes()); // width
        for cell in [0u32, 1, 2, 3, u32::MAX, 4] {
            bytes.extend_from_slice(&cell.to_le_bytes());
        }

        let zone = Zone::decode(&mut WireReader::new(&bytes), ProtocolVersion::V2, 0).unwrap();
        let map = zone.matrix_map.unwrap();

        assert_eq!((map.height(), map.width()), (2, 3));
        assert_eq!(map.get(0, 2), Some(2));
        assert_eq!(map.get(1, 0), Some(3));
        assert_eq!(map.get(1, 1), None);
        assert_eq!(map.get(1, 2), Some(4));
        assert_eq!(map.get(2, 0), None);
        assert_eq!(map.get(0, 3), None);
        assert_eq!(map.get(u32::MAX, u32::MAX), None);
        assert_eq!(map.rows().count(), 2);
        assert_eq!(map.cells().len(), 6);
    }

    #[test]
    fn matrix_length_mismatch_rejected() {
        let mut bytes = Vec::new();
        zone_header(&mut bytes, "Keys", 2, 4);
        bytes.extend_from_slice(&20u16.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 16]);

        let err = Zone::decode(&mut WireReader::new(&bytes), ProtocolVersion::V0, 0).unwrap_err();
        assert!(matches!(
            err,
            ModelError::MatrixLength {
                declared: 20,
                height: 2,
                width: 2
            }
        ));
    }

    #[test]
    fn segments_read_only_at_v4() {
        let mut bytes = Vec::new();
        zone_header(&mut bytes, "Strip", 1, 20);
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        segment(&mut bytes, "Left", 0, 10);
        segment(&mut bytes, "Right", 10, 10);

        let mut reader = WireReader::new(&bytes);
        let zone = Zone::decode(&mut reader, ProtocolVersion::V4, 0).unwrap();
        assert!(reader.is_empty());

        let segments = zone.segments.unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].name, "Right");
        assert_eq!(segments[1].index, 1);
        assert_eq!(segments[1].segment_type, ZoneType::Linear);
        assert_eq!((segments[1].start_idx, segments[1].leds_count), (10, 10));

        // Below v4 the segment block is not part of the zone.
        let mut reader = WireReader::new(&bytes);
        let zone = Zone::decode(&mut reader, ProtocolVersion::V3, 0).unwrap();
        assert!(zone.segments.is_none());
        assert_eq!(reader.get_u16().unwrap(), 2);
    }

    #[test]
    fn unknown_zone_type_rejected() {
        let mut bytes = Vec::new();
        zone_header(&mut bytes, "Odd", 7, 1);
        bytes.extend_from_slice(&0u16.to_le_bytes());
        assert!(matches!(
            Zone::decode(&mut WireReader::new(&bytes), ProtocolVersion::V0, 0),
            Err(ModelError::InvalidEnum { field: "zone type", value: 7 })
        ));
    }
}
