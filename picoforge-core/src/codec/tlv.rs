//! One-byte tag, one-byte length TLV items.

use tracing::debug;

use crate::error::{PicoError, Result};

/// Maximum length of a single TLV value (one-byte length field).
pub const MAX_TLV_VALUE_LEN: usize = 255;

/// Iterator over `(tag, value)` items of a TLV buffer.
///
/// Iteration ends at the first truncated header or at a length that runs past
/// the end of the buffer; trailing bytes are ignored.
pub struct TlvReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TlvReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a> Iterator for TlvReader<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.data.get(self.pos..self.pos + 2)?;
        let (tag, len) = (header[0], header[1] as usize);
        let start = self.pos + 2;

        let Some(value) = self.data.get(start..start + len) else {
            debug!(
                tag,
                len,
                remaining = self.data.len() - start,
                "TLV item overruns buffer, stopping"
            );
            self.pos = self.data.len();
            return None;
        };

        self.pos = start + len;
        Some((tag, value))
    }
}

/// Append-only TLV encoder.
#[derive(Debug, Default)]
pub struct TlvWriter {
    buf: Vec<u8>,
}

impl TlvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: u8, value: &[u8]) -> Result<()> {
        if value.len() > MAX_TLV_VALUE_LEN {
            return Err(PicoError::FieldTooLong {
                field: "TLV value",
                len: value.len(),
                max: MAX_TLV_VALUE_LEN,
            });
        }
        self.buf.push(tag);
        self.buf.push(value.len() as u8);
        self.buf.extend_from_slice(value);
        Ok(())
    }

    pub fn push_u8(&mut self, tag: u8, value: u8) -> Result<()> {
        self.push(tag, &[value])
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_items_in_order() {
        let data = [0x04, 0x01, 0x19, 0x09, 0x03, b'a', b'b', 0x00];
        let items: Vec<_> = TlvReader::new(&data).collect();
        assert_eq!(items, vec![(0x04, &[0x19][..]), (0x09, &b"ab\0"[..])]);
    }

    #[test]
    fn test_zero_length_item() {
        let data = [0x0C, 0x00, 0x05, 0x01, 0x80];
        let items: Vec<_> = TlvReader::new(&data).collect();
        assert_eq!(items, vec![(0x0C, &[][..]), (0x05, &[0x80][..])]);
    }

    #[test]
    fn test_stops_at_truncated_header() {
        let data = [0x05, 0x01, 0x80, 0x06];
        let items: Vec<_> = TlvReader::new(&data).collect();
        assert_eq!(items, vec![(0x05, &[0x80][..])]);
    }

    #[test]
    fn test_stops_at_overrunning_length() {
        let data = [0x05, 0x01, 0x80, 0x09, 0x10, b'x'];
        let mut reader = TlvReader::new(&data);
        assert_eq!(reader.next(), Some((0x05, &[0x80][..])));
        assert_eq!(reader.next(), None);
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(TlvReader::new(&[]).count(), 0);
    }

    #[test]
    fn test_writer_round_trip() {
        let mut writer = TlvWriter::new();
        assert!(writer.is_empty());
        writer.push_u8(0x04, 25).unwrap();
        writer.push(0x00, &[0xCA, 0xFE, 0x42, 0x42]).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(bytes, [0x04, 0x01, 25, 0x00, 0x04, 0xCA, 0xFE, 0x42, 0x42]);

        let items: Vec<_> = TlvReader::new(&bytes).collect();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_writer_rejects_oversized_value() {
        let mut writer = TlvWriter::new();
        let err = writer.push(0x09, &[0u8; MAX_TLV_VALUE_LEN + 1]).unwrap_err();
        assert!(matches!(
            err,
            PicoError::FieldTooLong { len: 256, max: MAX_TLV_VALUE_LEN, .. }
        ));
        assert!(writer.is_empty());

        writer.push(0x09, &[0u8; MAX_TLV_VALUE_LEN]).unwrap();
        assert_eq!(writer.into_bytes().len(), 2 + MAX_TLV_VALUE_LEN);
    }
}
