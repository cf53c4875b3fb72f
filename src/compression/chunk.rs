//! On-disk processed-chunk container format.
//!
//! Each chunk is a fixed-width header followed by its payload. There is
//! no manifest: a reader recovers chunk boundaries purely by reading
//! one header, then exactly `proc_size` payload bytes, then the next
//! header, and so on until end of file.
//!
//! The header integer width is fixed at 8 bytes, little-endian
//! (`CONTAINER_INT_WIDTH`), unlike the platform-`size_t`-sized fields
//! the original implementation used — a deliberate portability fix
//! (see `DESIGN.md`, Open Question i).

use std::io::Read;

use crate::config::CONTAINER_INT_WIDTH;
use crate::error::CoreError;

/// Size in bytes of one on-disk chunk header: 1 flag byte plus two
/// [`CONTAINER_INT_WIDTH`]-byte integers.
pub const HEADER_SIZE: usize = 1 + 2 * CONTAINER_INT_WIDTH;

/// A single processed chunk's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Whether the payload is LZMA1-compressed (`true`) or stored
    /// verbatim (`false`).
    pub compressed: bool,
    /// Length of the original, uncompressed chunk.
    pub orig_size: u64,
    /// Length of the payload as written to disk (equal to `orig_size`
    /// when stored; `LZMA_PROPS_SIZE + compressed_len` when
    /// compressed).
    pub proc_size: u64,
}

impl ChunkHeader {
    /// Serializes this header to its fixed 17-byte on-disk form.
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = u8::from(self.compressed);
        bytes[1..1 + CONTAINER_INT_WIDTH].copy_from_slice(&self.orig_size.to_le_bytes());
        bytes[1 + CONTAINER_INT_WIDTH..].copy_from_slice(&self.proc_size.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Result<Self, CoreError> {
        let compressed = match bytes[0] {
            0 => false,
            1 => true,
            other => return Err(CoreError::MalformedContainer(format!("invalid chunk flag byte {other}"))),
        };
        let orig_size = u64::from_le_bytes(bytes[1..1 + CONTAINER_INT_WIDTH].try_into().unwrap());
        let proc_size = u64::from_le_bytes(bytes[1 + CONTAINER_INT_WIDTH..].try_into().unwrap());
        Ok(Self { compressed, orig_size, proc_size })
    }
}

/// Reads one chunk header from `reader`.
///
/// Returns `Ok(None)` exactly when the batch/container has cleanly
/// ended: zero bytes were available before EOF. Any other short read
/// (some but not all header bytes present before EOF) is
/// [`CoreError::MalformedContainer`] — per Open Question (ii), that is
/// the only interpretation of "short read" that is ever a clean
/// terminator.
pub fn read_header<R: Read>(reader: &mut R) -> Result<Option<ChunkHeader>, CoreError> {
    let mut bytes = [0u8; HEADER_SIZE];
    let mut filled = 0usize;

    while filled < HEADER_SIZE {
        match reader.read(&mut bytes[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CoreError::Io(e)),
        }
    }

    if filled == 0 {
        return Ok(None);
    }
    if filled != HEADER_SIZE {
        return Err(CoreError::MalformedContainer(format!("truncated chunk header: got {filled} of {HEADER_SIZE} bytes")));
    }

    ChunkHeader::from_bytes(&bytes).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_header_bytes() {
        let header = ChunkHeader { compressed: true, orig_size: 4096, proc_size: 100 };
        let bytes = header.to_bytes();
        let mut cursor = Cursor::new(bytes.to_vec());
        let parsed = read_header(&mut cursor).unwrap().unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn clean_eof_before_any_header_bytes_ends_the_stream() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(read_header(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn truncated_header_is_malformed() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        let err = read_header(&mut cursor).unwrap_err();
        assert!(matches!(err, CoreError::MalformedContainer(_)));
    }

    #[test]
    fn invalid_flag_byte_is_malformed() {
        let mut header = ChunkHeader { compressed: false, orig_size: 1, proc_size: 1 }.to_bytes();
        header[0] = 7;
        let mut cursor = Cursor::new(header.to_vec());
        let err = read_header(&mut cursor).unwrap_err();
        assert!(matches!(err, CoreError::MalformedContainer(_)));
    }
}
