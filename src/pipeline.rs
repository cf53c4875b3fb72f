//! Orchestrates compression and encryption into the two end-to-end
//! operations a transfer actually performs: `prepare` before sending a
//! file, and `process_received` after receiving one.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::aes::Schedule;
use crate::cipher;
use crate::compression;
use crate::config::{COMPRESSED_TAG, ENCRYPTED_TAG};
use crate::error::Result;
use crate::keyexchange::SessionKey;
use crate::tempname;

/// Compresses then encrypts `path`, returning the path of the prepared
/// file ready to be sent over the data stream.
///
/// Intermediate files follow the `<original>.comp-<6 chars>` and
/// `<original>.enc-<6 chars>` naming pattern; the compressed
/// intermediate is removed once encryption succeeds.
pub fn prepare(path: &Path, key: SessionKey) -> Result<PathBuf> {
    let compressed_path = tempname::with_tag(path, COMPRESSED_TAG);
    let encrypted_path = tempname::with_tag(path, ENCRYPTED_TAG);

    info!(?path, ?compressed_path, "compressing for transfer");
    compression::compress_file(path, &compressed_path)?;

    let schedule = Schedule::new(&key.to_bytes());
    info!(?compressed_path, ?encrypted_path, "encrypting for transfer");
    let encrypt_result = cipher::encrypt_file(&compressed_path, &encrypted_path, &schedule);

    let _ = std::fs::remove_file(&compressed_path);
    encrypt_result?;

    Ok(encrypted_path)
}

/// Decrypts then decompresses `received_path`, writing the recovered
/// file to `final_path`.
///
/// `received_path` is named following the
/// `<requested>.comp.enc-<6 chars>` pattern by the outer layer that
/// wrote the incoming bytes to disk; the decrypted intermediate
/// (compressed, not yet decompressed) follows the same
/// `<final>.comp-<6 chars>` pattern as the sending side and is removed
/// once decompression succeeds.
pub fn process_received(final_path: &Path, received_path: &Path, key: SessionKey) -> Result<()> {
    let decrypted_path = tempname::with_tag(final_path, COMPRESSED_TAG);

    let schedule = Schedule::new(&key.to_bytes());
    info!(?received_path, ?decrypted_path, "decrypting received file");
    cipher::decrypt_file(received_path, &decrypted_path, &schedule)?;

    info!(?decrypted_path, ?final_path, "decompressing received file");
    let decompress_result = compression::decompress_file(&decrypted_path, final_path);

    let _ = std::fs::remove_file(&decrypted_path);
    decompress_result?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key() -> SessionKey {
        SessionKey([0xDEAD_BEEFu32, 0x1234_5678, 0x9ABC_DEF0, 0x0F0F_0F0F])
    }

    #[test]
    fn round_trips_through_prepare_and_process_received() {
        let dir = tempdir().unwrap();
        let original_path = dir.path().join("notes.txt");
        let data = b"the quick brown fox jumps over the lazy dog".repeat(200);
        std::fs::write(&original_path, &data).unwrap();

        let prepared = prepare(&original_path, key()).unwrap();
        assert!(prepared.exists());

        let final_path = dir.path().join("received_notes.txt");
        process_received(&final_path, &prepared, key()).unwrap();

        let recovered = std::fs::read(&final_path).unwrap();
        assert_eq!(recovered, data);

        std::fs::remove_file(&prepared).unwrap();
    }

    #[test]
    fn round_trips_empty_file() {
        let dir = tempdir().unwrap();
        let original_path = dir.path().join("empty.bin");
        std::fs::write(&original_path, []).unwrap();

        let prepared = prepare(&original_path, key()).unwrap();
        let final_path = dir.path().join("empty_received.bin");
        process_received(&final_path, &prepared, key()).unwrap();

        assert_eq!(std::fs::read(&final_path).unwrap(), Vec::<u8>::new());
    }
}
