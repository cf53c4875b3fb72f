//! Chunked, multi-threaded AES-128 block-cipher driver.
//!
//! Processes a file in batches of up to `ENC_MAX_THREADS *
//! ENC_THREAD_MAX_MEM` bytes. Each batch is split into one region per
//! worker and encrypted/decrypted in place by a [`std::thread::scope`]
//! fan-out; the orchestrating thread always takes the last region
//! itself rather than idling. Padding is handled separately, once, at
//! end of file (see [`crate::cipher::padding`]).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::aes::Schedule;
use crate::cipher::padding::{pad_final_block, unpad_final_block};
use crate::config::{AES_BLOCK_SIZE, ENC_MAX_THREADS, ENC_THREAD_MAX_MEM};
use crate::error::{CoreError, Result};
use crate::worker::plan::{self, Region};

fn batch_size() -> u64 {
    (ENC_MAX_THREADS * ENC_THREAD_MAX_MEM) as u64
}

/// Splits `buffer` into one disjoint mutable slice per region, in
/// order, so each can be handed to a different worker without unsafe
/// code.
fn split_mut<'a>(mut buffer: &'a mut [u8], regions: &[Region]) -> Vec<&'a mut [u8]> {
    let mut slices = Vec::with_capacity(regions.len());
    for region in regions {
        let (chunk, rest) = buffer.split_at_mut(region.len as usize);
        slices.push(chunk);
        buffer = rest;
    }
    slices
}

/// Encrypts every 16-byte block in `buffer` in place, fanning the
/// batch out across up to [`ENC_MAX_THREADS`] worker threads.
///
/// A worker that the OS refuses to spawn surfaces as
/// [`CoreError::WorkerSpawn`] instead of panicking the whole process;
/// any workers already spawned before the failure are still joined
/// when the scope ends.
fn encrypt_batch(buffer: &mut [u8], schedule: &Schedule) -> Result<()> {
    let regions = plan::split(buffer.len() as u64, ENC_MAX_THREADS, AES_BLOCK_SIZE as u64);
    let mut slices = split_mut(buffer, &regions);
    let last = slices.pop();

    std::thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(slices.len());
        for slice in slices {
            let handle = std::thread::Builder::new()
                .spawn_scoped(scope, move || {
                    for block in slice.chunks_exact_mut(AES_BLOCK_SIZE) {
                        let block: &mut [u8; AES_BLOCK_SIZE] = block.try_into().expect("chunks_exact_mut yields full blocks");
                        schedule.encrypt_block(block);
                    }
                })
                .map_err(|e| CoreError::WorkerSpawn(e.to_string()))?;
            handles.push(handle);
        }

        if let Some(slice) = last {
            for block in slice.chunks_exact_mut(AES_BLOCK_SIZE) {
                let block: &mut [u8; AES_BLOCK_SIZE] = block.try_into().expect("chunks_exact_mut yields full blocks");
                schedule.encrypt_block(block);
            }
        }

        for handle in handles {
            handle.join().expect("encryption worker thread panicked");
        }
        Ok(())
    })
}

/// Decrypts every 16-byte block in `buffer` in place. Same fan-out
/// shape as [`encrypt_batch`].
fn decrypt_batch(buffer: &mut [u8], schedule: &Schedule) -> Result<()> {
    let regions = plan::split(buffer.len() as u64, ENC_MAX_THREADS, AES_BLOCK_SIZE as u64);
    let mut slices = split_mut(buffer, &regions);
    let last = slices.pop();

    std::thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(slices.len());
        for slice in slices {
            let handle = std::thread::Builder::new()
                .spawn_scoped(scope, move || {
                    for block in slice.chunks_exact_mut(AES_BLOCK_SIZE) {
                        let block: &mut [u8; AES_BLOCK_SIZE] = block.try_into().expect("chunks_exact_mut yields full blocks");
                        schedule.decrypt_block(block);
                    }
                })
                .map_err(|e| CoreError::WorkerSpawn(e.to_string()))?;
            handles.push(handle);
        }

        if let Some(slice) = last {
            for block in slice.chunks_exact_mut(AES_BLOCK_SIZE) {
                let block: &mut [u8; AES_BLOCK_SIZE] = block.try_into().expect("chunks_exact_mut yields full blocks");
                schedule.decrypt_block(block);
            }
        }

        for handle in handles {
            handle.join().expect("decryption worker thread panicked");
        }
        Ok(())
    })
}

/// Reads exactly `buf.len()` bytes, distinguishing a genuine
/// end-of-file short read ([`CoreError::ShortRead`]) from any other
/// I/O failure. Unlike [`std::io::Read::read_exact`], this never
/// collapses both cases into a bare [`std::io::ErrorKind::UnexpectedEof`].
fn read_exact_checked<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(CoreError::ShortRead { expected: buf.len(), got: filled }),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CoreError::Io(e)),
        }
    }
    Ok(())
}

/// Encrypts `input_path` into `output_path`, applying the single
/// trailing PKCS#7-style padding block described in
/// [`crate::cipher::padding`].
pub fn encrypt_file(input_path: &Path, output_path: &Path, schedule: &Schedule) -> Result<()> {
    let mut input = File::open(input_path)?;
    let mut output = File::create(output_path)?;

    let total_len = input.metadata()?.len();
    let aligned_len = total_len - (total_len % AES_BLOCK_SIZE as u64);
    let tail_len = (total_len % AES_BLOCK_SIZE as u64) as usize;

    let mut remaining = aligned_len;
    let mut buffer = Vec::new();
    while remaining > 0 {
        let this_batch = remaining.min(batch_size());
        buffer.resize(this_batch as usize, 0);
        read_exact_checked(&mut input, &mut buffer)?;

        debug!(batch_len = this_batch, "encrypting batch");
        encrypt_batch(&mut buffer, schedule)?;

        output.write_all(&buffer)?;
        remaining -= this_batch;
    }

    let mut tail = vec![0u8; tail_len];
    read_exact_checked(&mut input, &mut tail)?;
    let mut final_block = pad_final_block(&tail);
    schedule.encrypt_block(&mut final_block);
    output.write_all(&final_block)?;

    Ok(())
}

/// Decrypts `input_path` into `output_path`, validating and stripping
/// the trailing padding block.
pub fn decrypt_file(input_path: &Path, output_path: &Path, schedule: &Schedule) -> Result<()> {
    let mut input = File::open(input_path)?;
    let mut output = File::create(output_path)?;

    let total_len = input.metadata()?.len();
    if total_len == 0 || total_len % AES_BLOCK_SIZE as u64 != 0 {
        return Err(CoreError::MalformedCiphertext(format!("ciphertext length {total_len} is not a positive multiple of {AES_BLOCK_SIZE}")));
    }

    let body_len = total_len - AES_BLOCK_SIZE as u64;

    let mut remaining = body_len;
    let mut buffer = Vec::new();
    while remaining > 0 {
        let this_batch = remaining.min(batch_size());
        buffer.resize(this_batch as usize, 0);
        read_exact_checked(&mut input, &mut buffer)?;

        debug!(batch_len = this_batch, "decrypting batch");
        decrypt_batch(&mut buffer, schedule)?;

        output.write_all(&buffer)?;
        remaining -= this_batch;
    }

    input.seek(SeekFrom::Start(total_len - AES_BLOCK_SIZE as u64))?;
    let mut final_block = [0u8; AES_BLOCK_SIZE];
    read_exact_checked(&mut input, &mut final_block)?;
    schedule.decrypt_block(&mut final_block);
    let content = unpad_final_block(&final_block).map_err(CoreError::MalformedCiphertext)?;
    output.write_all(content)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn schedule() -> Schedule {
        Schedule::new(&[0xAAu8; 16])
    }

    fn round_trip(data: &[u8]) {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("plain");
        let enc_path = dir.path().join("enc");
        let dec_path = dir.path().join("dec");

        std::fs::write(&input_path, data).unwrap();

        let schedule = schedule();
        encrypt_file(&input_path, &enc_path, &schedule).unwrap();
        decrypt_file(&enc_path, &dec_path, &schedule).unwrap();

        let recovered = std::fs::read(&dec_path).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn round_trips_empty_file() {
        round_trip(&[]);
    }

    #[test]
    fn round_trips_one_byte_file() {
        round_trip(b"x");
    }

    #[test]
    fn round_trips_exactly_one_block() {
        round_trip(&[7u8; AES_BLOCK_SIZE]);
    }

    #[test]
    fn round_trips_multi_batch_boundary_file() {
        let size = (ENC_MAX_THREADS * ENC_THREAD_MAX_MEM) * 2 + 33;
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        round_trip(&data);
    }

    #[test]
    fn rejects_malformed_ciphertext_length() {
        let dir = tempdir().unwrap();
        let bad_path = dir.path().join("bad");
        let out_path = dir.path().join("out");
        std::fs::write(&bad_path, [1u8; AES_BLOCK_SIZE + 3]).unwrap();

        let err = decrypt_file(&bad_path, &out_path, &schedule()).unwrap_err();
        assert!(matches!(err, CoreError::MalformedCiphertext(_)));
    }

    #[test]
    fn read_exact_checked_reports_short_read_with_counts() {
        let mut source = std::io::Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 5];
        let err = read_exact_checked(&mut source, &mut buf).unwrap_err();
        assert!(matches!(err, CoreError::ShortRead { expected: 5, got: 3 }));
    }
}
