//! Chunked, multi-threaded LZMA1 compression/decompression driver.
//!
//! Each batch reads up to `COMP_MAX_THREADS * COMP_THREAD_MAX_MEM`
//! bytes, splits them into up to [`COMP_MAX_THREADS`] independent
//! chunks, and compresses each chunk on its own thread via
//! [`std::thread::scope`] (the orchestrating thread takes the last
//! chunk itself). A chunk is stored verbatim instead of compressed
//! whenever compression would not shrink it: see [`should_store`].

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use lzma_rust2::{LzmaOptions, LzmaReader, LzmaWriter};
use tracing::debug;

use crate::compression::chunk::{self, ChunkHeader};
use crate::config::{COMP_MAX_THREADS, COMP_THREAD_MAX_MEM, LZMA_DICT_SIZE, LZMA_PRESET, LZMA_PROPS_SIZE};
use crate::error::{CoreError, Result};
use crate::worker::plan;

fn batch_size() -> u64 {
    (COMP_MAX_THREADS * COMP_THREAD_MAX_MEM) as u64
}

/// True when LZMA1-compressing `original_len` bytes into
/// `compressed_len` bytes is not worth the [`LZMA_PROPS_SIZE`]-byte
/// properties overhead, and the chunk should be stored instead.
fn should_store(original_len: usize, compressed_len: usize) -> bool {
    LZMA_PROPS_SIZE + compressed_len >= original_len
}

/// Compresses one chunk, returning its header and on-disk payload.
///
/// The payload is either the chunk verbatim (stored) or a 5-byte LZMA1
/// properties prefix followed by the raw LZMA1 stream (compressed).
fn compress_chunk(data: &[u8]) -> Result<(ChunkHeader, Vec<u8>)> {
    let mut opts = LzmaOptions::with_preset(LZMA_PRESET);
    opts.dict_size = LZMA_DICT_SIZE.max(data.len().max(1) as u32);

    let mut compressed = Vec::new();
    {
        let mut writer = LzmaWriter::new_no_header(&mut compressed, &opts, false).map_err(|e| CoreError::CompressFailure(e.to_string()))?;
        writer.write_all(data).map_err(|e| CoreError::CompressFailure(e.to_string()))?;
        writer.finish().map_err(|e| CoreError::CompressFailure(e.to_string()))?;
    }

    if should_store(data.len(), compressed.len()) {
        let header = ChunkHeader { compressed: false, orig_size: data.len() as u64, proc_size: data.len() as u64 };
        Ok((header, data.to_vec()))
    } else {
        let mut payload = Vec::with_capacity(LZMA_PROPS_SIZE + compressed.len());
        payload.push(opts.get_props());
        payload.extend_from_slice(&opts.dict_size.to_le_bytes());
        payload.extend_from_slice(&compressed);

        let header = ChunkHeader { compressed: true, orig_size: data.len() as u64, proc_size: payload.len() as u64 };
        Ok((header, payload))
    }
}

/// Decompresses one chunk's payload given its header.
fn decompress_chunk(header: &ChunkHeader, payload: &[u8]) -> Result<Vec<u8>> {
    if !header.compressed {
        if payload.len() as u64 != header.orig_size {
            return Err(CoreError::MalformedContainer(format!("stored chunk size mismatch: header says {}, payload is {}", header.orig_size, payload.len())));
        }
        return Ok(payload.to_vec());
    }

    if payload.len() < LZMA_PROPS_SIZE {
        return Err(CoreError::MalformedContainer("compressed chunk payload shorter than LZMA properties".to_string()));
    }
    let props_byte = payload[0];
    let dict_size = u32::from_le_bytes(payload[1..LZMA_PROPS_SIZE].try_into().unwrap());
    let body = Cursor::new(payload[LZMA_PROPS_SIZE..].to_vec());

    let mut reader = LzmaReader::new_with_props(body, header.orig_size, props_byte, dict_size, None).map_err(|e| CoreError::DecompressFailure(e.to_string()))?;

    let mut out = vec![0u8; header.orig_size as usize];
    reader.read_exact(&mut out).map_err(|e| CoreError::DecompressFailure(e.to_string()))?;
    Ok(out)
}

/// Compresses `input_path` into `output_path` as a processed-chunk
/// container.
pub fn compress_file(input_path: &Path, output_path: &Path) -> Result<()> {
    let mut input = File::open(input_path)?;
    let mut output = File::create(output_path)?;

    loop {
        let mut batch = vec![0u8; batch_size() as usize];
        let mut filled = 0usize;
        while filled < batch.len() {
            let n = input.read(&mut batch[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        batch.truncate(filled);
        if batch.is_empty() {
            break;
        }

        let regions = plan::split(batch.len() as u64, COMP_MAX_THREADS, 1);
        debug!(batch_len = batch.len(), chunks = regions.len(), "compressing batch");

        let slices: Vec<&[u8]> = regions.iter().map(|r| &batch[r.offset as usize..(r.offset + r.len) as usize]).collect();
        let mut iter = slices.into_iter();
        let last = iter.next_back();

        let results: Vec<Result<(ChunkHeader, Vec<u8>)>> = std::thread::scope(|scope| {
            let mut slots = Vec::new();
            for slice in iter {
                match std::thread::Builder::new().spawn_scoped(scope, move || compress_chunk(slice)) {
                    Ok(handle) => slots.push(Ok(handle)),
                    Err(e) => slots.push(Err(CoreError::WorkerSpawn(e.to_string()))),
                }
            }

            let mut results: Vec<Result<(ChunkHeader, Vec<u8>)>> = slots
                .into_iter()
                .map(|slot| match slot {
                    Ok(handle) => handle.join().expect("compression worker thread panicked"),
                    Err(e) => Err(e),
                })
                .collect();
            if let Some(slice) = last {
                results.push(compress_chunk(slice));
            }
            results
        });

        for result in results {
            let (header, payload) = result?;
            output.write_all(&header.to_bytes())?;
            output.write_all(&payload)?;
        }
    }

    Ok(())
}

/// Decompresses a processed-chunk container at `input_path` into
/// `output_path`.
pub fn decompress_file(input_path: &Path, output_path: &Path) -> Result<()> {
    let mut input = File::open(input_path)?;
    let mut output = File::create(output_path)?;

    loop {
        let mut batch: Vec<(ChunkHeader, Vec<u8>)> = Vec::with_capacity(COMP_MAX_THREADS);
        for _ in 0..COMP_MAX_THREADS {
            let Some(header) = chunk::read_header(&mut input)? else {
                break;
            };
            let mut payload = vec![0u8; header.proc_size as usize];
            input.read_exact(&mut payload).map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    CoreError::MalformedContainer("chunk payload truncated before header's proc_size".to_string())
                } else {
                    CoreError::Io(e)
                }
            })?;
            batch.push((header, payload));
        }

        if batch.is_empty() {
            break;
        }
        debug!(chunks = batch.len(), "decompressing batch");

        let mut iter = batch.iter();
        let last = iter.next_back();

        let outputs: Vec<Result<Vec<u8>>> = std::thread::scope(|scope| {
            let mut slots = Vec::new();
            for (header, payload) in iter {
                match std::thread::Builder::new().spawn_scoped(scope, move || decompress_chunk(header, payload)) {
                    Ok(handle) => slots.push(Ok(handle)),
                    Err(e) => slots.push(Err(CoreError::WorkerSpawn(e.to_string()))),
                }
            }

            let mut outputs: Vec<Result<Vec<u8>>> = slots
                .into_iter()
                .map(|slot| match slot {
                    Ok(handle) => handle.join().expect("decompression worker thread panicked"),
                    Err(e) => Err(e),
                })
                .collect();
            if let Some((header, payload)) = last {
                outputs.push(decompress_chunk(header, payload));
            }
            outputs
        });

        for out in outputs {
            output.write_all(&out?)?;
        }

        if batch.len() < COMP_MAX_THREADS {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn round_trip(data: &[u8]) {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("plain");
        let comp_path = dir.path().join("comp");
        let decomp_path = dir.path().join("decomp");

        std::fs::write(&input_path, data).unwrap();
        compress_file(&input_path, &comp_path).unwrap();
        decompress_file(&comp_path, &decomp_path).unwrap();

        let recovered = std::fs::read(&decomp_path).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn round_trips_empty_file() {
        round_trip(&[]);
    }

    #[test]
    fn round_trips_small_incompressible_file() {
        round_trip(b"x");
    }

    #[test]
    fn round_trips_highly_compressible_file() {
        round_trip(&vec![b'a'; 64 * 1024]);
    }

    #[test]
    #[ignore = "allocates and compresses a full COMP_MAX_THREADS * COMP_THREAD_MAX_MEM + 1 byte file; run explicitly with `cargo test -- --ignored`"]
    fn round_trips_multi_batch_boundary_file() {
        // One byte past a full batch forces exactly two batches: the
        // first absorbs the whole COMP_MAX_THREADS * COMP_THREAD_MAX_MEM
        // worth of bytes, the second carries the single leftover byte.
        let size = (COMP_MAX_THREADS * COMP_THREAD_MAX_MEM) + 1;
        let mut data = vec![0u8; size];
        for (i, b) in data.iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        round_trip(&data);
    }

    #[test]
    fn rejects_truncated_container() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("plain");
        let comp_path = dir.path().join("comp");
        let decomp_path = dir.path().join("decomp");

        std::fs::write(&input_path, vec![b'z'; 4096]).unwrap();
        compress_file(&input_path, &comp_path).unwrap();

        let mut bytes = std::fs::read(&comp_path).unwrap();
        bytes.truncate(bytes.len() - 2);
        std::fs::write(&comp_path, &bytes).unwrap();

        let err = decompress_file(&comp_path, &decomp_path).unwrap_err();
        assert!(matches!(err, CoreError::MalformedContainer(_) | CoreError::DecompressFailure(_)));
    }
}
