//! Tunable constants shared by every layer of the transfer core.
//!
//! This module centralizes the batch/thread sizing, container framing,
//! and key-exchange parameters used throughout the codebase, rather than
//! scattering magic numbers across the drivers that use them.

/// Maximum number of worker threads used by a single compression batch.
///
/// Matches the original implementation's thread budget for the
/// compression stage.
pub const COMP_MAX_THREADS: usize = 4;

/// Maximum bytes of input a single compression worker is allowed to hold
/// in memory at once.
pub const COMP_THREAD_MAX_MEM: usize = 128 * 1024 * 1024;

/// Maximum number of worker threads used by a single encryption batch.
pub const ENC_MAX_THREADS: usize = 4;

/// Maximum bytes of input a single encryption worker is allowed to hold
/// in memory at once.
pub const ENC_THREAD_MAX_MEM: usize = 4 * 1024 * 1024;

/// AES block size in bytes.
pub const AES_BLOCK_SIZE: usize = 16;

/// Number of AES-128 round keys (10 rounds + the initial whitening key).
pub const AES_ROUND_KEY_COUNT: usize = 11;

/// Size, in bytes, of an LZMA1 properties blob: one properties byte
/// followed by a 4-byte little-endian dictionary size.
pub const LZMA_PROPS_SIZE: usize = 5;

/// LZMA1 preset used for every chunk, matching the level the original
/// implementation defaults to (level 9).
pub const LZMA_PRESET: u32 = 9;

/// Default LZMA1 dictionary size, matching the original implementation's
/// 16 MiB default. Grown per-chunk when a chunk exceeds this size (see
/// `compression::driver::compress_chunk`), since the dictionary must
/// cover the data being compressed.
pub const LZMA_DICT_SIZE: u32 = 16 * 1024 * 1024;

/// Number of random characters appended to generated temp filenames.
pub const TEMP_SUFFIX_LEN: usize = 6;

/// Alphabet used when generating temp filename suffixes.
pub const TEMP_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Suffix appended to the source file name to build the compressed temp
/// file name: `<original>.comp-<6 unique chars>`.
pub const COMPRESSED_TAG: &str = "comp";

/// Suffix appended to build the encrypted temp file name:
/// `<original>.enc-<6 unique chars>`.
pub const ENCRYPTED_TAG: &str = "enc";

/// Suffix appended to build the compress-then-encrypt temp file name on
/// the receiving side: `<requested>.comp.enc-<6 unique chars>`.
pub const COMPRESSED_ENCRYPTED_TAG: &str = "comp.enc";

/// Width, in bytes, of every integer field in the on-disk processed-chunk
/// container header.
///
/// The original implementation sized these fields with the platform's
/// `size_t`, which is not portable across architectures. This crate
/// fixes the width to 8-byte little-endian instead (see `DESIGN.md`,
/// Open Question i).
pub const CONTAINER_INT_WIDTH: usize = 8;

/// Number of session-key words (each 32 bits) produced by key exchange.
pub const SESSION_KEY_WORDS: usize = 4;
