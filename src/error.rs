//! Error taxonomy for the transfer core.
//!
//! Every fallible operation in `aes`, `cipher`, `compression`,
//! `keyexchange`, and `pipeline` returns [`CoreError`]. The CLI binary
//! layers `anyhow` context on top at the call site; library code never
//! does.

use thiserror::Error;

/// Errors produced by the transfer core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Any unrecoverable I/O failure against a file or control-stream
    /// socket.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A read returned fewer bytes than the container format requires,
    /// and the source was not at EOF.
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead {
        /// Number of bytes the caller required.
        expected: usize,
        /// Number of bytes actually read.
        got: usize,
    },

    /// A buffer allocation exceeded the per-worker memory budget.
    #[error("allocation of {0} bytes exceeds worker memory budget")]
    Alloc(usize),

    /// The LZMA1 encoder rejected or failed to process a chunk.
    #[error("compression failure: {0}")]
    CompressFailure(String),

    /// The LZMA1 decoder rejected or failed to process a chunk.
    #[error("decompression failure: {0}")]
    DecompressFailure(String),

    /// A processed-chunk container's header failed validation (bad
    /// flag, inconsistent sizes, or truncated mid-chunk with no EOF).
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Ciphertext length was not a multiple of the AES block size, or
    /// was shorter than one block.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(String),

    /// The Diffie-Hellman handshake failed or was abandoned mid-state.
    #[error("key exchange failed: {0}")]
    KeyExchangeFailure(String),
}

/// Convenience alias used throughout the core.
pub type Result<T> = std::result::Result<T, CoreError>;
