//! Batch/thread-per-batch concurrency primitives shared by the
//! block-cipher and compression drivers.
//!
//! Neither driver uses async or a long-lived thread pool: each batch
//! spawns a fixed, small number of threads via [`std::thread::scope`],
//! shares read-only state (AES tables, LZMA options) across them by
//! borrow rather than `Arc`, and joins before moving to the next batch.
//! The orchestrating thread always does the last worker's share of
//! work itself instead of idling while it waits on the others.

pub mod plan;

pub use plan::Region;
