//! Splits one batch of bytes into per-worker regions.
//!
//! Shared by the block-cipher and compression drivers: both process the
//! file in fixed-size batches, and each batch is divided as evenly as
//! possible across a fixed thread count. The cipher driver aligns
//! region boundaries to the AES block size; the compression driver
//! does not need alignment since its chunk boundaries are recorded in
//! the processed-chunk container header.

/// One worker's share of a batch: a byte offset and length relative to
/// the start of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Offset from the start of the batch, in bytes.
    pub offset: u64,
    /// Length of this region, in bytes.
    pub len: u64,
}

/// Splits `batch_len` bytes into up to `worker_count` regions, each a
/// multiple of `align` bytes except the final region, which absorbs any
/// remainder (including a non-block-aligned tail).
///
/// Returns fewer than `worker_count` regions if the batch is too small
/// to give every worker at least one aligned unit; never returns empty
/// regions.
pub fn split(batch_len: u64, worker_count: usize, align: u64) -> Vec<Region> {
    if batch_len == 0 || worker_count == 0 {
        return Vec::new();
    }

    let aligned_units = batch_len / align;
    let tail = batch_len % align;

    if aligned_units == 0 {
        // Smaller than one aligned unit: a single region carries everything.
        return vec![Region { offset: 0, len: batch_len }];
    }

    let workers = worker_count.min(aligned_units as usize).max(1);
    let units_per_worker = aligned_units / workers as u64;
    let extra_units = aligned_units % workers as u64;

    let mut regions = Vec::with_capacity(workers);
    let mut offset = 0u64;
    for i in 0..workers {
        let mut units = units_per_worker;
        if (i as u64) < extra_units {
            units += 1;
        }
        let mut len = units * align;
        if i == workers - 1 {
            len += tail;
        }
        regions.push(Region { offset, len });
        offset += len;
    }
    regions
}
