//! Global memory allocator configuration.
//!
//! `mimalloc` replaces the system allocator, mainly for the batch
//! worker pools in `cipher` and `compression`, which repeatedly
//! allocate and free large buffers across threads.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
