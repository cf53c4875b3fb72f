//! Chunked, multi-threaded LZMA1 compression with a forward-traversable,
//! manifest-free processed-chunk container.

mod chunk;
mod driver;

pub use driver::{compress_file, decompress_file};
