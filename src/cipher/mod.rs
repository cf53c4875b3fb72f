//! Chunked, multi-threaded AES-128 block encryption with a single
//! trailing PKCS#7-style padding block.

mod block_driver;
mod padding;

pub use block_driver::{decrypt_file, encrypt_file};
