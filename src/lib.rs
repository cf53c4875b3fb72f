//! ec-ftp-core: Diffie-Hellman key exchange, chunked LZMA1 compression,
//! and chunked AES-128 encryption for a two-party file-transfer tool.
//!
//! This crate is the transfer **core** only: an interactive client or
//! server built on top of it would add the REPL, the `ls`/`get`/`put`
//! command parsing, and the RFC-959 PORT dialogue, none of which live
//! here.

pub mod aes;
pub mod cipher;
pub mod cli;
pub mod compression;
pub mod config;
pub mod error;
pub mod keyexchange;
pub mod pipeline;
mod secret;
pub mod tempname;
pub mod ui;
mod worker;
