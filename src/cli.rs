//! Thin command-line front-end over the transfer core.
//!
//! Exposes `prepare` and `receive`, the two whole-file operations the
//! pipeline provides. This is not an FTP client: there is no REPL, no
//! `ls`/`get`/`put` command parsing, and no PORT dialogue here — those
//! remain out of scope for this crate.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::config::SESSION_KEY_WORDS;
use crate::keyexchange::SessionKey;
use crate::pipeline;
use crate::ui::progress::ProgressBar;

#[derive(Subcommand)]
pub enum Commands {
    /// Compress then encrypt a file, producing the temp file ready to send.
    Prepare {
        /// Path of the file to prepare.
        #[arg(short, long)]
        input: PathBuf,

        /// Session key as four comma-separated 32-bit hex words.
        #[arg(short, long)]
        key: String,
    },

    /// Decrypt then decompress a received file.
    Receive {
        /// Path the recovered file should be written to.
        #[arg(short, long)]
        output: PathBuf,

        /// Path of the received (compressed, then encrypted) file, as
        /// named by [`crate::tempname::received_name`] when the bytes
        /// came off the wire (`<output>.comp.enc-<6 chars>`).
        #[arg(short, long)]
        received: PathBuf,

        /// Session key as four comma-separated 32-bit hex words.
        #[arg(short, long)]
        key: String,
    },
}

#[derive(Parser)]
#[command(name = "ec-ftp-core", version, about = "Diffie-Hellman key exchange, chunked LZMA compression, and chunked AES-128 encryption for a file-transfer core.")]
pub struct App {
    #[command(subcommand)]
    command: Commands,
}

impl App {
    /// Installs the global tracing subscriber and parses arguments.
    pub fn init() -> Result<Self> {
        let subscriber = tracing_subscriber::fmt().with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(Self::parse())
    }

    /// Runs the requested subcommand.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Prepare { input, key } => Self::run_prepare(&input, &key),
            Commands::Receive { output, received, key } => Self::run_receive(&output, &received, &key),
        }
    }

    fn run_prepare(input: &std::path::Path, key: &str) -> Result<()> {
        let session_key = parse_session_key(key)?;
        let total = std::fs::metadata(input).with_context(|| format!("reading metadata for {}", input.display()))?.len();
        let progress = ProgressBar::new(total.max(1), "Preparing...")?;

        let prepared = pipeline::prepare(input, session_key).with_context(|| format!("preparing {}", input.display()))?;
        progress.finish();

        println!("prepared: {}", prepared.display());
        Ok(())
    }

    fn run_receive(output: &std::path::Path, received: &std::path::Path, key: &str) -> Result<()> {
        let session_key = parse_session_key(key)?;
        let total = std::fs::metadata(received).with_context(|| format!("reading metadata for {}", received.display()))?.len();
        let progress = ProgressBar::new(total.max(1), "Receiving...")?;

        pipeline::process_received(output, received, session_key).with_context(|| format!("processing {}", received.display()))?;
        progress.finish();

        println!("received: {}", output.display());
        Ok(())
    }
}

fn parse_session_key(raw: &str) -> Result<SessionKey> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != SESSION_KEY_WORDS {
        bail!("expected {SESSION_KEY_WORDS} comma-separated hex words, got {}", parts.len());
    }

    let mut words = [0u32; SESSION_KEY_WORDS];
    for (word, part) in words.iter_mut().zip(parts) {
        *word = u32::from_str_radix(part.trim_start_matches("0x"), 16).with_context(|| format!("invalid hex word: {part}"))?;
    }
    Ok(SessionKey(words))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_hex_words() {
        let key = parse_session_key("deadbeef,00000001,0xff,10").unwrap();
        assert_eq!(key.0, [0xDEAD_BEEF, 1, 0xFF, 0x10]);
    }

    #[test]
    fn rejects_wrong_word_count() {
        assert!(parse_session_key("1,2,3").is_err());
    }
}
