//! Classical Diffie-Hellman key exchange over a control stream.
//!
//! A deliberately small 64-bit modulus, matching the group the original
//! implementation used (see `DESIGN.md` for the exact constants and why
//! they are not a cryptographic strengthening target). The handshake is
//! symmetric: both sides generate a secret exponent, exchange public
//! values over the control stream, and derive a 128-bit session key as
//! four 32-bit words.

mod modexp;

use std::io::{Read, Write};

use rand::Rng;
use tracing::{debug, trace, warn};

use crate::config::SESSION_KEY_WORDS;
use crate::error::{CoreError, Result};
use crate::secret::Secret;

/// The 64-bit DH modulus.
///
/// A safe-prime-like odd modulus chosen for this implementation; the
/// original source this crate is grounded on does not ship its group
/// parameters in the retained files, so this value is an
/// implementation choice, not a recovered constant. See `DESIGN.md`.
pub const MODULUS: u64 = 0xFFFF_FFFF_FFFF_FFC5;

/// The generator used with [`MODULUS`].
pub const GENERATOR: u64 = 5;

/// States of the two-message handshake.
///
/// `Failed` is reachable from every other state on I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No message has been sent or received yet.
    Idle,
    /// This side's public value has been written to the control stream.
    SentPublic,
    /// The peer's public value has been read from the control stream.
    ReceivedPublic,
    /// The shared secret has been derived into a session key.
    KeyReady,
    /// The handshake could not complete.
    Failed,
}

/// The derived 128-bit session key, as four 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionKey(pub [u32; SESSION_KEY_WORDS]);

impl SessionKey {
    /// Expands the shared 64-bit secret into four 32-bit words by
    /// taking the secret itself as the low word and folding it with a
    /// fixed odd multiplier for the remaining words. This is a simple,
    /// deterministic, invertible-free expansion; it makes no
    /// additional security claim beyond the 64-bit group itself.
    fn expand(shared_secret: u64) -> Self {
        let lo = shared_secret as u32;
        let hi = (shared_secret >> 32) as u32;
        let w2 = lo.wrapping_mul(0x9E37_79B9).wrapping_add(hi);
        let w3 = hi.wrapping_mul(0x85EB_CA6B).wrapping_add(lo);
        Self([lo, hi, w2, w3])
    }

    /// Packs the session key into the 16-byte form consumed by
    /// [`crate::aes::Schedule::new`], little-endian per word.
    pub fn to_bytes(self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for (i, word) in self.0.iter().enumerate() {
            bytes[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

/// Drives one side of the handshake to completion over a pair of
/// readable/writable control-stream handles (in a real client/server
/// the same socket would be used for both).
pub struct Exchange {
    state: State,
    secret_exponent: Secret<u64>,
}

impl Exchange {
    /// Creates a handshake driver with a freshly generated secret
    /// exponent, held in a [`Secret`] so it is zeroized once the
    /// handshake (and the `Exchange` itself) is dropped.
    pub fn new() -> Self {
        let secret_exponent = Secret::new(rand::rng().random_range(2..MODULUS - 1));
        trace!(state = ?State::Idle, "generated secret exponent, handshake idle");
        Self { state: State::Idle, secret_exponent }
    }

    /// Current handshake state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Runs the full two-message handshake: send our public value,
    /// receive the peer's, derive the session key.
    ///
    /// On any I/O error the exchange moves to [`State::Failed`] and the
    /// error is returned; the driver must not be reused afterward.
    pub fn run<S: Read + Write>(&mut self, stream: &mut S) -> Result<SessionKey> {
        let secret_exponent = *self.secret_exponent.expose_secret();
        let public_value = modexp::pow_mod(GENERATOR, secret_exponent, MODULUS);

        if let Err(e) = stream.write_all(&public_value.to_le_bytes()) {
            self.state = State::Failed;
            warn!(error = %e, "key exchange failed sending public value");
            return Err(CoreError::Io(e));
        }
        self.state = State::SentPublic;
        debug!(state = ?self.state, "sent public value to peer");

        let mut peer_bytes = [0u8; 8];
        if let Err(e) = stream.read_exact(&mut peer_bytes) {
            self.state = State::Failed;
            warn!(error = %e, "key exchange failed receiving peer's public value");
            return Err(CoreError::Io(e));
        }
        let peer_public = u64::from_le_bytes(peer_bytes);
        self.state = State::ReceivedPublic;
        debug!(state = ?self.state, "received peer's public value");

        let shared_secret = modexp::pow_mod(peer_public, secret_exponent, MODULUS);
        self.state = State::KeyReady;
        debug!(state = ?self.state, "derived session key from shared secret");

        Ok(SessionKey::expand(shared_secret))
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A stream that writes to one buffer and reads from another,
    /// letting a single test simulate both ends of the handshake
    /// without real sockets.
    struct LoopbackPair {
        write_to: Vec<u8>,
        read_from: Cursor<Vec<u8>>,
    }

    impl Read for LoopbackPair {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.read_from.read(buf)
        }
    }

    impl Write for LoopbackPair {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.write_to.write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn both_sides_derive_the_same_session_key() {
        let mut client = Exchange::new();
        let mut server = Exchange::new();

        let client_public = modexp::pow_mod(GENERATOR, *client.secret_exponent.expose_secret(), MODULUS);
        let server_public = modexp::pow_mod(GENERATOR, *server.secret_exponent.expose_secret(), MODULUS);

        let mut client_stream = LoopbackPair { write_to: Vec::new(), read_from: Cursor::new(server_public.to_le_bytes().to_vec()) };
        let mut server_stream = LoopbackPair { write_to: Vec::new(), read_from: Cursor::new(client_public.to_le_bytes().to_vec()) };

        let client_key = client.run(&mut client_stream).expect("client handshake");
        let server_key = server.run(&mut server_stream).expect("server handshake");

        assert_eq!(client_key, server_key);
        assert_eq!(client.state(), State::KeyReady);
        assert_eq!(server.state(), State::KeyReady);
    }

    #[test]
    fn failed_read_moves_to_failed_state() {
        let mut exchange = Exchange::new();
        let mut stream = LoopbackPair { write_to: Vec::new(), read_from: Cursor::new(Vec::new()) };
        let result = exchange.run(&mut stream);
        assert!(result.is_err());
        assert_eq!(exchange.state(), State::Failed);
    }
}
