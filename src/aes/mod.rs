//! Hand-rolled AES-128 block primitive.
//!
//! Implements FIPS-197 AES-128 from scratch: S-box generation via the
//! Rijndael affine transform over GF(2^8) (polynomial `0x11B`), the
//! standard key schedule, and the standard 10-round block cipher. This
//! primitive never allocates and never touches global mutable state —
//! the S-box and round-key schedule are computed once by the caller and
//! passed down as immutable borrows (see [`Schedule`]).

mod block;
mod key_schedule;
mod sbox;

use crate::config::AES_ROUND_KEY_COUNT;

/// A fully-expanded AES-128 key: the forward/inverse S-boxes plus the
/// eleven round keys derived from a 16-byte key.
///
/// Built once per block-cipher session and shared (by immutable
/// reference) across worker threads, so S-box generation and key
/// expansion happen exactly once regardless of batch or thread count.
pub struct Schedule {
    sbox: [u8; 256],
    inv_sbox: [u8; 256],
    round_keys: [[u8; 16]; AES_ROUND_KEY_COUNT],
}

impl Schedule {
    /// Builds a schedule from a 16-byte AES-128 key.
    pub fn new(key: &[u8; 16]) -> Self {
        let (sbox, inv_sbox) = sbox::generate();
        let round_keys = key_schedule::expand(key);
        Self { sbox, inv_sbox, round_keys }
    }

    /// Encrypts one 16-byte block in place.
    pub fn encrypt_block(&self, block: &mut [u8; 16]) {
        block::encrypt(block, &self.round_keys, &self.sbox);
    }

    /// Decrypts one 16-byte block in place.
    pub fn decrypt_block(&self, block: &mut [u8; 16]) {
        block::decrypt(block, &self.round_keys, &self.inv_sbox);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_round_trips() {
        let key = [0x42u8; 16];
        let schedule = Schedule::new(&key);
        let original = [7u8; 16];
        let mut block = original;
        schedule.encrypt_block(&mut block);
        assert_ne!(block, original);
        schedule.decrypt_block(&mut block);
        assert_eq!(block, original);
    }
}
