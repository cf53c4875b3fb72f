//! PKCS#7-style padding applied exactly once, at end of file.
//!
//! Unlike a textbook PKCS#7 implementation invoked per buffer, this
//! crate only ever pads the very last block of a file: intermediate
//! 16-byte blocks are written as-is, and a single trailing block
//! carries the padding length repeated to fill the remainder (a full
//! block of `0x10` when the file length is already a multiple of 16).

use crate::config::AES_BLOCK_SIZE;

/// Builds the final padded block from the last `tail.len()` bytes of
/// the file (`0..=15` bytes).
pub fn pad_final_block(tail: &[u8]) -> [u8; AES_BLOCK_SIZE] {
    debug_assert!(tail.len() < AES_BLOCK_SIZE);
    let pad_len = AES_BLOCK_SIZE - tail.len();
    let mut block = [pad_len as u8; AES_BLOCK_SIZE];
    block[..tail.len()].copy_from_slice(tail);
    block
}

/// Validates and strips padding from a decrypted final block,
/// returning the original trailing bytes.
pub fn unpad_final_block(block: &[u8; AES_BLOCK_SIZE]) -> Result<&[u8], String> {
    let pad_len = block[AES_BLOCK_SIZE - 1] as usize;
    if pad_len == 0 || pad_len > AES_BLOCK_SIZE {
        return Err(format!("invalid padding length {pad_len}"));
    }
    let content_len = AES_BLOCK_SIZE - pad_len;
    if !block[content_len..].iter().all(|&b| b as usize == pad_len) {
        return Err("inconsistent padding bytes".to_string());
    }
    Ok(&block[..content_len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_unpads_a_partial_tail() {
        let tail = b"hello";
        let block = pad_final_block(tail);
        let recovered = unpad_final_block(&block).unwrap();
        assert_eq!(recovered, tail);
    }

    #[test]
    fn exact_multiple_gets_a_full_padding_block() {
        let block = pad_final_block(&[]);
        assert_eq!(block, [16u8; AES_BLOCK_SIZE]);
        assert_eq!(unpad_final_block(&block).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn rejects_inconsistent_padding() {
        let mut block = pad_final_block(b"hi");
        block[AES_BLOCK_SIZE - 2] = 0xFF;
        assert!(unpad_final_block(&block).is_err());
    }
}
