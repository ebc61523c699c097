// SPDX-License-Identifier: MIT

//! Emergency unlock-key generation and verification.
//!
//! The key is a 255-character secret issued at profile creation, shown once to
//! the owner for out-of-band safekeeping, consumed to reverse an emergency
//! account lock, and rotated on every successful unlock. Length and alphabet
//! are part of the external contract (clients pre-validate the length).

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};
use subtle::ConstantTimeEq;

/// Exact length of every unlock key.
pub const UNLOCK_KEY_LEN: usize = 255;

/// 72-symbol alphabet: letters, digits, and 10 punctuation marks.
pub const UNLOCK_KEY_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*-_";

/// Generate a fresh unlock key from the system CSPRNG.
///
/// Uses rejection sampling so every alphabet symbol is equally likely
/// (256 is not a multiple of 72).
pub fn generate_unlock_key() -> Result<String, AppError> {
    let rng = SystemRandom::new();
    let mut key = String::with_capacity(UNLOCK_KEY_LEN);
    let mut buf = [0u8; 128];

    // Largest multiple of the alphabet size that fits in a byte.
    let limit = (u8::MAX as usize + 1) - ((u8::MAX as usize + 1) % UNLOCK_KEY_ALPHABET.len());

    while key.len() < UNLOCK_KEY_LEN {
        rng.fill(&mut buf)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;

        for &byte in buf.iter() {
            if (byte as usize) < limit {
                key.push(UNLOCK_KEY_ALPHABET[byte as usize % UNLOCK_KEY_ALPHABET.len()] as char);
                if key.len() == UNLOCK_KEY_LEN {
                    break;
                }
            }
        }
    }

    Ok(key)
}

/// Constant-time comparison of a supplied key against the stored one.
///
/// Both are public-length (255) strings; the comparison itself must not leak
/// how many leading characters matched.
pub fn keys_match(supplied: &str, stored: &str) -> bool {
    supplied.as_bytes().ct_eq(stored.as_bytes()).into()
}
