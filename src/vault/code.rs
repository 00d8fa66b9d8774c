//! Short retrieval codes.
//!
//! A code is exactly six characters from `[A-Z0-9]`, giving 36^6
//! (about 2.2 billion) possibilities.  Generation is pure; uniqueness is
//! the store's job.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Serialize, Serializer};

use crate::errors::{Result, VaultError};

/// Number of characters in a code.
pub const CODE_LEN: usize = 6;

/// The code alphabet: uppercase ASCII letters then digits.
const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A validated retrieval code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(String);

impl Code {
    /// Draw a fresh code uniformly from the alphabet.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code = (0..CODE_LEN)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        Self(code)
    }

    /// Validate untrusted text as a code.
    ///
    /// No case folding: `abc123` is not the same code as `ABC123`.
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() == CODE_LEN
            && input
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            Ok(Self(input.to_string()))
        } else {
            Err(VaultError::InvalidCode(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Code {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
