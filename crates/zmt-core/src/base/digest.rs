//! Fixed-width digest shared by leaves and internal nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use thiserror::Error;

/// Size of a digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Errors raised when a value at the API boundary is not a valid digest.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DigestError {
    /// The decoded value does not have exactly [`DIGEST_SIZE`] bytes.
    #[error("Malformed digest: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required width in bytes.
        expected: usize,
        /// Width of the rejected value in bytes.
        actual: usize,
    },

    /// The textual form is not valid hex.
    #[error("Malformed digest: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// A 256-bit digest.
///
/// Leaf values and internal node values share this representation. The
/// canonical textual form is 64 lowercase hex characters, which is also how
/// the digest is serialized.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(#[serde_as(as = "Hex")] [u8; DIGEST_SIZE]);

impl Digest {
    /// The canonical empty leaf (all zeros).
    pub const EMPTY: Self = Self([0_u8; DIGEST_SIZE]);

    /// Create a digest from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Borrow the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Get the underlying bytes.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; DIGEST_SIZE] {
        self.0
    }

    /// Lowercase hex encoding (64 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether this is the canonical empty leaf.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = DigestError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; DIGEST_SIZE]>::try_from(bytes)
            .map(Self)
            .map_err(|_| DigestError::InvalidLength {
                expected: DIGEST_SIZE,
                actual: bytes.len(),
            })
    }
}

impl From<[u8; DIGEST_SIZE]> for Digest {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for [u8; DIGEST_SIZE] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
