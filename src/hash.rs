//! 32-byte hash values in internal byte order

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::HASH_SIZE;
use crate::error::{CoreError, Result};

/// The all-zero hash; marks a null outpoint
pub const HASH_ZERO: Hash = Hash([0u8; HASH_SIZE]);

/// The sentinel digest returned by the signature-hash engine for its
/// "impossible" branches. No real signature verifies against it, which is
/// the intended outcome.
pub const HASH_ONE: Hash = Hash([
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00,
]);

/// A 32-byte digest held in internal byte order, the order it travels on
/// the wire. User-facing tools show the reversed form; see [`Hash::rhex`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Parses a hex string in internal byte order.
    pub fn from_hex(hexstring: &str) -> Result<Self> {
        let bytes = hex::decode(hexstring)?;
        if bytes.len() != HASH_SIZE {
            return Err(CoreError::InvalidHex);
        }
        let mut hash = [0u8; HASH_SIZE];
        hash.copy_from_slice(&bytes);
        Ok(Hash(hash))
    }

    /// Parses a hex string in reversed (RPC) order.
    pub fn from_rhex(hexstring: &str) -> Result<Self> {
        let mut hash = Self::from_hex(hexstring)?;
        hash.0.reverse();
        Ok(hash)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; HASH_SIZE] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == HASH_ZERO
    }

    /// Hex in internal byte order.
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hex in reversed byte order, the form block explorers and RPC show.
    pub fn rhex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

/// Double SHA-256: `SHA256(SHA256(data))`
pub fn dhash256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut hash = [0u8; HASH_SIZE];
    hash.copy_from_slice(&second);
    Hash(hash)
}
