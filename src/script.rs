//! The script surface the signature-hash engine relies on
//!
//! The interpreter proper lives elsewhere; signing only needs the raw
//! program bytes, the ability to drop `OP_CODESEPARATOR` opcodes, and the
//! tag naming which digest algorithm a signature commits to.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opcode whose occurrences split the script code used by the legacy
/// signature hash; stripped during digest computation
pub const OP_CODESEPARATOR: u8 = 0xab;

const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;

/// Which digest algorithm a signature commits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureVersion {
    /// The original algorithm
    Base,
    /// BIP-143
    WitnessV0,
    /// BIP-143 shape with the fork-id hashtype bit
    ForkId,
}

/// A script program as raw bytes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    pub fn from_hex(hexstring: &str) -> Result<Self> {
        Ok(Script(hex::decode(hexstring)?))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy with every `OP_CODESEPARATOR` opcode removed.
    /// Push-data length prefixes are honored, so a literal `0xab` byte
    /// inside pushed data is left untouched.
    pub fn without_sep(&self) -> Script {
        let mut out = Vec::with_capacity(self.0.len());
        let mut i = 0;
        while i < self.0.len() {
            let next = self.next_op(i);
            if self.0[i] != OP_CODESEPARATOR {
                out.extend_from_slice(&self.0[i..next]);
            }
            i = next;
        }
        Script(out)
    }

    /// Index of the opcode following the one at `i`, skipping its push
    /// data. A push whose announced length runs past the end of the script
    /// is clamped to the end.
    fn next_op(&self, i: usize) -> usize {
        let script = &self.0;
        let op = script[i];
        let next = match op {
            0x01..=0x4b => i + 1 + op as usize,
            OP_PUSHDATA1 => {
                if i + 1 >= script.len() {
                    script.len()
                } else {
                    i + 2 + script[i + 1] as usize
                }
            }
            OP_PUSHDATA2 => {
                if i + 2 >= script.len() {
                    script.len()
                } else {
                    let n = u16::from_le_bytes([script[i + 1], script[i + 2]]) as usize;
                    i + 3 + n
                }
            }
            OP_PUSHDATA4 => {
                if i + 4 >= script.len() {
                    script.len()
                } else {
                    let n = u32::from_le_bytes([
                        script[i + 1],
                        script[i + 2],
                        script[i + 3],
                        script[i + 4],
                    ]) as usize;
                    i + 5 + n
                }
            }
            _ => i + 1,
        };
        next.min(script.len())
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}
