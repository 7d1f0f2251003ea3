//! Compact 32-bit representation of the proof-of-work target

use std::fmt;

use serde::{Deserialize, Serialize};

/// The packed floating-point target carried in a block header's `bits`
/// field. On the wire it is a plain little-endian `u32`; expanding the
/// mantissa/exponent structure to a 256-bit target is a concern of
/// difficulty validation and lives outside this crate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Compact(u32);

impl Compact {
    pub const fn new(value: u32) -> Self {
        Compact(value)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for Compact {
    fn from(value: u32) -> Self {
        Compact(value)
    }
}

impl From<Compact> for u32 {
    fn from(compact: Compact) -> Self {
        compact.0
    }
}

impl fmt::Display for Compact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
