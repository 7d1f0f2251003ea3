//! Bitcoin protocol constants shared across serialization and signing

/// Size of a double-SHA-256 digest in bytes
pub const HASH_SIZE: usize = 32;

/// Serialized block header size
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Serialized outpoint size: 32-byte hash plus 4-byte index
pub const OUT_POINT_SIZE: usize = HASH_SIZE + 4;

/// Sequence value that makes an input final; when every input carries it,
/// the transaction locktime is disabled
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Marker byte between version and input count in the witness serialization
pub const WITNESS_MARKER: u8 = 0x00;

/// Flag byte following the witness marker
pub const WITNESS_FLAG: u8 = 0x01;

/// Locktime values below this are block heights, at or above are Unix times
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// BIP-68: if set, the sequence number is not interpreted as a relative
/// lock-time
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

/// BIP-68: if set, the relative lock-time has units of 512 seconds,
/// otherwise it counts blocks
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

/// BIP-68: mask extracting the relative lock-time from a sequence number
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

/// Sighash base flag: commit to all outputs
pub const SIGHASH_ALL: u8 = 0x01;

/// Sighash base flag: commit to no outputs
pub const SIGHASH_NONE: u8 = 0x02;

/// Sighash base flag: commit only to the output paired with the input
pub const SIGHASH_SINGLE: u8 = 0x03;

/// Sighash modifier: commit to this input only
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Sighash modifier repurposed by fork-id chains
pub const SIGHASH_FORKID: u8 = 0x40;

/// Mask extracting the base flag from a sighash byte
pub const SIGHASH_BASE_MASK: u8 = 0x1f;
