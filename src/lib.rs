//! # bcore
//!
//! Bitcoin consensus primitives: deterministic binary encoding and decoding
//! of blocks, block headers and transactions (both the legacy and the
//! segregated-witness serializations), and the transaction signature-hash
//! engine that computes the digest a signer commits to for a given input,
//! script and hash-type combination.
//!
//! ## Architecture
//!
//! The crate is a stack of leaf-first value types:
//! - `Hash`, `Compact` and the little-endian `Buffer` codec at the bottom
//! - `OutPoint`, `ScriptWitness`, inputs/outputs, `Transaction`,
//!   `BlockHeader` and `Block` built on the codec
//! - the `TransactionSigner` on top: locktime/sequence predicates for
//!   `OP_CHECKLOCKTIMEVERIFY`/`OP_CHECKSEQUENCEVERIFY`, the three
//!   signature-hash algorithms (original, BIP-143 witness-v0, fork-id) and
//!   secp256k1 signature verification
//!
//! ## Design principles
//!
//! 1. **Bit-exact wire formats**: every encoder and digest reproduces the
//!    consensus byte streams exactly, historical quirks included
//! 2. **Pure values**: no shared state; decoding builds owned values and
//!    digest computation never mutates its inputs
//! 3. **Errors over panics**: corrupt input is a diagnostic
//!    [`CoreError`], not a crash; impossible sighash branches return the
//!    [`HASH_ONE`](hash::HASH_ONE) sentinel instead of failing
//!
//! ## Usage
//!
//! ```rust
//! use bcore::Transaction;
//!
//! let tx = Transaction::from_hex(
//!     "0100000001a6b97044d03da79c005b20ea9c0e1a6d9dc12d9f7b91a5911c9030a4\
//!      39eed8f5000000004948304502206e21798a42fae0e854281abd38bacd1aeed3ee\
//!      3738d9e1446618c4571d1090db022100e2ac980643b0b82c0e88ffdfec6b64e3e6\
//!      ba35e7ba5fdd7d5d6cc8d25c6b241501ffffffff0100f2052a010000001976a914\
//!      404371705fa9bd789a2fcd52d2c580b65d35549d88ac00000000",
//! )
//! .unwrap();
//!
//! assert_eq!(tx.version, 1);
//! assert_eq!(
//!     tx.hash().rhex(),
//!     "5a4ebf66822b0b2d56bd9dc64ece0bc38ee7844a23ff1d7320a88c5fdb2ad3e2"
//! );
//! ```

pub mod block;
pub mod buffer;
pub mod compact;
pub mod constants;
pub mod error;
pub mod formatter;
pub mod hash;
pub mod script;
pub mod signer;
pub mod transaction;

pub use block::{Block, BlockHeader};
pub use buffer::Buffer;
pub use compact::Compact;
pub use constants::*;
pub use error::{CoreError, Result};
pub use formatter::Formatter;
pub use hash::{dhash256, Hash, HASH_ONE, HASH_ZERO};
pub use script::{Script, SignatureVersion};
pub use signer::{verify_signature, SigHash, SigHashBase, SigHashCache, TransactionSigner};
pub use transaction::{
    OutPoint, ScriptWitness, Transaction, TransactionInput, TransactionOutput,
};
