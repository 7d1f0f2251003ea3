//! Transaction signature hashing and verification
//!
//! Three digest algorithms live here: the original one, the witness-v0
//! shape of BIP-143, and the fork-id variant that reuses the BIP-143 shape
//! with the `0x40` hashtype bit. Every byte of these digests is
//! consensus-critical; the historical quirks (the SIGHASH_SINGLE sentinel,
//! zeroed foreign sequences, the four-byte hashtype suffix) are reproduced
//! exactly. The locktime and sequence predicates backing
//! `OP_CHECKLOCKTIMEVERIFY` and `OP_CHECKSEQUENCEVERIFY` are carried here
//! too, since they share the signer's view of one input of one transaction.

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use secp256k1::{ecdsa, Message, PublicKey, Secp256k1};

use crate::buffer::Buffer;
use crate::constants::{
    LOCKTIME_THRESHOLD, SEQUENCE_FINAL, SEQUENCE_LOCKTIME_DISABLE_FLAG, SEQUENCE_LOCKTIME_MASK,
    SEQUENCE_LOCKTIME_TYPE_FLAG, SIGHASH_ANYONECANPAY, SIGHASH_BASE_MASK, SIGHASH_FORKID,
    SIGHASH_NONE, SIGHASH_SINGLE,
};
use crate::error::{CoreError, Result};
use crate::hash::{dhash256, Hash, HASH_ONE, HASH_ZERO};
use crate::script::{Script, SignatureVersion};
use crate::transaction::{ScriptWitness, Transaction, TransactionInput, TransactionOutput};

/// The base flag of a sighash byte. Values other than NONE and SINGLE are
/// treated as ALL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigHashBase {
    All,
    None,
    Single,
}

/// A decoded hash-type value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigHash {
    pub base: SigHashBase,
    pub anyone_can_pay: bool,
    pub fork_id: bool,
}

impl SigHash {
    /// Decodes a 32-bit hash-type value under the given signature version.
    /// The fork-id bit only takes effect for [`SignatureVersion::ForkId`].
    pub fn from_u32(version: SignatureVersion, u: u32) -> Self {
        let base = match (u & SIGHASH_BASE_MASK as u32) as u8 {
            SIGHASH_SINGLE => SigHashBase::Single,
            SIGHASH_NONE => SigHashBase::None,
            _ => SigHashBase::All,
        };

        SigHash {
            base,
            anyone_can_pay: u & SIGHASH_ANYONECANPAY as u32 != 0,
            fork_id: version == SignatureVersion::ForkId && u & SIGHASH_FORKID as u32 != 0,
        }
    }
}

/// Lazily computed intermediate hashes shared by the witness-v0 and fork-id
/// algorithms. Signing many inputs of one transaction reuses the three
/// sub-hashes instead of recomputing them per input. Valid for a single
/// transaction only; build a fresh cache per transaction.
#[derive(Debug, Default)]
pub struct SigHashCache {
    hash_prevouts: Option<Hash>,
    hash_sequence: Option<Hash>,
    hash_outputs: Option<Hash>,
}

impl SigHashCache {
    pub fn new() -> Self {
        SigHashCache::default()
    }

    fn hash_prevouts(&mut self, transaction: &Transaction) -> Hash {
        *self.hash_prevouts.get_or_insert_with(|| {
            let mut engine = sha256d::Hash::engine();
            for input in &transaction.inputs {
                engine.input(&input.prev_output.to_bytes());
            }
            Hash::from_bytes(sha256d::Hash::from_engine(engine).to_byte_array())
        })
    }

    fn hash_sequence(&mut self, transaction: &Transaction) -> Hash {
        *self.hash_sequence.get_or_insert_with(|| {
            let mut engine = sha256d::Hash::engine();
            for input in &transaction.inputs {
                engine.input(&input.sequence.to_le_bytes());
            }
            Hash::from_bytes(sha256d::Hash::from_engine(engine).to_byte_array())
        })
    }

    fn hash_outputs(&mut self, transaction: &Transaction) -> Hash {
        *self.hash_outputs.get_or_insert_with(|| {
            let mut engine = sha256d::Hash::engine();
            for output in &transaction.outputs {
                engine.input(&output.to_bytes());
            }
            Hash::from_bytes(sha256d::Hash::from_engine(engine).to_byte_array())
        })
    }
}

/// One input's view of the transaction being signed: the transaction, the
/// index of the input under consideration, and the satoshi value of the
/// previous output it spends (used by witness-v0 only).
#[derive(Debug, Clone, Copy)]
pub struct TransactionSigner<'a> {
    pub transaction: &'a Transaction,
    pub input_index: usize,
    pub input_value: u64,
}

impl<'a> TransactionSigner<'a> {
    pub fn new(transaction: &'a Transaction, input_index: usize, input_value: u64) -> Self {
        TransactionSigner {
            transaction,
            input_index,
            input_value,
        }
    }

    fn input(&self) -> &TransactionInput {
        &self.transaction.inputs[self.input_index]
    }

    /// The predicate behind `OP_CHECKLOCKTIMEVERIFY` (BIP-65).
    ///
    /// There are two kinds of locktime, lock-by-blockheight and
    /// lock-by-blocktime, distinguished by whether the value is below
    /// 500,000,000. Comparing across the two kinds is meaningless, so the
    /// operand must be the same kind as the transaction's locktime.
    pub fn check_lock_time(&self, locktime: u32) -> Result<()> {
        let tx_locktime = self.transaction.locktime;

        if !((tx_locktime < LOCKTIME_THRESHOLD && locktime < LOCKTIME_THRESHOLD)
            || (tx_locktime >= LOCKTIME_THRESHOLD && locktime >= LOCKTIME_THRESHOLD))
        {
            return Err(CoreError::LocktimeThreshold);
        }

        if locktime > tx_locktime {
            return Err(CoreError::LocktimeNotArrived);
        }

        // A final input means nothing can still rely on the transaction
        // locktime, so the opcode must not succeed.
        if self.input().sequence == SEQUENCE_FINAL {
            return Err(CoreError::LocktimeSequenceFinal);
        }

        Ok(())
    }

    /// The predicate behind `OP_CHECKSEQUENCEVERIFY` (BIP-112), evaluating
    /// BIP-68 relative lock-times.
    pub fn check_sequence(&self, sequence: u32) -> Result<()> {
        // BIP-68 rules only trigger from transaction version 2 on.
        if self.transaction.version < 2 {
            return Err(CoreError::SequenceLowVersion);
        }

        if self.input().sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            return Err(CoreError::SequenceDisabled);
        }

        let locktime_mask = SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK;
        let tx_sequence = self.input().sequence & locktime_mask;
        let sequence = sequence & locktime_mask;

        // Same apples-to-apples rule as the locktime check: block-based and
        // time-based relative locks are distinguished by the type flag and
        // must not be compared across kinds.
        if !((tx_sequence < SEQUENCE_LOCKTIME_TYPE_FLAG && sequence < SEQUENCE_LOCKTIME_TYPE_FLAG)
            || (tx_sequence >= SEQUENCE_LOCKTIME_TYPE_FLAG
                && sequence >= SEQUENCE_LOCKTIME_TYPE_FLAG))
        {
            return Err(CoreError::SequenceThreshold);
        }

        if tx_sequence < sequence {
            return Err(CoreError::SequenceNotArrived);
        }

        Ok(())
    }

    /// Computes the digest a signature over this input commits to. Never
    /// fails: the impossible branches return [`HASH_ONE`], which no real
    /// signature verifies against.
    pub fn signature_hash(
        &self,
        script_code: &Script,
        hashtype: u32,
        version: SignatureVersion,
        cache: &mut SigHashCache,
    ) -> Hash {
        match version {
            SignatureVersion::Base => self.signature_hash_original(script_code, hashtype),
            SignatureVersion::WitnessV0 => {
                self.signature_hash_witness_v0(script_code, hashtype, cache)
            }
            SignatureVersion::ForkId => self.signature_hash_fork_id(script_code, hashtype, cache),
        }
    }

    /// The original algorithm: project the transaction down to what the
    /// hash type commits to, serialize it in the legacy form, append the
    /// hashtype as four little-endian bytes and double-hash.
    fn signature_hash_original(&self, script_code: &Script, hashtype: u32) -> Hash {
        let transaction = self.transaction;
        let sighash = SigHash::from_u32(SignatureVersion::Base, hashtype);

        // The long-standing SIGHASH_SINGLE bug: out-of-range indices hash
        // the sentinel instead of failing.
        if self.input_index >= transaction.inputs.len() {
            return HASH_ONE;
        }
        if sighash.base == SigHashBase::Single && self.input_index >= transaction.outputs.len() {
            return HASH_ONE;
        }

        let script_code = script_code.without_sep();

        let inputs = if sighash.anyone_can_pay {
            let input = self.input();
            vec![TransactionInput {
                prev_output: input.prev_output.clone(),
                script_sig: script_code.bytes().to_vec(),
                sequence: input.sequence,
                script_witness: ScriptWitness::default(),
            }]
        } else {
            transaction
                .inputs
                .iter()
                .enumerate()
                .map(|(i, input)| {
                    let script_sig = if i == self.input_index {
                        script_code.bytes().to_vec()
                    } else {
                        Vec::new()
                    };
                    let sequence = if i != self.input_index
                        && matches!(sighash.base, SigHashBase::None | SigHashBase::Single)
                    {
                        0
                    } else {
                        input.sequence
                    };
                    TransactionInput {
                        prev_output: input.prev_output.clone(),
                        script_sig,
                        sequence,
                        script_witness: ScriptWitness::default(),
                    }
                })
                .collect()
        };

        let outputs = match sighash.base {
            SigHashBase::None => Vec::new(),
            SigHashBase::Single => {
                let mut outputs = Vec::with_capacity(self.input_index + 1);
                for _ in 0..self.input_index {
                    outputs.push(TransactionOutput::null());
                }
                outputs.push(transaction.outputs[self.input_index].clone());
                outputs
            }
            SigHashBase::All => transaction.outputs.clone(),
        };

        let projected = Transaction {
            version: transaction.version,
            inputs,
            outputs,
            locktime: transaction.locktime,
        };

        let mut buffer = Buffer::new();
        projected.encode(&mut buffer);
        buffer.put_u32(hashtype);
        dhash256(buffer.bytes())
    }

    /// BIP-143.
    fn signature_hash_witness_v0(
        &self,
        script_code: &Script,
        hashtype: u32,
        cache: &mut SigHashCache,
    ) -> Hash {
        if self.input_index >= self.transaction.inputs.len() {
            return HASH_ONE;
        }

        let sighash = SigHash::from_u32(SignatureVersion::WitnessV0, hashtype);
        self.witness_digest(script_code, hashtype, sighash, cache)
    }

    /// BIP-143 shape with the fork-id hashtype bit. SIGHASH_SINGLE is not
    /// supported on this path and hashes the sentinel.
    fn signature_hash_fork_id(
        &self,
        script_code: &Script,
        hashtype: u32,
        cache: &mut SigHashCache,
    ) -> Hash {
        if self.input_index >= self.transaction.inputs.len() {
            return HASH_ONE;
        }

        let sighash = SigHash::from_u32(SignatureVersion::ForkId, hashtype);
        if sighash.base == SigHashBase::Single {
            return HASH_ONE;
        }

        self.witness_digest(script_code, hashtype, sighash, cache)
    }

    fn witness_digest(
        &self,
        script_code: &Script,
        hashtype: u32,
        sighash: SigHash,
        cache: &mut SigHashCache,
    ) -> Hash {
        let transaction = self.transaction;
        let input = self.input();

        let hash_prevouts = if sighash.anyone_can_pay {
            HASH_ZERO
        } else {
            cache.hash_prevouts(transaction)
        };

        let hash_sequence = if sighash.anyone_can_pay || sighash.base != SigHashBase::All {
            HASH_ZERO
        } else {
            cache.hash_sequence(transaction)
        };

        let hash_outputs = match sighash.base {
            SigHashBase::All => cache.hash_outputs(transaction),
            SigHashBase::Single if self.input_index < transaction.outputs.len() => {
                dhash256(&transaction.outputs[self.input_index].to_bytes())
            }
            _ => HASH_ZERO,
        };

        let mut buffer = Buffer::new();
        buffer
            .put_u32(transaction.version)
            .put_hash(&hash_prevouts)
            .put_hash(&hash_sequence)
            .put_bytes(&input.prev_output.to_bytes())
            .put_var_bytes(script_code.bytes())
            .put_u64(self.input_value)
            .put_u32(input.sequence)
            .put_hash(&hash_outputs)
            .put_u32(transaction.locktime)
            .put_u32(hashtype);

        dhash256(buffer.bytes())
    }

    /// Checks one signature as `OP_CHECKSIG` would: the trailing byte of
    /// the signature is the sighash type, the rest is the DER signature
    /// over the digest selected by `version`.
    pub fn check_signature(
        &self,
        signature: &[u8],
        pubkey: &[u8],
        script_code: &Script,
        version: SignatureVersion,
    ) -> Result<()> {
        if signature.is_empty() {
            return Err(CoreError::EmptySignature);
        }

        let (der, hashtype) = signature.split_at(signature.len() - 1);
        let hashtype = hashtype[0] as u32;

        let mut cache = SigHashCache::new();
        let digest = self.signature_hash(script_code, hashtype, version, &mut cache);

        if verify_signature(pubkey, &digest, der) {
            Ok(())
        } else {
            Err(CoreError::VerifySignatureFailed)
        }
    }
}

/// Verifies a DER-encoded ECDSA signature over a 32-byte digest against a
/// SEC1 public key. Unparseable keys or signatures verify as false.
pub fn verify_signature(pubkey: &[u8], digest: &Hash, signature: &[u8]) -> bool {
    let secp = Secp256k1::verification_only();

    let pubkey = match PublicKey::from_slice(pubkey) {
        Ok(pk) => pk,
        Err(_) => return false,
    };

    let signature = match ecdsa::Signature::from_der(signature) {
        Ok(sig) => sig,
        Err(_) => return false,
    };

    let message = match Message::from_digest_slice(digest.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };

    secp.verify_ecdsa(&message, &signature, &pubkey).is_ok()
}
