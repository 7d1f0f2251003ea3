//! Transaction entities and their legacy and witness wire forms

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::constants::{OUT_POINT_SIZE, SEQUENCE_FINAL, WITNESS_FLAG, WITNESS_MARKER};
use crate::error::{CoreError, Result};
use crate::formatter::Formatter;
use crate::hash::{dhash256, Hash, HASH_ZERO};

/// Reference to a specific output of a prior transaction: its txid in
/// internal byte order plus the output index. 36 bytes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

impl OutPoint {
    /// The null outpoint a coinbase input carries: zero hash, maximum index.
    pub fn null() -> Self {
        OutPoint {
            hash: HASH_ZERO,
            index: u32::MAX,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != OUT_POINT_SIZE {
            return Err(CoreError::OutPointWrongSize);
        }
        Self::from_buffer(&mut Buffer::from_bytes(data.to_vec()))
    }

    pub fn from_buffer(buffer: &mut Buffer) -> Result<Self> {
        let hash = buffer.get_hash()?;
        let index = buffer.get_u32()?;
        Ok(OutPoint { hash, index })
    }

    /// A null outpoint marks a coinbase input.
    pub fn is_null(&self) -> bool {
        self.hash.is_zero()
    }

    pub fn encode(&self, buffer: &mut Buffer) {
        buffer.put_hash(&self.hash).put_u32(self.index);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Buffer::new();
        self.encode(&mut buffer);
        buffer.into_bytes()
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.index)
    }
}

/// Per-input witness stack: an ordered sequence of byte strings. Encoded as
/// `varint(count)` followed by each element as var-bytes; the empty witness
/// is the single byte `0x00`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptWitness(Vec<Vec<u8>>);

impl ScriptWitness {
    pub fn new(items: Vec<Vec<u8>>) -> Self {
        ScriptWitness(items)
    }

    pub fn from_buffer(buffer: &mut Buffer) -> Result<Self> {
        let n = buffer.get_var_int()?;
        let mut items = Vec::with_capacity(n as usize);
        for _ in 0..n {
            items.push(buffer.get_var_bytes()?);
        }
        Ok(ScriptWitness(items))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[Vec<u8>] {
        &self.0
    }

    pub fn push(&mut self, item: Vec<u8>) {
        self.0.push(item);
    }

    pub fn encode(&self, buffer: &mut Buffer) {
        buffer.put_var_int(self.0.len() as u64);
        for item in &self.0 {
            buffer.put_var_bytes(item);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Buffer::new();
        self.encode(&mut buffer);
        buffer.into_bytes()
    }
}

/// One spend of a prior output. The witness stack is out-of-band: it never
/// appears in the legacy serialization and is emitted in its own section of
/// the witness serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prev_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    pub script_witness: ScriptWitness,
}

impl TransactionInput {
    pub fn from_buffer(buffer: &mut Buffer) -> Result<Self> {
        let prev_output = OutPoint::from_buffer(buffer)?;
        let script_sig = buffer.get_var_bytes()?;
        let sequence = buffer.get_u32()?;
        Ok(TransactionInput {
            prev_output,
            script_sig,
            sequence,
            script_witness: ScriptWitness::default(),
        })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_buffer(&mut Buffer::from_bytes(data.to_vec()))
    }

    pub fn is_final(&self) -> bool {
        self.sequence == SEQUENCE_FINAL
    }

    pub fn has_witness(&self) -> bool {
        !self.script_witness.is_empty()
    }

    /// Legacy form: outpoint, script, sequence. No witness.
    pub fn encode(&self, buffer: &mut Buffer) {
        self.prev_output.encode(buffer);
        buffer.put_var_bytes(&self.script_sig).put_u32(self.sequence);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Buffer::new();
        self.encode(&mut buffer);
        buffer.into_bytes()
    }
}

impl fmt::Display for TransactionInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Formatter::new("\n", 10)
            .field("prevout", &self.prev_output)
            .field("scriptsig", hex::encode(&self.script_sig))
            .field("sequence", self.sequence)
            .finish();
        f.write_str(&text)
    }
}

/// An amount of satoshis locked by a pubkey script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

impl TransactionOutput {
    /// The placeholder output the legacy SIGHASH_SINGLE projection emits in
    /// front of the paired output: maximum value, empty script.
    pub fn null() -> Self {
        TransactionOutput {
            value: u64::MAX,
            script_pubkey: Vec::new(),
        }
    }

    pub fn from_buffer(buffer: &mut Buffer) -> Result<Self> {
        let value = buffer.get_u64()?;
        let script_pubkey = buffer.get_var_bytes()?;
        Ok(TransactionOutput {
            value,
            script_pubkey,
        })
    }

    pub fn encode(&self, buffer: &mut Buffer) {
        buffer.put_u64(self.value).put_var_bytes(&self.script_pubkey);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Buffer::new();
        self.encode(&mut buffer);
        buffer.into_bytes()
    }
}

impl fmt::Display for TransactionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Formatter::new("\n", 10)
            .field("value", self.value)
            .field("scriptpub", hex::encode(&self.script_pubkey))
            .finish();
        f.write_str(&text)
    }
}

/// A transaction in either of its two wire forms.
///
/// The legacy form is `version | inputs | outputs | locktime`; the witness
/// form inserts the `0x00 0x01` marker/flag pair after the version and a
/// per-input witness section before the locktime. The txid is always the
/// double-SHA-256 of the legacy form, which is what makes it invariant
/// under witness malleation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub locktime: u32,
}

impl Transaction {
    pub fn from_hex(hexstring: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(hexstring)?)
    }

    pub fn from_witness_hex(hexstring: &str) -> Result<Self> {
        Self::from_witness_bytes(&hex::decode(hexstring)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_buffer(&mut Buffer::from_bytes(data.to_vec()))
    }

    pub fn from_witness_bytes(data: &[u8]) -> Result<Self> {
        Self::from_witness_buffer(&mut Buffer::from_bytes(data.to_vec()))
    }

    pub fn from_buffer(buffer: &mut Buffer) -> Result<Self> {
        let version = buffer.get_u32()?;
        let inputs = Self::inputs_from_buffer(buffer)?;
        let outputs = Self::outputs_from_buffer(buffer)?;
        let locktime = buffer.get_u32()?;
        Ok(Transaction {
            version,
            inputs,
            outputs,
            locktime,
        })
    }

    pub fn from_witness_buffer(buffer: &mut Buffer) -> Result<Self> {
        let version = buffer.get_u32()?;

        let marker = buffer.get_u8()?;
        if marker != WITNESS_MARKER {
            return Err(CoreError::NoWitnessMarker);
        }
        let flag = buffer.get_u8()?;
        if flag != WITNESS_FLAG {
            return Err(CoreError::NoWitnessFlag);
        }

        let mut inputs = Self::inputs_from_buffer(buffer)?;
        let outputs = Self::outputs_from_buffer(buffer)?;
        for input in inputs.iter_mut() {
            input.script_witness = ScriptWitness::from_buffer(buffer)?;
        }
        let locktime = buffer.get_u32()?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            locktime,
        })
    }

    fn inputs_from_buffer(buffer: &mut Buffer) -> Result<Vec<TransactionInput>> {
        let n = buffer.get_var_int()?;
        let mut inputs = Vec::with_capacity(n as usize);
        for _ in 0..n {
            inputs.push(TransactionInput::from_buffer(buffer)?);
        }
        Ok(inputs)
    }

    fn outputs_from_buffer(buffer: &mut Buffer) -> Result<Vec<TransactionOutput>> {
        let n = buffer.get_var_int()?;
        let mut outputs = Vec::with_capacity(n as usize);
        for _ in 0..n {
            outputs.push(TransactionOutput::from_buffer(buffer)?);
        }
        Ok(outputs)
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() || self.outputs.is_empty()
    }

    pub fn is_null(&self) -> bool {
        self.inputs.iter().any(|input| input.prev_output.is_null())
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prev_output.is_null()
    }

    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| input.has_witness())
    }

    /// Sum of all output values in satoshis.
    pub fn total_spends(&self) -> u64 {
        self.outputs.iter().map(|output| output.value).sum()
    }

    /// Legacy form, witness excluded.
    pub fn encode(&self, buffer: &mut Buffer) {
        buffer.put_u32(self.version);

        buffer.put_var_int(self.inputs.len() as u64);
        for input in &self.inputs {
            input.encode(buffer);
        }

        buffer.put_var_int(self.outputs.len() as u64);
        for output in &self.outputs {
            output.encode(buffer);
        }

        buffer.put_u32(self.locktime);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Buffer::new();
        self.encode(&mut buffer);
        buffer.into_bytes()
    }

    /// Witness form: `version | marker | flag | inputs | outputs | witness
    /// sections | locktime`. Falls back to the legacy form when no input
    /// carries a witness.
    pub fn encode_with_witness(&self, buffer: &mut Buffer) {
        if !self.has_witness() {
            self.encode(buffer);
            return;
        }

        buffer.put_u32(self.version);
        buffer.put_u8(WITNESS_MARKER).put_u8(WITNESS_FLAG);

        buffer.put_var_int(self.inputs.len() as u64);
        for input in &self.inputs {
            input.encode(buffer);
        }

        buffer.put_var_int(self.outputs.len() as u64);
        for output in &self.outputs {
            output.encode(buffer);
        }

        for input in &self.inputs {
            input.script_witness.encode(buffer);
        }

        buffer.put_u32(self.locktime);
    }

    pub fn to_witness_bytes(&self) -> Vec<u8> {
        let mut buffer = Buffer::new();
        self.encode_with_witness(&mut buffer);
        buffer.into_bytes()
    }

    /// The txid: double-SHA-256 of the legacy serialization, always.
    pub fn hash(&self) -> Hash {
        dhash256(&self.to_bytes())
    }

    /// The wtxid: double-SHA-256 of the witness serialization when any
    /// witness is present, of the legacy one otherwise.
    pub fn witness_hash(&self) -> Hash {
        dhash256(&self.to_witness_bytes())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Formatter::new("\n", 10)
            .field("version", self.version)
            .list_field("inputs", &self.inputs)
            .list_field("outputs", &self.outputs)
            .field("locktime", self.locktime)
            .finish();
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(tag: u8) -> TransactionInput {
        TransactionInput {
            prev_output: OutPoint {
                hash: Hash::from_bytes([tag; 32]),
                index: tag as u32,
            },
            script_sig: vec![0x51],
            sequence: SEQUENCE_FINAL,
            script_witness: ScriptWitness::default(),
        }
    }

    #[test]
    fn test_out_point_fixed_size() {
        let out_point = OutPoint {
            hash: Hash::from_bytes([9; 32]),
            index: 7,
        };
        let bytes = out_point.to_bytes();
        assert_eq!(bytes.len(), OUT_POINT_SIZE);
        assert_eq!(OutPoint::from_bytes(&bytes).unwrap(), out_point);
    }

    #[test]
    fn test_out_point_wrong_size() {
        assert_eq!(
            OutPoint::from_bytes(&[0u8; 35]),
            Err(CoreError::OutPointWrongSize)
        );
        assert_eq!(
            OutPoint::from_bytes(&[0u8; 37]),
            Err(CoreError::OutPointWrongSize)
        );
    }

    #[test]
    fn test_out_point_null() {
        let null = OutPoint::null();
        assert!(null.is_null());
        assert_eq!(null.index, 0xffffffff);
        assert!(!OutPoint {
            hash: Hash::from_bytes([1; 32]),
            index: 0
        }
        .is_null());
    }

    #[test]
    fn test_script_witness_encoding() {
        let empty = ScriptWitness::default();
        assert_eq!(empty.to_bytes(), vec![0x00]);

        let witness = ScriptWitness::new(vec![vec![0xaa, 0xbb], vec![0xcc]]);
        assert_eq!(witness.to_bytes(), vec![0x02, 0x02, 0xaa, 0xbb, 0x01, 0xcc]);

        let mut reader = Buffer::from_bytes(witness.to_bytes());
        assert_eq!(ScriptWitness::from_buffer(&mut reader).unwrap(), witness);
    }

    #[test]
    fn test_input_round_trip_drops_witness() {
        let mut input = sample_input(3);
        input.script_witness.push(vec![1, 2, 3]);

        let decoded = TransactionInput::from_bytes(&input.to_bytes()).unwrap();
        assert_eq!(decoded.prev_output, input.prev_output);
        assert_eq!(decoded.script_sig, input.script_sig);
        assert_eq!(decoded.sequence, input.sequence);
        assert!(decoded.script_witness.is_empty());
    }

    #[test]
    fn test_input_is_final() {
        assert!(sample_input(1).is_final());
        let mut input = sample_input(1);
        input.sequence = 0xfffffffe;
        assert!(!input.is_final());
    }

    #[test]
    fn test_output_null_sentinel() {
        let sentinel = TransactionOutput::null();
        assert_eq!(sentinel.value, u64::MAX);
        assert!(sentinel.script_pubkey.is_empty());
        assert_eq!(
            sentinel.to_bytes(),
            vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00]
        );
    }

    #[test]
    fn test_transaction_round_trip() {
        let tx = Transaction {
            version: 2,
            inputs: vec![sample_input(1), sample_input(2)],
            outputs: vec![TransactionOutput {
                value: 5_000_000_000,
                script_pubkey: vec![0x76, 0xa9],
            }],
            locktime: 17,
        };
        assert_eq!(Transaction::from_bytes(&tx.to_bytes()).unwrap(), tx);
    }

    #[test]
    fn test_coinbase_predicates() {
        let coinbase = Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prev_output: OutPoint::null(),
                script_sig: vec![],
                sequence: SEQUENCE_FINAL,
                script_witness: ScriptWitness::default(),
            }],
            outputs: vec![TransactionOutput {
                value: 50,
                script_pubkey: vec![],
            }],
            locktime: 0,
        };
        assert!(coinbase.is_coinbase());
        assert!(coinbase.is_null());
        assert!(!coinbase.is_empty());

        let regular = Transaction {
            version: 1,
            inputs: vec![sample_input(1)],
            outputs: vec![],
            locktime: 0,
        };
        assert!(!regular.is_coinbase());
        assert!(!regular.is_null());
        assert!(regular.is_empty());
    }

    #[test]
    fn test_total_spends() {
        let tx = Transaction {
            version: 1,
            inputs: vec![sample_input(1)],
            outputs: vec![
                TransactionOutput {
                    value: 100,
                    script_pubkey: vec![],
                },
                TransactionOutput {
                    value: 250,
                    script_pubkey: vec![],
                },
            ],
            locktime: 0,
        };
        assert_eq!(tx.total_spends(), 350);
    }

    #[test]
    fn test_witness_encoding_falls_back_when_absent() {
        let tx = Transaction {
            version: 1,
            inputs: vec![sample_input(1)],
            outputs: vec![TransactionOutput {
                value: 1,
                script_pubkey: vec![],
            }],
            locktime: 0,
        };
        assert!(!tx.has_witness());
        assert_eq!(tx.to_witness_bytes(), tx.to_bytes());
        assert_eq!(tx.witness_hash(), tx.hash());
    }

    #[test]
    fn test_display_lists_inputs_and_outputs() {
        let tx = Transaction {
            version: 1,
            inputs: vec![sample_input(1)],
            outputs: vec![TransactionOutput {
                value: 42,
                script_pubkey: vec![0x51],
            }],
            locktime: 9,
        };
        let text = tx.to_string();
        assert!(text.starts_with("version   :1\n"));
        assert!(text.contains("inputs[0] :\n"));
        assert!(text.contains("outputs[0]:\n"));
        assert!(text.contains("value     :42"));
        assert!(text.ends_with("locktime  :9"));
    }

    #[test]
    fn test_witness_marker_and_flag_errors() {
        let tx = Transaction {
            version: 1,
            inputs: vec![sample_input(1)],
            outputs: vec![TransactionOutput {
                value: 1,
                script_pubkey: vec![],
            }],
            locktime: 0,
        };
        // legacy bytes have the input count where the marker belongs
        assert_eq!(
            Transaction::from_witness_bytes(&tx.to_bytes()),
            Err(CoreError::NoWitnessMarker)
        );

        let mut with_witness = tx.clone();
        with_witness.inputs[0].script_witness.push(vec![0xaa]);
        let mut bytes = with_witness.to_witness_bytes();
        bytes[5] = 0x02; // corrupt the flag
        assert_eq!(
            Transaction::from_witness_bytes(&bytes),
            Err(CoreError::NoWitnessFlag)
        );
    }
}
