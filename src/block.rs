//! Block header and block wire forms

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::compact::Compact;
use crate::constants::BLOCK_HEADER_SIZE;
use crate::error::{CoreError, Result};
use crate::formatter::Formatter;
use crate::hash::{dhash256, Hash};
use crate::transaction::Transaction;

/// The fixed 80-byte header record. Its double-SHA-256 is the block hash
/// the proof-of-work commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    /// Hash of the previous block's header, internal byte order
    pub prev_hash: Hash,
    /// Root of the transaction merkle tree, internal byte order
    pub merkle_root: Hash,
    /// Unix time the miner started hashing, by the miner's clock
    pub time: u32,
    /// Packed target threshold the header hash must not exceed
    pub bits: Compact,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn from_hex(hexstring: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(hexstring)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != BLOCK_HEADER_SIZE {
            return Err(CoreError::BlockHeaderWrongSize);
        }
        Self::from_buffer(&mut Buffer::from_bytes(data.to_vec()))
    }

    pub fn from_buffer(buffer: &mut Buffer) -> Result<Self> {
        let version = buffer.get_u32()?;
        let prev_hash = buffer.get_hash()?;
        let merkle_root = buffer.get_hash()?;
        let time = buffer.get_u32()?;
        let bits = buffer.get_compact()?;
        let nonce = buffer.get_u32()?;

        Ok(BlockHeader {
            version,
            prev_hash,
            merkle_root,
            time,
            bits,
            nonce,
        })
    }

    pub fn hash(&self) -> Hash {
        dhash256(&self.to_bytes())
    }

    pub fn encode(&self, buffer: &mut Buffer) {
        buffer
            .put_u32(self.version)
            .put_hash(&self.prev_hash)
            .put_hash(&self.merkle_root)
            .put_u32(self.time)
            .put_compact(self.bits)
            .put_u32(self.nonce);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Buffer::new();
        self.encode(&mut buffer);
        buffer.into_bytes()
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = Formatter::new("\n", 10)
            .field("version", self.version)
            .field("prevhash", &self.prev_hash)
            .field("merkleroot", &self.merkle_root)
            .field("time", self.time)
            .field("bits", self.bits)
            .field("nonce", self.nonce)
            .finish();
        f.write_str(&text)
    }
}

/// A header plus its varint-counted transaction list. The block hash is the
/// header hash; merkle-root correctness is not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Block {
            header,
            transactions,
        }
    }

    pub fn from_hex(hexstring: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(hexstring)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_buffer(&mut Buffer::from_bytes(data.to_vec()))
    }

    pub fn from_buffer(buffer: &mut Buffer) -> Result<Self> {
        let header = BlockHeader::from_buffer(buffer)?;

        let n = buffer.get_var_int()?;
        let mut transactions = Vec::with_capacity(n as usize);
        for _ in 0..n {
            transactions.push(Transaction::from_buffer(buffer)?);
        }

        Ok(Block {
            header,
            transactions,
        })
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn encode(&self, buffer: &mut Buffer) {
        self.header.encode(buffer);
        buffer.put_var_int(self.transactions.len() as u64);
        for transaction in &self.transactions {
            transaction.encode(buffer);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Buffer::new();
        self.encode(&mut buffer);
        buffer.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 1,
            prev_hash: Hash::from_bytes([2; 32]),
            merkle_root: Hash::from_bytes([3; 32]),
            time: 4,
            bits: Compact::new(5),
            nonce: 6,
        }
    }

    #[test]
    fn test_header_byte_exact_encoding() {
        let mut stream = vec![1, 0, 0, 0];
        stream.extend_from_slice(&[2; 32]);
        stream.extend_from_slice(&[3; 32]);
        stream.extend_from_slice(&[4, 0, 0, 0]);
        stream.extend_from_slice(&[5, 0, 0, 0]);
        stream.extend_from_slice(&[6, 0, 0, 0]);

        let header = sample_header();
        assert_eq!(header.to_bytes(), stream);
        assert_eq!(header.to_bytes().len(), BLOCK_HEADER_SIZE);
        assert_eq!(BlockHeader::from_bytes(&stream).unwrap(), header);
    }

    #[test]
    fn test_header_wrong_size() {
        assert_eq!(
            BlockHeader::from_bytes(&[0u8; 79]),
            Err(CoreError::BlockHeaderWrongSize)
        );
        assert_eq!(
            BlockHeader::from_bytes(&[0u8; 81]),
            Err(CoreError::BlockHeaderWrongSize)
        );
    }

    #[test]
    fn test_header_display() {
        let expect = "version   :1\n\
                      prevhash  :0202020202020202020202020202020202020202020202020202020202020202\n\
                      merkleroot:0303030303030303030303030303030303030303030303030303030303030303\n\
                      time      :4\n\
                      bits      :5\n\
                      nonce     :6";
        assert_eq!(sample_header().to_string(), expect);
    }

    #[test]
    fn test_block_hash_is_header_hash() {
        let block = Block::new(sample_header(), vec![]);
        assert_eq!(block.hash(), block.header.hash());
    }

    #[test]
    fn test_empty_block_round_trip() {
        let block = Block::new(sample_header(), vec![]);
        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), BLOCK_HEADER_SIZE + 1);
        assert_eq!(Block::from_bytes(&bytes).unwrap(), block);
    }
}
