//! Little-endian cursor buffer underlying all wire serialization

use crate::compact::Compact;
use crate::constants::HASH_SIZE;
use crate::error::{CoreError, Result};
use crate::hash::Hash;

/// A single read/write cursor over a growable byte sequence. Writers append
/// little-endian bytes and advance the cursor; readers consume from the
/// cursor and fail with [`CoreError::BufferOverflow`] when fewer bytes
/// remain than requested. After a failed read the position is unspecified.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    data: Vec<u8>,
    pos: usize,
}

impl Buffer {
    pub fn new() -> Self {
        Buffer {
            data: Vec::with_capacity(128),
            pos: 0,
        }
    }

    /// Wraps existing bytes for reading, cursor at the start.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Buffer { data, pos: 0 }
    }

    fn require(&self, n: usize) -> Result<()> {
        // pos never exceeds data.len(), so the subtraction cannot wrap even
        // for hostile varint lengths near usize::MAX
        if n > self.data.len() - self.pos {
            return Err(CoreError::BufferOverflow);
        }
        Ok(())
    }

    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.data.push(v);
        self.pos += 1;
        self
    }

    pub fn put_u16(&mut self, v: u16) -> &mut Self {
        self.data.extend_from_slice(&v.to_le_bytes());
        self.pos += 2;
        self
    }

    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.data.extend_from_slice(&v.to_le_bytes());
        self.pos += 4;
        self
    }

    pub fn put_u64(&mut self, v: u64) -> &mut Self {
        self.data.extend_from_slice(&v.to_le_bytes());
        self.pos += 8;
        self
    }

    pub fn put_compact(&mut self, compact: Compact) -> &mut Self {
        self.put_u32(compact.to_u32())
    }

    /// Appends the 32 hash bytes verbatim, no reversal.
    pub fn put_hash(&mut self, hash: &Hash) -> &mut Self {
        self.data.extend_from_slice(hash.as_bytes());
        self.pos += HASH_SIZE;
        self
    }

    /// Appends `n` in Bitcoin's canonical varint form, choosing the
    /// smallest prefix whose range covers the value.
    pub fn put_var_int(&mut self, n: u64) -> &mut Self {
        if n < 0xfd {
            self.put_u8(n as u8)
        } else if n <= 0xffff {
            self.put_u8(0xfd).put_u16(n as u16)
        } else if n <= 0xffff_ffff {
            self.put_u8(0xfe).put_u32(n as u32)
        } else {
            self.put_u8(0xff).put_u64(n)
        }
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self.pos += bytes.len();
        self
    }

    /// Length-prefixed byte string: `varint(len) | bytes`.
    pub fn put_var_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put_var_int(bytes.len() as u64);
        self.put_bytes(bytes)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        self.require(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        self.require(2)?;
        let mut bytes = [0u8; 2];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 2]);
        self.pos += 2;
        Ok(u16::from_le_bytes(bytes))
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        self.require(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn get_u64(&mut self) -> Result<u64> {
        self.require(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn get_compact(&mut self) -> Result<Compact> {
        Ok(Compact::new(self.get_u32()?))
    }

    /// Reads 32 hash bytes verbatim, no reversal.
    pub fn get_hash(&mut self) -> Result<Hash> {
        self.require(HASH_SIZE)?;
        let mut bytes = [0u8; HASH_SIZE];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + HASH_SIZE]);
        self.pos += HASH_SIZE;
        Ok(Hash::from_bytes(bytes))
    }

    pub fn get_var_int(&mut self) -> Result<u64> {
        let first = self.get_u8()?;
        let v = match first {
            0xfd => self.get_u16()? as u64,
            0xfe => self.get_u32()? as u64,
            0xff => self.get_u64()?,
            _ => first as u64,
        };
        Ok(v)
    }

    /// Reads `n` bytes as an owned copy.
    pub fn get_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.require(n)?;
        let bytes = self.data[self.pos..self.pos + n].to_vec();
        self.pos += n;
        Ok(bytes)
    }

    pub fn get_var_bytes(&mut self) -> Result<Vec<u8>> {
        let n = self.get_var_int()?;
        self.get_bytes(n as usize)
    }

    /// Current cursor position; for a freshly written buffer this equals
    /// the number of bytes written.
    pub fn size(&self) -> usize {
        self.pos
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
