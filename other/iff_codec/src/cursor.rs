use std::io::Write;

use crate::chunk::ChunkId;
use crate::error::{Error, Result};

/// Read cursor over an in-memory buffer. All integers are little-endian.
#[derive(Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Cursor<'a> { Self { data, pos: 0 } }

    pub fn position(&self) -> usize { self.pos }

    /// True once every byte has been consumed.
    pub fn is_exhausted(&self) -> bool { self.pos >= self.data.len() }

    pub fn remaining(&self) -> usize { self.data.len().saturating_sub(self.pos) }

    /// Looks at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n as u64)?;
        Ok(&self.data[self.pos..self.pos + n])
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.ensure(n)?;
        self.pos += n as usize;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: u64) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let n = n as usize;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_id(&mut self) -> Result<ChunkId> {
        let bytes = self.read_bytes(4)?;
        Ok(ChunkId([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]]))
    }

    /// Fails unless at least `n` more bytes are available.
    pub fn ensure(&self, n: u64) -> Result<()> {
        if n > self.remaining() as u64 {
            return Err(Error::Truncated {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }

        Ok(())
    }
}

/// Little-endian sink that keeps track of how many bytes went through it.
pub struct ChunkWriter<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> ChunkWriter<W> {
    pub fn new(inner: W) -> ChunkWriter<W> { Self { inner, position: 0 } }

    pub fn position(&self) -> u64 { self.position }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    pub fn write_id(&mut self, id: ChunkId) -> Result<()> { self.write_bytes(id.as_bytes()) }

    pub fn write_u32(&mut self, v: u32) -> Result<()> { self.write_bytes(&v.to_le_bytes()) }

    pub fn write_u64(&mut self, v: u64) -> Result<()> { self.write_bytes(&v.to_le_bytes()) }

    /// Writes the zero byte that follows odd-length payloads.
    pub fn pad(&mut self, payload_len: u64) -> Result<()> {
        if payload_len % 2 == 1 {
            self.write_bytes(&[0])?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> { Ok(self.inner.flush()?) }

    pub fn into_inner(self) -> W { self.inner }
}
