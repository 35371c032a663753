//! Bounds-checked reads over an in-memory tag structure.

use byteorder::ByteOrder;

use crate::Error;
use crate::Result;

/// A read-only cursor over a byte slice.
///
/// Every read checks the remaining length first and fails with
/// [`Error::TruncatedData`] instead of reading out of bounds.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Moves to an absolute offset. Seeking exactly to the end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(Error::truncated(offset as u64, self.data.len() as u64));
        }
        self.pos = offset;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Borrows the next `n` bytes and advances past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::truncated(n as u64, self.remaining() as u64));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16<E: ByteOrder>(&mut self) -> Result<u16> {
        Ok(E::read_u16(self.take(2)?))
    }

    pub fn read_u32<E: ByteOrder>(&mut self) -> Result<u32> {
        Ok(E::read_u32(self.take(4)?))
    }

    /// Reads `n` bytes as text. Invalid UTF-8 is replaced rather than rejected.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String> {
        Ok(String::from_utf8_lossy(self.take(n)?).into_owned())
    }

    /// Reads a `u32` length in byte order `E`, then that many bytes.
    pub fn read_length_prefixed_block<E: ByteOrder>(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32::<E>()? as usize;
        self.take(len)
    }

    /// Like [`read_length_prefixed_block`](Self::read_length_prefixed_block), decoded as text.
    pub fn read_length_prefixed_string<E: ByteOrder>(&mut self) -> Result<String> {
        let bytes = self.read_length_prefixed_block::<E>()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
