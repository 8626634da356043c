//! Cursor over a byte slice with the wire-format's primitive decodings.
//!
//! Every read is bounds-checked; running off the end of the buffer reports
//! [`BytecodeError::Truncated`] rather than panicking, since a truncated
//! file is an expected failure mode, not a programming error.

use crate::error::BytecodeError;

pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BytecodeError> {
        if self.pos + n > self.bytes.len() {
            return Err(BytecodeError::Truncated { at: self.pos, needed: n });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, BytecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32, BytecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn f64(&mut self) -> Result<f64, BytecodeError> {
        let b = self.take(8)?;
        Ok(f64::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn bool(&mut self) -> Result<bool, BytecodeError> {
        Ok(self.u8()? != 0)
    }

    pub fn string(&mut self) -> Result<String, BytecodeError> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub fn list<T>(&mut self, mut read_one: impl FnMut(&mut Self) -> Result<T, BytecodeError>) -> Result<Vec<T>, BytecodeError> {
        let count = self.u32()? as usize;
        let mut items = Vec::with_capacity(count.min(1 << 20));
        for _ in 0..count {
            items.push(read_one(self)?);
        }
        Ok(items)
    }

    pub fn option<T>(&mut self, read_some: impl FnOnce(&mut Self) -> Result<T, BytecodeError>) -> Result<Option<T>, BytecodeError> {
        if self.bool()? {
            Ok(Some(read_some(self)?))
        } else {
            Ok(None)
        }
    }
}
