//! Bounds-checked cursor over untrusted wire bytes.

use crate::error::SolError;
use crate::short_vec;

pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub(crate) fn read_u8(&mut self, what: &str) -> Result<u8, SolError> {
        let byte = *self
            .bytes
            .get(self.offset)
            .ok_or_else(|| truncated(what))?;
        self.offset += 1;
        Ok(byte)
    }

    pub(crate) fn read_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], SolError> {
        let slice = self.read_slice(N, what)?;
        // read_slice returned exactly N bytes.
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub(crate) fn read_slice(&mut self, len: usize, what: &str) -> Result<&'a [u8], SolError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| truncated(what))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub(crate) fn read_length(&mut self) -> Result<usize, SolError> {
        let (value, consumed) = short_vec::decode_length(&self.bytes[self.offset..])?;
        self.offset += consumed;
        Ok(value)
    }

    /// Read a length prefix that announces `len` items of `item_size` bytes
    /// each, rejecting counts the remaining input cannot possibly hold.
    pub(crate) fn read_bounded_length(
        &mut self,
        item_size: usize,
        what: &str,
    ) -> Result<usize, SolError> {
        let len = self.read_length()?;
        match len.checked_mul(item_size) {
            Some(total) if total <= self.remaining() => Ok(len),
            _ => Err(truncated(what)),
        }
    }

    /// Fail unless every byte was consumed.
    pub(crate) fn finish(self) -> Result<(), SolError> {
        if self.offset != self.bytes.len() {
            return Err(SolError::Serialization(format!(
                "{} trailing bytes after message",
                self.remaining()
            )));
        }
        Ok(())
    }
}

fn truncated(what: &str) -> SolError {
    SolError::Serialization(format!("input too short while reading {what}"))
}
