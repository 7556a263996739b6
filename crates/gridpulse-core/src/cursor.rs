//! Raw little-endian byte cursor shared by every codec.
//!
//! [`ByteWriter`] appends into a growable buffer; [`ByteReader`] consumes a
//! borrowed slice and reports [`DecodeError::Truncated`] instead of panicking
//! when the slice runs out. Field streams ([`crate::stream`]) are opened on
//! top of these cursors.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::DecodeError;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only output cursor.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: BytesMut,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    /// Standalone boolean, one full byte. Booleans inside a field stream are
    /// bit-packed instead.
    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Borrow the written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return the encoded bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub(crate) fn buf_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Consuming input cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    total: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            total: data.len(),
        }
    }

    /// Bytes consumed since construction.
    pub fn position(&self) -> usize {
        self.total - self.data.len()
    }

    /// Bytes left to consume.
    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if self.data.remaining() < needed {
            return Err(DecodeError::Truncated {
                offset: self.position(),
                needed,
                remaining: self.data.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        Ok(self.data.get_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.ensure(2)?;
        Ok(self.data.get_u16_le())
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        self.ensure(2)?;
        Ok(self.data.get_i16_le())
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        Ok(self.data.get_u32_le())
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.ensure(4)?;
        Ok(self.data.get_i32_le())
    }

    /// Standalone boolean: any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(len)?;
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }
}
