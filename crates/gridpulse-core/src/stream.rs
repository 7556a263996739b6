//! Typed field streams: homogeneous sequences of fixed-width values.
//!
//! A field stream is opened on a cursor with [`ByteWriter::begin_write`] or
//! [`ByteReader::begin_read`] and closed with `end_write` / `end_read`. The
//! stream mutably borrows its cursor for its whole lifetime, so a second
//! stream cannot be opened before the first is closed, and nothing else can
//! write to the cursor in between.
//!
//! Streams carry no length prefix. The element count always comes from the
//! surrounding context (grid size, or a count the caller read earlier).
//!
//! Supported element types: `u8`, `i16`, `u16` (little-endian) and `bool`
//! (packed eight per byte, least significant bit first; the last partial
//! byte is flushed when the writer closes and its unused bits are skipped
//! when the reader closes).

use std::fmt;
use std::marker::PhantomData;

use bytes::{BufMut, BytesMut};

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::DecodeError;

// ---------------------------------------------------------------------------
// Element types
// ---------------------------------------------------------------------------

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for bool {}
}

/// A primitive that can be carried by a field stream.
pub trait FieldValue: sealed::Sealed + Copy + Default + PartialEq + fmt::Debug {
    #[doc(hidden)]
    fn put(self, sink: &mut FieldSink<'_>);
    #[doc(hidden)]
    fn take(source: &mut FieldSource<'_, '_>) -> Result<Self, DecodeError>;
}

impl FieldValue for u8 {
    fn put(self, sink: &mut FieldSink<'_>) {
        sink.buf.put_u8(self);
    }
    fn take(source: &mut FieldSource<'_, '_>) -> Result<Self, DecodeError> {
        source.reader.read_u8()
    }
}

impl FieldValue for i16 {
    fn put(self, sink: &mut FieldSink<'_>) {
        sink.buf.put_i16_le(self);
    }
    fn take(source: &mut FieldSource<'_, '_>) -> Result<Self, DecodeError> {
        source.reader.read_i16()
    }
}

impl FieldValue for u16 {
    fn put(self, sink: &mut FieldSink<'_>) {
        sink.buf.put_u16_le(self);
    }
    fn take(source: &mut FieldSource<'_, '_>) -> Result<Self, DecodeError> {
        source.reader.read_u16()
    }
}

impl FieldValue for bool {
    fn put(self, sink: &mut FieldSink<'_>) {
        sink.put_bit(self);
    }
    fn take(source: &mut FieldSource<'_, '_>) -> Result<Self, DecodeError> {
        source.take_bit()
    }
}

// ---------------------------------------------------------------------------
// Sink / source state
// ---------------------------------------------------------------------------

/// Write-side state of an open field stream.
#[doc(hidden)]
pub struct FieldSink<'w> {
    buf: &'w mut BytesMut,
    bits: u8,
    bit_count: u8,
}

impl FieldSink<'_> {
    fn put_bit(&mut self, value: bool) {
        if value {
            self.bits |= 1 << self.bit_count;
        }
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.flush_bits();
        }
    }

    fn flush_bits(&mut self) {
        if self.bit_count > 0 {
            self.buf.put_u8(self.bits);
            self.bits = 0;
            self.bit_count = 0;
        }
    }
}

/// Read-side state of an open field stream.
#[doc(hidden)]
pub struct FieldSource<'r, 'a> {
    reader: &'r mut ByteReader<'a>,
    bits: u8,
    bits_left: u8,
}

impl FieldSource<'_, '_> {
    fn take_bit(&mut self) -> Result<bool, DecodeError> {
        if self.bits_left == 0 {
            self.bits = self.reader.read_u8()?;
            self.bits_left = 8;
        }
        let bit = self.bits & 1 == 1;
        self.bits >>= 1;
        self.bits_left -= 1;
        Ok(bit)
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// An open write stream for one field. Dropping it closes it.
pub struct FieldWriter<'w, T: FieldValue> {
    sink: FieldSink<'w>,
    written: usize,
    _marker: PhantomData<T>,
}

impl<T: FieldValue> FieldWriter<'_, T> {
    pub fn write(&mut self, value: T) {
        value.put(&mut self.sink);
        self.written += 1;
    }

    /// Close the stream, flushing any partially filled bit byte. Returns the
    /// number of elements written.
    pub fn end_write(self) -> usize {
        let written = self.written;
        drop(self);
        written
    }
}

impl<T: FieldValue> Drop for FieldWriter<'_, T> {
    fn drop(&mut self) {
        self.sink.flush_bits();
    }
}

impl ByteWriter {
    /// Open a field stream of `T` values on this cursor.
    pub fn begin_write<T: FieldValue>(&mut self) -> FieldWriter<'_, T> {
        FieldWriter {
            sink: FieldSink {
                buf: self.buf_mut(),
                bits: 0,
                bit_count: 0,
            },
            written: 0,
            _marker: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// An open read stream for one field.
pub struct FieldReader<'r, 'a, T: FieldValue> {
    source: FieldSource<'r, 'a>,
    read: usize,
    _marker: PhantomData<T>,
}

impl<T: FieldValue> FieldReader<'_, '_, T> {
    pub fn read(&mut self) -> Result<T, DecodeError> {
        let value = T::take(&mut self.source)?;
        self.read += 1;
        Ok(value)
    }

    /// Close the stream. Unused bits of a trailing packed byte are skipped.
    pub fn end_read(self) -> usize {
        self.read
    }
}

impl<'a> ByteReader<'a> {
    /// Open a field stream of `T` values on this cursor.
    pub fn begin_read<T: FieldValue>(&mut self) -> FieldReader<'_, 'a, T> {
        FieldReader {
            source: FieldSource {
                reader: self,
                bits: 0,
                bits_left: 0,
            },
            read: 0,
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_stream_has_no_length_prefix() {
        let mut out = ByteWriter::new();
        let mut field = out.begin_write::<u16>();
        field.write(1);
        field.write(0xABCD);
        assert_eq!(field.end_write(), 2);
        assert_eq!(out.as_slice(), &[1, 0, 0xCD, 0xAB]);
    }

    #[test]
    fn bools_pack_eight_per_byte() {
        let mut out = ByteWriter::new();
        let mut field = out.begin_write::<bool>();
        for i in 0..10 {
            field.write(i % 3 == 0);
        }
        field.end_write();
        // bits 0,3,6,9 set -> 0b0100_1001, then 0b0000_0010
        assert_eq!(out.as_slice(), &[0b0100_1001, 0b0000_0010]);
    }

    #[test]
    fn dropping_writer_flushes_partial_byte() {
        let mut out = ByteWriter::new();
        {
            let mut field = out.begin_write::<bool>();
            field.write(true);
        }
        out.write_u8(0xEE);
        assert_eq!(out.as_slice(), &[0b1, 0xEE]);
    }

    #[test]
    fn consecutive_bool_streams_start_on_fresh_bytes() {
        let mut out = ByteWriter::new();
        let mut a = out.begin_write::<bool>();
        a.write(true);
        a.end_write();
        let mut b = out.begin_write::<bool>();
        b.write(true);
        b.write(true);
        b.end_write();

        let data = out.into_vec();
        assert_eq!(data, vec![0b01, 0b11]);

        let mut input = ByteReader::new(&data);
        let mut a = input.begin_read::<bool>();
        assert!(a.read().unwrap());
        a.end_read();
        let mut b = input.begin_read::<bool>();
        assert!(b.read().unwrap());
        assert!(b.read().unwrap());
        assert_eq!(b.end_read(), 2);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn signed_values_round_trip() {
        let values = [i16::MIN, -1, 0, 1, i16::MAX];
        let mut out = ByteWriter::new();
        let mut field = out.begin_write::<i16>();
        for v in values {
            field.write(v);
        }
        field.end_write();

        let data = out.into_vec();
        let mut input = ByteReader::new(&data);
        let mut field = input.begin_read::<i16>();
        for v in values {
            assert_eq!(field.read().unwrap(), v);
        }
    }

    #[test]
    fn reading_past_end_reports_truncation() {
        let data = [5u8];
        let mut input = ByteReader::new(&data);
        let mut field = input.begin_read::<u8>();
        assert_eq!(field.read().unwrap(), 5);
        assert!(matches!(
            field.read(),
            Err(DecodeError::Truncated { offset: 1, .. })
        ));
    }
}
