// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A bounds-checked forward reader over an immutable byte buffer.

use crate::Error;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::KnownLayout;

/// Forward reader over a byte slice.
///
/// Every read either succeeds in full or fails with [`Error::TruncatedInput`]
/// and leaves the cursor where it was, so a caller can back off and try
/// something else.
///
/// Positions are reported relative to the start of the outermost buffer, even
/// for cursors created with [`ByteCursor::split`].
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    /// Offset of the next unread byte, relative to the outermost buffer.
    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` once every byte has been read.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn truncated(&self, needed: usize) -> Error {
        Error::TruncatedInput {
            offset: self.position(),
            needed,
            available: self.remaining(),
        }
    }

    fn peek(&self, n: usize) -> Result<&'a [u8], Error> {
        self.data
            .get(self.pos..)
            .and_then(|rest| rest.get(..n))
            .ok_or_else(|| self.truncated(n))
    }

    /// Reads exactly `n` bytes.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    /// Reads a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut out = [0; N];
        out.copy_from_slice(self.peek(N)?);
        self.pos += N;
        Ok(out)
    }

    /// Reads a fixed layout type, such as a wire header from `uefi_specs`.
    pub fn read_struct<T: FromBytes + KnownLayout + Immutable>(&mut self) -> Result<T, Error> {
        let n = size_of::<T>();
        let value = T::read_from_bytes(self.peek(n)?).map_err(|_| self.truncated(n))?;
        self.pos += n;
        Ok(value)
    }

    #[expect(missing_docs)]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_array::<1>()?[0])
    }

    #[expect(missing_docs)]
    pub fn read_u16_le(&mut self) -> Result<u16, Error> {
        self.read_array().map(u16::from_le_bytes)
    }

    #[expect(missing_docs)]
    pub fn read_u32_le(&mut self) -> Result<u32, Error> {
        self.read_array().map(u32::from_le_bytes)
    }

    #[expect(missing_docs)]
    pub fn read_u64_le(&mut self) -> Result<u64, Error> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Reads UTF-16LE code units up to and including a `0x0000` terminator,
    /// returning the text before the terminator.
    ///
    /// Unpaired surrogates are replaced with U+FFFD, as firmware strings are
    /// nominally UCS-2 and are not validated by the producer.
    pub fn read_utf16le_cstring(&mut self) -> Result<String, Error> {
        let rest = &self.data[self.pos..];
        let units = rest
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]));

        let mut text = Vec::new();
        for unit in units {
            if unit == 0 {
                self.pos += (text.len() + 1) * 2;
                return Ok(String::from_utf16_lossy(&text));
            }
            text.push(unit);
        }

        // Enough for every whole unit seen so far plus a terminator.
        Err(self.truncated(text.len() * 2 + 2))
    }

    /// Advances past `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        self.peek(n)?;
        self.pos += n;
        Ok(())
    }

    /// Splits off a cursor over the next `n` bytes and advances `self` past
    /// them. Reads on the returned cursor can never run past those `n` bytes.
    pub fn split(&mut self, n: usize) -> Result<ByteCursor<'a>, Error> {
        let base = self.position();
        let data = self.read_exact(n)?;
        Ok(ByteCursor { data, pos: 0, base })
    }

    /// Reads everything that is left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn little_endian_reads() {
        let data = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
            0x0f,
        ];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.read_u8().unwrap(), 0x01);
        assert_eq!(c.read_u16_le().unwrap(), 0x0302);
        assert_eq!(c.read_u32_le().unwrap(), 0x0706_0504);
        assert_eq!(c.read_u64_le().unwrap(), 0x0f0e_0d0c_0b0a_0908);
        assert!(c.is_empty());
        assert_eq!(c.position(), data.len());
    }

    #[test]
    fn truncated_read_leaves_cursor_unchanged() {
        let data = [0xaa, 0xbb, 0xcc];
        let mut c = ByteCursor::new(&data);
        c.read_u8().unwrap();

        let err = c.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            Error::TruncatedInput {
                offset: 1,
                needed: 4,
                available: 2
            }
        );
        assert_eq!(c.position(), 1);
        assert!(c.read_exact(3).is_err());
        assert!(c.skip(3).is_err());
        assert_eq!(c.position(), 1);

        // A smaller read still works afterwards.
        assert_eq!(c.read_u16_le().unwrap(), 0xccbb);
    }

    #[test]
    fn empty_cstring() {
        let data = [0x00, 0x00, 0x41, 0x00];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.read_utf16le_cstring().unwrap(), "");
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn cstring_stops_at_first_terminator() {
        let data = [b'h', 0, b'i', 0, 0, 0, b'x', 0, 0, 0];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.read_utf16le_cstring().unwrap(), "hi");
        assert_eq!(c.position(), 6);
        assert_eq!(c.read_utf16le_cstring().unwrap(), "x");
        assert!(c.is_empty());
    }

    #[test]
    fn cstring_without_terminator() {
        let data = [b'h', 0, b'i', 0, 0];
        let mut c = ByteCursor::new(&data);
        let err = c.read_utf16le_cstring().unwrap_err();
        assert!(matches!(err, Error::TruncatedInput { offset: 0, .. }));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn split_is_bounded_and_keeps_offsets() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut c = ByteCursor::new(&data);
        c.skip(1).unwrap();

        let mut inner = c.split(3).unwrap();
        assert_eq!(c.position(), 4);
        assert_eq!(inner.position(), 1);
        assert_eq!(inner.read_exact(2).unwrap(), &[2, 3]);

        let err = inner.read_u16_le().unwrap_err();
        assert_eq!(
            err,
            Error::TruncatedInput {
                offset: 3,
                needed: 2,
                available: 1
            }
        );

        assert!(c.split(3).is_err());
        assert_eq!(c.read_rest(), &[5, 6]);
        assert!(c.is_empty());
    }
}
