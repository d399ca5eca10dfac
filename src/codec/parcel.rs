// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Primitive encodings
//!
//! All values occupy a multiple of 4 bytes. Integers are stored in
//! little-endian byte order. Strings are stored as UTF-16 code units
//! with a length prefix and a terminating zero unit.

use super::{DecodeError, EncodeError};

const ALIGNMENT: usize = 4;

const NULL_LENGTH: i32 = -1;

fn encodable_len(len: usize) -> Result<i32, EncodeError> {
    i32::try_from(len).map_err(|_| EncodeError::LengthOverflow(len))
}

/// Appends encoded values to a growing buffer.
#[derive(Debug, Default)]
pub struct ParcelWriter {
    buf: Vec<u8>,
}

impl ParcelWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a non-negative length or count.
    pub fn write_len(&mut self, len: usize) -> Result<(), EncodeError> {
        self.write_i32(encodable_len(len)?);
        Ok(())
    }

    pub fn write_string(&mut self, value: Option<&str>) -> Result<(), EncodeError> {
        let Some(value) = value else {
            self.write_i32(NULL_LENGTH);
            return Ok(());
        };
        let units = value.encode_utf16().collect::<Vec<_>>();
        self.write_len(units.len())?;
        for unit in units.into_iter().chain(std::iter::once(0)) {
            self.buf.extend_from_slice(&unit.to_le_bytes());
        }
        self.pad();
        Ok(())
    }

    pub fn write_string_array<S>(&mut self, values: Option<&[S]>) -> Result<(), EncodeError>
    where
        S: AsRef<str>,
    {
        let Some(values) = values else {
            self.write_i32(NULL_LENGTH);
            return Ok(());
        };
        self.write_len(values.len())?;
        for value in values {
            self.write_string(Some(value.as_ref()))?;
        }
        Ok(())
    }

    /// Reserve space for an integer that is written later.
    ///
    /// Returns the position for [`Self::patch_i32()`].
    pub(super) fn reserve_i32(&mut self) -> usize {
        let pos = self.buf.len();
        self.write_i32(0);
        pos
    }

    pub(super) fn patch_i32(&mut self, pos: usize, value: i32) {
        debug_assert!(pos + 4 <= self.buf.len());
        self.buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn pad(&mut self) {
        let padded_len = self.buf.len().next_multiple_of(ALIGNMENT);
        self.buf.resize(padded_len, 0);
    }
}

/// Consumes encoded values from a byte slice.
#[derive(Debug)]
pub struct ParcelReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ParcelReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes that have been consumed.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes that have not been consumed yet.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if len > available {
            return Err(DecodeError::UnexpectedEnd {
                needed: len,
                available,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a non-negative length or count.
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| DecodeError::InvalidLength(len))
    }

    /// Read a length or count that might be absent.
    fn read_nullable_len(&mut self) -> Result<Option<usize>, DecodeError> {
        let len = self.read_i32()?;
        if len == NULL_LENGTH {
            return Ok(None);
        }
        usize::try_from(len)
            .map(Some)
            .map_err(|_| DecodeError::InvalidLength(len))
    }

    pub fn read_string(&mut self) -> Result<Option<String>, DecodeError> {
        let Some(len) = self.read_nullable_len()? else {
            return Ok(None);
        };
        // Including the terminating zero unit
        let byte_len = len
            .checked_add(1)
            .and_then(|units| units.checked_mul(2))
            .ok_or(DecodeError::UnexpectedEnd {
                needed: usize::MAX,
                available: self.remaining(),
            })?;
        let bytes = self.read_bytes(byte_len.next_multiple_of(ALIGNMENT))?;
        let (units, terminator) = bytes[..byte_len].split_at(byte_len - 2);
        if terminator != [0, 0] {
            return Err(DecodeError::UnterminatedString);
        }
        let units = units
            .chunks_exact(2)
            .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
            .collect::<Vec<_>>();
        let value = String::from_utf16(&units)?;
        Ok(Some(value))
    }

    /// Read a string that must be present.
    pub fn read_required_string(&mut self) -> Result<String, DecodeError> {
        self.read_string()?.ok_or(DecodeError::MissingString)
    }

    pub fn read_string_array(&mut self) -> Result<Option<Vec<Option<String>>>, DecodeError> {
        let Some(len) = self.read_nullable_len()? else {
            return Ok(None);
        };
        // Each string occupies at least 4 bytes
        let mut values = Vec::with_capacity(len.min(self.remaining() / ALIGNMENT));
        for _ in 0..len {
            values.push(self.read_string()?);
        }
        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_layout() {
        let mut writer = ParcelWriter::new();
        writer.write_string(Some("IN1")).unwrap();
        assert_eq!(
            vec![3, 0, 0, 0, b'I', 0, b'N', 0, b'1', 0, 0, 0],
            writer.into_bytes()
        );
    }

    #[test]
    fn string_padding() {
        let mut writer = ParcelWriter::new();
        writer.write_string(Some("ab")).unwrap();
        // 4 bytes length + 3 units + 2 bytes padding
        assert_eq!(12, writer.len());
        writer.write_string(Some("")).unwrap();
        assert_eq!(20, writer.len());
    }

    #[test]
    fn absent_string() {
        let mut writer = ParcelWriter::new();
        writer.write_string(None).unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(vec![0xff; 4], bytes);
        let mut reader = ParcelReader::new(&bytes);
        assert_eq!(None, reader.read_string().unwrap());
        assert_eq!(0, reader.remaining());
    }

    #[test]
    fn non_ascii_strings() {
        let mut writer = ParcelWriter::new();
        writer.write_string(Some("Größe 🎹")).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = ParcelReader::new(&bytes);
        assert_eq!(
            Some("Größe 🎹"),
            reader.read_string().unwrap().as_deref()
        );
        assert_eq!(0, reader.remaining());
    }

    #[test]
    fn string_array_with_absent_entries() {
        let mut writer = ParcelWriter::new();
        writer.write_i32(3);
        writer.write_string(Some("a")).unwrap();
        writer.write_string(None).unwrap();
        writer.write_string(Some("c")).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = ParcelReader::new(&bytes);
        assert_eq!(
            Some(vec![Some("a".to_owned()), None, Some("c".to_owned())]),
            reader.read_string_array().unwrap()
        );
    }

    #[test]
    fn truncated_string() {
        let mut writer = ParcelWriter::new();
        writer.write_string(Some("truncated")).unwrap();
        let bytes = writer.into_bytes();
        let mut reader = ParcelReader::new(&bytes[..bytes.len() - 4]);
        assert!(matches!(
            reader.read_string(),
            Err(DecodeError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn invalid_utf16() {
        let mut writer = ParcelWriter::new();
        writer.write_i32(1);
        // Unpaired high surrogate and terminator
        writer.write_i32(0x0000_d800);
        let bytes = writer.into_bytes();
        let mut reader = ParcelReader::new(&bytes);
        assert!(matches!(
            reader.read_string(),
            Err(DecodeError::InvalidUtf16(_))
        ));
    }

    #[test]
    fn reject_non_zero_terminator() {
        let mut writer = ParcelWriter::new();
        writer.write_i32(1);
        writer.write_i32(i32::from_le_bytes([b'A', 0, b'B', 0]));
        let bytes = writer.into_bytes();
        assert!(matches!(
            ParcelReader::new(&bytes).read_string(),
            Err(DecodeError::UnterminatedString)
        ));
    }

    #[test]
    fn negative_length() {
        let mut writer = ParcelWriter::new();
        writer.write_i32(-2);
        let bytes = writer.into_bytes();
        assert!(matches!(
            ParcelReader::new(&bytes).read_string(),
            Err(DecodeError::InvalidLength(-2))
        ));
        assert!(matches!(
            ParcelReader::new(&bytes).read_len(),
            Err(DecodeError::InvalidLength(-2))
        ));
    }

    #[test]
    fn patch_reserved_i32() {
        let mut writer = ParcelWriter::new();
        let pos = writer.reserve_i32();
        writer.write_i32(7);
        writer.patch_i32(pos, 42);
        let bytes = writer.into_bytes();
        let mut reader = ParcelReader::new(&bytes);
        assert_eq!(42, reader.read_i32().unwrap());
        assert_eq!(7, reader.read_i32().unwrap());
    }
}
