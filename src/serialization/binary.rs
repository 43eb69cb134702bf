//! Little-endian byte stream reader and writer.
//!
//! The format carries no header and no type tags of its own: every type
//! writes a fixed, order-dependent sequence of primitives and reads them back
//! in the same order.
//!
//! | Primitive | Encoding |
//! |---|---|
//! | `bool` | 1 byte, 0 or 1 |
//! | `u32`/`f32` | 4 bytes |
//! | `u64` | 8 bytes |
//! | string | `u64` byte length + UTF-8 bytes |
//! | [`Color`] | 4 bytes `r g b a` |
//! | enum | `u32` discriminant |
//! | [`Duration`] | `i64` microseconds |
//! | collection | `u64` count + items |

use std::io::{Read, Write};
use std::time::Duration;

use crate::error::{SerializeError, SerializeResult};
use crate::primitives::Color;

use super::BinarySerializable;

/// Upper bound for a single length-prefixed string.
const MAX_STRING_LEN: u64 = 16 * 1024 * 1024;
/// Upper bound for preallocation when reading a counted collection.
const MAX_PREALLOC: usize = 1024;

/// Writes primitives to an underlying stream.
pub struct BinaryWriter<'a> {
    out: &'a mut dyn Write,
}

impl<'a> BinaryWriter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }

    pub fn write_u8(&mut self, value: u8) -> SerializeResult<()> {
        self.out.write_all(&[value])?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> SerializeResult<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u32(&mut self, value: u32) -> SerializeResult<()> {
        self.out.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> SerializeResult<()> {
        self.out.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> SerializeResult<()> {
        self.out.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> SerializeResult<()> {
        self.out.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Collection count or string length.
    pub fn write_len(&mut self, len: usize) -> SerializeResult<()> {
        self.write_u64(len as u64)
    }

    pub fn write_str(&mut self, value: &str) -> SerializeResult<()> {
        self.write_len(value.len())?;
        self.out.write_all(value.as_bytes())?;
        Ok(())
    }

    pub fn write_color(&mut self, color: Color) -> SerializeResult<()> {
        self.out.write_all(&[color.r, color.g, color.b, color.a])?;
        Ok(())
    }

    /// Time as signed 64-bit microseconds.
    pub fn write_duration(&mut self, value: Duration) -> SerializeResult<()> {
        let micros = i64::try_from(value.as_micros())
            .map_err(|_| SerializeError::invalid(format!("duration {value:?} is too large")))?;
        self.write_i64(micros)
    }

    /// Write any serializable value in place.
    pub fn write<T: BinarySerializable>(&mut self, value: &T) -> SerializeResult<()> {
        value.write_binary(self)
    }

    pub fn flush(&mut self) -> SerializeResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Reads primitives from an underlying stream.
pub struct BinaryReader<'a> {
    input: &'a mut dyn Read,
}

impl<'a> BinaryReader<'a> {
    pub fn new(input: &'a mut dyn Read) -> Self {
        Self { input }
    }

    fn read_array<const N: usize>(&mut self) -> SerializeResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.input.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> SerializeResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> SerializeResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerializeError::invalid(format!(
                "expected boolean byte, found {other}"
            ))),
        }
    }

    pub fn read_u32(&mut self) -> SerializeResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> SerializeResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> SerializeResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> SerializeResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_len(&mut self) -> SerializeResult<usize> {
        let len = self.read_u64()?;
        usize::try_from(len)
            .map_err(|_| SerializeError::invalid(format!("length {len} does not fit in memory")))
    }

    pub fn read_string(&mut self) -> SerializeResult<String> {
        let len = self.read_u64()?;
        if len > MAX_STRING_LEN {
            return Err(SerializeError::invalid(format!(
                "string length {len} exceeds limit"
            )));
        }
        let mut bytes = Vec::new();
        let read = (&mut *self.input).take(len).read_to_end(&mut bytes)?;
        if (read as u64) < len {
            return Err(SerializeError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "string truncated",
            )));
        }
        Ok(String::from_utf8(bytes)?)
    }

    pub fn read_color(&mut self) -> SerializeResult<Color> {
        let [r, g, b, a] = self.read_array::<4>()?;
        Ok(Color::new(r, g, b, a))
    }

    pub fn read_duration(&mut self) -> SerializeResult<Duration> {
        let micros = self.read_i64()?;
        if micros < 0 {
            return Err(SerializeError::invalid(format!(
                "negative duration {micros}us"
            )));
        }
        Ok(Duration::from_micros(micros as u64))
    }

    /// Read any serializable value in place.
    pub fn read<T: BinarySerializable>(&mut self) -> SerializeResult<T> {
        T::read_binary(self)
    }

    /// Read a `u64` count followed by that many values.
    pub fn read_vec<T: BinarySerializable>(&mut self) -> SerializeResult<Vec<T>> {
        let count = self.read_len()?;
        let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            items.push(T::read_binary(self)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_string_is_length_prefixed() {
        let mut bytes = Vec::new();
        BinaryWriter::new(&mut bytes).write_str("abc").unwrap();
        assert_eq!(bytes.len(), 8 + 3);
        assert_eq!(&bytes[..8], &3u64.to_le_bytes());
        assert_eq!(&bytes[8..], b"abc");
    }

    #[test]
    fn test_duration_written_as_signed_micros() {
        let mut bytes = Vec::new();
        BinaryWriter::new(&mut bytes)
            .write_duration(Duration::from_millis(250))
            .unwrap();
        assert_eq!(bytes, 250_000i64.to_le_bytes());
    }

    #[test]
    fn test_negative_duration_rejected() {
        let bytes = (-5i64).to_le_bytes();
        let mut cursor = Cursor::new(bytes.to_vec());
        let mut reader = BinaryReader::new(&mut cursor);
        assert!(reader.read_duration().is_err());
    }

    #[test]
    fn test_truncated_string_fails() {
        let mut bytes = 10u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        let mut cursor = Cursor::new(bytes);
        let mut reader = BinaryReader::new(&mut cursor);
        assert!(reader.read_string().is_err());
    }

    #[test]
    fn test_bool_rejects_other_bytes() {
        let mut cursor = Cursor::new(vec![2u8]);
        let mut reader = BinaryReader::new(&mut cursor);
        assert!(reader.read_bool().is_err());
    }

    #[test]
    fn test_color_is_four_bytes() {
        let mut bytes = Vec::new();
        BinaryWriter::new(&mut bytes)
            .write_color(Color::new(1, 2, 3, 4))
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);
    }
}
