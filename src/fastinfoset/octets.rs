//! Octet-level primitives: bounded reads, integers and lengths packed at a
//! bit offset within an octet.
use crate::error::{FiError, FiErrorKind};

#[derive(Debug, Clone)]
pub struct OctetReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> OctetReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn error(&self, kind: FiErrorKind) -> FiError {
        FiError::new(kind).with_position(self.position as u64)
    }

    /// Error for an octet that was just read and is not valid at this point.
    pub fn unexpected(&self, octet: u8) -> FiError {
        FiError::new(FiErrorKind::UnexpectedOctet)
            .with_position(self.position.saturating_sub(1) as u64)
            .with_snippet(format!("{:#04x}", octet))
    }

    pub fn read_u8(&mut self) -> Result<u8, FiError> {
        match self.data.get(self.position) {
            Some(&octet) => {
                self.position += 1;
                Ok(octet)
            }
            None => Err(self.error(FiErrorKind::IncompleteInput)),
        }
    }

    pub fn take(&mut self, length: usize) -> Result<&'a [u8], FiError> {
        if self.data.len() - self.position < length {
            return Err(self
                .error(FiErrorKind::IncompleteInput)
                .with_snippet(format!("{} octets required", length)));
        }

        let output = &self.data[self.position..self.position + length];
        self.position += length;

        Ok(output)
    }

    /// Consumes `prefix` if the remaining input starts with it.
    pub fn skip_prefix(&mut self, prefix: &[u8]) -> bool {
        if self.remaining().starts_with(prefix) {
            self.position += prefix.len();
            true
        } else {
            false
        }
    }

    fn read_u16(&mut self) -> Result<usize, FiError> {
        let octets = self.take(2)?;
        Ok(((octets[0] as usize) << 8) | octets[1] as usize)
    }

    fn read_u32(&mut self) -> Result<usize, FiError> {
        let octets = self.take(4)?;
        let value = u32::from_be_bytes([octets[0], octets[1], octets[2], octets[3]]);

        usize::try_from(value).map_err(|_| self.error(FiErrorKind::Other))
    }

    fn add_limit(&self, value: usize, limit: usize) -> Result<usize, FiError> {
        value
            .checked_add(limit)
            .ok_or_else(|| self.error(FiErrorKind::Other).with_snippet("length overflow"))
    }

    /// Number of items in a sequence of the initial vocabulary or additional data.
    pub fn read_sequence_length(&mut self) -> Result<usize, FiError> {
        let b = self.read_u8()?;

        if b & 0x80 == 0 {
            Ok(b as usize + 1)
        } else {
            let high = (b & 0x0F) as usize;
            Ok(((high << 16) | self.read_u16()?) + 129)
        }
    }

    /// Index in the range 0 to 2^20 starting on the second bit of `b`.
    pub fn index_on_second_bit(&mut self, b: u8) -> Result<usize, FiError> {
        if b & 0x40 == 0 {
            Ok((b & 0x3F) as usize)
        } else if b & 0x60 == 0x40 {
            let high = (b & 0x1F) as usize;
            Ok(((high << 8) | self.read_u8()? as usize) + 64)
        } else if b & 0x70 == 0x60 {
            let high = (b & 0x0F) as usize;
            Ok(((high << 16) | self.read_u16()?) + 8256)
        } else {
            Err(self.unexpected(b))
        }
    }

    /// Index in the range 0 to 2^20 starting on the third bit of `b`.
    pub fn index_on_third_bit(&mut self, b: u8) -> Result<usize, FiError> {
        if b & 0x20 == 0 {
            Ok((b & 0x1F) as usize)
        } else if b & 0x38 == 0x20 {
            let high = (b & 0x07) as usize;
            Ok(((high << 8) | self.read_u8()? as usize) + 32)
        } else if b & 0x38 == 0x28 {
            let high = (b & 0x07) as usize;
            Ok(((high << 16) | self.read_u16()?) + 2080)
        } else if b & 0x38 == 0x30 {
            let high = (self.read_u8()? & 0x0F) as usize;
            Ok(((high << 16) | self.read_u16()?) + 526368)
        } else {
            Err(self.unexpected(b))
        }
    }

    /// Index in the range 0 to 2^20 starting on the fourth bit of `b`.
    pub fn index_on_fourth_bit(&mut self, b: u8) -> Result<usize, FiError> {
        if b & 0x10 == 0 {
            Ok((b & 0x0F) as usize)
        } else if b & 0x18 == 0x10 {
            let high = (b & 0x03) as usize;
            Ok(((high << 8) | self.read_u8()? as usize) + 16)
        } else if b & 0x1C == 0x18 {
            let high = (b & 0x01) as usize;
            Ok(((high << 16) | self.read_u16()?) + 1040)
        } else if b & 0x1E == 0x1C {
            let high = (self.read_u8()? & 0x0F) as usize;
            Ok(((high << 16) | self.read_u16()?) + 132112)
        } else {
            Err(self.unexpected(b))
        }
    }

    /// Length of a non-empty octet string starting on the second bit of `b`.
    pub fn length_on_second_bit(&mut self, b: u8) -> Result<usize, FiError> {
        match b & 0x60 {
            0x40 => Ok(self.read_u8()? as usize + 65),
            0x60 => {
                let value = self.read_u32()?;
                self.add_limit(value, 321)
            }
            _ => Ok((b & 0x3F) as usize + 1),
        }
    }

    /// Length of a non-empty octet string starting on the fifth bit of `b`.
    pub fn length_on_fifth_bit(&mut self, b: u8) -> Result<usize, FiError> {
        match b & 0x0C {
            0x08 => Ok(self.read_u8()? as usize + 9),
            0x0C => {
                let value = self.read_u32()?;
                self.add_limit(value, 265)
            }
            _ => Ok((b & 0x07) as usize + 1),
        }
    }

    /// Length of a non-empty octet string starting on the seventh bit of `b`.
    pub fn length_on_seventh_bit(&mut self, b: u8) -> Result<usize, FiError> {
        match b & 0x03 {
            0x02 => Ok(self.read_u8()? as usize + 3),
            0x03 => {
                let value = self.read_u32()?;
                self.add_limit(value, 259)
            }
            _ => Ok((b & 0x01) as usize + 1),
        }
    }

    /// Reads a non-empty octet string whose length starts on the second bit
    /// of the next octet.
    pub fn read_octets_on_second_bit(&mut self) -> Result<&'a [u8], FiError> {
        let b = self.read_u8()?;

        if b & 0x80 != 0 {
            return Err(self.unexpected(b));
        }

        let length = self.length_on_second_bit(b)?;
        self.take(length)
    }
}
