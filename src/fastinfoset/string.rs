//! Character string decoding: UTF-8, UTF-16, restricted alphabets and the
//! built-in encoding algorithms.
use data_encoding::{BASE64, HEXUPPER};

use crate::error::{FiError, FiErrorKind};

use super::event::Characters;

/// Built-in restricted alphabet 0.
pub const NUMERIC_ALPHABET: [char; 15] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', '+', '.', 'E', ' ',
];

/// Built-in restricted alphabet 1.
pub const DATE_TIME_ALPHABET: [char; 15] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', ':', 'T', 'Z', ' ',
];

pub fn decode_utf8(octets: &[u8]) -> Result<String, FiError> {
    Ok(std::str::from_utf8(octets)?.to_string())
}

pub fn decode_utf16(octets: &[u8]) -> Result<String, FiError> {
    if octets.len() % 2 != 0 {
        return Err(FiError::new(FiErrorKind::InvalidString)
            .with_snippet(format!("odd UTF-16 length {}", octets.len())));
    }

    let units = octets
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|error| FiError::new(FiErrorKind::InvalidString).with_source(error))
}

/// Decodes characters packed as fixed-width indexes into `alphabet`.
///
/// A value with all bits set marks the padding at the end of the octets.
pub fn decode_restricted_alphabet(octets: &[u8], alphabet: &[char]) -> Result<String, FiError> {
    if alphabet.len() < 2 {
        return Err(FiError::new(FiErrorKind::InvalidString)
            .with_snippet("restricted alphabet too small"));
    }

    let bits_per_char = (alphabet.len() + 1).next_power_of_two().trailing_zeros() as usize;
    let terminator = (1usize << bits_per_char) - 1;
    let total_bits = octets.len() * 8;
    let mut output = String::new();
    let mut bit_position = 0;

    while bit_position + bits_per_char <= total_bits {
        let mut value = 0usize;

        for _ in 0..bits_per_char {
            let octet = octets[bit_position / 8];
            let bit = (octet >> (7 - bit_position % 8)) & 1;
            value = (value << 1) | bit as usize;
            bit_position += 1;
        }

        if value == terminator {
            break;
        }

        match alphabet.get(value) {
            Some(&c) => output.push(c),
            None => {
                return Err(FiError::new(FiErrorKind::InvalidString)
                    .with_snippet(format!("alphabet index {}", value)));
            }
        }
    }

    tracing::trace!(bits_per_char, length = output.len(), "restricted alphabet");

    Ok(output)
}

/// Encoding algorithms with a fixed table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingAlgorithm {
    Hexadecimal,
    Base64,
    Short,
    Int,
    Long,
    Boolean,
    Float,
    Double,
    Uuid,
    CData,
}

impl EncodingAlgorithm {
    pub fn from_index(index: usize) -> Option<Self> {
        let value = match index {
            0 => Self::Hexadecimal,
            1 => Self::Base64,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Boolean,
            6 => Self::Float,
            7 => Self::Double,
            8 => Self::Uuid,
            9 => Self::CData,
            _ => return None,
        };

        Some(value)
    }

    /// Converts encoded octets to their lexical form.
    pub fn decode(self, octets: &[u8]) -> Result<Characters, FiError> {
        let text = match self {
            Self::Hexadecimal => HEXUPPER.encode(octets),
            Self::Base64 => BASE64.encode(octets),
            Self::Short => join_values::<2>(octets, |v| i16::from_be_bytes(v).to_string())?,
            Self::Int => join_values::<4>(octets, |v| i32::from_be_bytes(v).to_string())?,
            Self::Long => join_values::<8>(octets, |v| i64::from_be_bytes(v).to_string())?,
            Self::Boolean => decode_booleans(octets)?,
            Self::Float => {
                join_values::<4>(octets, |v| format_float(f32::from_be_bytes(v)))?
            }
            Self::Double => join_values::<8>(octets, |v| format_float(f64::from_be_bytes(v)))?,
            Self::Uuid => join_values::<16>(octets, |v| uuid::Uuid::from_bytes(v).to_string())?,
            Self::CData => return Ok(Characters::CData(decode_utf8(octets)?)),
        };

        Ok(Characters::Text(text))
    }
}

fn join_values<const N: usize>(
    octets: &[u8],
    format: impl Fn([u8; N]) -> String,
) -> Result<String, FiError> {
    if octets.is_empty() || octets.len() % N != 0 {
        return Err(FiError::new(FiErrorKind::InvalidString)
            .with_snippet(format!("length {} not a multiple of {}", octets.len(), N)));
    }

    let values = octets
        .chunks_exact(N)
        .map(|chunk| {
            let mut value = [0u8; N];
            value.copy_from_slice(chunk);
            format(value)
        })
        .collect::<Vec<_>>();

    Ok(values.join(" "))
}

fn decode_booleans(octets: &[u8]) -> Result<String, FiError> {
    let Some(&first) = octets.first() else {
        return Err(FiError::new(FiErrorKind::InvalidString).with_snippet("empty boolean list"));
    };

    let unused_bits = (first >> 4) as usize;
    let total_bits = (octets.len() * 8)
        .checked_sub(4 + unused_bits)
        .ok_or_else(|| {
            FiError::new(FiErrorKind::InvalidString).with_snippet("boolean padding too long")
        })?;

    let values = (4..4 + total_bits)
        .map(|bit_position| {
            let octet = octets[bit_position / 8];
            if (octet >> (7 - bit_position % 8)) & 1 == 1 {
                "true"
            } else {
                "false"
            }
        })
        .collect::<Vec<_>>();

    Ok(values.join(" "))
}

/// Formats a float the way the XML Schema lexical form of the Float and
/// Double algorithms is written: plain decimals between 10^-3 and 10^7,
/// otherwise `d.dddE±n`.
fn format_float<F>(value: F) -> String
where
    F: Into<f64> + Copy + std::fmt::Display + std::fmt::LowerExp,
{
    let wide: f64 = value.into();

    if wide.is_nan() {
        return "NaN".to_string();
    } else if wide.is_infinite() {
        return if wide > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let magnitude = wide.abs();

    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();

        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    } else {
        let text = format!("{:e}", value);
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));

        if mantissa.contains('.') {
            format!("{}E{}", mantissa, exponent)
        } else {
            format!("{}.0E{}", mantissa, exponent)
        }
    }
}
