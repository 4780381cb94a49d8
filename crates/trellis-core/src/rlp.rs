//! Canonical RLP encoding and strict decoding.
//!
//! Every byte sequence this crate feeds into a trie or a hash goes through
//! these functions, so the encoder must produce exactly the canonical form
//! and the decoder must reject everything that is not canonical. A
//! non-minimal encoding that decodes to the same value would hash
//! differently and silently break proof verification downstream.

use thiserror::Error;

/// Errors raised by the strict RLP decoder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("RLP input is empty")]
    EmptyInput,

    #[error("RLP input truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Non-canonical RLP: single byte {byte:#04x} must encode as itself")]
    NonMinimalByte { byte: u8 },

    #[error("Non-canonical RLP: {length}-byte payload must use the short form")]
    NonMinimalLength { length: usize },

    #[error("Non-canonical RLP: length-of-length starts with a zero byte")]
    LeadingZeroLength,

    #[error("RLP payload length overflows usize")]
    LengthOverflow,

    #[error("Expected an RLP list, found a byte string")]
    ExpectedList,

    #[error("Expected an RLP byte string, found a list")]
    ExpectedBytes,

    #[error("Trailing bytes after RLP item: {count} unconsumed")]
    TrailingBytes { count: usize },
}

/// A decoded RLP item: a byte string or a list of further items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Bytes(Vec<u8>),
    List(Vec<Item>),
}

impl Item {
    /// Byte-string item copied from a slice.
    pub fn bytes(data: &[u8]) -> Self {
        Item::Bytes(data.to_vec())
    }

    /// Byte-string item holding the minimal big-endian form of an integer.
    /// Zero becomes the empty string, per the RLP integer convention.
    pub fn uint(value: u64) -> Self {
        Item::Bytes(uint_to_minimal_be(value))
    }

    pub fn as_bytes(&self) -> Result<&[u8], DecodeError> {
        match self {
            Item::Bytes(bytes) => Ok(bytes),
            Item::List(_) => Err(DecodeError::ExpectedBytes),
        }
    }

    pub fn as_list(&self) -> Result<&[Item], DecodeError> {
        match self {
            Item::List(items) => Ok(items),
            Item::Bytes(_) => Err(DecodeError::ExpectedList),
        }
    }
}

/// Encode a single item, byte string or nested list.
pub fn encode(item: &Item) -> Vec<u8> {
    match item {
        Item::Bytes(bytes) => encode_bytes(bytes),
        Item::List(items) => encode_list(items),
    }
}

/// Encode a byte string.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        // A single byte below 0x80 is its own encoding.
        return vec![bytes[0]];
    }
    let mut out = length_prefix(bytes.len(), 0x80);
    out.extend_from_slice(bytes);
    out
}

/// Encode a list of already-built items.
pub fn encode_list(items: &[Item]) -> Vec<u8> {
    let mut payload = Vec::new();
    for item in items {
        payload.extend_from_slice(&encode(item));
    }
    let mut out = length_prefix(payload.len(), 0xC0);
    out.extend_from_slice(&payload);
    out
}

/// Encode an unsigned integer as a byte string.
/// Minimal big-endian; zero encodes as the empty string (0x80).
pub fn encode_uint(value: u64) -> Vec<u8> {
    encode_bytes(&uint_to_minimal_be(value))
}

fn uint_to_minimal_be(value: u64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}

fn length_prefix(len: usize, offset: u8) -> Vec<u8> {
    if len <= 55 {
        return vec![offset + len as u8];
    }
    let len_bytes = len.to_be_bytes();
    let start = len_bytes.iter().position(|&b| b != 0).unwrap_or(0);
    let significant = &len_bytes[start..];
    let mut out = Vec::with_capacity(1 + significant.len());
    out.push(offset + 55 + significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// Decode the first RLP item in `data`.
/// Returns the item and the number of bytes consumed.
pub fn decode(data: &[u8]) -> Result<(Item, usize), DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let prefix = data[0];
    match prefix {
        0x00..=0x7F => Ok((Item::Bytes(vec![prefix]), 1)),
        0x80..=0xB7 => {
            // Short string, 0 to 55 bytes
            let length = (prefix - 0x80) as usize;
            let payload = payload_slice(data, 1, length)?;
            if length == 1 && payload[0] < 0x80 {
                return Err(DecodeError::NonMinimalByte { byte: payload[0] });
            }
            Ok((Item::Bytes(payload.to_vec()), 1 + length))
        }
        0xB8..=0xBF => {
            // Long string, next (prefix - 0xB7) bytes hold the length
            let (length, header) = long_length(data, prefix - 0xB7)?;
            let payload = payload_slice(data, header, length)?;
            Ok((Item::Bytes(payload.to_vec()), header + length))
        }
        0xC0..=0xF7 => {
            // Short list
            let length = (prefix - 0xC0) as usize;
            let payload = payload_slice(data, 1, length)?;
            Ok((Item::List(decode_list_payload(payload)?), 1 + length))
        }
        0xF8..=0xFF => {
            // Long list
            let (length, header) = long_length(data, prefix - 0xF7)?;
            let payload = payload_slice(data, header, length)?;
            Ok((Item::List(decode_list_payload(payload)?), header + length))
        }
    }
}

/// Decode a complete buffer as exactly one RLP item.
pub fn decode_exact(data: &[u8]) -> Result<Item, DecodeError> {
    let (item, consumed) = decode(data)?;
    if consumed != data.len() {
        return Err(DecodeError::TrailingBytes {
            count: data.len() - consumed,
        });
    }
    Ok(item)
}

/// Read a long-form length. Returns (payload length, header size).
fn long_length(data: &[u8], len_of_len: u8) -> Result<(usize, usize), DecodeError> {
    let len_of_len = len_of_len as usize;
    if data.len() < 1 + len_of_len {
        return Err(DecodeError::Truncated {
            needed: 1 + len_of_len,
            available: data.len(),
        });
    }

    let len_bytes = &data[1..1 + len_of_len];
    if len_bytes[0] == 0 {
        return Err(DecodeError::LeadingZeroLength);
    }

    let mut length: usize = 0;
    for &byte in len_bytes {
        length = length
            .checked_mul(256)
            .and_then(|l| l.checked_add(byte as usize))
            .ok_or(DecodeError::LengthOverflow)?;
    }

    // Lengths up to 55 have a dedicated short form; the long form is
    // non-canonical for them.
    if length <= 55 {
        return Err(DecodeError::NonMinimalLength { length });
    }

    Ok((length, 1 + len_of_len))
}

fn payload_slice(data: &[u8], start: usize, length: usize) -> Result<&[u8], DecodeError> {
    let end = start
        .checked_add(length)
        .ok_or(DecodeError::LengthOverflow)?;
    if data.len() < end {
        return Err(DecodeError::Truncated {
            needed: end,
            available: data.len(),
        });
    }
    Ok(&data[start..end])
}

fn decode_list_payload(payload: &[u8]) -> Result<Vec<Item>, DecodeError> {
    let mut items = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        let (item, consumed) = decode(&payload[offset..])?;
        items.push(item);
        offset += consumed;
    }
    Ok(items)
}
