//! Owned symbol sequences and the trailing-group policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alphabet::{self, symbol_for, Base};
use crate::error::CodecError;

/// Number of symbols that encode one byte.
pub const SYMBOLS_PER_BYTE: usize = 4;

/// Text made only of alphabet symbols, `4 x` the length of the bytes it encodes.
///
/// Values built by the codec are valid by construction; values parsed from
/// text are checked for foreign symbols and for a length that splits into
/// whole groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SymbolSequence(String);

impl SymbolSequence {
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Empty sequence with room for the encoding of `bytes` bytes.
    pub fn with_byte_capacity(bytes: usize) -> Self {
        Self(String::with_capacity(bytes * SYMBOLS_PER_BYTE))
    }

    /// Validate `text` as a complete symbol sequence.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        if text.len() % SYMBOLS_PER_BYTE != 0 {
            return Err(CodecError::TruncatedSequence { len: text.len() });
        }
        if let Some(position) = alphabet::first_invalid(text.as_bytes()) {
            return Err(CodecError::InvalidSymbol {
                byte: text.as_bytes()[position],
                position,
            });
        }
        Ok(Self(text.to_owned()))
    }

    /// Append the 4 symbols for `byte`, most significant bits first.
    #[inline]
    pub(crate) fn push_byte(&mut self, byte: u8) {
        self.0.push(symbol_for(byte >> 6) as char);
        self.0.push(symbol_for(byte >> 4) as char);
        self.0.push(symbol_for(byte >> 2) as char);
        self.0.push(symbol_for(byte) as char);
    }

    /// Append another valid sequence.
    pub fn append(&mut self, other: &SymbolSequence) {
        self.0.push_str(&other.0);
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of bytes this sequence decodes to.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.0.len() / SYMBOLS_PER_BYTE
    }

    pub fn bases(&self) -> impl Iterator<Item = Base> + '_ {
        self.0.bytes().filter_map(Base::from_ascii)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SymbolSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SymbolSequence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SymbolSequence {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SymbolSequence {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)?;
        Ok(Self(value))
    }
}

impl From<SymbolSequence> for String {
    fn from(seq: SymbolSequence) -> String {
        seq.0
    }
}

/// What a decoder does with a final group of fewer than 4 symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingGroup {
    /// Fail with [`CodecError::TruncatedSequence`].
    #[default]
    Reject,
    /// Silently drop the incomplete group.
    Discard,
}

impl TrailingGroup {
    /// Number of leading symbols of a `len`-symbol input that will be decoded.
    pub fn usable_len(self, len: usize) -> Result<usize, CodecError> {
        let remainder = len % SYMBOLS_PER_BYTE;
        match (self, remainder) {
            (_, 0) => Ok(len),
            (Self::Reject, _) => Err(CodecError::TruncatedSequence { len }),
            (Self::Discard, _) => Ok(len - remainder),
        }
    }
}

impl fmt::Display for TrailingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Discard => write!(f, "discard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_byte_order() {
        let mut seq = SymbolSequence::new();
        seq.push_byte(0x4D); // 01 00 11 01
        assert_eq!(seq.as_str(), "TACT");
        seq.push_byte(0x00);
        seq.push_byte(0xFF);
        assert_eq!(seq.as_str(), "TACTAAAACCCC");
        assert_eq!(seq.byte_len(), 3);
    }

    #[test]
    fn test_parse_valid() {
        let seq: SymbolSequence = "ATGCATGC".parse().unwrap();
        assert_eq!(seq.len(), 8);
        assert_eq!(
            seq.bases().take(4).collect::<Vec<_>>(),
            vec![Base::A, Base::T, Base::G, Base::C]
        );
        assert!(SymbolSequence::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_truncated() {
        assert_eq!(
            SymbolSequence::parse("ATG"),
            Err(CodecError::TruncatedSequence { len: 3 })
        );
    }

    #[test]
    fn test_parse_rejects_foreign_symbol() {
        assert_eq!(
            SymbolSequence::parse("ATGCATGN"),
            Err(CodecError::InvalidSymbol {
                byte: b'N',
                position: 7
            })
        );
        assert!(SymbolSequence::parse("atgc").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let seq: SymbolSequence = serde_json::from_str("\"GATC\"").unwrap();
        assert_eq!(seq.as_str(), "GATC");
        assert_eq!(serde_json::to_string(&seq).unwrap(), "\"GATC\"");
        assert!(serde_json::from_str::<SymbolSequence>("\"GATX\"").is_err());
    }

    #[test]
    fn test_usable_len() {
        assert_eq!(TrailingGroup::Reject.usable_len(8), Ok(8));
        assert_eq!(TrailingGroup::Discard.usable_len(8), Ok(8));
        assert_eq!(
            TrailingGroup::Reject.usable_len(10),
            Err(CodecError::TruncatedSequence { len: 10 })
        );
        assert_eq!(TrailingGroup::Discard.usable_len(10), Ok(8));
        assert_eq!(TrailingGroup::Discard.usable_len(3), Ok(0));
        assert_eq!(TrailingGroup::Reject.usable_len(0), Ok(0));
    }

    #[test]
    fn test_append() {
        let mut a: SymbolSequence = "AAAA".parse().unwrap();
        let b: SymbolSequence = "CCCC".parse().unwrap();
        a.append(&b);
        assert_eq!(a.to_string(), "AAAACCCC");
    }
}
