use crate::error::CodecError;
use crate::sequence::{SymbolSequence, TrailingGroup};

/// Core trait for byte <-> symbol codecs.
///
/// Every strategy (`Sequential`, `Parallel`) must produce identical output:
/// 1.  `encode`: turn raw bytes into a symbol sequence, 4 symbols per byte.
/// 2.  `decode_groups`: turn whole 4-symbol groups back into bytes.
///
/// `decode` and `decode_with` layer the trailing-group policy on top.
pub trait Codec {
    fn encode(&self, bytes: &[u8]) -> SymbolSequence;

    /// Decode `symbols`, whose length must be a multiple of 4.
    ///
    /// Error positions are relative to the start of `symbols`.
    fn decode_groups(&self, symbols: &[u8]) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, symbols: &str) -> Result<Vec<u8>, CodecError> {
        self.decode_with(symbols, TrailingGroup::Reject)
    }

    fn decode_with(&self, symbols: &str, trailing: TrailingGroup) -> Result<Vec<u8>, CodecError> {
        let len = trailing.usable_len(symbols.len())?;
        self.decode_groups(&symbols.as_bytes()[..len])
    }
}
