use crate::alphabet::{DECODE_TABLE, NOT_A_SYMBOL};
use crate::error::CodecError;
use crate::sequence::{SymbolSequence, SYMBOLS_PER_BYTE};
use crate::traits::Codec;

/// Strategy: table lookup, one byte at a time, on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Codec for Sequential {
    fn encode(&self, bytes: &[u8]) -> SymbolSequence {
        let mut seq = SymbolSequence::with_byte_capacity(bytes.len());
        for &byte in bytes {
            seq.push_byte(byte);
        }
        seq
    }

    fn decode_groups(&self, symbols: &[u8]) -> Result<Vec<u8>, CodecError> {
        debug_assert_eq!(symbols.len() % SYMBOLS_PER_BYTE, 0);

        let mut bytes = Vec::with_capacity(symbols.len() / SYMBOLS_PER_BYTE);
        for (group_idx, group) in symbols.chunks_exact(SYMBOLS_PER_BYTE).enumerate() {
            let mut byte = 0u8;
            for (i, &symbol) in group.iter().enumerate() {
                let bits = DECODE_TABLE[symbol as usize];
                if bits == NOT_A_SYMBOL {
                    return Err(CodecError::InvalidSymbol {
                        byte: symbol,
                        position: group_idx * SYMBOLS_PER_BYTE + i,
                    });
                }
                byte = (byte << 2) | bits;
            }
            bytes.push(byte);
        }
        Ok(bytes)
    }
}
