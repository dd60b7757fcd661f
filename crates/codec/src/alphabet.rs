use core::fmt;

use serde::{Deserialize, Serialize};

/// ASCII symbols indexed by the 2-bit value they stand for.
pub const SYMBOLS: [u8; 4] = *b"ATGC";

/// Marker in [`DECODE_TABLE`] for bytes that are not symbols.
pub(crate) const NOT_A_SYMBOL: u8 = 0xFF;

/// Reverse lookup: ASCII byte -> 2-bit value, or [`NOT_A_SYMBOL`].
pub(crate) const DECODE_TABLE: [u8; 256] = build_decode_table();

const fn build_decode_table() -> [u8; 256] {
    let mut table = [NOT_A_SYMBOL; 256];
    let mut bits = 0;
    while bits < SYMBOLS.len() {
        table[SYMBOLS[bits] as usize] = bits as u8;
        bits += 1;
    }
    table
}

/// One symbol of the encoding alphabet.
///
/// The discriminant is the 2-bit pattern the symbol encodes
/// (`00 -> A`, `01 -> T`, `10 -> G`, `11 -> C`). The mapping is fixed: artifacts
/// written with any other assignment would decode to different bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Base {
    A = 0b00,
    T = 0b01,
    G = 0b10,
    C = 0b11,
}

impl Base {
    /// Every base, in 2-bit value order.
    pub const ALL: [Base; 4] = [Base::A, Base::T, Base::G, Base::C];

    /// Base for a 2-bit value (0-3).
    #[inline(always)]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00 => Some(Self::A),
            0b01 => Some(Self::T),
            0b10 => Some(Self::G),
            0b11 => Some(Self::C),
            _ => None,
        }
    }

    /// The 2-bit value this base encodes.
    #[inline(always)]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Base for an uppercase ASCII symbol. Lowercase letters are not symbols.
    #[inline]
    pub const fn from_ascii(byte: u8) -> Option<Self> {
        match DECODE_TABLE[byte as usize] {
            NOT_A_SYMBOL => None,
            bits => Self::from_bits(bits),
        }
    }

    #[inline(always)]
    pub const fn to_ascii(self) -> u8 {
        SYMBOLS[self as usize]
    }

    #[inline(always)]
    pub const fn to_char(self) -> char {
        self.to_ascii() as char
    }
}

/// Symbol for the low two bits of `bits`.
#[inline(always)]
pub const fn symbol_for(bits: u8) -> u8 {
    SYMBOLS[(bits & 0b11) as usize]
}

/// 2-bit value of an ASCII symbol.
#[inline(always)]
pub const fn bits_for(symbol: u8) -> Option<u8> {
    match DECODE_TABLE[symbol as usize] {
        NOT_A_SYMBOL => None,
        bits => Some(bits),
    }
}

/// Position of the first byte in `symbols` that is not an alphabet symbol.
pub fn first_invalid(symbols: &[u8]) -> Option<usize> {
    symbols
        .iter()
        .position(|&b| DECODE_TABLE[b as usize] == NOT_A_SYMBOL)
}

impl TryFrom<u8> for Base {
    type Error = crate::CodecError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_ascii(byte).ok_or(crate::CodecError::InvalidSymbol { byte, position: 0 })
    }
}

impl From<Base> for u8 {
    #[inline(always)]
    fn from(base: Base) -> u8 {
        base.bits()
    }
}

impl From<Base> for char {
    #[inline(always)]
    fn from(base: Base) -> char {
        base.to_char()
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
