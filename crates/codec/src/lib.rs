//! Byte <-> DNA symbol codec.
//!
//! Maps arbitrary binary data to a sequence over the alphabet `A`, `T`, `G`,
//! `C` (2 bits per symbol, 4 symbols per byte) and back, wraps the sequence in
//! the self-describing `.dna` container, and drives both directions in
//! bounded chunks with progress reporting and cancellation.

pub mod alphabet;
pub mod container;
pub mod driver;
mod error;
pub mod pipeline;
mod sequence;
mod strategies;
mod traits;
pub mod vault;

pub use alphabet::Base;
pub use container::{EncodedArtifact, Frame, Header};
pub use driver::{CancelToken, Driver, NoProgress, ProgressSink};
pub use error::CodecError as Error;
pub use error::CodecError;
pub use pipeline::{Decoded, Encoded, Inspection, Pipeline, Session, SourceFile};
pub use sequence::{SymbolSequence, TrailingGroup, SYMBOLS_PER_BYTE};
pub use strategies::{Parallel, Sequential};
pub use traits::Codec;
pub use vault::{MemoryVault, Operation, Vault, VaultError, VaultRecord};

use serde::{Deserialize, Serialize};

/// Strategies for running the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecStrategy {
    /// Single-threaded table lookup.
    Sequential,
    /// Chunked across the rayon pool.
    Parallel,
}

impl CodecStrategy {
    /// Encode using the selected strategy.
    pub fn encode(&self, bytes: &[u8]) -> SymbolSequence {
        match self {
            CodecStrategy::Sequential => Sequential.encode(bytes),
            CodecStrategy::Parallel => Parallel.encode(bytes),
        }
    }

    /// Decode whole groups using the selected strategy.
    pub fn decode_groups(&self, symbols: &[u8]) -> Result<Vec<u8>, CodecError> {
        match self {
            CodecStrategy::Sequential => Sequential.decode_groups(symbols),
            CodecStrategy::Parallel => Parallel.decode_groups(symbols),
        }
    }
}

impl Default for CodecStrategy {
    fn default() -> Self {
        Self::Parallel
    }
}

impl std::fmt::Display for CodecStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

impl std::str::FromStr for CodecStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" | "seq" => Ok(Self::Sequential),
            "parallel" | "par" => Ok(Self::Parallel),
            _ => Err(format!(
                "Unknown codec strategy: {s}. Available: sequential, parallel"
            )),
        }
    }
}

impl Codec for CodecStrategy {
    fn encode(&self, bytes: &[u8]) -> SymbolSequence {
        CodecStrategy::encode(self, bytes)
    }

    fn decode_groups(&self, symbols: &[u8]) -> Result<Vec<u8>, CodecError> {
        CodecStrategy::decode_groups(self, symbols)
    }
}

/// Tunables for chunked encoding and decoding.
///
/// Can be deserialized from a JSON file; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Elements (bytes when encoding, symbols when decoding) per driver step.
    pub chunk_size: usize,
    /// Strategy used inside each step.
    pub strategy: CodecStrategy,
    /// Handling of an incomplete final symbol group.
    pub trailing_group: TrailingGroup,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            chunk_size: driver::DEFAULT_CHUNK_SIZE,
            strategy: CodecStrategy::default(),
            trailing_group: TrailingGroup::default(),
        }
    }
}
