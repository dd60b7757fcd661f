use thiserror::Error;

/// Error type for codec, container and pipeline operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A byte outside the `A`/`T`/`G`/`C` alphabet was found in a symbol sequence.
    #[error("Invalid symbol {} at position {position}", describe_byte(.byte))]
    InvalidSymbol { byte: u8, position: usize },

    /// The symbol sequence does not split into whole groups of 4.
    #[error("Truncated symbol sequence: length {len} is not a multiple of 4")]
    TruncatedSequence { len: usize },

    /// The artifact is not a header/delimiter/payload frame.
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// The header segment did not parse into the expected field set.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// A length declared in the header disagrees with the payload.
    #[error("Header mismatch: `{field}` declares {declared}, payload has {actual}")]
    HeaderMismatch {
        field: &'static str,
        declared: u64,
        actual: u64,
    },

    /// The operation was stopped at a chunk boundary by its cancel token.
    #[error("Operation cancelled")]
    Cancelled,

    /// Chunked processing needs at least one element per chunk.
    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),
}

impl CodecError {
    /// True for errors meaning "this is a container, but its contents are damaged".
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSymbol { .. } | Self::TruncatedSequence { .. } | Self::HeaderMismatch { .. }
        )
    }

    /// True for errors meaning "this is not a container at all".
    pub fn is_framing_error(&self) -> bool {
        matches!(self, Self::MalformedContainer(_) | Self::MalformedHeader(_))
    }

    /// Shift the position of an `InvalidSymbol` by `offset`.
    ///
    /// Chunked decoders report positions relative to the chunk; this turns them
    /// into absolute positions within the whole sequence.
    pub(crate) fn offset_by(self, offset: usize) -> Self {
        match self {
            Self::InvalidSymbol { byte, position } => Self::InvalidSymbol {
                byte,
                position: position + offset,
            },
            other => other,
        }
    }
}

fn describe_byte(byte: &u8) -> String {
    let byte = *byte;
    if byte.is_ascii_graphic() {
        format!("'{}' (0x{byte:02x})", byte as char)
    } else {
        format!("0x{byte:02x}")
    }
}
