//! Shared default values for the command line.
//! Used by clap attributes in `args.rs` and by the commands themselves.

/// Bytes (encode) or symbols (decode) per driver step.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Largest input `encode` accepts; 0 disables the check.
pub const MAX_SIZE: u64 = 10 * 1024 * 1024;

pub const VAULT_DB: &str = "genestore.db";

pub const LOG_LEVEL: &str = "warn";

pub const MIME_TYPE: &str = "application/octet-stream";

/// Output name when an artifact's header carries no usable filename.
pub const DECODED_NAME: &str = "decoded.bin";
