use clap::{Args, Subcommand, ValueEnum};
use genestore_codec::CodecStrategy;
use std::path::PathBuf;

use crate::defaults;

/// Where conversion records go, and for whom.
#[derive(Args, Debug)]
pub struct VaultArgs {
    /// Record the conversion in this user's vault
    ///
    /// Without a user nothing is recorded and the vault file is not opened.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Vault database path
    #[arg(long, default_value = defaults::VAULT_DB)]
    pub vault: PathBuf,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// File to encode
    pub input: PathBuf,

    /// Output artifact path (default: <input stem>.dna next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// MIME type stored in the header (default: guessed from the extension)
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Bytes per step
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Codec strategy (sequential, parallel)
    #[arg(long)]
    pub strategy: Option<CodecStrategy>,

    /// Refuse inputs larger than this many bytes (0 = no limit)
    #[arg(long, default_value_t = defaults::MAX_SIZE)]
    pub max_size: u64,

    /// Replace the output file if it exists
    #[arg(long)]
    pub overwrite: bool,

    #[command(flatten)]
    pub vault: VaultArgs,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// `.dna` artifact to decode
    pub artifact: PathBuf,

    /// Output file path (default: the original filename next to the artifact)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Decode even if the file does not end in `.dna`
    #[arg(long)]
    pub force: bool,

    /// Replace the output file if it exists
    #[arg(long)]
    pub overwrite: bool,

    /// Symbols per step
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Codec strategy (sequential, parallel)
    #[arg(long)]
    pub strategy: Option<CodecStrategy>,

    /// Drop an incomplete final symbol group and only warn on header mismatches
    #[arg(long)]
    pub lenient: bool,

    #[command(flatten)]
    pub vault: VaultArgs,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug)]
pub enum VaultCommand {
    /// List a user's records, newest first.
    List {
        #[arg(short, long)]
        user: String,

        /// Vault database path
        #[arg(long, default_value = defaults::VAULT_DB)]
        vault: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Delete one of a user's records.
    Delete {
        #[arg(short, long)]
        user: String,

        /// Record id, as shown by `vault list`
        #[arg(long)]
        id: u64,

        /// Vault database path
        #[arg(long, default_value = defaults::VAULT_DB)]
        vault: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}
