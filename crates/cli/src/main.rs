mod args;
mod commands;
pub mod defaults;
mod printing;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use args::{DecodeArgs, EncodeArgs, OutputFormat, VaultCommand};
use commands::{decode, encode, inspect, vault};

/// GeneStore: store any file as a DNA sequence
///
/// Every byte becomes four of the letters A, T, G and C. The sequence is
/// saved as a `.dna` file together with the original name, type and size,
/// and can be turned back into the exact original file.
#[derive(Parser, Debug)]
#[command(name = "genestore")]
#[command(author, version, about = "Encodes files as DNA sequences and back", long_about = None)]
struct Cli {
    /// Number of threads to use for the parallel codec
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Log level for stderr diagnostics (error, warn, info, debug, trace)
    ///
    /// RUST_LOG takes precedence when set.
    #[arg(long, global = true, default_value = defaults::LOG_LEVEL)]
    log_level: String,

    /// JSON file with codec settings (chunk_size, strategy, trailing_group)
    ///
    /// Command line flags override values from the file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a file into a `.dna` artifact.
    Encode(Box<EncodeArgs>),

    /// Decode a `.dna` artifact back into the original file.
    Decode(Box<DecodeArgs>),

    /// Check an artifact and show its header without writing anything.
    Inspect {
        /// `.dna` artifact to inspect
        artifact: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Browse or prune the record of past conversions.
    Vault {
        #[command(subcommand)]
        command: VaultCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = utils::init_logging(&cli.log_level)?;

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Encode(args) => {
            let config = utils::load_config(cli.config.as_deref())?;
            encode::encode_file(&args, config)?;
        }
        Commands::Decode(args) => {
            let config = utils::load_config(cli.config.as_deref())?;
            decode::decode_file(&args, config)?;
        }
        Commands::Inspect { artifact, format } => {
            inspect::inspect_artifact(&artifact, format)?;
        }
        Commands::Vault { command } => match command {
            VaultCommand::List {
                user,
                vault: path,
                format,
            } => {
                vault::list_records(&path, &user, format)?;
            }
            VaultCommand::Delete {
                user,
                id,
                vault: path,
            } => {
                vault::delete_record(&path, &user, id)?;
            }
        },
    }

    Ok(())
}
