use anyhow::{Context, Result};
use genestore_codec::{CancelToken, CodecConfig, Driver, Pipeline, Session, Vault};
use log::info;
use std::path::PathBuf;

use crate::args::EncodeArgs;
use crate::printing::{format_bytes, preview};
use crate::utils::{self, BarSink};

pub fn encode_file(args: &EncodeArgs, mut config: CodecConfig) -> Result<()> {
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    let driver = Driver::from_config(&config).context("Invalid codec settings")?;
    let pipeline = Pipeline::new(driver);

    let source = utils::read_source(&args.input, args.mime_type.as_deref(), args.max_size)?;

    println!("🧬 GeneStore - Encoding");
    println!("============================================");
    println!("  • File: {}", args.input.display());
    println!("  • Type: {}", source.mime_type);
    println!("  • Size: {}", format_bytes(source.bytes.len() as u64));
    println!(
        "  • Strategy: {} (chunks of {})",
        driver.strategy(),
        driver.chunk_size()
    );
    println!();

    let session = args
        .vault
        .user
        .clone()
        .map(Session::for_user)
        .unwrap_or_default();
    let mut vault = utils::open_vault(&args.vault)?;

    let mut sink = BarSink::new(source.bytes.len() as u64, "bytes", !args.no_progress);
    let encoded = pipeline
        .encode_file(
            &source,
            &session,
            &mut sink,
            &CancelToken::new(),
            vault.as_mut().map(|v| v as &mut dyn Vault),
        )
        .with_context(|| format!("Failed to encode {}", args.input.display()))?;
    sink.finish();

    let output = args.output.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .map(|dir| dir.join(&encoded.file_name))
            .unwrap_or_else(|| PathBuf::from(&encoded.file_name))
    });
    utils::write_output(&output, encoded.artifact.as_bytes(), args.overwrite)?;
    info!("wrote {} ({} bytes)", output.display(), encoded.artifact.len());

    let frame = encoded.artifact.frame()?;
    println!(
        "✓ Encoded {} bytes into {} symbols",
        encoded.header.original_size, encoded.header.symbol_sequence_length
    );
    println!("  • Sequence: {}", preview(frame.payload, 48));
    println!(
        "  • Artifact: {} ({})",
        output.display(),
        format_bytes(encoded.artifact.len() as u64)
    );
    if let Some(user) = session.user() {
        println!("  • Recorded in the vault of {user}");
    }

    Ok(())
}
