use anyhow::{bail, Context, Result};
use genestore_codec::container::{artifact_text, has_artifact_extension};
use genestore_codec::{CancelToken, CodecConfig, Driver, Pipeline, Session, TrailingGroup, Vault};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::args::DecodeArgs;
use crate::defaults;
use crate::printing::{format_bytes, print_header};
use crate::utils::{self, BarSink};

pub fn decode_file(args: &DecodeArgs, mut config: CodecConfig) -> Result<()> {
    if !args.force && !has_artifact_extension(&args.artifact) {
        bail!(
            "{} is not a .dna file (use --force to decode it anyway)",
            args.artifact.display()
        );
    }

    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if args.lenient {
        config.trailing_group = TrailingGroup::Discard;
    }
    let driver = Driver::from_config(&config).context("Invalid codec settings")?;
    let pipeline = if args.lenient {
        Pipeline::new(driver).without_header_checks()
    } else {
        Pipeline::new(driver)
    };

    let raw = fs::read(&args.artifact)
        .with_context(|| format!("Failed to read {}", args.artifact.display()))?;
    let text = artifact_text(&raw)
        .with_context(|| format!("Failed to decode {}", args.artifact.display()))?;

    println!("🧬 GeneStore - Decoding");
    println!("============================================");
    println!(
        "  • Artifact: {} ({})",
        args.artifact.display(),
        format_bytes(text.len() as u64)
    );

    let session = args
        .vault
        .user
        .clone()
        .map(Session::for_user)
        .unwrap_or_default();
    let mut vault = utils::open_vault(&args.vault)?;

    let mut sink = BarSink::new(text.len() as u64, "symbols", !args.no_progress);
    let decoded = pipeline
        .decode_artifact(
            text,
            &session,
            &mut sink,
            &CancelToken::new(),
            vault.as_mut().map(|v| v as &mut dyn Vault),
        )
        .with_context(|| format!("Failed to decode {}", args.artifact.display()))?;
    sink.finish();

    print_header(&decoded.header);

    let output = match &args.output {
        Some(path) => path.clone(),
        None => default_output(&args.artifact, &decoded.header.filename),
    };
    utils::write_output(&output, &decoded.bytes, args.overwrite)?;
    info!("wrote {} ({} bytes)", output.display(), decoded.bytes.len());

    println!(
        "✓ Restored {} ({})",
        output.display(),
        format_bytes(decoded.bytes.len() as u64)
    );
    if let Some(user) = session.user() {
        println!("  • Recorded in the vault of {user}");
    }

    Ok(())
}

/// The header's file name, stripped of any directories, next to the artifact.
fn default_output(artifact: &Path, filename: &str) -> PathBuf {
    let name = Path::new(filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| defaults::DECODED_NAME.into());
    match artifact.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
