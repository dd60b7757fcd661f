use anyhow::{Context, Result};
use genestore_codec::container::artifact_text;
use genestore_codec::Pipeline;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::args::OutputFormat;
use crate::printing::{format_bytes, print_header};

pub fn inspect_artifact(artifact: &Path, format: OutputFormat) -> Result<()> {
    let raw =
        fs::read(artifact).with_context(|| format!("Failed to read {}", artifact.display()))?;
    let report = artifact_text(&raw)
        .and_then(|text| Pipeline::default().inspect(text))
        .with_context(|| format!("{} is not a valid artifact", artifact.display()))?;

    match format {
        OutputFormat::Json => {
            let value = json!({
                "artifact": artifact.display().to_string(),
                "header": report.header,
                "payloadLength": report.payload_len,
                "artifactSize": report.artifact_len,
                "valid": true,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Pretty => {
            println!("\n📊 Artifact Information");
            println!("{}", "=".repeat(50));
            println!("  • Path: {}", artifact.display());
            println!("  • Size: {}", format_bytes(report.artifact_len as u64));
            println!("  • Payload: {} symbols", report.payload_len);
            print_header(&report.header);
            println!("✓ Header and sequence are consistent");
        }
    }

    Ok(())
}
