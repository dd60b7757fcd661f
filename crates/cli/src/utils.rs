use anyhow::{bail, Context, Result};
use flexi_logger::{Logger, LoggerHandle};
use genestore_codec::{CodecConfig, ProgressSink, SourceFile};
use genestore_store::SqliteVault;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::fs;
use std::path::Path;

use crate::args::VaultArgs;
use crate::defaults;

/// Start logging to stderr. The handle must stay alive for the whole run.
pub fn init_logging(level: &str) -> Result<LoggerHandle> {
    Logger::try_with_env_or_str(level)
        .with_context(|| format!("Invalid log level `{level}`"))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .context("Failed to start logger")
}

/// Codec settings from `path`, or the command line defaults without one.
pub fn load_config(path: Option<&Path>) -> Result<CodecConfig> {
    let Some(path) = path else {
        return Ok(CodecConfig {
            chunk_size: defaults::CHUNK_SIZE,
            ..CodecConfig::default()
        });
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: CodecConfig = serde_json::from_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    debug!("loaded {config:?} from {}", path.display());
    Ok(config)
}

/// MIME type for a file name, by extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "dna" => "text/x-dna",
        _ => defaults::MIME_TYPE,
    }
}

/// Read `path` as a [`SourceFile`], enforcing the size limit first.
pub fn read_source(path: &Path, mime_type: Option<&str>, max_size: u64) -> Result<SourceFile> {
    let meta =
        fs::metadata(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if !meta.is_file() {
        bail!("{} is not a regular file", path.display());
    }
    if max_size > 0 && meta.len() > max_size {
        bail!(
            "{} is {} bytes, over the limit of {max_size} (raise it with --max-size)",
            path.display(),
            meta.len()
        );
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = mime_type.unwrap_or_else(|| mime_type_for(path));
    Ok(SourceFile::new(name, mime_type, bytes))
}

/// Write `contents` to `path`, refusing to replace a file unless `overwrite`.
pub fn write_output(path: &Path, contents: &[u8], overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!(
            "{} already exists (use --overwrite to replace it)",
            path.display()
        );
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// The vault named on the command line, opened only when a user is given.
pub fn open_vault(args: &VaultArgs) -> Result<Option<SqliteVault>> {
    if args.user.is_none() {
        return Ok(None);
    }
    let vault = SqliteVault::open(&args.vault)
        .with_context(|| format!("Failed to open vault {}", args.vault.display()))?;
    Ok(Some(vault))
}

/// Progress sink drawing an indicatif bar; a no-op when hidden.
pub struct BarSink(Option<ProgressBar>);

impl BarSink {
    pub fn new(total: u64, unit: &str, enabled: bool) -> Self {
        if !enabled || total == 0 {
            return Self(None);
        }
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{eta}})"
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self(Some(pb))
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.0 {
            pb.finish_with_message("Done");
        }
    }
}

impl ProgressSink for BarSink {
    fn on_progress(&mut self, processed: u64, total: u64) {
        if let Some(pb) = &self.0 {
            pb.set_length(total);
            pb.set_position(processed);
        }
    }
}
