use anyhow::{bail, Context, Result};
use genestore_codec::Vault;
use genestore_store::SqliteVault;
use std::path::Path;

use crate::args::OutputFormat;
use crate::printing::print_records;

fn open(path: &Path) -> Result<SqliteVault> {
    if !path.exists() {
        bail!("No vault at {}", path.display());
    }
    SqliteVault::open(path).with_context(|| format!("Failed to open vault {}", path.display()))
}

pub fn list_records(path: &Path, user: &str, format: OutputFormat) -> Result<()> {
    let vault = open(path)?;
    let records = vault
        .list_records(user)
        .context("Failed to list vault records")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Pretty => print_records(user, &records),
    }
    Ok(())
}

pub fn delete_record(path: &Path, user: &str, id: u64) -> Result<()> {
    let mut vault = open(path)?;
    let removed = vault
        .delete_record(user, id)
        .context("Failed to delete vault record")?;
    if !removed {
        bail!("No record {id} in the vault of {user}");
    }
    println!("✓ Deleted record {id} from the vault of {user}");
    Ok(())
}
