//! SQLite persistence for GeneStore vault records.
//!
//! One table holds every user's records; [`SqliteVault`] implements the
//! codec's [`Vault`](genestore_codec::Vault) trait on top of it.

pub mod database;
mod errors;
pub mod vault;

pub use database::Database;
pub use errors::StoreError;
pub use vault::SqliteVault;
