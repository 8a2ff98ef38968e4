pub mod db;

pub mod accounts;
pub mod connections;
pub mod holdings;
pub mod transactions;

pub mod constants;
pub mod errors;
pub mod providers;
pub mod schema;
pub mod sync;
pub mod vault;

pub use errors::{Error, Result};
pub use sync::{SyncResult, SyncService};
pub use vault::CredentialVault;
