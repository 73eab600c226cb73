//! Pluggable invoice persistence. One backend is selected at startup
//! from config; callers never branch on the backend again.

mod local;
mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

use crate::config::Config;
use crate::error::{ReceiptError, Result};
use serde_json::Value;
use std::path::Path;

/// Generic record persistence over JSON rows keyed by field values.
pub trait RecordStore {
    fn insert(&self, table: &str, record: &Value) -> Result<()>;
    fn find_by(&self, table: &str, field: &str, value: &str) -> Result<Vec<Value>>;
    fn update(&self, table: &str, field: &str, key: &str, patch: &Value) -> Result<()>;
    fn all(&self, table: &str) -> Result<Vec<Value>>;
}

/// Select the store backend once, from config.
pub fn open_store(config: &Config, config_dir: &Path) -> Result<Box<dyn RecordStore>> {
    match config.store.backend.as_str() {
        "local" => Ok(Box::new(LocalStore::new(config_dir.join("data")))),
        "remote" => {
            let remote = config.store.remote.as_ref().ok_or_else(|| {
                ReceiptError::Store(
                    "backend = \"remote\" requires a [store.remote] section".to_string(),
                )
            })?;
            Ok(Box::new(RemoteStore::new(&remote.url, &remote.api_key)))
        }
        other => Err(ReceiptError::Store(format!(
            "Unknown store backend '{other}'. Use 'local' or 'remote'."
        ))),
    }
}
