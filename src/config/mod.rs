mod clinic;
mod service;
mod state;

pub use clinic::{Clinic, Config, PdfSettings, ReceiptSettings, RemoteSettings, StoreSettings};
pub use service::Service;
pub use state::{Counter, State};

use crate::error::{ReceiptError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.receipt/ or XDG equivalent)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "receipt") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.receipt/
    let home = dirs_home().ok_or_else(|| {
        ReceiptError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".receipt"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs_home() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}

/// Resolve the PDF output directory; relative paths live under the config dir
pub fn resolve_output_dir(configured: &str, config_dir: &PathBuf) -> PathBuf {
    let expanded = expand_path(configured);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &PathBuf) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(ReceiptError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReceiptError::ConfigParse { path, source: e })
}

/// Load services.toml as a HashMap
pub fn load_services(config_dir: &PathBuf) -> Result<HashMap<String, Service>> {
    let path = config_dir.join("services.toml");
    if !path.exists() {
        return Err(ReceiptError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReceiptError::ConfigParse { path, source: e })
}

/// Load state.toml (creates default if missing)
pub fn load_state(config_dir: &PathBuf) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| ReceiptError::ConfigParse { path, source: e })
}

/// Save state.toml
pub fn save_state(config_dir: &PathBuf, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state).map_err(|e| {
        ReceiptError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[clinic]
name = "Tulsi Sugar Care Clinic"
address = "Near Agha Khan Laboratory VIP Road Larkana"
# logo = "logo.png"   # optional, relative to this directory

[receipt]
page_width_mm = 80.0          # 80mm or 76.2mm thermal stock
height_policy = "dynamic"     # "dynamic" or "fixed"
min_height_mm = 80.0          # dynamic policy: never shorter than this
fixed_height_mm = 127.0       # fixed policy: 3in x 5in stock
shrink_floor = 0.6            # fixed policy: smallest auto-shrink scale
words_basis = "declared-total"  # or "item-sum"

[store]
backend = "local"             # "local" or "remote"

# [store.remote]
# url = "https://example.supabase.co"
# api_key = ""

[pdf]
output_dir = "output"
"#;

/// Template content for services.toml
pub const SERVICES_TEMPLATE: &str = r#"# Billable services. The table name (e.g., [consultation]) is the
# identifier used with the generate command:
#
#   receipt generate --payer "Name" --item consultation --item lab-test
#
# Ad-hoc items can be given inline as '<label>:<amount>'.

[consultation]
label = "Consultation"
amount = 500.00

[lab-test]
label = "Lab Test"
amount = 300.00

[follow-up]
label = "Follow Up Visit"
amount = 200.00
"#;
