use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub clinic: Clinic,
    pub receipt: ReceiptSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub pdf: PdfSettings,
}

/// Clinic identity printed in the receipt footer.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Clinic {
    pub name: String,
    pub address: String,
    /// Optional logo image path, relative to the config directory
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReceiptSettings {
    /// Page width in mm (80mm and 76.2mm thermal stock are both common)
    pub page_width_mm: f64,
    /// "dynamic" (height follows content) or "fixed" (auto-shrink)
    pub height_policy: String,
    /// Minimum page height under the dynamic policy
    #[serde(default = "default_min_height")]
    pub min_height_mm: f64,
    /// Page height under the fixed policy
    #[serde(default = "default_fixed_height")]
    pub fixed_height_mm: f64,
    /// Smallest allowed auto-shrink scale before accepting crowding
    #[serde(default = "default_shrink_floor")]
    pub shrink_floor: f64,
    /// "declared-total" (override wins, fall back to the item sum) or
    /// "item-sum" (always the computed sum) for the amount-in-words line
    #[serde(default = "default_words_basis")]
    pub words_basis: String,
}

fn default_min_height() -> f64 {
    80.0
}

fn default_fixed_height() -> f64 {
    127.0
}

fn default_shrink_floor() -> f64 {
    0.6
}

fn default_words_basis() -> String {
    "declared-total".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StoreSettings {
    /// "local" (JSON files under the config dir) or "remote"
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub remote: Option<RemoteSettings>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            remote: None,
        }
    }
}

fn default_backend() -> String {
    "local".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemoteSettings {
    /// Base URL of a PostgREST-style table service
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}
