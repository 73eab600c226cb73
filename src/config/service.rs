use serde::{Deserialize, Serialize};

/// A catalog entry from services.toml: a service the clinic bills for,
/// with its usual charge.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Service {
    pub label: String,
    pub amount: f64,
}
