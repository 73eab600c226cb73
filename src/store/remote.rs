use super::RecordStore;
use crate::error::{ReceiptError, Result};
use serde_json::Value;
use std::time::Duration;
use ureq::Agent;

/// Record store backed by a PostgREST-style table service (the hosted
/// backend the clinic uses). Rows are plain JSON; filters use the
/// `field=eq.value` query convention.
pub struct RemoteStore {
    agent: Agent,
    base_url: String,
    api_key: String,
}

impl RemoteStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn parse_rows(body: String) -> Result<Vec<Value>> {
        serde_json::from_str(&body)
            .map_err(|e| ReceiptError::Store(format!("Malformed store response: {e}")))
    }
}

/// Percent-encode a filter value for use in a query string.
fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

impl RecordStore for RemoteStore {
    fn insert(&self, table: &str, record: &Value) -> Result<()> {
        self.agent
            .post(&self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(record)
            .map_err(|e| ReceiptError::Store(format!("insert into '{table}' failed: {e}")))?;
        Ok(())
    }

    fn find_by(&self, table: &str, field: &str, value: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{}?{}=eq.{}&select=*",
            self.table_url(table),
            field,
            encode(value)
        );
        let body = self
            .agent
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .call()
            .map_err(|e| ReceiptError::Store(format!("query on '{table}' failed: {e}")))?
            .body_mut()
            .read_to_string()
            .map_err(|e| ReceiptError::Store(e.to_string()))?;
        Self::parse_rows(body)
    }

    fn update(&self, table: &str, field: &str, key: &str, patch: &Value) -> Result<()> {
        let url = format!("{}?{}=eq.{}", self.table_url(table), field, encode(key));
        self.agent
            .patch(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(patch)
            .map_err(|e| ReceiptError::Store(format!("update on '{table}' failed: {e}")))?;
        Ok(())
    }

    fn all(&self, table: &str) -> Result<Vec<Value>> {
        let url = format!("{}?select=*", self.table_url(table));
        let body = self
            .agent
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .call()
            .map_err(|e| ReceiptError::Store(format!("query on '{table}' failed: {e}")))?
            .body_mut()
            .read_to_string()
            .map_err(|e| ReceiptError::Store(e.to_string()))?;
        Self::parse_rows(body)
    }
}

#[cfg(test)]
mod tests {
    use super::encode;

    #[test]
    fn encode_passes_invoice_numbers_through() {
        assert_eq!(encode("INV-20240101-001"), "INV-20240101-001");
    }

    #[test]
    fn encode_escapes_reserved_characters() {
        assert_eq!(encode("a b&c"), "a%20b%26c");
    }
}
