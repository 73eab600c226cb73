use super::RecordStore;
use crate::error::{ReceiptError, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Record store backed by one JSON array file per table under the
/// config directory. The fallback when no remote service is configured.
pub struct LocalStore {
    data_dir: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.data_dir.join(format!("{table}.json"))
    }

    fn read_table(&self, table: &str) -> Result<Vec<Value>> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| ReceiptError::Store(format!("Corrupt table file {}: {e}", path.display())))
    }

    fn write_table(&self, table: &str, rows: &[Value]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let content = serde_json::to_string_pretty(rows)
            .map_err(|e| ReceiptError::Store(e.to_string()))?;
        fs::write(self.table_path(table), content)?;
        Ok(())
    }
}

fn field_matches(row: &Value, field: &str, value: &str) -> bool {
    match row.get(field) {
        Some(Value::String(s)) => s == value,
        Some(other) => other.to_string() == value,
        None => false,
    }
}

impl RecordStore for LocalStore {
    fn insert(&self, table: &str, record: &Value) -> Result<()> {
        let mut rows = self.read_table(table)?;
        rows.push(record.clone());
        self.write_table(table, &rows)
    }

    fn find_by(&self, table: &str, field: &str, value: &str) -> Result<Vec<Value>> {
        Ok(self
            .read_table(table)?
            .into_iter()
            .filter(|row| field_matches(row, field, value))
            .collect())
    }

    fn update(&self, table: &str, field: &str, key: &str, patch: &Value) -> Result<()> {
        let mut rows = self.read_table(table)?;
        let mut touched = false;
        for row in rows.iter_mut() {
            if field_matches(row, field, key) {
                if let (Value::Object(target), Value::Object(changes)) = (row, patch) {
                    for (k, v) in changes {
                        target.insert(k.clone(), v.clone());
                    }
                    touched = true;
                }
            }
        }
        if !touched {
            return Err(ReceiptError::Store(format!(
                "No row in '{table}' with {field} = {key}"
            )));
        }
        self.write_table(table, &rows)
    }

    fn all(&self, table: &str) -> Result<Vec<Value>> {
        self.read_table(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("data"));
        (dir, store)
    }

    #[test]
    fn insert_and_find_round_trip() {
        let (_dir, store) = store();
        store
            .insert("invoices", &json!({"invoice_no": "INV-20240101-001", "total": 800.0}))
            .unwrap();
        store
            .insert("invoices", &json!({"invoice_no": "INV-20240101-002", "total": 500.0}))
            .unwrap();

        let found = store
            .find_by("invoices", "invoice_no", "INV-20240101-002")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["total"], json!(500.0));
        assert_eq!(store.all("invoices").unwrap().len(), 2);
    }

    #[test]
    fn missing_table_reads_empty() {
        let (_dir, store) = store();
        assert!(store.all("invoices").unwrap().is_empty());
        assert!(store
            .find_by("invoices", "invoice_no", "INV-x")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn update_merges_patch_into_matching_row() {
        let (_dir, store) = store();
        store
            .insert("invoices", &json!({"invoice_no": "INV-1", "total": 100.0, "payer": "A"}))
            .unwrap();
        store
            .update("invoices", "invoice_no", "INV-1", &json!({"total": 250.0}))
            .unwrap();

        let rows = store.find_by("invoices", "invoice_no", "INV-1").unwrap();
        assert_eq!(rows[0]["total"], json!(250.0));
        assert_eq!(rows[0]["payer"], json!("A"));
    }

    #[test]
    fn update_of_missing_row_is_an_error() {
        let (_dir, store) = store();
        let result = store.update("invoices", "invoice_no", "INV-x", &json!({"total": 1.0}));
        assert!(result.is_err());
    }
}
