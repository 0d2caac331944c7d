//! Overhead settings document
//!
//! The document is kept as raw JSON so keys this tool does not know about
//! survive an edit. Only the three overhead figures are writable.

use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::amount::{parse_amount, parse_amount_str};
use super::overhead::{OverheadKind, OverheadSchedule, month_values};
use crate::error::SettingsError;
use crate::utils::write_atomic;

pub(crate) struct SettingsDocument {
    path: PathBuf,
    root: Map<String, Value>,
}

impl SettingsDocument {
    /// A missing file is an empty document
    pub(crate) fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No overhead settings at {}, using zero overhead", path.display());
                return Ok(Self::empty(path));
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let value: Value =
            serde_json::from_str(&content).map_err(|source| SettingsError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        let root = match value {
            Value::Object(root) => root,
            // an empty list is how PHP stores an empty option
            Value::Array(items) if items.is_empty() => Map::new(),
            Value::Null => Map::new(),
            _ => {
                return Err(SettingsError::NotAnObject {
                    path: path.to_path_buf(),
                });
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    pub(crate) fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            root: Map::new(),
        }
    }

    pub(crate) fn schedule(&self) -> OverheadSchedule {
        OverheadSchedule::from_settings(&Value::Object(self.root.clone()))
    }

    pub(crate) fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Set one monthly figure from editor input. Empty input leaves it unchanged.
    /// Returns whether the document changed.
    pub(crate) fn set(
        &mut self,
        kind: OverheadKind,
        year: i32,
        month: u32,
        raw: &str,
    ) -> Result<bool, SettingsError> {
        if !(1..=12).contains(&month) {
            return Err(SettingsError::InvalidMonth(month));
        }
        if raw.trim().is_empty() {
            return Ok(false);
        }
        let amount = parse_amount_str(raw)
            .filter(|v| !v.is_sign_negative() || v.is_zero())
            .ok_or_else(|| SettingsError::InvalidValue {
                kind: kind.name(),
                value: raw.to_string(),
            })?;

        let key = kind.settings_key();
        let mut years = match self.root.remove(key) {
            Some(Value::Object(years)) => years,
            _ => Map::new(),
        };
        let year_key = year.to_string();
        let mut months = vec![Value::from(0); 12];
        if let Some(existing) = years.get(&year_key) {
            for (index, value) in month_values(existing) {
                months[index as usize] = value.clone();
            }
        }

        let slot = &mut months[(month - 1) as usize];
        let changed = parse_amount(slot) != Some(amount);
        if changed {
            *slot = Value::String(amount.normalize().to_string());
            tracing::info!("Overhead {} for {year}-{month:02} set to {raw}", kind.name());
        }
        years.insert(year_key, Value::Array(months));
        self.root.insert(key.to_string(), Value::Object(years));
        Ok(changed)
    }

    pub(crate) fn save(&self) -> Result<(), SettingsError> {
        write_atomic(&self.path, |out: &mut dyn Write| {
            serde_json::to_writer_pretty(&mut *out, &self.root)?;
            out.write_all(b"\n")
        })
        .map_err(|source| SettingsError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn write_settings(dir: &Path, value: &Value) -> PathBuf {
        let path = dir.join("settings.json");
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn set_fills_a_new_year_and_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), &json!({"currency": "EUR", "rent": {"2024": [100]}}));
        let mut doc = SettingsDocument::load(&path).unwrap();

        assert!(doc.set(OverheadKind::Rent, 2025, 3, "310").unwrap());
        assert!(doc.set(OverheadKind::Marketing, 2025, 12, "12,5").unwrap());
        doc.save().unwrap();

        let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["currency"], "EUR");
        assert_eq!(saved["rent"]["2024"][0], 100);
        assert_eq!(saved["rent"]["2025"].as_array().unwrap().len(), 12);
        assert_eq!(saved["rent"]["2025"][2], "310");
        assert_eq!(saved["marketingCosts"]["2025"][11], "12.5");

        let schedule = SettingsDocument::load(&path).unwrap().schedule();
        assert_eq!(schedule.monthly(2025, 3).rent, dec!(310));
        assert_eq!(schedule.monthly(2025, 12).marketing_costs, dec!(12.5));
        assert_eq!(schedule.monthly(2024, 1).rent, dec!(100));
    }

    #[test]
    fn sparse_year_object_becomes_a_full_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), &json!({"costs": {"2025": {"1": "58"}}}));
        let mut doc = SettingsDocument::load(&path).unwrap();
        assert!(doc.set(OverheadKind::Fixed, 2025, 1, "60").unwrap());

        let value = doc.as_value();
        let months = value["costs"]["2025"].as_array().unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[1], "58");
        assert_eq!(months[0], "60");
    }

    #[test]
    fn same_amount_or_empty_input_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), &json!({"rent": {"2025": [0, 0, 310]}}));
        let mut doc = SettingsDocument::load(&path).unwrap();
        assert!(!doc.set(OverheadKind::Rent, 2025, 3, "310.00").unwrap());
        assert!(!doc.set(OverheadKind::Rent, 2025, 3, "  ").unwrap());
    }

    #[test]
    fn rejects_bad_month_and_amount() {
        let mut doc = SettingsDocument::empty(Path::new("settings.json"));
        assert!(matches!(
            doc.set(OverheadKind::Rent, 2025, 13, "1"),
            Err(SettingsError::InvalidMonth(13))
        ));
        assert!(matches!(
            doc.set(OverheadKind::Rent, 2025, 1, "-5"),
            Err(SettingsError::InvalidValue { kind: "rent", .. })
        ));
        assert!(matches!(
            doc.set(OverheadKind::Rent, 2025, 1, "lots"),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_accepts_missing_file_and_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let doc = SettingsDocument::load(&dir.path().join("none.json")).unwrap();
        assert_eq!(doc.as_value(), json!({}));

        let path = write_settings(dir.path(), &json!([]));
        assert_eq!(SettingsDocument::load(&path).unwrap().as_value(), json!({}));

        let path = write_settings(dir.path(), &json!("rent"));
        assert!(matches!(
            SettingsDocument::load(&path),
            Err(SettingsError::NotAnObject { .. })
        ));
    }
}
