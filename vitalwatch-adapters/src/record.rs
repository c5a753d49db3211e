//! Loosely-typed rows as delivered by a backend.

use std::collections::BTreeMap;

use serde_json::Value;

/// A single cell of a raw row.
///
/// Backends do not coerce values: a spreadsheet cell stays text even when it
/// looks numeric, a JSON number stays a number.
#[derive(Debug, Clone, PartialEq)]
pub enum RawField {
    /// Blank cell or JSON `null`.
    Null,
    Text(String),
    Number(f64),
}

impl RawField {
    /// Build a field from a spreadsheet cell; blank cells are `Null`.
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() {
            RawField::Null
        } else {
            RawField::Text(cell.to_string())
        }
    }
}

impl From<Value> for RawField {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawField::Null,
            Value::String(s) => RawField::Text(s),
            Value::Number(n) => n.as_f64().map_or(RawField::Null, RawField::Number),
            other => RawField::Text(other.to_string()),
        }
    }
}

/// One row from a backend, keyed by the backend's own column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: BTreeMap<String, RawField>,
}

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, returning the record (builder style).
    pub fn with(mut self, column: impl Into<String>, field: RawField) -> Self {
        self.insert(column, field);
        self
    }

    /// Add a field by column name.
    pub fn insert(&mut self, column: impl Into<String>, field: RawField) {
        self.fields.insert(column.into(), field);
    }

    /// Get a field by its exact column name.
    pub fn get(&self, column: &str) -> Option<&RawField> {
        self.fields.get(column)
    }

    /// Iterate over all (column, field) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawField)> {
        self.fields.iter()
    }

    /// Number of columns in this row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a JSON object; other JSON values are rejected.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(
                map.into_iter()
                    .map(|(column, value)| (column, RawField::from(value)))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl FromIterator<(String, RawField)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawField)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Fold a column name for schema matching.
///
/// Lowercases and drops everything that is not alphanumeric, so
/// `"Blood Oxygen"`, `"blood_oxygen"` and `"BLOOD-OXYGEN"` all fold to
/// `"bloodoxygen"`.
pub fn canonical_key(column: &str) -> String {
    column
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("Blood Oxygen"), "bloodoxygen");
        assert_eq!(canonical_key("blood_oxygen"), "bloodoxygen");
        assert_eq!(canonical_key("  Heart-Rate "), "heartrate");
        assert_eq!(canonical_key("Timestamp"), "timestamp");
    }

    #[test]
    fn test_from_cell() {
        assert_eq!(RawField::from_cell("  "), RawField::Null);
        assert_eq!(RawField::from_cell(" 37.2 "), RawField::Text("37.2".to_string()));
    }

    #[test]
    fn test_from_json_object() {
        let record = RawRecord::from_json(json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "temperature": 37.5,
            "blood_pressure": null,
            "flag": true
        }))
        .unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("temperature"), Some(&RawField::Number(37.5)));
        assert_eq!(record.get("blood_pressure"), Some(&RawField::Null));
        assert_eq!(record.get("flag"), Some(&RawField::Text("true".to_string())));
        assert!(record.get("heart_rate").is_none());
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(RawRecord::from_json(json!([1, 2, 3])).is_none());
        assert!(RawRecord::from_json(json!("text")).is_none());
    }
}
