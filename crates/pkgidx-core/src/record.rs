use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_IDENTITY_FIELD, ID_FIELD},
    error::CoreResult,
};

/// One parsed record: a numeric id plus fields in first-occurrence order.
///
/// Serializes as a flat JSON object with `"id"` first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    #[serde(flatten)]
    fields: IndexMap<String, String>,
}

impl Record {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            fields: IndexMap::new(),
        }
    }

    pub(crate) fn from_fields(id: u64, fields: IndexMap<String, String>) -> Self {
        Self {
            id,
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn package(&self) -> Option<&str> {
        self.get(DEFAULT_IDENTITY_FIELD)
    }

    /// True when the record has no `Package` field, i.e. it was assembled
    /// from lines that preceded the first `Package` line.
    pub fn is_orphan(&self) -> bool {
        !self.fields.contains_key(DEFAULT_IDENTITY_FIELD)
    }

    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Inserts a field, or appends `"\n" + value` to an existing one so it
    /// keeps its first-seen position.
    ///
    /// Returns `false` without storing anything for the reserved `id` name.
    pub fn insert_or_append(&mut self, key: &str, value: &str) -> bool {
        insert_or_append(&mut self.fields, key, value)
    }
}

pub(crate) fn insert_or_append(
    fields: &mut IndexMap<String, String>,
    key: &str,
    value: &str,
) -> bool {
    if key == ID_FIELD {
        return false;
    }
    match fields.get_mut(key) {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(value);
        }
        None => {
            fields.insert(key.to_string(), value.to_string());
        }
    }
    true
}

/// Records parsed from one input, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// First record whose `key` field equals `value`.
    pub fn find_by(&self, key: &str, value: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.get(key) == Some(value))
    }

    pub fn find_package(&self, name: &str) -> Option<&Record> {
        self.find_by(DEFAULT_IDENTITY_FIELD, name)
    }

    pub fn orphan_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_orphan()).count()
    }

    /// Two-space indented JSON array.
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl IntoIterator for Collection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, pairs: &[(&str, &str)]) -> Record {
        let mut record = Record::new(id);
        for (k, v) in pairs {
            record.insert_or_append(k, v);
        }
        record
    }

    #[test]
    fn test_insert_or_append_keeps_position() {
        let mut r = Record::new(1);
        r.insert_or_append("Package", "foo");
        r.insert_or_append("Depends", "a");
        r.insert_or_append("Version", "1.0");
        r.insert_or_append("Depends", "b");

        let keys: Vec<_> = r.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Package", "Depends", "Version"]);
        assert_eq!(r.get("Depends"), Some("a\nb"));
    }

    #[test]
    fn test_reserved_id_is_rejected() {
        let mut r = Record::new(7);
        assert!(!r.insert_or_append("id", "42"));
        assert!(r.is_empty());
        assert_eq!(r.id, 7);
    }

    #[test]
    fn test_orphan() {
        assert!(record(1, &[("Section", "games")]).is_orphan());
        assert!(!record(1, &[("Package", "foo")]).is_orphan());
    }

    #[test]
    fn test_serialize_id_first() {
        let collection = Collection::new(vec![record(
            1,
            &[("Package", "foo"), ("Version", "1.0")],
        )]);
        let json = collection.to_json_pretty().unwrap();
        assert_eq!(
            json,
            "[\n  {\n    \"id\": 1,\n    \"Package\": \"foo\",\n    \"Version\": \"1.0\"\n  }\n]"
        );
    }

    #[test]
    fn test_deserialize_preserves_order() {
        let json = r#"[{"id": 3, "Package": "zsh", "Architecture": "amd64", "Depends": "libc6"}]"#;
        let collection = Collection::from_json(json).unwrap();
        let r = &collection.records()[0];
        assert_eq!(r.id, 3);
        let keys: Vec<_> = r.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Package", "Architecture", "Depends"]);
    }

    #[test]
    fn test_from_json_rejects_corrupt_input() {
        assert!(Collection::from_json("[{\"id\": 1, \"Package\": ").is_err());
        assert!(Collection::from_json("{\"Package\": \"foo\"}").is_err());
    }

    #[test]
    fn test_find_package() {
        let collection = Collection::new(vec![
            record(1, &[("Package", "foo")]),
            record(2, &[("Package", "bar")]),
            record(3, &[("Package", "bar"), ("Version", "2")]),
        ]);
        assert_eq!(collection.find_package("bar").map(|r| r.id), Some(2));
        assert!(collection.find_package("baz").is_none());
    }
}
