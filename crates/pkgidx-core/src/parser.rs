use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    block::{record_blocks, FieldLine},
    constants::{DEFAULT_IDENTITY_FIELD, ID_FIELD},
    record::{insert_or_append, Collection, Record},
};

/// Turns normalized control-file text into a [`Collection`].
///
/// Records are delimited by the identity field (`Package` by default), not by
/// blank lines: a block without the identity field extends the record that is
/// still open.
#[derive(Debug, Clone)]
pub struct RecordParser {
    identity_field: String,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_FIELD)
    }
}

struct Assembler<'a> {
    identity_field: &'a str,
    current: IndexMap<String, String>,
    records: Vec<Record>,
}

impl Assembler<'_> {
    fn commit(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let id = self.records.len() as u64 + 1;
        let fields = std::mem::take(&mut self.current);
        if !fields.contains_key(self.identity_field) {
            warn!(
                id,
                fields = fields.len(),
                "fields found before any `{}` line; kept as a separate record",
                self.identity_field
            );
        }
        self.records.push(Record::from_fields(id, fields));
    }
}

impl RecordParser {
    pub fn new(identity_field: impl Into<String>) -> Self {
        Self {
            identity_field: identity_field.into(),
        }
    }

    pub fn identity_field(&self) -> &str {
        &self.identity_field
    }

    /// Lines holding only whitespace are skipped instead of becoming an
    /// empty-named field.
    pub fn parse(&self, text: &str) -> Collection {
        let mut assembler = Assembler {
            identity_field: &self.identity_field,
            current: IndexMap::new(),
            records: Vec::new(),
        };

        for block in record_blocks(text) {
            for line in block.split('\n') {
                if line.trim().is_empty() {
                    continue;
                }

                let FieldLine {
                    key,
                    value,
                } = FieldLine::parse(line);

                if key == self.identity_field {
                    assembler.commit();
                }

                if !insert_or_append(&mut assembler.current, key, value) {
                    warn!(
                        "dropping source field `{}`: the name is reserved for the record id",
                        ID_FIELD
                    );
                }
            }
        }
        assembler.commit();

        debug!(records = assembler.records.len(), "parsed control file");
        Collection::new(assembler.records)
    }
}

/// Parses `text` with the default `Package` identity field.
pub fn parse_records(text: &str) -> Collection {
    RecordParser::default().parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;

    #[test]
    fn test_round_trip_two_records() {
        let text = "Package: 0ad\nVersion: 0.0.26\n\nPackage: foo\nVersion: 1.0\n";
        let collection = parse_records(text);

        assert_eq!(collection.len(), 2);
        let json: serde_json::Value =
            serde_json::from_str(&collection.to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": 1, "Package": "0ad", "Version": "0.0.26"},
                {"id": 2, "Package": "foo", "Version": "1.0"}
            ])
        );
    }

    #[test]
    fn test_normalize_then_parse_folded_records() {
        let text = "Package: 0ad\n\
Version: 0.0.26-3\n\
Description: Real-time strategy game\n \
0 A.D. is a free game\n \
of ancient warfare\n\
Tag: game::strategy,\n \
role::program\n\
\n\
Package: foo\n\
Version: 1.0\n";

        let normalized = Normalizer::default().normalize_text(text);
        let json = parse_records(&normalized).to_json_pretty().unwrap();

        let expected = r#"[
  {
    "id": 1,
    "Package": "0ad",
    "Version": "0.0.26-3",
    "Description": "Real-time strategy game 0 A.D. is a free game of ancient warfare",
    "Tag": "game::strategy, role::program"
  },
  {
    "id": 2,
    "Package": "foo",
    "Version": "1.0"
  }
]"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_blank_value_without_space_keeps_colon_in_key() {
        let normalized =
            Normalizer::default().normalize_text("Package: foo\nDescription:\n \nSection: x");
        assert_eq!(normalized, "Package: foo\nDescription:\nSection: x");

        let collection = parse_records(&normalized);
        let record = &collection.records()[0];
        assert_eq!(record.get("Description:"), Some(""));
        assert_eq!(record.get("Description"), None);
        assert_eq!(record.get("Section"), Some("x"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("\n\n   \n\n").is_empty());
        assert_eq!(parse_records("").to_json_pretty().unwrap(), "[]");
    }

    #[test]
    fn test_ids_are_dense() {
        let text = (1..=25)
            .map(|i| format!("Package: p{i}\nVersion: {i}"))
            .collect::<Vec<_>>()
            .join("\n\n");
        let collection = parse_records(&text);
        let ids: Vec<u64> = collection.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<u64>>());
    }

    #[test]
    fn test_record_count_matches_package_lines() {
        let text = "Package: a\nDepends: x\n\nPackage: b\n\n\n\nPackage: c\nSection: misc\n\n";
        let collection = parse_records(text);
        let package_lines = text.lines().filter(|l| l.starts_with("Package: ")).count();
        assert_eq!(collection.len(), package_lines);
    }

    #[test]
    fn test_repeated_keys_are_joined() {
        let collection = parse_records("Package: foo\nDepends: a\nVersion: 1\nDepends: b");
        let record = &collection.records()[0];
        assert_eq!(record.get("Depends"), Some("a\nb"));
        let keys: Vec<_> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Package", "Depends", "Version"]);
    }

    #[test]
    fn test_block_without_package_extends_open_record() {
        let text = "Package: foo\nVersion: 1\n\nSection: misc\n\nPackage: bar";
        let collection = parse_records(text);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.records()[0].get("Section"), Some("misc"));
    }

    #[test]
    fn test_orphan_fields_form_first_record() {
        let text = "Origin: Parrot\nLabel: lory\n\nPackage: foo\nVersion: 1";
        let collection = parse_records(text);

        assert_eq!(collection.len(), 2);
        let orphan = &collection.records()[0];
        assert_eq!(orphan.id, 1);
        assert!(orphan.is_orphan());
        assert_eq!(orphan.get("Label"), Some("lory"));
        assert_eq!(collection.records()[1].package(), Some("foo"));
        assert_eq!(collection.records()[1].id, 2);
        assert_eq!(collection.orphan_count(), 1);
    }

    #[test]
    fn test_line_without_separator() {
        let collection = parse_records("Package: foo\nbroken line\nEmpty:");
        let record = &collection.records()[0];
        assert_eq!(record.get("broken line"), Some(""));
        assert_eq!(record.get("Empty:"), Some(""));
    }

    #[test]
    fn test_whitespace_only_lines_skipped() {
        let collection = parse_records("Package: foo\n   \nVersion: 1");
        assert_eq!(collection.records()[0].len(), 2);
    }

    #[test]
    fn test_source_id_field_dropped() {
        let collection = parse_records("Package: foo\nid: 99\nVersion: 1");
        let record = &collection.records()[0];
        assert_eq!(record.id, 1);
        assert_eq!(record.get("id"), None);
        assert_eq!(record.get("Version"), Some("1"));
    }

    #[test]
    fn test_custom_identity_field() {
        let parser = RecordParser::new("Source");
        let collection = parser.parse("Source: glibc\nBinary: libc6\n\nSource: zlib\nBinary: zlib1g");
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.find_by("Source", "zlib").map(|r| r.id), Some(2));
    }

    #[test]
    fn test_unknown_fields_survive_pipeline() {
        let text = "Package: foo\nX-Custom: keep  me\nDescription: short\n long\nTag: a,\n  b";
        let normalized = Normalizer::default().normalize_text(text);
        let collection = parse_records(&normalized);
        let record = &collection.records()[0];
        assert_eq!(record.get("X-Custom"), Some("keep  me"));
        assert_eq!(record.get("Description"), Some("short long"));
        assert_eq!(record.get("Tag"), Some("a, b"));
    }
}
