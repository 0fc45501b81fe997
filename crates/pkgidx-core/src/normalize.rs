//! Collapsing of folded field values.
//!
//! A field's value span runs from just after `Field:` to the line break
//! before the next line accepted by the [`BoundaryRule`], or to the end of
//! the block. Only the bytes inside such spans are rewritten; everything else
//! in the block is copied through untouched.

use std::{borrow::Cow, ops::Range};

use serde::{Deserialize, Serialize};

use crate::{
    block::{lines_with_offsets, split_blocks},
    boundary::BoundaryRule,
    constants::{BLOCK_SEPARATOR, DEFAULT_LIST_FORM_FIELDS, DEFAULT_LONG_FORM_FIELDS},
    error::{CoreError, CoreResult},
};

/// How a field's value is collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldClass {
    /// Prose such as `Description`: trimmed and joined into one line with
    /// the line breaks removed. Internal spacing is kept as authored.
    LongForm,
    /// Taxonomies such as `Tag`: trimmed with every whitespace run collapsed
    /// to a single space.
    ListForm,
}

impl FieldClass {
    pub fn apply(self, value: &str) -> String {
        match self {
            FieldClass::LongForm => value.trim().lines().collect(),
            FieldClass::ListForm => value.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

/// Byte ranges of every value span of `field` in `block`.
pub fn field_spans(block: &str, field: &str, rule: &BoundaryRule) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (offset, line) in lines_with_offsets(block) {
        if !rule.is_field_start(line) {
            continue;
        }
        if let Some(start) = open.take() {
            spans.push(start..offset - 1);
        }
        if line
            .strip_prefix(field)
            .is_some_and(|rest| rest.starts_with(':'))
        {
            open = Some(offset + field.len() + 1);
        }
    }

    if let Some(start) = open {
        spans.push(start..block.len());
    }

    spans
}

/// Rewrites one value span.
///
/// Horizontal whitespace right after the colon and trailing line terminators
/// are kept; a value that had no leading space gets one so the line still
/// splits on `": "`.
fn rewrite_span(span: &str, class: FieldClass) -> String {
    let rest = span.trim_start_matches([' ', '\t']);
    let lead = &span[..span.len() - rest.len()];
    let body = rest.trim_end_matches(['\r', '\n']);
    let tail = &rest[body.len()..];

    let value = class.apply(body);
    let lead = if lead.is_empty() && !value.is_empty() {
        " "
    } else {
        lead
    };

    let mut out = String::with_capacity(lead.len() + value.len() + tail.len());
    out.push_str(lead);
    out.push_str(&value);
    out.push_str(tail);
    out
}

/// Normalizes every occurrence of `field` in `block`.
///
/// A block without the field is returned borrowed and unchanged.
pub fn normalize_field<'a>(
    block: &'a str,
    field: &str,
    class: FieldClass,
    rule: &BoundaryRule,
) -> Cow<'a, str> {
    let spans = field_spans(block, field, rule);
    if spans.is_empty() {
        return Cow::Borrowed(block);
    }

    let mut out = block.to_string();
    for span in spans.into_iter().rev() {
        let rewritten = rewrite_span(&block[span.clone()], class);
        out.replace_range(span, &rewritten);
    }
    Cow::Owned(out)
}

/// Applies a set of field normalizations to blocks or whole files.
#[derive(Debug, Clone)]
pub struct Normalizer {
    fields: Vec<(String, FieldClass)>,
    rule: BoundaryRule,
}

impl Default for Normalizer {
    fn default() -> Self {
        let mut normalizer = Self::new(BoundaryRule::default());
        for field in DEFAULT_LONG_FORM_FIELDS {
            normalizer = normalizer.with_field(*field, FieldClass::LongForm);
        }
        for field in DEFAULT_LIST_FORM_FIELDS {
            normalizer = normalizer.with_field(*field, FieldClass::ListForm);
        }
        normalizer
    }
}

impl Normalizer {
    /// A normalizer with no target fields.
    pub fn new(rule: BoundaryRule) -> Self {
        Self {
            fields: Vec::new(),
            rule,
        }
    }

    /// Builds a normalizer from the two field lists, rejecting a field that
    /// appears in both.
    pub fn from_fields(
        long_form: &[String],
        list_form: &[String],
        rule: BoundaryRule,
    ) -> CoreResult<Self> {
        if let Some(field) = long_form.iter().find(|f| list_form.contains(*f)) {
            return Err(CoreError::ConflictingFieldClass {
                field: field.clone(),
            });
        }

        let long = long_form.iter().map(|f| (f, FieldClass::LongForm));
        let list = list_form.iter().map(|f| (f, FieldClass::ListForm));
        Ok(long
            .chain(list)
            .fold(Self::new(rule), |n, (field, class)| {
                n.with_field(field.as_str(), class)
            }))
    }

    /// Adds a target field. The name also becomes a known boundary anchor.
    pub fn with_field(mut self, name: impl Into<String>, class: FieldClass) -> Self {
        let name = name.into();
        self.rule.add_known_field(name.clone());
        self.fields.retain(|(existing, _)| *existing != name);
        self.fields.push((name, class));
        self
    }

    pub fn fields(&self) -> &[(String, FieldClass)] {
        &self.fields
    }

    pub fn rule(&self) -> &BoundaryRule {
        &self.rule
    }

    pub fn normalize_block(&self, block: &str) -> String {
        let mut text = block.to_string();
        for (field, class) in &self.fields {
            let changed = match normalize_field(&text, field, *class, &self.rule) {
                Cow::Owned(changed) => Some(changed),
                Cow::Borrowed(_) => None,
            };
            if let Some(changed) = changed {
                text = changed;
            }
        }
        text
    }

    /// Normalizes a whole file: split on blank lines, normalize each block,
    /// join back with the same separator.
    pub fn normalize_text(&self, text: &str) -> String {
        split_blocks(text)
            .map(|block| self.normalize_block(block))
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOLDED: &str = "Package: 0ad\n\
Version: 0.0.26-3\n\
Description: Real-time strategy game of ancient warfare\n \
0 A.D. (pronounced \"zero ey-dee\") is a free, open-source, cross-platform\n \
real-time strategy (RTS) game.\n\
Tag: game::strategy,\n    interface::graphical,   \n role::program\n\
Section: games\n";

    #[test]
    fn test_long_form_joins_lines() {
        let out = normalize_field(
            "Description: a\n b\n  c\nSection: x",
            "Description",
            FieldClass::LongForm,
            &BoundaryRule::default(),
        );
        assert_eq!(out, "Description: a b  c\nSection: x");
    }

    #[test]
    fn test_list_form_collapses_whitespace() {
        let out = normalize_field(
            "Tag:  a::b,\n   c::d,\t e::f  \nSize: 1",
            "Tag",
            FieldClass::ListForm,
            &BoundaryRule::default(),
        );
        assert_eq!(out, "Tag:  a::b, c::d, e::f\nSize: 1");
    }

    #[test]
    fn test_default_normalizer_on_record() {
        let out = Normalizer::default().normalize_block(FOLDED);
        assert_eq!(
            out,
            "Package: 0ad\n\
Version: 0.0.26-3\n\
Description: Real-time strategy game of ancient warfare \
0 A.D. (pronounced \"zero ey-dee\") is a free, open-source, cross-platform \
real-time strategy (RTS) game.\n\
Tag: game::strategy, interface::graphical, role::program\n\
Section: games\n"
        );
    }

    #[test]
    fn test_idempotent() {
        let normalizer = Normalizer::default();
        let once = normalizer.normalize_text(FOLDED);
        let twice = normalizer.normalize_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalized_values_are_newline_free() {
        let rule = BoundaryRule::default();
        let out = Normalizer::default().normalize_block(FOLDED);
        for (field, _) in Normalizer::default().fields() {
            for span in field_spans(&out, field, &rule) {
                let value = out[span].trim_end_matches('\n');
                assert!(!value.contains('\n'), "{field} still folded: {value:?}");
            }
        }
    }

    #[test]
    fn test_span_isolation() {
        let block = "Package: echo\n\
Summary: hello   world\n\
Description: hello   world\n  again\n\
Tag: hello   world";
        let out = Normalizer::default().normalize_block(block);
        assert_eq!(
            out,
            "Package: echo\n\
Summary: hello   world\n\
Description: hello   world  again\n\
Tag: hello world"
        );
    }

    #[test]
    fn test_block_without_field_is_borrowed() {
        let block = "Package: foo\nVersion: 1.0";
        let out = normalize_field(block, "Description", FieldClass::LongForm, &BoundaryRule::default());
        assert!(matches!(out, Cow::Borrowed(b) if b == block));
    }

    #[test]
    fn test_whitespace_only_value() {
        let out = normalize_field(
            "Tag:   \n   \nSize: 3",
            "Tag",
            FieldClass::ListForm,
            &BoundaryRule::default(),
        );
        assert_eq!(out, "Tag:   \nSize: 3");
    }

    #[test]
    fn test_value_on_next_line_gets_separator() {
        let out = normalize_field(
            "Description:\n first\n second",
            "Description",
            FieldClass::LongForm,
            &BoundaryRule::default(),
        );
        assert_eq!(out, "Description: first second");
    }

    #[test]
    fn test_trailing_newline_kept_at_block_end() {
        let out = normalize_field(
            "Package: a\nTag: x,\n y\n",
            "Tag",
            FieldClass::ListForm,
            &BoundaryRule::default(),
        );
        assert_eq!(out, "Package: a\nTag: x, y\n");
    }

    #[test]
    fn test_every_occurrence_normalized() {
        let out = normalize_field(
            "Tag: a,\n b\nSize: 1\nTag: c,\n    d",
            "Tag",
            FieldClass::ListForm,
            &BoundaryRule::default(),
        );
        assert_eq!(out, "Tag: a, b\nSize: 1\nTag: c, d");
    }

    #[test]
    fn test_prefix_named_field_not_matched() {
        let block = "Description-md5: abc\n def\nDescription: x\n y";
        let out = normalize_field(block, "Description", FieldClass::LongForm, &BoundaryRule::default());
        assert_eq!(out, "Description-md5: abc\n def\nDescription: x y");
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let text = "Package: foo\nX-Weird:  keep   this\n spacing\nDescription: d\n\nPackage: bar\n";
        let out = Normalizer::default().normalize_text(text);
        assert_eq!(
            out,
            "Package: foo\nX-Weird:  keep   this\n spacing\nDescription: d\n\nPackage: bar\n"
        );
    }

    #[test]
    fn test_text_outside_spans_is_byte_identical() {
        let text = "Package: a\r\nDescription: one\n two\nSize: 1\n\n\nPackage: b\n";
        let out = Normalizer::default().normalize_text(text);
        assert_eq!(out, "Package: a\r\nDescription: one two\nSize: 1\n\n\nPackage: b\n");
    }

    #[test]
    fn test_misfire_under_generic_fallback() {
        let block = "Description: summary\nnote: not a field\nSection: x";
        let generic = normalize_field(block, "Description", FieldClass::LongForm, &BoundaryRule::default());
        assert_eq!(generic, block);

        let strict = BoundaryRule::default().without_fallback();
        let out = normalize_field(block, "Description", FieldClass::LongForm, &strict);
        assert_eq!(out, "Description: summarynote: not a field\nSection: x");
    }

    #[test]
    fn test_unknown_field_folds_without_fallback() {
        let block = "Tag: a,\n b\nX-Custom: 1\nSize: 2";
        let strict = BoundaryRule::default().without_fallback();
        let out = normalize_field(block, "Tag", FieldClass::ListForm, &strict);
        assert_eq!(out, "Tag: a, b X-Custom: 1\nSize: 2");
    }

    #[test]
    fn test_from_fields_rejects_conflict() {
        let err = Normalizer::from_fields(
            &["Description".into()],
            &["Tag".into(), "Description".into()],
            BoundaryRule::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ConflictingFieldClass { field } if field == "Description"));
    }

    #[test]
    fn test_from_fields_registers_known_names() {
        let normalizer = Normalizer::from_fields(
            &["X-Long".into()],
            &[],
            BoundaryRule::generic().without_fallback(),
        )
        .unwrap();
        assert!(normalizer.rule().is_known("X-Long"));
        assert_eq!(normalizer.fields(), &[("X-Long".to_string(), FieldClass::LongForm)]);
    }

    #[test]
    fn test_field_class_serde() {
        let class: FieldClass = serde_json::from_str("\"list-form\"").unwrap();
        assert_eq!(class, FieldClass::ListForm);
    }
}
