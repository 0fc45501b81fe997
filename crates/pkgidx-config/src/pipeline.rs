use documented::{Documented, DocumentedFields};
use pkgidx_core::{
    constants::{
        DEBIAN_FIELDS, DEFAULT_FALLBACK_PATTERN, DEFAULT_IDENTITY_FIELD,
        DEFAULT_LIST_FORM_FIELDS, DEFAULT_LONG_FORM_FIELDS,
    },
    BoundaryRule, Normalizer, RecordParser,
};
use pkgidx_utils::pattern::NameFilter;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_OUTPUT_PREFIX: &str = "processed_";
pub const DEFAULT_NAME_PREFIX: &str = "Packages";
pub const DEFAULT_NAME_SUFFIX: &str = "Packages";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Field normalization applied to raw `Packages` files.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct NormalizeSettings {
    /// Prose fields joined into a single line.
    /// Default: ["Description"]
    pub long_form_fields: Option<Vec<String>>,

    /// Taxonomy fields whose whitespace runs collapse to one space.
    /// Default: ["Tag"]
    pub list_form_fields: Option<Vec<String>>,

    /// Prefix prepended to the names of normalized output files.
    /// Default: "processed_"
    pub output_prefix: Option<String>,

    /// Only input files whose names start with this are normalized.
    /// Default: "Packages"
    pub name_prefix: Option<String>,
}

impl NormalizeSettings {
    pub fn long_form_fields(&self) -> Vec<String> {
        self.long_form_fields
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_LONG_FORM_FIELDS))
    }

    pub fn list_form_fields(&self) -> Vec<String> {
        self.list_form_fields
            .clone()
            .unwrap_or_else(|| owned(DEFAULT_LIST_FORM_FIELDS))
    }

    pub fn output_prefix(&self) -> &str {
        self.output_prefix
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_PREFIX)
    }

    pub fn name_filter(&self) -> NameFilter {
        NameFilter::prefix(self.name_prefix.as_deref().unwrap_or(DEFAULT_NAME_PREFIX))
    }
}

/// Conversion of normalized files into JSON collections.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct ParseSettings {
    /// Only input files whose names end with this are parsed.
    /// Default: "Packages"
    pub name_suffix: Option<String>,

    /// Field whose occurrence starts a new record.
    /// Default: "Package"
    pub identity_field: Option<String>,
}

impl ParseSettings {
    pub fn name_filter(&self) -> NameFilter {
        NameFilter::suffix(self.name_suffix.as_deref().unwrap_or(DEFAULT_NAME_SUFFIX))
    }

    pub fn identity_field(&self) -> &str {
        self.identity_field
            .as_deref()
            .unwrap_or(DEFAULT_IDENTITY_FIELD)
    }

    pub fn record_parser(&self) -> RecordParser {
        RecordParser::new(self.identity_field())
    }
}

/// Detection of the line where one field ends and the next begins.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct BoundarySettings {
    /// Field names that always start a new field.
    /// Default: the standard Debian binary package fields
    pub known_fields: Option<Vec<String>>,

    /// Whether lines matching `fallback_pattern` also start a new field.
    /// When disabled, unknown fields fold into the preceding value.
    /// Default: true
    pub fallback: Option<bool>,

    /// Regular expression matched against lines with unknown names.
    /// Default: "^\w.*:"
    pub fallback_pattern: Option<String>,
}

impl BoundarySettings {
    pub fn fallback(&self) -> bool {
        self.fallback.unwrap_or(true)
    }

    pub fn fallback_pattern(&self) -> &str {
        self.fallback_pattern
            .as_deref()
            .unwrap_or(DEFAULT_FALLBACK_PATTERN)
    }

    pub fn rule(&self) -> Result<BoundaryRule> {
        let rule = match &self.known_fields {
            Some(fields) => BoundaryRule::new(fields.iter().cloned()),
            None => BoundaryRule::new(DEBIAN_FIELDS.iter().copied()),
        };

        Ok(if self.fallback() {
            rule.with_fallback_pattern(self.fallback_pattern())?
        } else {
            rule.without_fallback()
        })
    }
}

/// The HTTP query endpoint started by `pkgidx serve`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the server listens on.
    /// Default: "127.0.0.1:8000"
    pub bind: Option<String>,
}

impl ServerSettings {
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}

/// Builds the normalizer described by the two settings sections.
pub fn build_normalizer(
    normalize: &NormalizeSettings,
    boundary: &BoundarySettings,
) -> Result<Normalizer> {
    Ok(Normalizer::from_fields(
        &normalize.long_form_fields(),
        &normalize.list_form_fields(),
        boundary.rule()?,
    )?)
}

#[cfg(test)]
mod tests {
    use pkgidx_core::{CoreError, FieldClass};

    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_default_normalizer() {
        let normalizer =
            build_normalizer(&NormalizeSettings::default(), &BoundarySettings::default()).unwrap();
        assert_eq!(
            normalizer.fields(),
            &[
                ("Description".to_string(), FieldClass::LongForm),
                ("Tag".to_string(), FieldClass::ListForm),
            ]
        );
        assert!(normalizer.rule().has_fallback());
    }

    #[test]
    fn test_conflicting_field_classes() {
        let normalize = NormalizeSettings {
            long_form_fields: Some(vec!["Tag".into()]),
            ..Default::default()
        };
        let err = build_normalizer(&normalize, &BoundarySettings::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Core(CoreError::ConflictingFieldClass { .. })
        ));
    }

    #[test]
    fn test_invalid_fallback_pattern() {
        let boundary = BoundarySettings {
            fallback_pattern: Some("(".into()),
            ..Default::default()
        };
        assert!(matches!(
            boundary.rule(),
            Err(ConfigError::Core(CoreError::InvalidBoundaryPattern { .. }))
        ));
    }

    #[test]
    fn test_disabled_fallback_with_custom_known_fields() {
        let boundary = BoundarySettings {
            known_fields: Some(vec!["Package".into(), "Description".into()]),
            fallback: Some(false),
            ..Default::default()
        };
        let rule = boundary.rule().unwrap();
        assert!(!rule.has_fallback());
        assert!(rule.is_field_start("Description: x"));
        assert!(!rule.is_field_start("Version: 1"));
    }

    #[test]
    fn test_name_filters() {
        assert!(NormalizeSettings::default().name_filter().matches("Packages"));
        assert!(!NormalizeSettings::default()
            .name_filter()
            .matches("processed_Packages"));
        assert!(ParseSettings::default()
            .name_filter()
            .matches("processed_Packages"));
    }
}
