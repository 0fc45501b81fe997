use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use crate::{
    constants::{DEBIAN_FIELDS, DEFAULT_FALLBACK_PATTERN},
    error::{CoreError, CoreResult},
};

static DEFAULT_FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_FALLBACK_PATTERN).expect("unable to compile field boundary regex")
});

/// Decides whether a line starts a new field.
///
/// A line whose text before the first `:` is a known field name is always a
/// field start. Other lines are tested against an optional fallback pattern,
/// `^\w.*:` unless configured otherwise. The fallback is approximate: an
/// unindented continuation line such as `note: see above` also matches it.
#[derive(Debug, Clone)]
pub struct BoundaryRule {
    known_fields: HashSet<String>,
    fallback: Option<Regex>,
}

impl Default for BoundaryRule {
    /// Debian field names plus the default fallback pattern.
    fn default() -> Self {
        Self::new(DEBIAN_FIELDS.iter().copied())
    }
}

impl BoundaryRule {
    /// Known names plus the default fallback pattern.
    pub fn new<I, S>(known_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_fields: known_fields.into_iter().map(Into::into).collect(),
            fallback: Some(DEFAULT_FALLBACK.clone()),
        }
    }

    /// No known names, fallback pattern only.
    pub fn generic() -> Self {
        Self::new(std::iter::empty::<String>())
    }

    pub fn with_fallback_pattern(mut self, pattern: &str) -> CoreResult<Self> {
        let regex = Regex::new(pattern).map_err(|source| {
            CoreError::InvalidBoundaryPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        self.fallback = Some(regex);
        Ok(self)
    }

    /// Only known names anchor boundaries; unknown fields fold into the
    /// preceding value.
    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    pub fn with_known_field(mut self, name: impl Into<String>) -> Self {
        self.add_known_field(name);
        self
    }

    pub fn add_known_field(&mut self, name: impl Into<String>) {
        self.known_fields.insert(name.into());
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.known_fields.contains(name)
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn is_field_start(&self, line: &str) -> bool {
        if let Some((name, _)) = line.split_once(':') {
            if self.known_fields.contains(name) {
                return true;
            }
        }

        self.fallback.as_ref().is_some_and(|re| re.is_match(line))
    }
}
