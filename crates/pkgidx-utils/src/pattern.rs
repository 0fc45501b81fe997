/// Matches file names by an optional literal prefix and suffix.
///
/// An empty filter matches every name. Matching is case-sensitive and works
/// on the file name only, never on the full path.
///
/// # Examples
///
/// ```
/// use pkgidx_utils::pattern::NameFilter;
///
/// let filter = NameFilter::prefix("Packages");
/// assert!(filter.matches("Packages"));
/// assert!(filter.matches("Packages.main"));
/// assert!(!filter.matches("processed_Packages"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameFilter {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl NameFilter {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            suffix: None,
        }
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self {
            prefix: None,
            suffix: Some(suffix.into()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.prefix.as_deref().is_none_or(|p| name.starts_with(p))
            && self.suffix.as_deref().is_none_or(|s| name.ends_with(s))
    }
}
