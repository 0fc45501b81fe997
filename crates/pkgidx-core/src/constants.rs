//! Constants used throughout pkgidx-core.

/// Separator between record blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Separator between a field name and its value on a field line.
pub const FIELD_SEPARATOR: &str = ": ";

/// Field whose occurrence starts a new record.
pub const DEFAULT_IDENTITY_FIELD: &str = "Package";

/// Name of the numeric identifier every record carries.
pub const ID_FIELD: &str = "id";

/// Generic field-start pattern used for names outside the known set.
pub const DEFAULT_FALLBACK_PATTERN: &str = r"^\w.*:";

pub const DEFAULT_LONG_FORM_FIELDS: &[&str] = &["Description"];

pub const DEFAULT_LIST_FORM_FIELDS: &[&str] = &["Tag"];

/// Field names found in Debian binary `Packages` indexes.
pub const DEBIAN_FIELDS: &[&str] = &[
    "Package",
    "Source",
    "Version",
    "Installed-Size",
    "Maintainer",
    "Original-Maintainer",
    "Architecture",
    "Multi-Arch",
    "Essential",
    "Protected",
    "Priority",
    "Section",
    "Origin",
    "Bugs",
    "Homepage",
    "Depends",
    "Pre-Depends",
    "Recommends",
    "Suggests",
    "Enhances",
    "Breaks",
    "Conflicts",
    "Replaces",
    "Provides",
    "Built-Using",
    "Static-Built-Using",
    "Description",
    "Description-md5",
    "Tag",
    "Task",
    "Filename",
    "Size",
    "MD5sum",
    "SHA1",
    "SHA256",
    "SHA512",
    "Ruby-Versions",
    "Lua-Versions",
    "Python-Version",
    "Go-Import-Path",
    "Gstreamer-Version",
    "Gstreamer-Elements",
    "Gstreamer-Decoders",
    "Gstreamer-Encoders",
    "Gstreamer-Uri-Sources",
    "Gstreamer-Uri-Sinks",
    "Build-Ids",
    "Auto-Built-Package",
    "Cnf-Extra-Commands",
    "Cnf-Priority-Bonus",
    "Important",
];
