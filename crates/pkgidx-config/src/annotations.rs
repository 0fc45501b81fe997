use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{Decor, DocumentMut, Item, RawString, Table};
use tracing::warn;

use crate::{
    error::{ConfigError, Result},
    pipeline::{BoundarySettings, NormalizeSettings, ParseSettings, ServerSettings},
    repository::RepositorySettings,
};

/// Appends `docs` to the comment prefix of `decor`, one `# ` line per doc
/// line. An existing prefix is separated from the new lines by a bare `#`.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let old_prefix = decor.prefix().and_then(RawString::as_str);
    let last_line = old_prefix.and_then(|prefix| prefix.lines().last());

    let comments = docs
        .lines()
        .map(|l| {
            if l.is_empty() {
                "#\n".into()
            } else {
                format!("# {l}\n")
            }
        })
        .collect();

    let new_prefix = match (old_prefix, last_line) {
        (Some(prefix), Some("")) => format!("{prefix}{comments}"),
        (Some(prefix), Some(_)) => format!("{prefix}#\n{comments}"),
        _ => comments,
    };
    decor.set_prefix(new_prefix);
}

/// Writes the field docs of `T` above each key of `table`.
///
/// Non-root tables also get the struct-level docs of `T`.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key_mut, value_item) in table.iter_mut() {
        let key_str = key_mut.get();
        match T::get_field_docs(key_str) {
            Ok(docs) => {
                match value_item {
                    Item::None => {
                        return Err(ConfigError::UnexpectedTomlItem(key_str.into()));
                    }
                    Item::Value(_) => append_docs_as_toml_comments(key_mut.leaf_decor_mut(), docs),
                    Item::Table(sub_table) => {
                        append_docs_as_toml_comments(sub_table.decor_mut(), docs)
                    }
                    Item::ArrayOfTables(array) => {
                        if let Some(first_table) = array.iter_mut().next() {
                            append_docs_as_toml_comments(first_table.decor_mut(), docs);
                        }
                    }
                }
            }
            Err(_) => {
                warn!(
                    "Key '{}' has no documentation in '{}'",
                    key_str,
                    type_name::<T>()
                );
            }
        }
    }

    Ok(())
}

/// Annotates each section table of a serialized [`Config`] with the
/// documentation of its settings struct.
pub fn annotate_toml_tables(doc: &mut DocumentMut) -> Result<()> {
    for (key, item) in doc.as_table_mut().iter_mut() {
        let Item::Table(table) = item else {
            continue;
        };
        match key.get() {
            "normalize" => annotate_toml_table::<NormalizeSettings>(table, false)?,
            "parse" => annotate_toml_table::<ParseSettings>(table, false)?,
            "boundary" => annotate_toml_table::<BoundarySettings>(table, false)?,
            "repository" => annotate_toml_table::<RepositorySettings>(table, false)?,
            "server" => annotate_toml_table::<ServerSettings>(table, false)?,
            other => warn!("No documentation registered for section '{}'", other),
        }
    }
    Ok(())
}
