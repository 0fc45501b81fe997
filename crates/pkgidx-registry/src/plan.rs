use std::path::{Path, PathBuf};

use pkgidx_config::repository::{parse_base_url, RepositorySettings};
use pkgidx_events::{Dimension, EventSinkHandle, IndexEvent};
use tracing::warn;

use crate::error::Result;

pub const PACKAGES_FILE: &str = "Packages";

/// Values requested for each dimension. An empty list selects every valid
/// value of that dimension.
#[derive(Clone, Debug, Default)]
pub struct FetchSelection {
    pub codenames: Vec<String>,
    pub branches: Vec<String>,
    pub architectures: Vec<String>,
}

/// One `Packages` file to download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTarget {
    pub codename: String,
    pub branch: String,
    pub architecture: String,
    pub url: String,
    pub path: PathBuf,
}

/// Keeps the requested values that are in `valid`, in request order.
/// Unknown values are reported and dropped.
fn select(
    dimension: Dimension,
    requested: &[String],
    valid: Vec<String>,
    events: &EventSinkHandle,
) -> Vec<String> {
    if requested.is_empty() {
        return valid;
    }

    let mut selected = Vec::with_capacity(requested.len());
    for value in requested {
        if !valid.contains(value) {
            warn!("Invalid {dimension} '{value}' skipped");
            events.emit(IndexEvent::FetchSkipped {
                dimension,
                value: value.clone(),
            });
            continue;
        }
        if !selected.contains(value) {
            selected.push(value.clone());
        }
    }
    selected
}

/// Expands `selection` into concrete download targets below `output`.
///
/// The URL of each target is `{base_url}{codename}/{branch}/{arch}/Packages`
/// and its path mirrors the same layout. A `base_url` that is not an
/// absolute http(s) URL fails before anything is emitted.
pub fn plan_fetch(
    repo: &RepositorySettings,
    selection: &FetchSelection,
    output: &Path,
    events: &EventSinkHandle,
) -> Result<Vec<FetchTarget>> {
    let base_url = parse_base_url(repo.base_url())?;
    let mut base = base_url.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    let codenames = select(
        Dimension::Codename,
        &selection.codenames,
        repo.codenames(),
        events,
    );
    let branches = select(
        Dimension::Branch,
        &selection.branches,
        repo.branches(),
        events,
    );
    let architectures = select(
        Dimension::Architecture,
        &selection.architectures,
        repo.architectures(),
        events,
    );

    let mut targets = Vec::with_capacity(codenames.len() * branches.len() * architectures.len());
    for codename in &codenames {
        for branch in &branches {
            for architecture in &architectures {
                targets.push(FetchTarget {
                    codename: codename.clone(),
                    branch: branch.clone(),
                    architecture: architecture.clone(),
                    url: format!("{base}{codename}/{branch}/{architecture}/{PACKAGES_FILE}"),
                    path: output
                        .join(codename)
                        .join(branch)
                        .join(architecture)
                        .join(PACKAGES_FILE),
                });
            }
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pkgidx_events::CollectorSink;

    use super::*;
    use crate::RegistryError;

    fn sink() -> (Arc<CollectorSink>, EventSinkHandle) {
        let collector = Arc::new(CollectorSink::default());
        let handle: EventSinkHandle = collector.clone();
        (collector, handle)
    }

    #[test]
    fn test_empty_selection_means_everything() {
        let (collector, events) = sink();
        let targets = plan_fetch(
            &RepositorySettings::defaults(),
            &FetchSelection::default(),
            Path::new("out"),
            &events,
        )
        .unwrap();

        assert_eq!(targets.len(), 4 * 4 * 4);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_target_url_and_path() {
        let (_, events) = sink();
        let selection = FetchSelection {
            codenames: vec!["lory".into()],
            branches: vec!["main".into()],
            architectures: vec!["binary-amd64".into()],
        };
        let targets = plan_fetch(
            &RepositorySettings::defaults(),
            &selection,
            Path::new("out"),
            &events,
        )
        .unwrap();

        assert_eq!(
            targets,
            vec![FetchTarget {
                codename: "lory".into(),
                branch: "main".into(),
                architecture: "binary-amd64".into(),
                url: "https://deb.parrot.sh/parrot/dists/lory/main/binary-amd64/Packages".into(),
                path: PathBuf::from("out/lory/main/binary-amd64/Packages"),
            }]
        );
    }

    #[test]
    fn test_invalid_values_are_skipped_with_event() {
        let (collector, events) = sink();
        let selection = FetchSelection {
            codenames: vec!["lory".into(), "bookworm".into()],
            branches: vec!["main".into(), "universe".into(), "main".into()],
            architectures: vec!["binary-amd64".into()],
        };
        let targets = plan_fetch(
            &RepositorySettings::defaults(),
            &selection,
            Path::new("."),
            &events,
        )
        .unwrap();

        assert_eq!(targets.len(), 1);
        let skipped: Vec<_> = collector
            .events()
            .into_iter()
            .filter_map(|e| {
                match e {
                    IndexEvent::FetchSkipped {
                        dimension,
                        value,
                    } => Some((dimension, value)),
                    _ => None,
                }
            })
            .collect();
        assert_eq!(
            skipped,
            vec![
                (Dimension::Codename, "bookworm".to_string()),
                (Dimension::Branch, "universe".to_string()),
            ]
        );
    }

    #[test]
    fn test_all_values_invalid_yields_no_targets() {
        let (_, events) = sink();
        let selection = FetchSelection {
            architectures: vec!["binary-mips".into()],
            ..Default::default()
        };
        let targets = plan_fetch(
            &RepositorySettings::defaults(),
            &selection,
            Path::new("."),
            &events,
        )
        .unwrap();
        assert!(targets.is_empty());
    }

    #[test]
    fn test_base_url_without_trailing_slash() {
        let (_, events) = sink();
        let repo = RepositorySettings {
            base_url: Some("http://mirror.local/dists".into()),
            ..RepositorySettings::defaults()
        };
        let selection = FetchSelection {
            codenames: vec!["lory".into()],
            branches: vec!["contrib".into()],
            architectures: vec!["binary-i386".into()],
        };
        let targets = plan_fetch(&repo, &selection, Path::new("."), &events).unwrap();
        assert_eq!(
            targets[0].url,
            "http://mirror.local/dists/lory/contrib/binary-i386/Packages"
        );
    }

    #[test]
    fn test_invalid_base_url_fails_up_front() {
        let (collector, events) = sink();
        let repo = RepositorySettings {
            base_url: Some("ftp:/nowhere".into()),
            ..RepositorySettings::defaults()
        };
        let selection = FetchSelection {
            branches: vec!["universe".into()],
            ..Default::default()
        };
        let err = plan_fetch(&repo, &selection, Path::new("."), &events).unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
        assert!(collector.is_empty());
    }
}
