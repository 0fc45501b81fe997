//! Fetching of `Packages` indexes from a Debian-style repository.
//!
//! A repository is addressed by three dimensions: codename, branch and
//! architecture. [`plan_fetch`] checks a [`FetchSelection`] against the
//! configured valid values and expands it into one [`FetchTarget`] per
//! combination. [`fetch_packages`] downloads them one after another,
//! reporting through an event sink.
//!
//! # Example
//!
//! ```no_run
//! use std::{path::Path, sync::Arc};
//!
//! use pkgidx_config::repository::RepositorySettings;
//! use pkgidx_events::{EventSinkHandle, NullSink};
//! use pkgidx_registry::{fetch_packages, FetchSelection};
//!
//! fn sync() -> pkgidx_registry::Result<()> {
//!     let selection = FetchSelection {
//!         branches: vec!["main".into()],
//!         ..Default::default()
//!     };
//!     let events: EventSinkHandle = Arc::new(NullSink);
//!     let report = fetch_packages(
//!         &RepositorySettings::defaults(),
//!         &selection,
//!         Path::new("."),
//!         &events,
//!     )?;
//!     println!("{} fetched, {} failed", report.fetched.len(), report.failed.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fetch;
pub mod plan;

pub use error::{RegistryError, Result};
pub use fetch::{fetch_packages, FetchFailure, FetchReport, FetchedFile};
pub use plan::{plan_fetch, FetchSelection, FetchTarget, PACKAGES_FILE};
