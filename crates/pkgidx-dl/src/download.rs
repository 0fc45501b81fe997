use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use pkgidx_utils::fs::ensure_dir_exists;
use tracing::debug;
use ureq::{
    http::{header::CONTENT_LENGTH, Response},
    Body,
};

use crate::{
    error::DownloadError,
    http_client::SHARED_AGENT,
    types::{Downloaded, OverwriteMode, Progress},
};

/// Single-file HTTP download.
///
/// The body is streamed into `<output>.part` and renamed into place once the
/// transfer completes, so a failed request never leaves a truncated target.
pub struct Download {
    url: String,
    output: Option<PathBuf>,
    overwrite: OverwriteMode,
    on_progress: Option<Box<dyn Fn(Progress) + Send + Sync>>,
}

impl Download {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output: None,
            overwrite: OverwriteMode::default(),
            on_progress: None,
        }
    }

    /// Target file. Defaults to the last path segment of the URL in the
    /// working directory.
    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn overwrite(mut self, overwrite: OverwriteMode) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Registers a callback invoked with [`Progress`] events while the body
    /// is read.
    ///
    /// ```no_run
    /// use pkgidx_dl::{download::Download, types::Progress};
    ///
    /// let dl = Download::new("https://deb.parrot.sh/parrot/dists/lory/main/binary-amd64/Packages")
    ///     .progress(|event| {
    ///         if let Progress::Chunk { current, total } = event {
    ///             println!("{current}/{total}");
    ///         }
    ///     });
    /// ```
    pub fn progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    /// Performs the request. Anything but `200 OK` is reported as
    /// [`DownloadError::HttpError`].
    pub fn execute(self) -> Result<Downloaded, DownloadError> {
        let parsed = url::Url::parse(&self.url).map_err(|err| {
            DownloadError::InvalidUrl {
                url: self.url.clone(),
                source: err,
            }
        })?;

        let output_path = match &self.output {
            Some(path) => path.clone(),
            None => default_file_name(&parsed),
        };

        if output_path.is_file() && self.overwrite == OverwriteMode::Skip {
            debug!("keeping existing {}", output_path.display());
            let bytes = fs::metadata(&output_path)?.len();
            return Ok(Downloaded {
                path: output_path,
                bytes,
                skipped: true,
            });
        }

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir_exists(parent)?;
            }
        }

        let resp = SHARED_AGENT
            .get(self.url.as_str())
            .call()
            .map_err(|err| DownloadError::from_request(err, &self.url))?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(DownloadError::HttpError {
                status,
                url: self.url.clone(),
            });
        }

        let part_path = part_path(&output_path);
        let bytes = match self.stream_to_file(resp, &part_path) {
            Ok(bytes) => bytes,
            Err(err) => {
                let _ = fs::remove_file(&part_path);
                return Err(err);
            }
        };
        fs::rename(&part_path, &output_path)?;

        Ok(Downloaded {
            path: output_path,
            bytes,
            skipped: false,
        })
    }

    fn stream_to_file(&self, resp: Response<Body>, path: &Path) -> Result<u64, DownloadError> {
        let total = content_length(&resp);

        if let Some(ref cb) = self.on_progress {
            cb(Progress::Starting {
                total,
            });
        }

        let mut file = File::create(path)?;
        let mut reader = resp.into_body().into_reader();
        let mut buffer = [0u8; 8192];
        let mut downloaded = 0u64;

        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }

            file.write_all(&buffer[..n])?;
            downloaded += n as u64;

            if let Some(ref cb) = self.on_progress {
                cb(Progress::Chunk {
                    current: downloaded,
                    total,
                });
            }
        }
        file.flush()?;

        if let Some(ref cb) = self.on_progress {
            cb(Progress::Complete {
                total: downloaded,
            });
        }

        Ok(downloaded)
    }
}

fn content_length(resp: &Response<Body>) -> u64 {
    resp.headers()
        .get(CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|len| len.parse::<u64>().ok())
        .unwrap_or(0)
}

fn default_file_name(url: &url::Url) -> PathBuf {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("index.html"))
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
