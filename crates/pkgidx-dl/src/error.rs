use miette::Diagnostic;
use pkgidx_utils::error::FileSystemError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(pkgidx_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(
        code(pkgidx_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(pkgidx_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error(transparent)]
    #[diagnostic(code(pkgidx_dl::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(pkgidx_dl::filesystem))]
    FileSystem(#[from] FileSystemError),
}

impl DownloadError {
    /// Maps a request failure, turning ureq's status errors into
    /// [`DownloadError::HttpError`] for `url`.
    pub fn from_request(err: ureq::Error, url: &str) -> Self {
        match err {
            ureq::Error::StatusCode(status) => {
                DownloadError::HttpError {
                    status,
                    url: url.to_string(),
                }
            }
            other => DownloadError::Network(Box::new(other)),
        }
    }
}

impl From<ureq::Error> for DownloadError {
    fn from(value: ureq::Error) -> Self {
        Self::Network(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_becomes_http_error() {
        let err = DownloadError::from_request(ureq::Error::StatusCode(404), "http://x/Packages");
        assert!(matches!(
            err,
            DownloadError::HttpError {
                status: 404,
                ..
            }
        ));
        assert_eq!(err.to_string(), "HTTP 404: http://x/Packages");
    }

    #[test]
    fn test_other_errors_are_network() {
        let err = DownloadError::from_request(ureq::Error::ConnectionFailed, "http://x");
        assert!(matches!(err, DownloadError::Network(_)));
    }
}
