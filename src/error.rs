use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the install pipeline and its parts.
///
/// Every step of an install maps onto one of these; the binary adds
/// tool/version/step context on top with `anyhow` before reporting.
#[derive(Error, Debug)]
pub enum InstallError {
    // Bad configuration, caught before any network or filesystem activity
    #[error("template error: {0}")]
    Template(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("release tag `{tag}` not found in {repo}")]
    TagNotFound { repo: String, tag: String },

    #[error("no releases found for {0}")]
    NoReleases(String),

    #[error("GitHub API request for {repo} failed with status {status}")]
    ApiStatus {
        repo: String,
        status: reqwest::StatusCode,
    },

    #[error("asset `{asset}` not found in release {tag}")]
    AssetNotFound { asset: String, tag: String },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    // A single malicious entry invalidates the whole archive
    #[error("illegal file path in archive: {0}")]
    IllegalPath(String),

    #[error("unsupported archive format: {0}")]
    UnsupportedArchive(String),

    // Rendered relative path missing after extraction; usually an upstream
    // layout change or a misconfigured strip count
    #[error("binary not found at {} after extraction", .0.display())]
    BinaryNotFound(PathBuf),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, InstallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = InstallError::NoReleases("acme/widget".to_string());
        assert_eq!(err.to_string(), "no releases found for acme/widget");

        let err = InstallError::TagNotFound {
            repo: "acme/widget".to_string(),
            tag: "v9.9.9".to_string(),
        };
        assert_eq!(err.to_string(), "release tag `v9.9.9` not found in acme/widget");

        let err = InstallError::BinaryNotFound(PathBuf::from("/tmp/scratch/widget"));
        assert_eq!(
            err.to_string(),
            "binary not found at /tmp/scratch/widget after extraction"
        );
    }
}
