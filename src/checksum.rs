use std::fs::File;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{InstallError, Result};

/// Outcome of the artifact verification step, surfaced to the user so an
/// unverified install is distinguishable from a verified one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Unverified,
}

/// A checksum advertised by the release metadata for an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDigest {
    hex: String,
}

impl ExpectedDigest {
    /// Parse a digest string of the form `sha256:<64 hex chars>`.
    ///
    /// Other algorithms and malformed values are treated as absent; the
    /// install then proceeds but reports itself as unverified.
    pub fn parse(raw: &str) -> Option<Self> {
        let hex = raw.strip_prefix("sha256:")?;
        if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self {
            hex: hex.to_ascii_lowercase(),
        })
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

/// Hex-encoded SHA-256 of a file, streamed rather than slurped.
pub fn sha256_hex(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare a downloaded file against its expected digest. A mismatch aborts
/// the install before anything is unpacked.
pub fn verify_file(path: &Path, expected: &ExpectedDigest) -> Result<()> {
    let actual = sha256_hex(path)?;
    if actual != expected.hex {
        return Err(InstallError::ChecksumMismatch {
            expected: expected.hex.clone(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn parses_sha256_digests() {
        let digest = ExpectedDigest::parse(&format!("sha256:{}", HELLO_SHA256)).unwrap();
        assert_eq!(digest.hex(), HELLO_SHA256);
    }

    #[test]
    fn normalizes_uppercase_hex() {
        let upper = HELLO_SHA256.to_ascii_uppercase();
        let digest = ExpectedDigest::parse(&format!("sha256:{}", upper)).unwrap();
        assert_eq!(digest.hex(), HELLO_SHA256);
    }

    #[test]
    fn rejects_other_algorithms_and_garbage() {
        assert!(ExpectedDigest::parse(&format!("md5:{}", HELLO_SHA256)).is_none());
        assert!(ExpectedDigest::parse("sha256:abcdef").is_none());
        assert!(ExpectedDigest::parse("sha256:zz4d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcdzz").is_none());
        assert!(ExpectedDigest::parse(HELLO_SHA256).is_none());
    }

    #[test]
    fn hashes_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"hello world").unwrap();
        assert_eq!(sha256_hex(&path).unwrap(), HELLO_SHA256);
    }

    #[test]
    fn verify_accepts_matching_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        std::fs::write(&path, b"hello world").unwrap();
        let digest = ExpectedDigest::parse(&format!("sha256:{}", HELLO_SHA256)).unwrap();
        verify_file(&path, &digest).unwrap();
    }

    #[test]
    fn verify_rejects_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        std::fs::write(&path, b"tampered").unwrap();
        let digest = ExpectedDigest::parse(&format!("sha256:{}", HELLO_SHA256)).unwrap();
        let err = verify_file(&path, &digest).unwrap_err();
        match err {
            InstallError::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, HELLO_SHA256);
                assert_ne!(actual, HELLO_SHA256);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
