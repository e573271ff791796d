use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{InstallError, Result};

/// Archive container inferred from the asset filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Gzip,
    Zip,
    Raw,
}

/// Suffixes we recognize but do not extract. Listed explicitly so they fail
/// loudly instead of being copied byte-for-byte as a "raw" binary.
const UNSUPPORTED_SUFFIXES: &[&str] = &[
    ".tar.xz", ".txz", ".tar.bz2", ".tbz2", ".tar", ".xz", ".bz2", ".7z",
];

impl ArchiveFormat {
    /// Classify an asset by filename suffix. `.tar.gz` is checked before
    /// `.gz` so a compressed tarball is never treated as a bare gzip stream.
    /// Unknown suffixes fall through to `Raw`: plenty of upstreams publish
    /// plain uncompressed binaries.
    pub fn from_name(name: &str) -> Result<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            return Ok(ArchiveFormat::TarGz);
        }
        if name.ends_with(".gz") {
            return Ok(ArchiveFormat::Gzip);
        }
        if name.ends_with(".zip") {
            return Ok(ArchiveFormat::Zip);
        }
        if UNSUPPORTED_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            return Err(InstallError::UnsupportedArchive(name.to_string()));
        }
        Ok(ArchiveFormat::Raw)
    }
}

/// How an artifact is unpacked into a destination root.
#[derive(Debug, Clone)]
pub struct UnpackPlan<'a> {
    pub dest_root: &'a Path,
    /// Leading path components dropped from every entry name.
    pub strip_components: usize,
    /// Destination, relative to `dest_root`, for formats that carry a single
    /// file (`Gzip`, `Raw`). Ignored for formats with their own entry names.
    pub single_file: &'a Path,
}

/// Drop `n` leading components from a raw entry name.
///
/// The name is split on `/` before any normalization, exactly as recorded in
/// the archive. Empty and `.` segments are discarded from the remainder;
/// `..` segments are kept so [`sanitize_path`] can reject them. Returns
/// `None` when nothing is left, which callers treat as "skip this entry".
pub fn strip_components(name: &str, n: usize) -> Option<PathBuf> {
    let parts: Vec<&str> = name.split('/').collect();
    if parts.len() <= n {
        return None;
    }
    let mut out = PathBuf::new();
    for part in &parts[n..] {
        if part.is_empty() || *part == "." {
            continue;
        }
        out.push(part);
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Resolve an entry path against the destination root, refusing anything
/// that would escape it.
///
/// Resolution is purely lexical: `..` pops one level and is rejected the
/// moment it would climb past the root, so no part of a hostile archive ever
/// touches the filesystem. The result is the root itself or a descendant of
/// it, never anything outside.
pub fn sanitize_path(root: &Path, relative: &Path) -> Result<PathBuf> {
    let mut out = root.to_path_buf();
    let mut depth = 0usize;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(InstallError::IllegalPath(relative.display().to_string()));
                }
                out.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(InstallError::IllegalPath(relative.display().to_string()));
            }
        }
    }
    Ok(out)
}

/// Strip-then-sanitize an entry name. `Ok(None)` means the entry is skipped.
fn entry_destination(root: &Path, raw_name: &str, strip: usize) -> Result<Option<PathBuf>> {
    if raw_name.starts_with('/') {
        return Err(InstallError::IllegalPath(raw_name.to_string()));
    }
    match strip_components(raw_name, strip) {
        None => Ok(None),
        Some(relative) => sanitize_path(root, &relative).map(Some),
    }
}

/// Unpack a downloaded artifact according to its format. Entry names are
/// validated before anything is written, so a single hostile entry fails the
/// whole extraction with the destination untouched by that entry.
pub fn unpack(artifact: &Path, format: ArchiveFormat, plan: &UnpackPlan<'_>) -> Result<()> {
    match format {
        ArchiveFormat::TarGz => unpack_tar_gz(artifact, plan),
        ArchiveFormat::Zip => unpack_zip(artifact, plan),
        ArchiveFormat::Gzip => unpack_gzip(artifact, plan),
        ArchiveFormat::Raw => copy_raw(artifact, plan),
    }
}

fn unpack_tar_gz(artifact: &Path, plan: &UnpackPlan<'_>) -> Result<()> {
    let file = File::open(artifact)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let kind = entry.header().entry_type();
        if !kind.is_file() && !kind.is_dir() {
            debug!(entry = %name, ?kind, "skipping non-regular tar entry");
            continue;
        }
        let Some(target) = entry_destination(plan.dest_root, &name, plan.strip_components)?
        else {
            continue;
        };
        if kind.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        let mode = entry.header().mode().ok();
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        if let Some(mode) = mode {
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}

fn unpack_zip(artifact: &Path, plan: &UnpackPlan<'_>) -> Result<()> {
    let file = File::open(artifact)?;
    let mut archive = zip::ZipArchive::new(file)?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let Some(target) = entry_destination(plan.dest_root, &name, plan.strip_components)?
        else {
            continue;
        };
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut entry, &mut out)?;
        if let Some(mode) = entry.unix_mode() {
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}

fn unpack_gzip(artifact: &Path, plan: &UnpackPlan<'_>) -> Result<()> {
    let target = plan.dest_root.join(plan.single_file);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut decoder = GzDecoder::new(File::open(artifact)?);
    let mut out = File::create(&target)?;
    std::io::copy(&mut decoder, &mut out)?;
    Ok(())
}

fn copy_raw(artifact: &Path, plan: &UnpackPlan<'_>) -> Result<()> {
    let target = plan.dest_root.join(plan.single_file);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(artifact, &target)?;
    Ok(())
}
