use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

use crate::archive::{self, ArchiveFormat, UnpackPlan};
use crate::checksum::{self, ExpectedDigest, Verification};
use crate::download::download_file;
use crate::error::{InstallError, Result};
use crate::github::Client;
use crate::platform;
use crate::registry::ToolSpec;
use crate::template;

/// A resolved request to install one tool version into one directory.
///
/// `version` is the normalized display form and `tag` the release tag, so
/// both `install --version 1.2.3` and `install --version v1.2.3` resolve to
/// the same request.
pub struct InstallRequest<'a> {
    pub spec: &'a ToolSpec,
    pub tag: String,
    pub version: String,
    pub dest_root: PathBuf,
}

impl<'a> InstallRequest<'a> {
    pub fn new(spec: &'a ToolSpec, version: &str, dest_root: &Path) -> Self {
        let tag = spec.version_scheme.release_tag(version);
        let version = spec.version_scheme.display_version(&tag);
        InstallRequest {
            spec,
            tag,
            version,
            dest_root: dest_root.to_path_buf(),
        }
    }
}

/// What an install produced.
#[derive(Debug)]
pub struct Installed {
    pub bin_path: PathBuf,
    pub version: String,
    pub verification: Verification,
}

/// Installation root used when `--dir` is not given.
pub fn default_install_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|dir| dir.join("toolchest"))
        .ok_or_else(|| {
            InstallError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no local data directory for this user",
            ))
        })
}

/// Download and install one release of a tool.
///
/// Both templates are rendered and the archive format resolved before any
/// network traffic, so a broken catalog entry fails in microseconds instead
/// of after a download.
pub async fn install_tool(client: &Client, request: &InstallRequest<'_>) -> Result<Installed> {
    let spec = request.spec;
    let (host_platform, host_arch) = platform::host()?;
    let ctx = spec.render_context(&request.version, host_platform, host_arch);
    let asset_name = template::render(spec.asset_template, &ctx)?;
    let bin_relative = PathBuf::from(template::render(spec.bin_path_template, &ctx)?);
    let format = ArchiveFormat::from_name(&asset_name)?;

    info!(
        tool = spec.name,
        version = %request.version,
        asset = %asset_name,
        "installing"
    );

    let release = client.release_by_tag(spec.repo, &request.tag).await?;
    let asset = release
        .asset(&asset_name)
        .ok_or_else(|| InstallError::AssetNotFound {
            asset: asset_name.clone(),
            tag: release.tag_name.clone(),
        })?;

    let workdir = TempDir::new()?;
    let artifact = workdir.path().join(&asset_name);
    download_file(client.http(), &asset.browser_download_url, &artifact).await?;

    let digest = asset.digest.as_deref().and_then(ExpectedDigest::parse);
    install_artifact(request, &artifact, format, digest.as_ref(), &bin_relative)
}

/// The filesystem half of an install: verify, unpack into a scratch
/// directory, locate the binary, move it to `<dest>/bin/<cmd>` and mark it
/// executable. Everything except that one binary stays in the scratch
/// directory, which is removed on success and failure alike, so a failed
/// install never leaves partial output at the destination. Split from
/// [`install_tool`] so it can run against a local artifact.
pub fn install_artifact(
    request: &InstallRequest<'_>,
    artifact: &Path,
    format: ArchiveFormat,
    digest: Option<&ExpectedDigest>,
    bin_relative: &Path,
) -> Result<Installed> {
    let verification = match digest {
        Some(expected) => {
            checksum::verify_file(artifact, expected)?;
            Verification::Verified
        }
        None => {
            warn!(
                artifact = %artifact.display(),
                "release metadata carries no usable sha256 digest, skipping verification"
            );
            Verification::Unverified
        }
    };

    let scratch = TempDir::new()?;
    let plan = UnpackPlan {
        dest_root: scratch.path(),
        strip_components: request.spec.strip_components,
        single_file: bin_relative,
    };
    archive::unpack(artifact, format, &plan)?;

    let extracted = scratch.path().join(bin_relative);
    if !extracted.is_file() {
        return Err(InstallError::BinaryNotFound(extracted));
    }

    let bin_dir = request.dest_root.join("bin");
    fs::create_dir_all(&bin_dir)?;
    let bin_path = bin_dir.join(request.spec.cmd);
    relocate(&extracted, &bin_path)?;

    let mut perms = fs::metadata(&bin_path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&bin_path, perms)?;

    info!(bin = %bin_path.display(), "installed");
    Ok(Installed {
        bin_path,
        version: request.version.clone(),
        verification,
    })
}

/// Rename, falling back to copy for filesystems where the two paths are on
/// different devices. The copy is staged next to the target so the final
/// step is still a same-directory rename and a crash never leaves a
/// truncated binary in place.
fn relocate(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    let staged = to.with_extension("partial");
    fs::copy(from, &staged)?;
    fs::rename(&staged, to)?;
    fs::remove_file(from)?;
    Ok(())
}
