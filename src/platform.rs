use crate::error::{InstallError, Result};

/// Operating systems toolchest installs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    Darwin,
}

impl Platform {
    /// Default alias used in templates when a tool supplies no mapping.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
        }
    }
}

/// CPU architectures toolchest installs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    /// Default alias used in templates when a tool supplies no mapping.
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
        }
    }
}

/// Detect the running platform and architecture.
///
/// Anything outside the supported set fails before any network activity.
pub fn host() -> Result<(Platform, Arch)> {
    let platform = match std::env::consts::OS {
        "linux" => Platform::Linux,
        "macos" => Platform::Darwin,
        other => {
            return Err(InstallError::UnsupportedPlatform(format!(
                "operating system `{}`",
                other
            )))
        }
    };

    let arch = match std::env::consts::ARCH {
        "x86_64" => Arch::X86_64,
        "aarch64" => Arch::Aarch64,
        other => {
            return Err(InstallError::UnsupportedPlatform(format!(
                "architecture `{}`",
                other
            )))
        }
    };

    Ok((platform, arch))
}
