use std::cmp::Ordering;
use std::collections::BTreeMap;

use semver::Version;

use crate::github::Release;
use crate::platform::{Arch, Platform};
use crate::template::RenderContext;

/// How a tool's release tags relate to the versions users type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionScheme {
    /// Tag and version are the same string.
    Verbatim,
    /// Tags carry a leading `v` that users omit.
    VPrefix,
    /// Date-style tags (`2024-01-15`) shown with dots (`2024.01.15`).
    DashDelimited,
    /// Tags carry a fixed prefix, e.g. `rust-v0.21.0`.
    Prefixed(&'static str),
}

impl VersionScheme {
    /// The version shown to users for a release tag.
    pub fn display_version(&self, tag: &str) -> String {
        match self {
            VersionScheme::Verbatim => tag.to_string(),
            VersionScheme::VPrefix => tag.strip_prefix('v').unwrap_or(tag).to_string(),
            VersionScheme::DashDelimited => tag.replace('-', "."),
            VersionScheme::Prefixed(prefix) => tag.strip_prefix(prefix).unwrap_or(tag).to_string(),
        }
    }

    /// The release tag for a version as a user typed it. Accepts versions
    /// already in tag form so `install --version v1.2.3` works too.
    pub fn release_tag(&self, version: &str) -> String {
        match self {
            VersionScheme::Verbatim => version.to_string(),
            VersionScheme::VPrefix => {
                let starts_numeric = version.chars().next().is_some_and(|c| c.is_ascii_digit());
                if !version.starts_with('v') && starts_numeric {
                    format!("v{}", version)
                } else {
                    version.to_string()
                }
            }
            VersionScheme::DashDelimited => version.replace('.', "-"),
            VersionScheme::Prefixed(prefix) => {
                if version.starts_with(prefix) {
                    version.to_string()
                } else {
                    format!("{}{}", prefix, version.trim_start_matches('v'))
                }
            }
        }
    }
}

/// Which releases of a repository belong to a tool at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseRule {
    All,
    StableOnly,
    /// Only tags that start with a digit; skips `release-*` style tags some
    /// repositories mix into the same release feed.
    NumericTag,
    /// Only stable tags carrying a fixed prefix; feeds that mix several
    /// products into one repository tag the relevant one this way.
    TagPrefix(&'static str),
}

impl ReleaseRule {
    pub fn admits(&self, tag: &str, prerelease: bool) -> bool {
        match self {
            ReleaseRule::All => true,
            ReleaseRule::StableOnly => !prerelease,
            ReleaseRule::NumericTag => tag.chars().next().is_some_and(|c| c.is_ascii_digit()),
            ReleaseRule::TagPrefix(prefix) => tag.starts_with(prefix) && !prerelease,
        }
    }
}

/// Everything needed to install one tool, as plain data. Platform and
/// architecture spellings vary per upstream, so each tool carries alias
/// tables; an empty table means the default spelling is used.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    /// The command the installed binary is exposed as.
    pub cmd: &'static str,
    /// GitHub `owner/repo`.
    pub repo: &'static str,
    pub asset_template: &'static str,
    /// Path of the binary inside the unpacked artifact.
    pub bin_path_template: &'static str,
    pub strip_components: usize,
    pub platform_names: &'static [(Platform, &'static str)],
    pub arch_names: &'static [(Arch, &'static str)],
    pub version_scheme: VersionScheme,
    pub release_rule: ReleaseRule,
}

impl ToolSpec {
    pub fn platform_alias(&self, platform: Platform) -> &'static str {
        self.platform_names
            .iter()
            .find(|(p, _)| *p == platform)
            .map(|(_, name)| *name)
            .unwrap_or(platform.as_str())
    }

    pub fn arch_alias(&self, arch: Arch) -> &'static str {
        self.arch_names
            .iter()
            .find(|(a, _)| *a == arch)
            .map(|(_, name)| *name)
            .unwrap_or(arch.as_str())
    }

    pub fn render_context(&self, version: &str, platform: Platform, arch: Arch) -> RenderContext {
        RenderContext {
            version: version.to_string(),
            platform: self.platform_alias(platform).to_string(),
            arch: self.arch_alias(arch).to_string(),
        }
    }
}

/// The built-in tool catalog, keyed by tool name.
pub struct Registry {
    tools: BTreeMap<&'static str, ToolSpec>,
}

impl Registry {
    pub fn builtin() -> Self {
        let mut tools = BTreeMap::new();
        for spec in builtin_specs() {
            tools.insert(spec.name, spec);
        }
        Registry { tools }
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    /// Tools in name order.
    pub fn tools(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Drop drafts and out-of-scope releases, then order newest first: semver
/// descending, releases without a parseable version after those with one,
/// publication date as the final tiebreak.
pub fn sorted_releases(spec: &ToolSpec, mut releases: Vec<Release>) -> Vec<Release> {
    releases.retain(|r| !r.draft && spec.release_rule.admits(&r.tag_name, r.prerelease));
    releases.sort_by(|a, b| compare_releases(spec, b, a));
    releases
}

fn compare_releases(spec: &ToolSpec, a: &Release, b: &Release) -> Ordering {
    match (parse_version(spec, &a.tag_name), parse_version(spec, &b.tag_name)) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.published_at.cmp(&b.published_at),
    }
}

fn parse_version(spec: &ToolSpec, tag: &str) -> Option<Version> {
    let display = spec.version_scheme.display_version(tag);
    Version::parse(display.trim_start_matches('v')).ok()
}

fn builtin_specs() -> Vec<ToolSpec> {
    use Arch::{Aarch64, X86_64};
    use Platform::{Darwin, Linux};

    vec![
        ToolSpec {
            name: "neovim",
            cmd: "nvim",
            repo: "neovim/neovim",
            asset_template: "nvim-{platform}-{arch}.tar.gz",
            bin_path_template: "bin/nvim",
            strip_components: 1,
            platform_names: &[(Darwin, "macos")],
            arch_names: &[(Aarch64, "arm64")],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "rust-analyzer",
            cmd: "rust-analyzer",
            repo: "rust-lang/rust-analyzer",
            asset_template: "rust-analyzer-{arch}-{platform}.gz",
            bin_path_template: "rust-analyzer",
            strip_components: 0,
            platform_names: &[(Darwin, "apple-darwin"), (Linux, "unknown-linux-gnu")],
            arch_names: &[],
            version_scheme: VersionScheme::DashDelimited,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "lazygit",
            cmd: "lazygit",
            repo: "jesseduffield/lazygit",
            asset_template: "lazygit_{version}_{platform}_{arch}.tar.gz",
            bin_path_template: "lazygit",
            strip_components: 0,
            platform_names: &[],
            arch_names: &[(Aarch64, "arm64")],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "fzf",
            cmd: "fzf",
            repo: "junegunn/fzf",
            asset_template: "fzf-{version}-{platform}_{arch}.tar.gz",
            bin_path_template: "fzf",
            strip_components: 0,
            platform_names: &[],
            arch_names: &[(X86_64, "amd64"), (Aarch64, "arm64")],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "fd",
            cmd: "fd",
            repo: "sharkdp/fd",
            asset_template: "fd-v{version}-{arch}-{platform}.tar.gz",
            bin_path_template: "fd",
            strip_components: 1,
            platform_names: &[(Darwin, "apple-darwin"), (Linux, "unknown-linux-gnu")],
            arch_names: &[],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "ripgrep",
            cmd: "rg",
            repo: "BurntSushi/ripgrep",
            asset_template: "ripgrep-{version}-{arch}-{platform}.tar.gz",
            bin_path_template: "rg",
            strip_components: 1,
            platform_names: &[(Darwin, "apple-darwin"), (Linux, "unknown-linux-musl")],
            arch_names: &[],
            version_scheme: VersionScheme::Verbatim,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "gh",
            cmd: "gh",
            repo: "cli/cli",
            asset_template: "gh_{version}_{platform}_{arch}.{platform=macOS?zip:tar.gz}",
            bin_path_template: "bin/gh",
            strip_components: 1,
            platform_names: &[(Darwin, "macOS")],
            arch_names: &[(X86_64, "amd64"), (Aarch64, "arm64")],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "shfmt",
            cmd: "shfmt",
            repo: "mvdan/sh",
            asset_template: "shfmt_v{version}_{platform}_{arch}",
            bin_path_template: "shfmt",
            strip_components: 0,
            platform_names: &[],
            arch_names: &[(X86_64, "amd64"), (Aarch64, "arm64")],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "gofumpt",
            cmd: "gofumpt",
            repo: "mvdan/gofumpt",
            asset_template: "gofumpt_v{version}_{platform}_{arch}",
            bin_path_template: "gofumpt",
            strip_components: 0,
            platform_names: &[],
            arch_names: &[(X86_64, "amd64"), (Aarch64, "arm64")],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "taplo",
            cmd: "taplo",
            repo: "tamasfe/taplo",
            asset_template: "taplo-{platform}-{arch}.gz",
            bin_path_template: "taplo",
            strip_components: 0,
            platform_names: &[],
            arch_names: &[],
            version_scheme: VersionScheme::Verbatim,
            release_rule: ReleaseRule::NumericTag,
        },
        ToolSpec {
            name: "stylua",
            cmd: "stylua",
            repo: "JohnnyMorganz/StyLua",
            asset_template: "stylua-{platform}-{arch}.zip",
            bin_path_template: "stylua",
            strip_components: 0,
            platform_names: &[(Darwin, "macos")],
            arch_names: &[],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "lua-language-server",
            cmd: "lua-language-server",
            repo: "LuaLS/lua-language-server",
            asset_template: "lua-language-server-{version}-{platform}-{arch}.tar.gz",
            bin_path_template: "bin/lua-language-server",
            strip_components: 0,
            platform_names: &[],
            arch_names: &[(X86_64, "x64"), (Aarch64, "arm64")],
            version_scheme: VersionScheme::Verbatim,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "starship",
            cmd: "starship",
            repo: "starship/starship",
            asset_template: "starship-{arch}-{platform}.tar.gz",
            bin_path_template: "starship",
            strip_components: 0,
            platform_names: &[(Darwin, "apple-darwin"), (Linux, "unknown-linux-gnu")],
            arch_names: &[],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "zoxide",
            cmd: "zoxide",
            repo: "ajeetdsouza/zoxide",
            asset_template: "zoxide-{version}-{arch}-{platform}.tar.gz",
            bin_path_template: "zoxide",
            strip_components: 0,
            platform_names: &[(Darwin, "apple-darwin"), (Linux, "unknown-linux-musl")],
            arch_names: &[],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "uv",
            cmd: "uv",
            repo: "astral-sh/uv",
            asset_template: "uv-{arch}-{platform}.tar.gz",
            bin_path_template: "uv",
            strip_components: 1,
            platform_names: &[(Darwin, "apple-darwin"), (Linux, "unknown-linux-gnu")],
            arch_names: &[],
            version_scheme: VersionScheme::Verbatim,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "tree-sitter",
            cmd: "tree-sitter",
            repo: "tree-sitter/tree-sitter",
            asset_template: "tree-sitter-{platform}-{arch}.gz",
            bin_path_template: "tree-sitter",
            strip_components: 0,
            platform_names: &[(Darwin, "macos")],
            arch_names: &[(X86_64, "x64"), (Aarch64, "arm64")],
            version_scheme: VersionScheme::VPrefix,
            release_rule: ReleaseRule::All,
        },
        ToolSpec {
            name: "ty",
            cmd: "ty",
            repo: "astral-sh/ty",
            asset_template: "ty-{arch}-{platform}.tar.gz",
            bin_path_template: "ty",
            strip_components: 1,
            platform_names: &[(Darwin, "apple-darwin"), (Linux, "unknown-linux-gnu")],
            arch_names: &[],
            version_scheme: VersionScheme::Verbatim,
            release_rule: ReleaseRule::StableOnly,
        },
        ToolSpec {
            name: "codex",
            cmd: "codex",
            repo: "openai/codex",
            asset_template: "codex-{arch}-{platform}.tar.gz",
            bin_path_template: "codex-{arch}-{platform}",
            strip_components: 0,
            platform_names: &[(Darwin, "apple-darwin"), (Linux, "unknown-linux-musl")],
            arch_names: &[],
            version_scheme: VersionScheme::Prefixed("rust-v"),
            release_rule: ReleaseRule::TagPrefix("rust-v"),
        },
    ]
}
