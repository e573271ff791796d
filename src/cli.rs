use std::path::PathBuf;

use clap::{Parser, Subcommand};

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // If there's a git tag at HEAD, use just the tag (release build)
    if let Some(tag) = option_env!("TOOLCHEST_GIT_TAG") {
        return tag;
    }

    // Not on a tag - include commit hash and branch (dev build)
    let commit = option_env!("TOOLCHEST_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("TOOLCHEST_GIT_BRANCH").unwrap_or("unknown");

    // Return a static string by leaking the formatted string
    // This is safe because it only happens once at startup
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Debug, Parser)]
#[command(name = "toolchest")]
#[command(about = "A CLI manager for single-binary developer tools from GitHub releases")]
#[command(version = get_version(), propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a specific version of a tool
    // `--version` here is the tool version, so the propagated binary
    // version flag must stay out of this subcommand.
    #[command(
        disable_version_flag = true,
        after_help = "Examples:\n  toolchest install --tool ripgrep --version 14.1.0\n  toolchest install --tool neovim --version v0.10.0 --dir ~/.local"
    )]
    Install {
        /// Tool name from the catalog (see 'toolchest tools')
        #[arg(long)]
        tool: String,
        /// Version to install, with or without the tag prefix
        #[arg(long)]
        version: String,
        /// Installation directory (defaults to the user data directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Install the newest release of a tool
    InstallLatest {
        /// Tool name from the catalog (see 'toolchest tools')
        #[arg(long)]
        tool: String,
        /// Installation directory (defaults to the user data directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List recent versions of a tool, newest first
    ListVersions {
        /// Tool name from the catalog (see 'toolchest tools')
        #[arg(long)]
        tool: String,
        /// Append the publication timestamp to each line
        #[arg(long)]
        with_published_at: bool,
    },

    /// Show the newest version of every tool in the catalog
    ListLatestVersions,

    /// List the tools this manager knows how to install
    Tools,

    /// Show the current version
    Version,
}
