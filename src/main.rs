mod archive;
mod checksum;
mod cli;
mod download;
mod error;
mod github;
mod install;
mod platform;
mod registry;
mod template;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use console::style;

use checksum::Verification;
use cli::{Cli, Commands};
use github::{Client, Release};
use install::{default_install_dir, install_tool, InstallRequest, Installed};
use registry::{sorted_releases, Registry, ToolSpec};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let registry = Registry::builtin();

    match cli.command {
        Commands::Version => {
            println!("toolchest v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        Commands::Tools => {
            list_tools(&registry);
        }

        Commands::ListVersions {
            tool,
            with_published_at,
        } => {
            let spec = lookup(&registry, &tool)?;
            let client = Client::new()?;
            let releases = client
                .list_releases(spec.repo)
                .await
                .with_context(|| format!("failed to list versions for {}", spec.name))?;
            list_versions(spec, &sorted_releases(spec, releases), with_published_at);
        }

        Commands::ListLatestVersions => {
            let client = Client::new()?;
            list_latest_versions(&registry, &client).await;
        }

        Commands::Install { tool, version, dir } => {
            let spec = lookup(&registry, &tool)?;
            let client = Client::new()?;
            let dest = resolve_dir(dir)?;
            let request = InstallRequest::new(spec, &version, &dest);
            let installed = install_tool(&client, &request)
                .await
                .with_context(|| format!("failed to install {} {}", spec.name, request.version))?;
            report_install(spec, &installed);
        }

        Commands::InstallLatest { tool, dir } => {
            let spec = lookup(&registry, &tool)?;
            let client = Client::new()?;
            let releases = client
                .list_releases(spec.repo)
                .await
                .with_context(|| format!("failed to list versions for {}", spec.name))?;
            let latest = sorted_releases(spec, releases)
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("no installable releases for {}", spec.name))?;
            let version = spec.version_scheme.display_version(&latest.tag_name);
            let dest = resolve_dir(dir)?;
            let request = InstallRequest::new(spec, &version, &dest);
            let installed = install_tool(&client, &request)
                .await
                .with_context(|| format!("failed to install {} {}", spec.name, request.version))?;
            report_install(spec, &installed);
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}

fn lookup<'a>(registry: &'a Registry, name: &str) -> Result<&'a ToolSpec> {
    registry.get(name).ok_or_else(|| {
        anyhow!(
            "unknown tool `{}`; run `toolchest tools` to see the catalog",
            name
        )
    })
}

fn resolve_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(default_install_dir()?),
    }
}

fn list_tools(registry: &Registry) {
    for spec in registry.tools() {
        println!("{:<22} {}", spec.name, spec.repo);
    }
}

/// Print the ten most recent versions, oldest of those first, so the newest
/// ends up next to the prompt.
fn list_versions(spec: &ToolSpec, releases: &[Release], with_published_at: bool) {
    let shown: Vec<_> = releases.iter().take(10).collect();
    for release in shown.iter().rev() {
        let version = spec.version_scheme.display_version(&release.tag_name);
        if with_published_at {
            let stamp = release
                .published_at
                .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                .unwrap_or_default();
            println!("{} #{}", version, stamp);
        } else {
            println!("{}", version);
        }
    }
}

async fn list_latest_versions(registry: &Registry, client: &Client) {
    for spec in registry.tools() {
        match client.list_releases(spec.repo).await {
            Ok(releases) => {
                let releases = sorted_releases(spec, releases);
                match releases.first() {
                    Some(latest) => println!(
                        "{:<22} {}",
                        spec.name,
                        spec.version_scheme.display_version(&latest.tag_name)
                    ),
                    None => println!("{:<22} {}", spec.name, style("no releases").dim()),
                }
            }
            Err(e) => {
                tracing::warn!("failed to fetch releases for {}: {}", spec.name, e);
                println!("{:<22} {}", spec.name, style("error").red());
            }
        }
    }
}

fn report_install(spec: &ToolSpec, installed: &Installed) {
    let note = match installed.verification {
        Verification::Verified => style("verified").green().to_string(),
        Verification::Unverified => style("unverified").yellow().to_string(),
    };
    println!(
        "{} {} {} -> {} ({})",
        style("Installed").green().bold(),
        spec.name,
        installed.version,
        installed.bin_path.display(),
        note
    );
}
