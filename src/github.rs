//! GitHub releases API client.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::error::{InstallError, Result};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "toolchest";
const PER_PAGE: u32 = 100;

/// One release of a repository, as returned by the releases API. Fields we
/// do not use are simply not deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    /// Upstream-reported checksum, `sha256:<hex>` when present.
    #[serde(default)]
    pub digest: Option<String>,
}

impl Release {
    pub fn asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// Thin client over the releases endpoints. Sends a stable User-Agent (the
/// API rejects anonymous clients without one) and a bearer token when
/// `GITHUB_TOKEN` is set, which raises the rate limit considerably.
pub struct Client {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl Client {
    /// Build a client from the environment. `TOOLCHEST_API_BASE` overrides
    /// the endpoint so tests can point the client away from the real API.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let api_base = std::env::var("TOOLCHEST_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
        Ok(Client {
            http,
            api_base,
            token,
        })
    }

    /// The underlying HTTP client, for asset downloads.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }
        request
    }

    /// The most recent page of releases for a repository, newest first as
    /// the API returns them. Ordering for display and "latest" resolution
    /// is applied by the caller.
    pub async fn list_releases(&self, repo: &str) -> Result<Vec<Release>> {
        let url = releases_url(&self.api_base, repo);
        debug!(%url, "listing releases");
        let response = self.get(&url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(InstallError::NoReleases(repo.to_string())),
            status => Err(InstallError::ApiStatus {
                repo: repo.to_string(),
                status,
            }),
        }
    }

    /// A single release looked up by its tag.
    pub async fn release_by_tag(&self, repo: &str, tag: &str) -> Result<Release> {
        let url = release_by_tag_url(&self.api_base, repo, tag);
        debug!(%url, "fetching release");
        let response = self.get(&url).send().await?;
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(InstallError::TagNotFound {
                repo: repo.to_string(),
                tag: tag.to_string(),
            }),
            status => Err(InstallError::ApiStatus {
                repo: repo.to_string(),
                status,
            }),
        }
    }
}

fn releases_url(base: &str, repo: &str) -> String {
    format!("{}/repos/{}/releases?per_page={}", base, repo, PER_PAGE)
}

fn release_by_tag_url(base: &str, repo: &str, tag: &str) -> String {
    format!("{}/repos/{}/releases/tags/{}", base, repo, tag)
}
