use crate::error::SourceError;
use crate::source::{Coordinate, VersionSource};
use async_trait::async_trait;
use quick_xml::de::from_str;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
pub const GOOGLE_MAVEN: &str = "https://dl.google.com/dl/android/maven2";
pub const GRADLE_PLUGIN_PORTAL: &str = "https://plugins.gradle.org/m2";
const MAX_METADATA_BYTES: usize = 10 * 1024 * 1024;

/// A Maven repository to query, optionally restricted to matching groups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MavenRepository {
    pub name: String,
    pub url: String,
    /// Regex patterns a group must match for this repository to be queried
    #[serde(default)]
    pub group_filters: Vec<String>,
}

impl MavenRepository {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            group_filters: Vec::new(),
        }
    }

    pub fn with_group_filters(mut self, filters: &[&str]) -> Self {
        self.group_filters = filters.iter().map(|f| f.to_string()).collect();
        self
    }

    fn accepts(&self, group: &str) -> bool {
        self.group_filters.is_empty()
            || self
                .group_filters
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .any(|re| re.is_match(group))
    }

    pub fn defaults() -> Vec<MavenRepository> {
        vec![
            MavenRepository::new("Maven Central", MAVEN_CENTRAL),
            MavenRepository::new("Google Maven", GOOGLE_MAVEN).with_group_filters(&[
                ".*google.*",
                ".*android.*",
                ".*androidx.*",
            ]),
        ]
    }
}

/// Looks up versions in `maven-metadata.xml` files.
///
/// Library coordinates are tried against each repository in order and the
/// first repository listing any version wins. Plugin marker coordinates are
/// looked up in the plugin repository.
pub struct MavenSource {
    client: Client,
    repositories: Vec<MavenRepository>,
    plugin_repository: MavenRepository,
}

impl MavenSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_repositories(Vec::new())
    }

    pub fn with_repositories(repositories: Vec<MavenRepository>) -> Result<Self, SourceError> {
        let repositories = if repositories.is_empty() {
            MavenRepository::defaults()
        } else {
            repositories
        };

        for repo in &repositories {
            validate_repository_url(&repo.url)?;
        }

        Ok(Self {
            client: build_client()?,
            repositories,
            plugin_repository: MavenRepository::new("Gradle Plugin Portal", GRADLE_PLUGIN_PORTAL),
        })
    }

    pub fn plugin_repository(mut self, url: impl Into<String>) -> Result<Self, SourceError> {
        let url = url.into();
        validate_repository_url(&url)?;
        self.plugin_repository = MavenRepository::new("Plugin repository", url);
        Ok(self)
    }

    pub fn repositories(&self) -> &[MavenRepository] {
        &self.repositories
    }

    async fn fetch_versions(
        &self,
        repo: &MavenRepository,
        coordinate: &Coordinate,
    ) -> Result<Option<Vec<String>>, SourceError> {
        let metadata_url = metadata_url(&repo.url, coordinate);
        debug!(repository = %repo.name, url = %metadata_url, "fetching metadata");

        let response = self.client.get(&metadata_url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            debug!(%status, url = %metadata_url, "metadata not available");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                url: metadata_url,
                status: status.as_u16(),
            });
        }

        if response
            .content_length()
            .is_some_and(|len| len as usize > MAX_METADATA_BYTES)
        {
            return Err(SourceError::Metadata(
                "Maven metadata response exceeded 10MB limit".to_string(),
            ));
        }

        let text = response.text().await?;
        if text.len() > MAX_METADATA_BYTES {
            return Err(SourceError::Metadata(
                "Maven metadata response exceeded 10MB limit".to_string(),
            ));
        }

        parse_metadata(&text).map(Some)
    }
}

#[async_trait]
impl VersionSource for MavenSource {
    async fn available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>, SourceError> {
        if coordinate.is_plugin_marker() {
            return Ok(self
                .fetch_versions(&self.plugin_repository, coordinate)
                .await?
                .unwrap_or_default());
        }

        // a repository that errors only matters when no other one lists the artifact
        let mut last_error = None;
        for repo in self
            .repositories
            .iter()
            .filter(|repo| repo.accepts(&coordinate.group))
        {
            match self.fetch_versions(repo, coordinate).await {
                Ok(Some(versions)) if !versions.is_empty() => return Ok(versions),
                Ok(_) => continue,
                Err(e) => {
                    warn!(repository = %repo.name, %coordinate, error = %e, "repository lookup failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}

fn build_client() -> Result<Client, SourceError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("uprun/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

fn metadata_url(repo_url: &str, coordinate: &Coordinate) -> String {
    format!(
        "{}/{}/{}/maven-metadata.xml",
        repo_url.trim_end_matches('/'),
        coordinate.group.replace('.', "/"),
        coordinate.artifact
    )
}

fn parse_metadata(xml: &str) -> Result<Vec<String>, SourceError> {
    let metadata: MavenMetadata = from_str(xml)
        .map_err(|e| SourceError::Metadata(format!("Failed to parse Maven metadata: {}", e)))?;
    Ok(metadata.versioning.versions.version)
}

pub fn validate_repository_url(url: &str) -> Result<(), SourceError> {
    let parsed =
        Url::parse(url).map_err(|_| SourceError::Repository(format!("Invalid URL: {url}")))?;

    match parsed.scheme() {
        "https" | "http" => {}
        scheme => {
            return Err(SourceError::Repository(format!(
                "Unsupported scheme: {scheme}"
            )));
        }
    }

    if let Some(host) = parsed.host_str() {
        if is_private_host(host) {
            return Err(SourceError::Repository(format!(
                "Host '{host}' is not allowed"
            )));
        }
    }

    Ok(())
}

fn is_private_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    // IPv6 hosts come back bracketed from `Url::host_str`
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private() || v4.is_loopback(),
        Ok(IpAddr::V6(v6)) => v6.is_loopback() || v6.is_unique_local(),
        Err(_) => false,
    }
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    versioning: Versioning,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    #[serde(default)]
    versions: Versions,
}

#[derive(Debug, Default, Deserialize)]
struct Versions {
    #[serde(default)]
    version: Vec<String>,
}
