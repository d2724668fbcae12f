use crate::catalog::version::VersionComparator;
use crate::error::SourceError;
use async_trait::async_trait;
use std::fmt;

pub mod fixed;
pub mod maven;

pub use fixed::StaticSource;
pub use maven::{MavenRepository, MavenSource};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
}

impl Coordinate {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Gradle publishes plugins under a marker artifact `<id>:<id>.gradle.plugin`.
    pub fn plugin(plugin_id: impl Into<String>) -> Self {
        let id = plugin_id.into();
        let artifact = format!("{id}.gradle.plugin");
        Self {
            group: id,
            artifact,
        }
    }

    pub fn is_plugin_marker(&self) -> bool {
        self.artifact.ends_with(".gradle.plugin")
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// Where newer versions of a dependency are looked up.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Every published version of `coordinate`; empty when it is unknown.
    async fn available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>, SourceError>;

    async fn latest_version(
        &self,
        coordinate: &Coordinate,
        stable_only: bool,
    ) -> Result<Option<String>, SourceError> {
        let versions = self.available_versions(coordinate).await?;
        Ok(VersionComparator::latest(&versions, stable_only))
    }
}
