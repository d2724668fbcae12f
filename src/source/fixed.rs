use crate::error::SourceError;
use crate::source::{Coordinate, VersionSource};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Version listings held in memory.
///
/// Loadable from a JSON object mapping `"group:artifact"` to a list of versions,
/// which makes offline checks and tests possible.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    versions: BTreeMap<String, Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions<I, S>(mut self, coordinate: &Coordinate, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions.insert(
            coordinate.to_string(),
            versions.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let versions: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self { versions })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading static version listing");
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[async_trait]
impl VersionSource for StaticSource {
    async fn available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>, SourceError> {
        Ok(self
            .versions
            .get(&coordinate.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_coordinate_has_no_versions() {
        let source = StaticSource::new();
        let coordinate = Coordinate::new("com.test", "missing");
        assert!(source.available_versions(&coordinate).await.unwrap().is_empty());
        assert_eq!(source.latest_version(&coordinate, true).await.unwrap(), None);
    }

    #[tokio::test]
    async fn json_listing_resolves_latest() {
        let source = StaticSource::from_json(
            r#"{ "com.squareup.okhttp3:okhttp": ["4.11.0", "4.12.0", "5.0.0-alpha.14"] }"#,
        )
        .unwrap();
        let coordinate = Coordinate::new("com.squareup.okhttp3", "okhttp");

        assert_eq!(
            source.latest_version(&coordinate, true).await.unwrap().as_deref(),
            Some("4.12.0")
        );
        assert_eq!(
            source.latest_version(&coordinate, false).await.unwrap().as_deref(),
            Some("5.0.0-alpha.14")
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            StaticSource::from_json("[1, 2]"),
            Err(SourceError::Json(_))
        ));
    }
}
