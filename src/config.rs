use crate::error::ConfigError;
use crate::source::MavenRepository;
use crate::source::maven::GRADLE_PLUGIN_PORTAL;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE: &str = "uprun.toml";

/// Settings read from `uprun.toml`; command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Only consider stable releases (no alpha, beta, RC)
    pub stable_only: bool,
    /// Draw progress bars while applying updates
    pub show_progress: bool,
    /// Repositories searched for library versions, in order
    pub repositories: Vec<MavenRepository>,
    /// Maven repository holding Gradle plugin markers
    pub plugin_repository: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stable_only: true,
            show_progress: true,
            repositories: Vec::new(),
            plugin_repository: GRADLE_PLUGIN_PORTAL.to_string(),
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Loads `explicit` if given, else `uprun.toml` in the project when it
    /// exists, else defaults.
    pub fn resolve(project_path: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config");
            return Self::load(path);
        }

        let candidate = project_path.join(CONFIG_FILE);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "loading project config");
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn parses_repositories() {
        let config = Config::parse(
            r#"
stable_only = false

[[repositories]]
name = "Central"
url = "https://repo1.maven.org/maven2"

[[repositories]]
name = "Google"
url = "https://dl.google.com/dl/android/maven2"
group_filters = ["androidx.*"]
"#,
        )
        .unwrap();

        assert!(!config.stable_only);
        assert!(config.show_progress);
        assert_eq!(config.repositories.len(), 2);
        assert_eq!(config.repositories[1].group_filters, vec!["androidx.*"]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Config::parse("stable = true"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn resolve_prefers_project_file() {
        let dir = tempdir().unwrap();
        assert_eq!(
            Config::resolve(dir.path(), None).unwrap(),
            Config::default()
        );

        fs::write(dir.path().join(CONFIG_FILE), "show_progress = false").unwrap();
        assert!(!Config::resolve(dir.path(), None).unwrap().show_progress);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::resolve(dir.path(), Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
