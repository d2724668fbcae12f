use std::fmt;
use thiserror::Error;

/// Failures surfaced by an [`UpdateRunner`](crate::runner::UpdateRunner).
///
/// `F` is the failure record type of the update procedure in use.
#[derive(Error, Debug)]
pub enum UpdateError<F> {
    #[error("Update has not been planned yet")]
    NotPlanned,

    #[error("Update has not been run yet")]
    NotRun,

    #[error("Update aborted by user")]
    Aborted,

    #[error("Update plan failed: {0}")]
    PlanFailed(UpdateErrors<F>),

    #[error("Update run failed: {0}")]
    RunFailed(UpdateErrors<F>),

    #[error("Prompt failed: {0}")]
    Prompt(PromptError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl<F> UpdateError<F> {
    /// Failure records attached to a plan or run failure.
    pub fn errors(&self) -> Option<&UpdateErrors<F>> {
        match self {
            UpdateError::PlanFailed(errors) | UpdateError::RunFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Ordered, never-empty collection of failure records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateErrors<F> {
    records: Vec<F>,
}

#[allow(clippy::len_without_is_empty)]
impl<F> UpdateErrors<F> {
    pub fn new(first: F) -> Self {
        Self {
            records: vec![first],
        }
    }

    /// Returns `None` when `records` is empty.
    pub fn from_vec(records: Vec<F>) -> Option<Self> {
        if records.is_empty() {
            None
        } else {
            Some(Self { records })
        }
    }

    pub fn push(&mut self, record: F) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, F> {
        self.records.iter()
    }

    pub fn into_vec(self) -> Vec<F> {
        self.records
    }
}

impl<F> IntoIterator for UpdateErrors<F> {
    type Item = F;
    type IntoIter = std::vec::IntoIter<F>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, F> IntoIterator for &'a UpdateErrors<F> {
    type Item = &'a F;
    type IntoIter = std::slice::Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<F: fmt::Display> fmt::Display for UpdateErrors<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.records.as_slice() {
            return write!(f, "{only}");
        }

        write!(f, "{} errors", self.records.len())?;
        for record in &self.records {
            write!(f, "\n  - {record}")?;
        }
        Ok(())
    }
}

/// Failures raised by a confirmation [`Prompt`](crate::runner::Prompt).
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("User declined")]
    Declined,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised while reading or writing a version catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("TOML parsing failed: {0}")]
    TomlParsing(String),

    #[error("Invalid filter pattern: {0}")]
    Pattern(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised by a [`VersionSource`](crate::source::VersionSource).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid repository: {0}")]
    Repository(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Metadata parsing failed: {0}")]
    Metadata(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures raised while loading `uprun.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T, F> = std::result::Result<T, UpdateError<F>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_errors_rejects_empty_collection() {
        assert!(UpdateErrors::<String>::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn single_record_displays_inline() {
        let errors = UpdateErrors::new("catalog missing".to_string());
        let err: UpdateError<String> = UpdateError::PlanFailed(errors);
        assert_eq!(err.to_string(), "Update plan failed: catalog missing");
    }

    #[test]
    fn multiple_records_are_listed() {
        let errors = UpdateErrors::from_vec(vec!["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(errors.to_string(), "2 errors\n  - a\n  - b");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn errors_accessor_only_for_failures() {
        let err: UpdateError<String> = UpdateError::NotPlanned;
        assert!(err.errors().is_none());

        let err: UpdateError<String> = UpdateError::RunFailed(UpdateErrors::new("x".into()));
        assert_eq!(err.errors().map(|e| e.len()), Some(1));
    }
}
