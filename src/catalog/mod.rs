// Catalog module - plan-then-run updates of a Gradle version catalog
//
// - CatalogManager: locates, loads and saves gradle/libs.versions.toml
// - CatalogUpdate: the UpdateProcedure checking entries against a VersionSource
// - CatalogTodo / UpdateReport: what is pending, what was applied
pub mod entry;
pub mod filter;
pub mod version;

pub use entry::{CatalogEntry, LibraryDetails};
pub use filter::PatternMatcher;
pub use version::{Version, VersionComparator};

use crate::error::{CatalogError, UpdateError, UpdateErrors};
use crate::runner::{RunContext, UpdateProcedure};
use crate::source::{Coordinate, VersionSource};
use async_trait::async_trait;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toml_edit::{DocumentMut, Item};
use tracing::debug;

pub const CATALOG_PATH: &str = "gradle/libs.versions.toml";

/// Catalog tables that hold updatable versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Versions,
    Libraries,
    Plugins,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Versions, Section::Libraries, Section::Plugins];

    /// Table name inside the catalog.
    pub fn key(self) -> &'static str {
        match self {
            Section::Versions => "versions",
            Section::Libraries => "libraries",
            Section::Plugins => "plugins",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Section::Versions => "Version updates",
            Section::Libraries => "Library updates",
            Section::Plugins => "Plugin updates",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Locates and persists the version catalog of one project.
#[derive(Debug, Clone)]
pub struct CatalogManager {
    catalog_path: PathBuf,
}

impl CatalogManager {
    /// Finds `gradle/libs.versions.toml` under `project_path`.
    pub fn discover<P: AsRef<Path>>(project_path: P) -> Result<Self, CatalogError> {
        let project_path = project_path.as_ref();
        if !project_path.is_dir() {
            return Err(CatalogError::ProjectValidation(format!(
                "Path '{}' is not a directory",
                project_path.display()
            )));
        }

        let catalog_path = project_path.join(CATALOG_PATH);
        if !catalog_path.is_file() {
            return Err(CatalogError::ProjectValidation(format!(
                "{CATALOG_PATH} not found"
            )));
        }

        Ok(Self::at(catalog_path))
    }

    pub fn at(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
        }
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn load(&self) -> Result<DocumentMut, CatalogError> {
        let content = fs::read_to_string(&self.catalog_path)
            .map_err(|e| CatalogError::TomlParsing(format!("Failed to read catalog: {}", e)))?;

        content
            .parse::<DocumentMut>()
            .map_err(|e| CatalogError::TomlParsing(format!("Failed to parse TOML: {}", e)))
    }

    pub fn save(&self, doc: &DocumentMut) -> Result<(), CatalogError> {
        debug!(path = %self.catalog_path.display(), "writing catalog");
        fs::write(&self.catalog_path, doc.to_string())
            .map_err(|e| CatalogError::TomlParsing(format!("Failed to write catalog: {}", e)))
    }
}

/// One entry that can move to a newer version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub section: Section,
    pub name: String,
    pub coordinate: Coordinate,
    pub current: String,
    pub latest: String,
}

/// Everything a catalog plan would change, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTodo {
    updates: Vec<PendingUpdate>,
}

impl CatalogTodo {
    pub fn new(updates: Vec<PendingUpdate>) -> Self {
        Self { updates }
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PendingUpdate> {
        self.updates.iter()
    }

    pub fn in_section(&self, section: Section) -> impl Iterator<Item = &PendingUpdate> {
        self.updates.iter().filter(move |u| u.section == section)
    }
}

/// Tracks the changes made during an update run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Version updates from [versions] section
    pub version_updates: BTreeMap<String, (String, String)>,
    /// Library updates from [libraries] section
    pub library_updates: BTreeMap<String, (String, String)>,
    /// Plugin updates from [plugins] section
    pub plugin_updates: BTreeMap<String, (String, String)>,
}

impl UpdateReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, update: &PendingUpdate) {
        let entry = (update.current.clone(), update.latest.clone());
        self.section_mut(update.section)
            .insert(update.name.clone(), entry);
    }

    pub fn section(&self, section: Section) -> &BTreeMap<String, (String, String)> {
        match section {
            Section::Versions => &self.version_updates,
            Section::Libraries => &self.library_updates,
            Section::Plugins => &self.plugin_updates,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut BTreeMap<String, (String, String)> {
        match section {
            Section::Versions => &mut self.version_updates,
            Section::Libraries => &mut self.library_updates,
            Section::Plugins => &mut self.plugin_updates,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.version_updates.is_empty()
            && self.library_updates.is_empty()
            && self.plugin_updates.is_empty()
    }

    pub fn total_updates(&self) -> usize {
        self.version_updates.len() + self.library_updates.len() + self.plugin_updates.len()
    }
}

/// A single failure while planning or applying a catalog update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFailure {
    /// Catalog entry concerned, if the failure is not catalog-wide
    pub entry: Option<String>,
    pub message: String,
}

impl CatalogFailure {
    pub fn entry(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entry: Some(name.into()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            entry: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for CatalogFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "{}: {}", entry, self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn plan_failure(err: CatalogError) -> UpdateError<CatalogFailure> {
    UpdateError::PlanFailed(UpdateErrors::new(CatalogFailure::general(err.to_string())))
}

fn run_failure(err: CatalogError) -> UpdateError<CatalogFailure> {
    UpdateError::RunFailed(UpdateErrors::new(CatalogFailure::general(err.to_string())))
}

#[derive(Debug)]
struct Candidate {
    section: Section,
    name: String,
    coordinate: Coordinate,
    current: String,
}

/// Plans and applies version bumps for one catalog.
pub struct CatalogUpdate {
    manager: CatalogManager,
    source: Arc<dyn VersionSource>,
    stable_only: bool,
    filter: Option<PatternMatcher>,
}

impl CatalogUpdate {
    pub fn new(manager: CatalogManager, source: Arc<dyn VersionSource>) -> Self {
        Self {
            manager,
            source,
            stable_only: true,
            filter: None,
        }
    }

    pub fn stable_only(mut self, stable_only: bool) -> Self {
        self.stable_only = stable_only;
        self
    }

    pub fn filter(mut self, filter: Option<PatternMatcher>) -> Self {
        self.filter = filter;
        self
    }

    pub fn manager(&self) -> &CatalogManager {
        &self.manager
    }

    fn collect_candidates(&self, doc: &DocumentMut) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let libraries = doc.get("libraries").and_then(|v| v.as_table());
        let plugins = doc.get("plugins").and_then(|v| v.as_table());

        if let Some(versions) = doc.get("versions").and_then(|v| v.as_table()) {
            for (key, value) in versions.iter() {
                let Some(current) = value.as_str() else {
                    continue;
                };

                // The first entry referencing the key stands in for all of them
                let representative = libraries
                    .into_iter()
                    .flat_map(|t| t.iter())
                    .find(|(_, lib)| CatalogEntry::uses_version_ref(lib, key))
                    .and_then(|(_, lib)| CatalogEntry::group_artifact(lib))
                    .map(|(group, artifact)| Coordinate::new(group, artifact))
                    .or_else(|| {
                        plugins
                            .into_iter()
                            .flat_map(|t| t.iter())
                            .find(|(_, plugin)| CatalogEntry::uses_version_ref(plugin, key))
                            .and_then(|(_, plugin)| CatalogEntry::plugin_details(plugin))
                            .map(|(id, _)| Coordinate::plugin(id))
                    });

                match representative {
                    Some(coordinate) => candidates.push(Candidate {
                        section: Section::Versions,
                        name: key.to_string(),
                        coordinate,
                        current: current.to_string(),
                    }),
                    None => debug!(version = key, "no entry references version, skipping"),
                }
            }
        }

        for (name, item) in libraries.into_iter().flat_map(|t| t.iter()) {
            let Some(details) = CatalogEntry::library_details(item) else {
                continue;
            };
            // entries on a version.ref move with their [versions] key
            if let Some(current) = details.version {
                candidates.push(Candidate {
                    section: Section::Libraries,
                    name: name.to_string(),
                    coordinate: Coordinate::new(details.group, details.artifact),
                    current,
                });
            }
        }

        for (name, item) in plugins.into_iter().flat_map(|t| t.iter()) {
            if let Some((id, Some(current))) = CatalogEntry::plugin_details(item) {
                candidates.push(Candidate {
                    section: Section::Plugins,
                    name: name.to_string(),
                    coordinate: Coordinate::plugin(id),
                    current,
                });
            }
        }

        match &self.filter {
            Some(filter) => candidates
                .into_iter()
                .filter(|c| {
                    let coordinate = c.coordinate.to_string();
                    filter.matches_any([c.name.as_str(), coordinate.as_str()])
                })
                .collect(),
            None => candidates,
        }
    }
}

#[async_trait(?Send)]
impl UpdateProcedure for CatalogUpdate {
    type Todo = CatalogTodo;
    type Outcome = UpdateReport;
    type Failure = CatalogFailure;

    fn preview(&self, todo: Option<&CatalogTodo>) -> String {
        let Some(todo) = todo else {
            return "No plan yet".dimmed().to_string();
        };

        if todo.is_empty() {
            return "✨ All dependencies are up to date!".green().bold().to_string();
        }

        let mut lines = vec![
            "📦 Available Updates:".cyan().bold().to_string(),
            format!("Found {} update(s)", todo.len()).yellow().to_string(),
        ];
        if !self.stable_only {
            lines.push(
                "   (showing all versions including pre-releases)"
                    .dimmed()
                    .to_string(),
            );
        }

        for section in Section::ALL {
            let mut pending = todo.in_section(section).peekable();
            if pending.peek().is_none() {
                continue;
            }
            lines.push(format!("\n{}:", section.title().cyan().bold()));
            for update in pending {
                lines.push(format!(
                    "  • {} {} → {}",
                    update.name.white().bold(),
                    update.current.red(),
                    update.latest.green().bold()
                ));
            }
        }

        lines.join("\n")
    }

    fn report(&self, outcome: Option<&UpdateReport>) -> String {
        let Some(report) = outcome else {
            return "No update has run yet".dimmed().to_string();
        };

        if report.is_empty() {
            return "No updates were applied".yellow().to_string();
        }

        let mut lines = vec![
            "Update Summary:".cyan().bold().to_string(),
            format!("Total updates: {}", report.total_updates())
                .green()
                .to_string(),
        ];
        for section in Section::ALL {
            let applied = report.section(section);
            if applied.is_empty() {
                continue;
            }
            lines.push(format!("\n{}:", section.title().cyan()));
            for (name, (old, new)) in applied {
                lines.push(format!(
                    "  • {} {} → {}",
                    name.white().bold(),
                    old.red(),
                    new.green()
                ));
            }
        }

        lines.join("\n")
    }

    async fn plan(&mut self) -> crate::error::Result<CatalogTodo, CatalogFailure> {
        let doc = self.manager.load().map_err(plan_failure)?;
        let candidates = self.collect_candidates(&doc);
        debug!(candidates = candidates.len(), "checking catalog entries");

        let mut updates = Vec::new();
        let mut failures = Vec::new();
        for candidate in candidates {
            match self
                .source
                .latest_version(&candidate.coordinate, self.stable_only)
                .await
            {
                Ok(Some(latest))
                    if latest != candidate.current
                        && VersionComparator::is_newer(&latest, &candidate.current) =>
                {
                    updates.push(PendingUpdate {
                        section: candidate.section,
                        name: candidate.name,
                        coordinate: candidate.coordinate,
                        current: candidate.current,
                        latest,
                    });
                }
                Ok(_) => {}
                Err(e) => failures.push(CatalogFailure::entry(candidate.name, e.to_string())),
            }
        }

        if let Some(errors) = UpdateErrors::from_vec(failures) {
            return Err(UpdateError::PlanFailed(errors));
        }

        Ok(CatalogTodo::new(updates))
    }

    async fn run(
        &mut self,
        ctx: RunContext<'_, Self>,
    ) -> crate::error::Result<UpdateReport, CatalogFailure> {
        let todo = ctx.todo()?;
        let mut doc = self.manager.load().map_err(run_failure)?;

        let mut report = UpdateReport::new();
        let mut failures = Vec::new();
        {
            let progress = ctx.progress_bar(todo.len() as u64);
            for update in todo.iter() {
                progress.set_message(format!("Updating {}", update.name));
                match apply_update(&mut doc, update) {
                    Ok(()) => report.record(update),
                    Err(failure) => failures.push(failure),
                }
                progress.inc(1);
            }
        }

        if let Some(errors) = UpdateErrors::from_vec(failures) {
            return Err(UpdateError::RunFailed(errors));
        }

        if !report.is_empty() {
            self.manager.save(&doc).map_err(run_failure)?;
        }

        Ok(report)
    }
}

fn current_version(section: Section, item: &Item) -> Option<String> {
    match section {
        Section::Versions => item.as_str().map(str::to_string),
        Section::Libraries => CatalogEntry::version(item),
        Section::Plugins => CatalogEntry::plugin_details(item).and_then(|(_, v)| v),
    }
}

fn apply_update(doc: &mut DocumentMut, update: &PendingUpdate) -> Result<(), CatalogFailure> {
    let item = doc
        .get_mut(update.section.key())
        .and_then(|v| v.as_table_mut())
        .and_then(|table| table.get_mut(&update.name))
        .ok_or_else(|| {
            CatalogFailure::entry(&update.name, format!("no longer present in [{}]", update.section))
        })?;

    match current_version(update.section, item) {
        Some(found) if found == update.current => {}
        Some(found) => {
            return Err(CatalogFailure::entry(
                &update.name,
                format!(
                    "changed since planning (planned {}, found {})",
                    update.current, found
                ),
            ));
        }
        None => {
            return Err(CatalogFailure::entry(
                &update.name,
                "no concrete version to update",
            ));
        }
    }

    if CatalogEntry::set_version(item, &update.latest) {
        Ok(())
    } else {
        Err(CatalogFailure::entry(&update.name, "entry cannot hold a version"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use tempfile::TempDir;

    const CATALOG: &str = r#"[versions]
ktor = "2.3.0"
unused = "1.0.0"

[libraries]
ktor-core = { module = "io.ktor:ktor-server-core", version.ref = "ktor" }
okhttp = { group = "com.squareup.okhttp3", name = "okhttp", version = "4.11.0" }
junit = "junit:junit:4.13.2"

[plugins]
android-application = { id = "com.android.application", version = "8.1.0" }
"#;

    fn source() -> Arc<dyn VersionSource> {
        Arc::new(
            StaticSource::new()
                .with_versions(
                    &Coordinate::new("io.ktor", "ktor-server-core"),
                    ["2.3.0", "2.3.5", "3.0.0-beta-1"],
                )
                .with_versions(
                    &Coordinate::new("com.squareup.okhttp3", "okhttp"),
                    ["4.11.0", "4.12.0"],
                )
                .with_versions(&Coordinate::new("junit", "junit"), ["4.13.2"])
                .with_versions(&Coordinate::plugin("com.android.application"), ["8.1.0", "8.2.0"]),
        )
    }

    fn project() -> (TempDir, CatalogManager) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("gradle")).unwrap();
        fs::write(dir.path().join(CATALOG_PATH), CATALOG).unwrap();
        let manager = CatalogManager::discover(dir.path()).unwrap();
        (dir, manager)
    }

    #[test]
    fn discover_requires_catalog() {
        let dir = TempDir::new().unwrap();
        let err = CatalogManager::discover(dir.path()).unwrap_err();
        assert!(matches!(err, CatalogError::ProjectValidation(_)));
    }

    #[tokio::test]
    async fn plan_lists_newer_stable_versions() {
        let (_dir, manager) = project();
        let mut update = CatalogUpdate::new(manager, source());

        let todo = update.plan().await.unwrap();
        let names: Vec<_> = todo.iter().map(|u| (u.section, u.name.as_str(), u.latest.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (Section::Versions, "ktor", "2.3.5"),
                (Section::Libraries, "okhttp", "4.12.0"),
                (Section::Plugins, "android-application", "8.2.0"),
            ]
        );
    }

    #[tokio::test]
    async fn plan_honours_filter_and_unstable_versions() {
        let (_dir, manager) = project();
        let mut update = CatalogUpdate::new(manager, source())
            .stable_only(false)
            .filter(Some(PatternMatcher::new("ktor").unwrap()));

        let todo = update.plan().await.unwrap();
        assert_eq!(todo.len(), 1);
        let only = todo.iter().next().unwrap();
        assert_eq!(only.name, "ktor");
        assert_eq!(only.latest, "3.0.0-beta-1");
    }

    #[tokio::test]
    async fn plan_fails_with_single_record_for_broken_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("libs.versions.toml");
        fs::write(&path, "[versions\nbroken").unwrap();
        let mut update = CatalogUpdate::new(CatalogManager::at(path), source());

        let err = update.plan().await.unwrap_err();
        let errors = err.errors().expect("plan failure records");
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().next().unwrap().entry.is_none());
    }

    #[test]
    fn apply_update_rejects_drifted_entry() {
        let mut doc: DocumentMut = CATALOG.parse().unwrap();
        let update = PendingUpdate {
            section: Section::Libraries,
            name: "okhttp".to_string(),
            coordinate: Coordinate::new("com.squareup.okhttp3", "okhttp"),
            current: "4.10.0".to_string(),
            latest: "4.12.0".to_string(),
        };

        let failure = apply_update(&mut doc, &update).unwrap_err();
        assert_eq!(failure.entry.as_deref(), Some("okhttp"));
        assert!(failure.message.contains("changed since planning"));
    }

    #[test]
    fn apply_update_rewrites_each_section() {
        let mut doc: DocumentMut = CATALOG.parse().unwrap();
        let updates = [
            (Section::Versions, "ktor", "2.3.0", "2.3.5"),
            (Section::Libraries, "junit", "4.13.2", "4.13.3"),
            (Section::Plugins, "android-application", "8.1.0", "8.2.0"),
        ];
        for (section, name, current, latest) in updates {
            let update = PendingUpdate {
                section,
                name: name.to_string(),
                coordinate: Coordinate::new("g", "a"),
                current: current.to_string(),
                latest: latest.to_string(),
            };
            apply_update(&mut doc, &update).unwrap();
        }

        let rendered = doc.to_string();
        assert!(rendered.contains(r#"ktor = "2.3.5""#));
        assert!(rendered.contains(r#"junit = "junit:junit:4.13.3""#));
        assert!(rendered.contains(r#"version = "8.2.0""#));
        assert!(rendered.contains(r#"unused = "1.0.0""#));
    }

    #[test]
    fn report_groups_by_section() {
        let mut report = UpdateReport::new();
        report.record(&PendingUpdate {
            section: Section::Plugins,
            name: "kotlin".to_string(),
            coordinate: Coordinate::plugin("org.jetbrains.kotlin.jvm"),
            current: "1.9.0".to_string(),
            latest: "1.9.22".to_string(),
        });
        assert_eq!(report.total_updates(), 1);
        assert_eq!(
            report.plugin_updates.get("kotlin"),
            Some(&("1.9.0".to_string(), "1.9.22".to_string()))
        );
        assert!(report.section(Section::Libraries).is_empty());
    }
}
