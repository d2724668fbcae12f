use toml_edit::{Item, Value};

/// Canonical representation of a library entry inside the version catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDetails {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
    pub version_ref: Option<String>,
}

/// Parse a Maven coordinate (e.g., "com.example:artifact:1.0.0")
pub fn parse_maven_coordinate(coordinate: &str) -> Option<(String, String, Option<String>)> {
    let parts: Vec<&str> = coordinate.split(':').collect();
    match parts.as_slice() {
        [group, artifact] => Some((group.to_string(), artifact.to_string(), None)),
        [group, artifact, version] => Some((
            group.to_string(),
            artifact.to_string(),
            Some(version.to_string()),
        )),
        _ => None,
    }
}

/// Helpers for inspecting and updating Gradle version catalog entries.
pub struct CatalogEntry;

impl CatalogEntry {
    fn field<'a>(item: &'a Item, key: &str) -> Option<&'a Value> {
        if let Some(inline_table) = item.as_inline_table() {
            return inline_table.get(key);
        }
        item.as_table()
            .and_then(|table| table.get(key))
            .and_then(|v| v.as_value())
    }

    fn field_str<'a>(item: &'a Item, key: &str) -> Option<&'a str> {
        Self::field(item, key).and_then(|v| v.as_str())
    }

    /// Extracts `(group, artifact)` from strings, inline tables, or standard tables.
    pub fn group_artifact(item: &Item) -> Option<(String, String)> {
        if let Some(raw) = item.as_str() {
            return parse_maven_coordinate(raw).map(|(g, a, _)| (g, a));
        }

        if let Some(module) = Self::field_str(item, "module") {
            return parse_maven_coordinate(module).map(|(g, a, _)| (g, a));
        }

        match (Self::field_str(item, "group"), Self::field_str(item, "name")) {
            (Some(group), Some(name)) => Some((group.to_string(), name.to_string())),
            _ => None,
        }
    }

    /// Concrete version string defined on the item.
    pub fn version(item: &Item) -> Option<String> {
        if let Some(raw) = item.as_str() {
            return parse_maven_coordinate(raw).and_then(|(_, _, v)| v);
        }
        Self::field_str(item, "version").map(str::to_string)
    }

    /// Version reference key `{ version = { ref = "foo" } }` or `version.ref = "foo"`.
    pub fn version_ref(item: &Item) -> Option<String> {
        if let Some(reference) = Self::field(item, "version")
            .and_then(|v| v.as_inline_table())
            .and_then(|table| table.get("ref"))
            .and_then(|v| v.as_str())
        {
            return Some(reference.to_string());
        }

        // `version.ref = "foo"` inside a standard table parses as a dotted sub-table
        item.as_table()
            .and_then(|table| table.get("version"))
            .and_then(|v| v.as_table_like())
            .and_then(|table| table.get("ref"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    pub fn uses_version_ref(item: &Item, version_key: &str) -> bool {
        Self::version_ref(item).is_some_and(|key| key == version_key)
    }

    pub fn library_details(item: &Item) -> Option<LibraryDetails> {
        let (group, artifact) = Self::group_artifact(item)?;
        Some(LibraryDetails {
            group,
            artifact,
            version: Self::version(item),
            version_ref: Self::version_ref(item),
        })
    }

    /// Plugin id and concrete version of a `[plugins]` entry.
    ///
    /// Accepts `{ id = "...", version = "..." }` and the `"id:version"` shorthand.
    pub fn plugin_details(item: &Item) -> Option<(String, Option<String>)> {
        if let Some(raw) = item.as_str() {
            return match raw.rsplit_once(':') {
                Some((id, version)) => Some((id.to_string(), Some(version.to_string()))),
                None => Some((raw.to_string(), None)),
            };
        }

        let id = Self::field_str(item, "id")?;
        Some((id.to_string(), Self::version(item)))
    }

    /// Rewrites the item's concrete version, keeping its shape.
    ///
    /// Returns false when the item has no place for a version.
    pub fn set_version(item: &mut Item, new_version: &str) -> bool {
        if let Some(raw) = item.as_str() {
            let rewritten = match raw.rsplit_once(':') {
                Some((prefix, _)) => format!("{prefix}:{new_version}"),
                None => new_version.to_string(),
            };
            *item = Item::Value(Value::from(rewritten));
            return true;
        }

        if let Some(inline_table) = item.as_inline_table_mut() {
            inline_table.insert("version", Value::from(new_version));
            return true;
        }

        if let Some(table) = item.as_table_mut() {
            table.insert("version", Item::Value(Value::from(new_version)));
            return true;
        }

        false
    }
}
