//! Project configuration models
//!
//! Operator files (JSON or TOML, snake_case keys) and stored state are read
//! with serde straight into these types. The camelCase documents exchanged
//! with the management API go through [`modelkit::Model`] instead.

pub mod authorization;
pub mod connectors;
pub mod jwt;
pub mod messaging;
pub mod project;
pub mod settings;

pub use project::Project;

use anyhow::{Context, Result, bail};
use modelkit::{Document, Handler};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Document keys holding write-only values
pub const SECRET_KEYS: &[&str] = &["bearerToken", "password", "secret"];

/// Write the registered identity of a named entity into `data["id"]`
///
/// Entities created in this request get their deferred key.
pub(crate) fn write_identity(h: &Handler, data: &mut Document, namespace: &str, name: &str) {
    if let Some(reference) = h.refs.get(namespace, name) {
        data.insert("id".to_string(), reference.reference_value().into());
    }
}

/// Load a project file, picking the format from the extension
pub fn load_project(path: &Path) -> Result<Project> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;

    let project: Project = match extension(path) {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid project file: {}", path.display()))?,
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid project file: {}", path.display()))?,
        _ => bail!(
            "Unsupported project file: {} (expected .json or .toml)",
            path.display()
        ),
    };

    log::debug!("Loaded project from {}", path.display());
    Ok(project)
}

/// Expand directories into the project files they contain
pub fn discover(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        files.extend(
            WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| !is_hidden(entry))
                .filter(|entry| matches!(extension(entry.path()), Some("json" | "toml")))
                .map(walkdir::DirEntry::into_path),
        );
    }
    files.sort();
    files.dedup();
    files
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_toml_and_json() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("app.toml");
        fs::write(
            &toml_path,
            r#"
name = "app"
tags = ["b", "a"]

[[connectors.http]]
name = "C1"
base_url = "https://hooks.example.com"
"#,
        )
        .unwrap();
        let json_path = dir.path().join("app.json");
        fs::write(&json_path, r#"{"name": "app", "environment": "production"}"#).unwrap();

        let from_toml = load_project(&toml_path).unwrap();
        assert_eq!(from_toml.name.value_str(), "app");
        let http = from_toml.connectors.as_present().unwrap().http.as_present().unwrap();
        assert_eq!(http[0].name.value_str(), "C1");

        let from_json = load_project(&json_path).unwrap();
        assert_eq!(from_json.environment.value_str(), "production");
        assert!(from_json.connectors.is_absent());
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("typo.json");
        fs::write(&path, r#"{"name": "app", "enviroment": "x"}"#).unwrap();
        assert!(load_project(&path).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(&path, "name: app").unwrap();
        let err = load_project(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported project file"));
    }

    #[test]
    fn test_discover_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("nested/b.toml"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::write(dir.path().join(".hidden.json"), "{}").unwrap();

        let files = discover(&[dir.path().to_path_buf()]);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e != "md")));
    }
}
