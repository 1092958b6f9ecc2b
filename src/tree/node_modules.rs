//! Installed tree read from a `node_modules` directory
//!
//! Project scope reads the root package.json for declarations and the
//! top-level `node_modules` for installed versions. Global scope has no root
//! manifest: every package in the global `node_modules` is declared as a
//! `dependencies` entry with specifier `*`.

use super::package_json::PackageJson;
use super::InstalledTreeView;
use crate::domain::{DependencyKind, DependencySpec, InstalledRecord};
use crate::error::TreeError;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Installed tree backed by the file system
#[derive(Debug, Clone, Default)]
pub struct NodeModulesTree {
    root_name: Option<String>,
    declared: Vec<DependencySpec>,
    installed: HashMap<String, InstalledRecord>,
}

impl NodeModulesTree {
    /// Load a project rooted at `root`
    pub fn load_project(root: &Path) -> Result<Self, TreeError> {
        let manifest = PackageJson::read(&root.join("package.json"))?;
        let installed = read_node_modules(&root.join("node_modules"))?;
        debug!(
            root = %root.display(),
            declared = manifest.declared.len(),
            installed = installed.len(),
            "loaded project tree"
        );

        Ok(Self {
            root_name: manifest.name,
            declared: manifest.declared,
            installed,
        })
    }

    /// Load the global packages installed under `prefix`
    pub fn load_global(prefix: &Path) -> Result<Self, TreeError> {
        let dir = global_node_modules(prefix);
        let installed = read_node_modules(&dir)?;
        debug!(dir = %dir.display(), installed = installed.len(), "loaded global tree");

        let mut names: Vec<&String> = installed.keys().collect();
        names.sort();
        let declared = names
            .into_iter()
            .map(|name| DependencySpec::prod(name.clone(), "*"))
            .collect();

        Ok(Self {
            root_name: None,
            declared,
            installed,
        })
    }
}

impl InstalledTreeView for NodeModulesTree {
    fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    fn declared(&self, kind: DependencyKind) -> Vec<DependencySpec> {
        self.declared
            .iter()
            .filter(|dep| dep.kind == kind)
            .cloned()
            .collect()
    }

    fn installed(&self, name: &str) -> Option<InstalledRecord> {
        self.installed.get(name).cloned()
    }
}

/// Global install prefix from the environment
///
/// `NPM_CONFIG_PREFIX`, then `PREFIX`, then `%APPDATA%\npm` on Windows,
/// otherwise `/usr/local`.
pub fn default_global_prefix() -> PathBuf {
    let from_env = |key: &str| {
        std::env::var_os(key)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    };

    if let Some(prefix) = from_env("NPM_CONFIG_PREFIX").or_else(|| from_env("PREFIX")) {
        return prefix;
    }
    if cfg!(windows) {
        if let Some(appdata) = from_env("APPDATA") {
            return appdata.join("npm");
        }
    }
    PathBuf::from("/usr/local")
}

/// The `node_modules` directory global packages live in
pub fn global_node_modules(prefix: &Path) -> PathBuf {
    if cfg!(windows) {
        prefix.join("node_modules")
    } else {
        prefix.join("lib").join("node_modules")
    }
}

/// Read the top-level packages of a `node_modules` directory.
///
/// A missing directory is an empty tree. Scoped packages are read from
/// `@scope/name`; dot entries such as `.bin` are skipped.
fn read_node_modules(dir: &Path) -> Result<HashMap<String, InstalledRecord>, TreeError> {
    let mut installed = HashMap::new();
    for (name, path) in list_packages(dir)? {
        if let Some(record) = read_installed(&name, &path) {
            installed.insert(name, record);
        }
    }
    Ok(installed)
}

fn list_packages(dir: &Path) -> Result<Vec<(String, PathBuf)>, TreeError> {
    let mut packages = Vec::new();
    for (name, path) in list_dir(dir)? {
        if name.starts_with('@') {
            for (child, child_path) in list_dir(&path)? {
                packages.push((format!("{}/{}", name, child), child_path));
            }
        } else {
            packages.push((name, path));
        }
    }
    Ok(packages)
}

fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>, TreeError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(TreeError::read_error(dir, e)),
    };

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TreeError::read_error(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if name.starts_with('.') || !path.is_dir() {
            continue;
        }
        children.push((name, path));
    }
    Ok(children)
}

fn read_installed(name: &str, path: &Path) -> Option<InstalledRecord> {
    match PackageJson::read(&path.join("package.json")) {
        Ok(PackageJson {
            version: Some(version),
            ..
        }) => Some(InstalledRecord::new(version, path)),
        Ok(_) => {
            debug!(package = name, "installed package.json has no version");
            None
        }
        Err(TreeError::NotFound { .. }) => {
            debug!(package = name, "directory without package.json");
            None
        }
        Err(e) => {
            warn!(package = name, error = %e, "ignoring unreadable installed package");
            None
        }
    }
}
