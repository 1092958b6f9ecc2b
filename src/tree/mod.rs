//! Installed dependency trees
//!
//! This module provides:
//! - The `InstalledTreeView` trait the scanner reads declarations and installs through
//! - A file-system backed tree for project and global scope
//! - An in-memory tree for tests and library callers

mod node_modules;
mod package_json;

pub use node_modules::{default_global_prefix, global_node_modules, NodeModulesTree};
pub use package_json::PackageJson;

use crate::config::Scope;
use crate::domain::{DependencyKind, DependencySpec, InstalledRecord};
use crate::error::TreeError;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Read-only view of a root package and what is installed beneath it
pub trait InstalledTreeView: Send + Sync {
    /// Name of the root package, `None` for the global tree
    fn root_name(&self) -> Option<&str>;

    /// Dependencies the root declares in one section
    fn declared(&self, kind: DependencyKind) -> Vec<DependencySpec>;

    /// Installed record of a top-level package
    fn installed(&self, name: &str) -> Option<InstalledRecord>;
}

/// All declared dependencies; a name declared in several sections keeps its first declaration
pub fn declared_dependencies(tree: &dyn InstalledTreeView) -> Vec<DependencySpec> {
    let mut seen = HashSet::new();
    DependencyKind::ALL
        .into_iter()
        .flat_map(|kind| tree.declared(kind))
        .filter(|dep| seen.insert(dep.name.clone()))
        .collect()
}

/// Load the tree for a scope
pub fn load_tree(scope: &Scope) -> Result<Arc<dyn InstalledTreeView>, TreeError> {
    let tree = match scope {
        Scope::Project { root } => NodeModulesTree::load_project(root)?,
        Scope::Global { prefix } => NodeModulesTree::load_global(prefix)?,
    };
    Ok(Arc::new(tree))
}

/// In-memory installed tree
#[derive(Debug, Clone, Default)]
pub struct StaticTree {
    root_name: Option<String>,
    declared: Vec<DependencySpec>,
    installed: HashMap<String, InstalledRecord>,
}

impl StaticTree {
    /// Creates an empty tree for a named root package
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: Some(root_name.into()),
            ..Self::default()
        }
    }

    /// Creates an empty tree without a root package
    pub fn global() -> Self {
        Self::default()
    }

    /// Adds a declaration
    pub fn with_dependency(mut self, dependency: DependencySpec) -> Self {
        self.declared.push(dependency);
        self
    }

    /// Marks a package as installed at `<root>/node_modules/<name>`
    pub fn with_installed(mut self, name: &str, version: &str) -> Self {
        let path = PathBuf::from("node_modules").join(name);
        self.installed
            .insert(name.to_string(), InstalledRecord::new(version, path));
        self
    }
}

impl InstalledTreeView for StaticTree {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_static_tree() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::prod("lodash", "^4.17.0"))
            .with_installed("lodash", "4.17.21");

        assert_eq!(tree.root_name(), Some("app"));
        assert_eq!(tree.declared(DependencyKind::Prod).len(), 1);
        assert!(tree.declared(DependencyKind::Dev).is_empty());
        assert_eq!(tree.installed("lodash").unwrap().version, "4.17.21");
        assert!(StaticTree::global().root_name().is_none());
    }

    #[test]
    fn test_declared_dependencies_first_section_wins() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::optional("a", "^3.0.0"))
            .with_dependency(DependencySpec::dev("a", "^2.0.0"))
            .with_dependency(DependencySpec::prod("a", "^1.0.0"))
            .with_dependency(DependencySpec::dev("b", "^1.0.0"));

        let declared = declared_dependencies(&tree);
        assert_eq!(
            declared,
            vec![
                DependencySpec::prod("a", "^1.0.0"),
                DependencySpec::dev("b", "^1.0.0"),
            ]
        );
    }

    #[test]
    fn test_declared_dependencies_dev_before_optional() {
        let tree = StaticTree::new("app")
            .with_dependency(DependencySpec::optional("x", "1"))
            .with_dependency(DependencySpec::dev("x", "2"));

        assert_eq!(
            declared_dependencies(&tree),
            vec![DependencySpec::dev("x", "2")]
        );
    }

    #[test]
    fn test_load_tree_project_scope() {
        let root = TempDir::new().unwrap();
        std::fs::write(
            root.path().join("package.json"),
            r#"{"name": "app", "dependencies": {"a": "1"}}"#,
        )
        .unwrap();

        let scope = Scope::Project {
            root: root.path().to_path_buf(),
        };
        let tree = load_tree(&scope).unwrap();
        assert_eq!(tree.root_name(), Some("app"));
        assert_eq!(declared_dependencies(tree.as_ref()).len(), 1);
    }

    #[test]
    fn test_load_tree_missing_project() {
        let root = TempDir::new().unwrap();
        let scope = Scope::Project {
            root: root.path().join("nope"),
        };
        assert!(matches!(load_tree(&scope), Err(TreeError::NotFound { .. })));
    }
}
