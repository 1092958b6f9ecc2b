//! Classification of declared version specifiers
//!
//! Handles the forms that can appear as a package.json dependency value:
//! - Range: `^1.2.3`, `~1.2`, `>=1.0.0 <2.0.0`, `1.x`, `*`, `1.0.0 - 2.0.0`
//! - Version: `1.2.3`, `v1.2.3`, `=1.2.3`
//! - Tag: `latest`, `next`, `beta`
//! - Git: `git+ssh://...`, `github:user/repo`, `user/repo#branch`
//! - Remote: `https://example.com/pkg.tgz`
//! - File: `file:../lib`, `link:../lib`, `./lib`, `../pkg.tgz`
//! - Alias: `npm:other-package@^1.0.0`
//! - Workspace: `workspace:*`
//!
//! Only ranges, versions and tags can be checked against a registry.

use crate::version::Range;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// The kind of a declared specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecifierKind {
    /// Semver range (including `*` and the empty string)
    Range,
    /// A single exact version
    Version,
    /// A dist-tag name
    Tag,
    /// Git repository reference
    Git,
    /// Tarball URL
    Remote,
    /// Local directory, tarball or link
    File,
    /// `npm:` alias to another package
    Alias,
    /// `workspace:` protocol
    Workspace,
    /// Anything else
    Invalid,
}

impl SpecifierKind {
    /// Returns true if this specifier can be resolved against registry metadata
    pub fn is_registry(&self) -> bool {
        matches!(
            self,
            SpecifierKind::Range | SpecifierKind::Version | SpecifierKind::Tag
        )
    }
}

/// A classified version specifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifier {
    kind: SpecifierKind,
    raw: String,
}

static GIT_HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:git\+[a-z]+|git|github|gitlab|bitbucket|gist):").unwrap());
static GITHUB_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+(?:#.*)?$").unwrap());
static TARBALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(?:tgz|tar\.gz|tar)$").unwrap());
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());

impl Specifier {
    /// Classify a raw specifier string
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self {
            kind: classify(trimmed),
            raw: trimmed.to_string(),
        }
    }

    pub fn kind(&self) -> SpecifierKind {
        self.kind
    }

    /// The trimmed specifier text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns true if this specifier can be resolved against registry metadata
    pub fn is_registry(&self) -> bool {
        self.kind.is_registry()
    }
}

fn classify(spec: &str) -> SpecifierKind {
    if spec.starts_with("npm:") {
        return SpecifierKind::Alias;
    }
    if spec.starts_with("workspace:") {
        return SpecifierKind::Workspace;
    }
    if spec.starts_with("file:")
        || spec.starts_with("link:")
        || spec.starts_with("./")
        || spec.starts_with("../")
        || spec.starts_with("~/")
        || spec.starts_with('/')
    {
        return SpecifierKind::File;
    }
    if GIT_HOST_RE.is_match(spec) || spec.ends_with(".git") {
        return SpecifierKind::Git;
    }
    if spec.starts_with("http://") || spec.starts_with("https://") {
        return SpecifierKind::Remote;
    }
    if TARBALL_RE.is_match(spec) {
        return SpecifierKind::File;
    }
    if is_exact_version(spec) {
        return SpecifierKind::Version;
    }
    if Range::parse(spec).is_some() {
        return SpecifierKind::Range;
    }
    if GITHUB_SHORTHAND_RE.is_match(spec) {
        return SpecifierKind::Git;
    }
    if TAG_RE.is_match(spec) {
        return SpecifierKind::Tag;
    }
    SpecifierKind::Invalid
}

fn is_exact_version(spec: &str) -> bool {
    let bare = spec.strip_prefix('=').unwrap_or(spec).trim_start();
    let bare = bare.strip_prefix('v').unwrap_or(bare);
    Version::parse(bare).is_ok()
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
