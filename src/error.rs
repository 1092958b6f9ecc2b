//! Application error types using thiserror
//!
//! Error hierarchy:
//! - TreeError: the installed dependency tree could not be loaded (fatal)
//! - RegistryError: package metadata could not be fetched (per dependency)
//! - PickError: no version could be selected from a packument (per dependency)
//! - LookupError: any per-dependency failure (including an aborted lookup task),
//!   classified by `FailureKind`
//! - ScanError: whole-scan precondition failures
//! - ConfigError: invalid command line configuration

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors related to loading the installed dependency tree
#[derive(Error, Debug)]
pub enum TreeError {
    /// No package.json (or global node_modules) at the expected place
    #[error("no package.json found in {path}")]
    NotFound { path: PathBuf },

    /// Failed to read a tree file or directory
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root package.json is not valid JSON
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Registry refused access to the package
    #[error("access to '{package}' forbidden by {registry} registry")]
    Forbidden { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors raised while selecting a version from a packument
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    /// The specifier is not a range, version or dist-tag
    #[error("'{spec}' is not a version range or dist-tag")]
    InvalidSpecifier { spec: String },

    /// Nothing published satisfies the specifier
    #[error("no version matching '{spec}'")]
    NoMatchingVersion { spec: String },
}

/// Any failure while checking a single dependency
#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Pick(#[from] PickError),

    /// The lookup task ended without producing a result
    #[error("lookup of '{package}' aborted: {message}")]
    Aborted { package: String, message: String },
}

/// Coarse classification of a per-dependency failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Package or matching version does not exist
    NotFound,
    /// Registry denied access
    Forbidden,
    /// Transport, rate limit or malformed response
    Network,
    /// Lookup did not finish in time
    Timeout,
    /// Specifier cannot be checked against a registry
    Unsupported,
    /// Lookup task panicked or was cancelled
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::NotFound => "not found",
            FailureKind::Forbidden => "forbidden",
            FailureKind::Network => "network",
            FailureKind::Timeout => "timeout",
            FailureKind::Unsupported => "unsupported",
            FailureKind::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

impl LookupError {
    /// Classify this failure
    pub fn classify(&self) -> FailureKind {
        match self {
            LookupError::Registry(err) => match err {
                RegistryError::PackageNotFound { .. } => FailureKind::NotFound,
                RegistryError::Forbidden { .. } => FailureKind::Forbidden,
                RegistryError::NetworkError { .. }
                | RegistryError::RateLimitExceeded { .. }
                | RegistryError::InvalidResponse { .. } => FailureKind::Network,
                RegistryError::Timeout { .. } => FailureKind::Timeout,
            },
            LookupError::Pick(err) => match err {
                PickError::NoMatchingVersion { .. } => FailureKind::NotFound,
                PickError::InvalidSpecifier { .. } => FailureKind::Unsupported,
            },
            LookupError::Aborted { .. } => FailureKind::Aborted,
        }
    }
}

/// Errors that stop a scan before any lookup starts
#[derive(Error, Debug)]
pub enum ScanError {
    /// The installed tree could not be loaded
    #[error("failed to load dependency tree: {0}")]
    TreeLoad(#[from] TreeError),

    /// The registry client could not be created
    #[error("failed to initialize registry client: {0}")]
    Client(#[source] RegistryError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Registry URL is not http(s)
    #[error("invalid registry URL '{value}': expected an http:// or https:// URL")]
    InvalidRegistry { value: String },

    /// Could not resolve the working directory
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },
}

impl TreeError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        TreeError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TreeError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TreeError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new Forbidden error
    pub fn forbidden(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Forbidden {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}

impl PickError {
    pub fn invalid_specifier(spec: impl Into<String>) -> Self {
        PickError::InvalidSpecifier { spec: spec.into() }
    }

    pub fn no_matching_version(spec: impl Into<String>) -> Self {
        PickError::NoMatchingVersion { spec: spec.into() }
    }
}
