//! npm-outdated - report outdated npm dependencies
//!
//! This library checks the dependencies a package declares against an npm
//! registry and reports the ones that are missing, behind the highest version
//! their range allows ("wanted"), or behind the `latest` dist-tag:
//! - `tree`: declared and installed dependencies (project or global scope)
//! - `registry`: packument sources
//! - `version`: npm range matching and version selection
//! - `scanner`: concurrent, failure-isolated lookups
//! - `output`: table, JSON and parseable presentation

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod progress;
pub mod registry;
pub mod scanner;
pub mod tree;
pub mod version;
