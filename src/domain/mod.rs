//! Core domain models for npm-outdated
//!
//! This module contains the fundamental types used throughout the application:
//! - Declared dependencies and installed records
//! - Specifier classification
//! - Registry packuments
//! - Outdated entries and the sorted scan result

mod collate;
mod dependency;
mod entry;
mod packument;
mod specifier;

pub use collate::locale_cmp;
pub use dependency::{DependencyKind, DependencySpec, InstalledRecord};
pub use entry::{OutdatedEntry, ScanResult};
pub use packument::{PackageManifest, Packument};
pub use specifier::{Specifier, SpecifierKind};
