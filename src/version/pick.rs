//! Select the manifest a specifier resolves to

use super::range::{precedence, Range};
use crate::domain::{PackageManifest, Packument, Specifier, SpecifierKind};
use crate::error::PickError;
use semver::Version;

/// Dist-tag that names the newest release
pub const LATEST_TAG: &str = "latest";

/// Pick the manifest a specifier resolves to.
///
/// A dist-tag resolves to the version it points at. A range or exact version
/// resolves to the highest published version satisfying it, skipping
/// pre-releases unless the range opts into them.
pub fn pick<'a>(packument: &'a Packument, spec: &str) -> Result<&'a PackageManifest, PickError> {
    let specifier = Specifier::parse(spec);
    match specifier.kind() {
        SpecifierKind::Tag => packument
            .tagged(specifier.raw())
            .ok_or_else(|| PickError::no_matching_version(spec)),
        SpecifierKind::Range | SpecifierKind::Version => {
            let range =
                Range::parse(specifier.raw()).ok_or_else(|| PickError::invalid_specifier(spec))?;
            highest_satisfying(packument, &range)
                .ok_or_else(|| PickError::no_matching_version(spec))
        }
        SpecifierKind::Git
        | SpecifierKind::Remote
        | SpecifierKind::File
        | SpecifierKind::Alias
        | SpecifierKind::Workspace
        | SpecifierKind::Invalid => Err(PickError::invalid_specifier(spec)),
    }
}

fn highest_satisfying<'a>(packument: &'a Packument, range: &Range) -> Option<&'a PackageManifest> {
    packument
        .versions
        .iter()
        .filter_map(|(key, manifest)| Version::parse(key).ok().map(|v| (v, manifest)))
        .filter(|(version, _)| range.satisfies(version))
        .max_by(|(a, _), (b, _)| precedence(a, b).then_with(|| a.build.cmp(&b.build)))
        .map(|(_, manifest)| manifest)
}
