//! npm semver range grammar
//!
//! Supports npm range specifications:
//! - `1.2.3`, `=1.2.3`, `v1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0-0, special cases for 0.x)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0-0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1`, `*`, `""` - x-ranges
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - `>=1.0.0 <2.0.0` - space separated, all must satisfy
//! - `^1.0.0 || ^2.0.0` - any must satisfy
//!
//! Every form is desugared into plain comparators. Pre-release versions only
//! satisfy a comparator set when one of its comparators carries a pre-release
//! on the same `major.minor.patch`.

use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use std::cmp::Ordering;
use std::sync::LazyLock;

static OPERATOR_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<=|>=|<|>|=|\^|~>?)\s+").unwrap());
static HYPHEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+-\s+(\S+)$").unwrap());
static PRERELEASE_ZERO: LazyLock<Prerelease> = LazyLock::new(|| Prerelease::new("0").unwrap());

/// Compare two versions by semver precedence, ignoring build metadata
pub fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    fn matches(&self, version: &Version) -> bool {
        let ord = precedence(version, &self.version);
        match self.op {
            Op::Eq => ord == Ordering::Equal,
            Op::Gt => ord == Ordering::Greater,
            Op::Gte => ord != Ordering::Less,
            Op::Lt => ord == Ordering::Less,
            Op::Lte => ord != Ordering::Greater,
        }
    }
}

/// A parsed npm range: a union of comparator sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    sets: Vec<Vec<Comparator>>,
}

impl Range {
    /// Parse an npm range; `None` if any part is not valid range syntax
    pub fn parse(spec: &str) -> Option<Self> {
        let sets = spec
            .split("||")
            .map(parse_set)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { sets })
    }

    /// Check if a version satisfies this range
    pub fn satisfies(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set_satisfies(set, version))
    }
}

fn set_satisfies(set: &[Comparator], version: &Version) -> bool {
    if !set.iter().all(|c| c.matches(version)) {
        return false;
    }
    if version.pre.is_empty() {
        return true;
    }
    set.iter().any(|c| {
        !c.version.pre.is_empty()
            && c.version.major == version.major
            && c.version.minor == version.minor
            && c.version.patch == version.patch
    })
}

fn parse_set(part: &str) -> Option<Vec<Comparator>> {
    let part = part.trim();
    let mut set = Vec::new();
    if part.is_empty() {
        return Some(set);
    }

    if let Some(caps) = HYPHEN_RE.captures(part) {
        hyphen(&caps[1], &caps[2], &mut set)?;
        return Some(set);
    }

    let normalized = OPERATOR_SPACE_RE.replace_all(part, "$1");
    for token in normalized.split_whitespace() {
        parse_comparator(token, &mut set)?;
    }
    Some(set)
}

enum Prefix {
    Caret,
    Tilde,
    Cmp(Op),
}

fn split_prefix(token: &str) -> (Prefix, &str) {
    const PREFIXES: [(&str, Prefix); 8] = [
        ("^", Prefix::Caret),
        ("~>", Prefix::Tilde),
        ("~", Prefix::Tilde),
        (">=", Prefix::Cmp(Op::Gte)),
        ("<=", Prefix::Cmp(Op::Lte)),
        (">", Prefix::Cmp(Op::Gt)),
        ("<", Prefix::Cmp(Op::Lt)),
        ("=", Prefix::Cmp(Op::Eq)),
    ];

    for (text, prefix) in PREFIXES {
        if let Some(rest) = token.strip_prefix(text) {
            return (prefix, rest);
        }
    }
    (Prefix::Cmp(Op::Eq), token)
}

fn parse_comparator(token: &str, set: &mut Vec<Comparator>) -> Option<()> {
    let (prefix, rest) = split_prefix(token);
    let partial = Partial::parse(rest)?;
    match prefix {
        Prefix::Caret => caret(&partial, set),
        Prefix::Tilde => tilde(&partial, set),
        Prefix::Cmp(op) => xrange(op, &partial, set),
    }
    Some(())
}

/// A possibly incomplete version; `None` components are wildcards
#[derive(Debug, Clone, PartialEq, Eq)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn parse(text: &str) -> Option<Self> {
        let text = text.strip_prefix('v').unwrap_or(text);
        if text.is_empty() {
            return None;
        }

        let core = text.split_once('+').map_or(text, |(core, _)| core);
        let (numbers, pre) = match core.split_once('-') {
            Some((numbers, pre)) => (numbers, Some(pre)),
            None => (core, None),
        };

        let mut parts = numbers.split('.');
        let major = component(parts.next()?)?;
        let mut minor = match parts.next() {
            Some(part) => component(part)?,
            None => None,
        };
        let mut patch = match parts.next() {
            Some(part) => component(part)?,
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }

        if major.is_none() {
            minor = None;
        }
        if minor.is_none() {
            patch = None;
        }

        let pre = match pre {
            Some(pre) if !pre.is_empty() && patch.is_some() => Prerelease::new(pre).ok()?,
            Some(_) => return None,
            None => Prerelease::EMPTY,
        };

        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// The lowest version this partial covers
    fn lower(&self) -> Version {
        Version {
            major: self.major.unwrap_or(0),
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: BuildMetadata::EMPTY,
        }
    }
}

/// Parse one dotted component: `Some(None)` for a wildcard
fn component(text: &str) -> Option<Option<u64>> {
    match text {
        "x" | "X" | "*" => Some(None),
        _ if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            text.parse().ok().map(Some)
        }
        _ => None,
    }
}

/// Lowest possible version on a `major.minor.patch` tuple (`-0` pre-release)
fn floor(major: u64, minor: u64, patch: u64) -> Version {
    Version {
        major,
        minor,
        patch,
        pre: PRERELEASE_ZERO.clone(),
        build: BuildMetadata::EMPTY,
    }
}

fn next_major(major: u64) -> Version {
    floor(major.saturating_add(1), 0, 0)
}

fn next_minor(major: u64, minor: u64) -> Version {
    floor(major, minor.saturating_add(1), 0)
}

fn xrange(op: Op, partial: &Partial, set: &mut Vec<Comparator>) {
    if partial.is_full() {
        set.push(Comparator::new(op, partial.lower()));
        return;
    }

    match (op, partial.major, partial.minor) {
        (Op::Eq, None, _) | (Op::Gte, None, _) | (Op::Lte, None, _) => {}
        (Op::Gt, None, _) | (Op::Lt, None, _) => {
            set.push(Comparator::new(Op::Lt, floor(0, 0, 0)));
        }
        (Op::Eq, Some(major), None) => {
            set.push(Comparator::new(Op::Gte, partial.lower()));
            set.push(Comparator::new(Op::Lt, next_major(major)));
        }
        (Op::Eq, Some(major), Some(minor)) => {
            set.push(Comparator::new(Op::Gte, partial.lower()));
            set.push(Comparator::new(Op::Lt, next_minor(major, minor)));
        }
        (Op::Gt, Some(major), None) => {
            set.push(Comparator::new(
                Op::Gte,
                Version::new(major.saturating_add(1), 0, 0),
            ));
        }
        (Op::Gt, Some(major), Some(minor)) => {
            set.push(Comparator::new(
                Op::Gte,
                Version::new(major, minor.saturating_add(1), 0),
            ));
        }
        (Op::Gte, Some(_), _) => {
            set.push(Comparator::new(Op::Gte, partial.lower()));
        }
        (Op::Lt, Some(major), minor) => {
            set.push(Comparator::new(Op::Lt, floor(major, minor.unwrap_or(0), 0)));
        }
        (Op::Lte, Some(major), None) => {
            set.push(Comparator::new(Op::Lt, next_major(major)));
        }
        (Op::Lte, Some(major), Some(minor)) => {
            set.push(Comparator::new(Op::Lt, next_minor(major, minor)));
        }
    }
}

fn caret(partial: &Partial, set: &mut Vec<Comparator>) {
    let Some(major) = partial.major else {
        return;
    };

    let upper = match (partial.minor, partial.patch) {
        (None, _) => next_major(major),
        (Some(minor), None) if major == 0 => next_minor(0, minor),
        (Some(_), None) => next_major(major),
        (Some(_), Some(_)) if major != 0 => next_major(major),
        (Some(minor), Some(_)) if minor != 0 => next_minor(0, minor),
        (Some(_), Some(patch)) => floor(0, 0, patch.saturating_add(1)),
    };

    set.push(Comparator::new(Op::Gte, partial.lower()));
    set.push(Comparator::new(Op::Lt, upper));
}

fn tilde(partial: &Partial, set: &mut Vec<Comparator>) {
    let Some(major) = partial.major else {
        return;
    };

    let upper = match partial.minor {
        None => next_major(major),
        Some(minor) => next_minor(major, minor),
    };

    set.push(Comparator::new(Op::Gte, partial.lower()));
    set.push(Comparator::new(Op::Lt, upper));
}

fn hyphen(from: &str, to: &str, set: &mut Vec<Comparator>) -> Option<()> {
    let from = Partial::parse(from)?;
    let to = Partial::parse(to)?;

    if from.major.is_some() {
        set.push(Comparator::new(Op::Gte, from.lower()));
    }

    match (to.major, to.minor, to.patch) {
        (None, _, _) => {}
        (Some(major), None, _) => set.push(Comparator::new(Op::Lt, next_major(major))),
        (Some(major), Some(minor), None) => {
            set.push(Comparator::new(Op::Lt, next_minor(major, minor)))
        }
        (Some(_), Some(_), Some(_)) => set.push(Comparator::new(Op::Lte, to.lower())),
    }
    Some(())
}
