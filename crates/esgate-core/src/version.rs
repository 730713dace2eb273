//! Parsed server versions.
//!
//! Servers report `version.number` in a handful of shapes: plain releases
//! (`7.10.2`), pre-releases (`8.0.0-rc1`), two-component snapshots
//! (`7.14-SNAPSHOT`) and wildcard development builds (`7.x-SNAPSHOT`).
//! [`VersionSpec`] parses all of them into one totally ordered type so the
//! verification table can be written as plain range checks.
//!
//! Ordering follows semver precedence with one extension: a wildcard
//! component (`x`, `X`, `*`) sorts above every number in the same position,
//! so `7.x-SNAPSHOT` is newer than any numeric `7.*` release.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One minor or patch component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// A numeric component.
    Number(u64),
    /// A non-numeric placeholder; sorts above every number.
    Wildcard,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Wildcard => f.write_str("x"),
        }
    }
}

/// A version string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version {input:?}: {reason}")]
pub struct VersionParseError {
    pub input: String,
    pub reason: &'static str,
}

/// A parsed `major.minor.patch[-pre]` version.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    major: u64,
    minor: Segment,
    patch: Segment,
    pre: Option<Cow<'static, str>>,
}

impl VersionSpec {
    /// A plain release.
    pub const fn release(major: u64, minor: u64, patch: u64) -> Self {
        Self::from_parts(major, Segment::Number(minor), Segment::Number(patch), None)
    }

    /// A pre-release such as `7.14.0-SNAPSHOT`.
    pub const fn pre_release(major: u64, minor: u64, patch: u64, pre: &'static str) -> Self {
        Self::from_parts(
            major,
            Segment::Number(minor),
            Segment::Number(patch),
            Some(pre),
        )
    }

    pub const fn from_parts(
        major: u64,
        minor: Segment,
        patch: Segment,
        pre: Option<&'static str>,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: match pre {
                Some(p) => Some(Cow::Borrowed(p)),
                None => None,
            },
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> Segment {
        self.minor
    }

    pub fn patch(&self) -> Segment {
        self.patch
    }

    /// Pre-release tag, without the leading `-`.
    pub fn pre(&self) -> Option<&str> {
        self.pre.as_deref()
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre.is_some()
    }
}

impl FromStr for VersionSpec {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| VersionParseError {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let without_build = trimmed.split_once('+').map_or(trimmed, |(v, _)| v);
        let (core, pre) = match without_build.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (without_build, None),
        };

        if let Some(pre) = pre {
            if pre.split('.').any(str::is_empty) {
                return Err(fail("empty pre-release identifier"));
            }
        }

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(fail("more than three components"));
        }

        let major = parse_number(parts[0]).ok_or_else(|| fail("major is not a number"))?;
        let minor = parse_segment(parts.get(1).copied(), false)
            .ok_or_else(|| fail("minor is not a number or wildcard"))?;
        let patch = parse_segment(parts.get(2).copied(), minor == Segment::Wildcard)
            .ok_or_else(|| fail("patch is not a number or wildcard"))?;

        Ok(Self {
            major,
            minor,
            patch,
            pre: pre.map(|p| Cow::Owned(p.to_string())),
        })
    }
}

fn parse_number(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Missing components default to `0`, or to a wildcard after a wildcard.
fn parse_segment(raw: Option<&str>, after_wildcard: bool) -> Option<Segment> {
    match raw {
        None if after_wildcard => Some(Segment::Wildcard),
        None => Some(Segment::Number(0)),
        Some("x" | "X" | "*") => Some(Segment::Wildcard),
        Some(r) => {
            let n = parse_number(r)?;
            Some(if after_wildcard {
                Segment::Wildcard
            } else {
                Segment::Number(n)
            })
        }
    }
}

impl Ord for VersionSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.pre(), other.pre()) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => cmp_pre_release(a, b),
            })
    }
}

impl PartialOrd for VersionSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionSpec {}

fn cmp_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (parse_number(x), parse_number(y)) {
                    (Some(m), Some(n)) => m.cmp(&n),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.minor != Segment::Wildcard {
            write!(f, ".{}", self.patch)?;
        }
        if let Some(pre) = self.pre() {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionSpec {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_release() {
        let version = v("7.10.2");
        assert_eq!(version.major(), 7);
        assert_eq!(version.minor(), Segment::Number(10));
        assert_eq!(version.patch(), Segment::Number(2));
        assert!(!version.is_pre_release());
    }

    #[test]
    fn test_parse_two_component_snapshot() {
        let version = v("7.14-SNAPSHOT");
        assert_eq!(version, VersionSpec::pre_release(7, 14, 0, "SNAPSHOT"));
        assert_eq!(version.pre(), Some("SNAPSHOT"));
    }

    #[test]
    fn test_parse_wildcard_snapshot() {
        let version = v("7.x-SNAPSHOT");
        assert_eq!(version.minor(), Segment::Wildcard);
        assert_eq!(version.patch(), Segment::Wildcard);
        assert_eq!(version.to_string(), "7.x-SNAPSHOT");
    }

    #[test]
    fn test_parse_ignores_build_metadata() {
        assert_eq!(v("8.1.0+build.5"), VersionSpec::release(8, 1, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "v7.0.0", "7..1", "7.1.2.3", "7.0.0-", "7.0.0-a..b", "+7.0.0"] {
            assert!(bad.parse::<VersionSpec>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_parse_error_names_input() {
        let err = "7.one".parse::<VersionSpec>().unwrap_err();
        assert_eq!(err.input, "7.one");
        assert!(err.to_string().contains("7.one"));
    }

    #[test]
    fn test_numeric_components_compare_numerically() {
        assert!(v("7.9.0") < v("7.10.0"));
        assert!(v("6.8.23") < v("7.0.0"));
        assert!(v("10.0.0") > v("9.99.99"));
    }

    #[test]
    fn test_pre_release_sorts_below_release() {
        assert!(v("7.14.0-SNAPSHOT") < v("7.14.0"));
        assert!(v("6.0.0-rc1") < v("6.0.0"));
        assert!(v("7.13.4") < v("7.14.0-SNAPSHOT"));
    }

    #[test]
    fn test_wildcard_is_top_band_of_major() {
        assert!(v("7.x-SNAPSHOT") > v("7.17.22"));
        assert!(v("7.x-SNAPSHOT") > v("7.14.0-SNAPSHOT"));
        assert!(v("7.x-SNAPSHOT") < v("8.0.0"));
        assert!(v("7.14.x") > v("7.14.9"));
        assert!(v("7.14.x") < v("7.15.0"));
    }

    #[test]
    fn test_semver_precedence_chain() {
        let chain = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in chain.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_equality_is_consistent_with_ordering() {
        assert_eq!(v("7.14-SNAPSHOT"), v("7.14.0-SNAPSHOT"));
        assert_eq!(v("8.0.0-beta.01"), v("8.0.0-beta.1"));
        assert_ne!(v("8.0.0-beta"), v("8.0.0"));
    }
}
