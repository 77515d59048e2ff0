use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::version::error::VersionError;

/// A parsed semantic version.
///
/// Ordering and equality follow SemVer precedence: build metadata is carried
/// along for display but never compared.
#[derive(Debug, Clone)]
pub struct Version {
    inner: ::semver::Version,
    /// Number of core segments written in the source string (1 to 3)
    specified: usize,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            inner: ::semver::Version::new(major, minor, patch),
            specified: 3,
        }
    }

    /// Parse a version string, normalizing partial versions.
    ///
    /// A leading `v` is accepted and partial versions are padded with zeros:
    /// - "1" -> 1.0.0
    /// - "v1.2" -> 1.2.0
    /// - "1.2-beta1" -> 1.2.0-beta1
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        let stripped = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let core_end = stripped
            .find(|c| c == '-' || c == '+')
            .unwrap_or(stripped.len());
        let (core, suffix) = stripped.split_at(core_end);
        let specified = core.split('.').count();

        let normalized = match specified {
            1 => format!("{core}.0.0{suffix}"),
            2 => format!("{core}.0{suffix}"),
            _ => stripped.to_string(),
        };

        let inner =
            ::semver::Version::parse(&normalized).map_err(|e| VersionError::InvalidVersion {
                input: input.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            inner,
            specified: specified.min(3),
        })
    }

    /// Core segments as `[major, minor, patch]`
    pub fn segments(&self) -> [u64; 3] {
        [self.inner.major, self.inner.minor, self.inner.patch]
    }

    /// How many core segments were present in the parsed string
    pub fn specified_segments(&self) -> usize {
        self.specified
    }

    pub fn prerelease(&self) -> &str {
        self.inner.pre.as_str()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.inner.pre.is_empty()
    }

    pub fn build(&self) -> &str {
        self.inner.build.as_str()
    }

    /// The same version with prerelease and build metadata removed
    pub fn core(&self) -> Self {
        Self::new(self.inner.major, self.inner.minor, self.inner.patch)
    }

    /// True when major, minor and patch are equal, regardless of prerelease
    pub fn same_core(&self, other: &Self) -> bool {
        self.segments() == other.segments()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments()
            .cmp(&other.segments())
            // semver::Prerelease orders an empty prerelease above any non-empty one
            .then_with(|| self.inner.pre.cmp(&other.inner.pre))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", [1, 2, 3], "", 3)]
    #[case("v1.2.3", [1, 2, 3], "", 3)]
    #[case("1.2", [1, 2, 0], "", 2)]
    #[case("1", [1, 0, 0], "", 1)]
    #[case("1.5.0-alpha20230405", [1, 5, 0], "alpha20230405", 3)]
    #[case("1.2.0-alpha-20220328", [1, 2, 0], "alpha-20220328", 3)]
    #[case("1.2-beta1", [1, 2, 0], "beta1", 2)]
    #[case(" 1.4.6 ", [1, 4, 6], "", 3)]
    fn parse_accepts_valid_versions(
        #[case] input: &str,
        #[case] segments: [u64; 3],
        #[case] prerelease: &str,
        #[case] specified: usize,
    ) {
        let version = Version::parse(input).unwrap();
        assert_eq!(version.segments(), segments);
        assert_eq!(version.prerelease(), prerelease);
        assert_eq!(version.specified_segments(), specified);
    }

    #[rstest]
    #[case("")]
    #[case("latest")]
    #[case("1.2.3.4")]
    #[case("1..3")]
    #[case("1.2.x")]
    #[case("1.2.3-")]
    fn parse_rejects_invalid_versions(#[case] input: &str) {
        assert!(matches!(
            Version::parse(input),
            Err(VersionError::InvalidVersion { .. })
        ));
    }

    #[rstest]
    #[case("1.2.3", "1.2.4", Ordering::Less)]
    #[case("1.10.0", "1.9.9", Ordering::Greater)]
    #[case("2.0.0", "10.0.0", Ordering::Less)]
    #[case("1.4.0-rc1", "1.4.0", Ordering::Less)]
    #[case("1.4.0-beta2", "1.4.0-rc1", Ordering::Less)]
    #[case("1.4.0-alpha.2", "1.4.0-alpha.10", Ordering::Less)]
    #[case("1.4.0-alpha", "1.4.0-alpha.1", Ordering::Less)]
    #[case("1.4.0-rc1", "1.3.9", Ordering::Greater)]
    #[case("1.2.3+build.1", "1.2.3+build.2", Ordering::Equal)]
    #[case("v1.2", "1.2.0", Ordering::Equal)]
    fn cmp_follows_semver_precedence(
        #[case] left: &str,
        #[case] right: &str,
        #[case] expected: Ordering,
    ) {
        let left = Version::parse(left).unwrap();
        let right = Version::parse(right).unwrap();

        assert_eq!(left.cmp(&right), expected);
        assert_eq!(right.cmp(&left), expected.reverse());
    }

    #[test]
    fn cmp_is_transitive_across_sorted_sample() {
        let mut versions: Vec<Version> = [
            "1.4.0",
            "1.4.0-alpha20221109",
            "1.3.9",
            "1.4.0-rc1",
            "1.4.0-beta1",
            "0.15.5",
            "1.4.0-beta2",
        ]
        .iter()
        .map(|v| Version::parse(v).unwrap())
        .collect();
        versions.sort();

        for (i, a) in versions.iter().enumerate() {
            for b in &versions[i..] {
                assert!(a <= b, "{a} should not sort above {b}");
            }
        }
        assert_eq!(versions.first().unwrap().to_string(), "0.15.5");
        assert_eq!(versions.last().unwrap().to_string(), "1.4.0");
    }

    #[rstest]
    #[case("1.2.3")]
    #[case("v0.12")]
    #[case("1.5.0-alpha20230405")]
    #[case("1.2.3-rc.1+sha.5114f85")]
    fn display_round_trips_through_parse(#[case] input: &str) {
        let version = Version::parse(input).unwrap();
        let reparsed = Version::parse(&version.to_string()).unwrap();

        assert_eq!(reparsed, version);
        assert_eq!(reparsed.to_string(), version.to_string());
    }

    #[test]
    fn core_strips_prerelease_and_build() {
        let version = Version::parse("1.4.0-rc1+abc").unwrap();

        let core = version.core();

        assert_eq!(core.to_string(), "1.4.0");
        assert!(!core.is_prerelease());
        assert!(version.same_core(&core));
    }
}
