//! Terraform-style version constraints
//!
//! Supports the `required_version` syntax:
//! - `1.2.3`, `= 1.2.3` - exact match
//! - `!= 1.2.3` - anything but this version
//! - `> 1.2.3`, `>= 1.2.3`, `< 1.2.3`, `<= 1.2.3` - comparison operators
//! - `~> 1.2.0` - pessimistic: >= 1.2.0 < 1.3.0 (`~> 1.2` means >= 1.2 < 2.0)
//!
//! Clauses are separated by commas and must all match.

use std::fmt;
use std::str::FromStr;

use crate::version::error::VersionError;
use crate::version::semver::Version;

/// Comparison operators for a single constraint clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    /// `~>`: allows only the rightmost written segment to increase
    Pessimistic,
}

impl Operator {
    /// Split a leading operator off a clause, defaulting to `Equal`
    fn split(clause: &str) -> (Self, &str) {
        // Two-character operators must be tried first
        const PREFIXES: [(&str, Operator); 7] = [
            ("~>", Operator::Pessimistic),
            (">=", Operator::GreaterThanOrEqual),
            ("<=", Operator::LessThanOrEqual),
            ("!=", Operator::NotEqual),
            (">", Operator::GreaterThan),
            ("<", Operator::LessThan),
            ("=", Operator::Equal),
        ];

        PREFIXES
            .iter()
            .find_map(|(prefix, op)| clause.strip_prefix(prefix).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Equal, clause))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::Pessimistic => "~>",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How prerelease candidates are treated while matching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Prerelease candidates only match clauses whose operand names a
    /// prerelease of the same core version
    #[default]
    Strict,
    /// Prerelease and build metadata are stripped from the candidate before
    /// matching, answering "would this satisfy the constraint once promoted"
    CoreOnly,
}

impl MatchMode {
    pub fn from_allow_prerelease(allow_prerelease: bool) -> Self {
        if allow_prerelease {
            MatchMode::CoreOnly
        } else {
            MatchMode::Strict
        }
    }
}

/// One `operator version` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    operator: Operator,
    operand: Version,
}

impl Clause {
    fn parse(input: &str, clause: &str) -> Result<Self, VersionError> {
        let clause = clause.trim();
        if clause.is_empty() {
            return Err(VersionError::InvalidConstraint {
                input: input.to_string(),
                reason: "empty clause".to_string(),
            });
        }

        let (operator, operand) = Operator::split(clause);
        let operand = Version::parse(operand).map_err(|e| VersionError::InvalidConstraint {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { operator, operand })
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operand(&self) -> &Version {
        &self.operand
    }

    /// Check a candidate using strict prerelease rules
    pub fn matches(&self, version: &Version) -> bool {
        let operand = &self.operand;
        match self.operator {
            Operator::Equal => version == operand,
            Operator::NotEqual => version != operand,
            Operator::GreaterThan => prerelease_compatible(version, operand) && version > operand,
            Operator::GreaterThanOrEqual => {
                prerelease_compatible(version, operand) && version >= operand
            }
            Operator::LessThan => prerelease_compatible(version, operand) && version < operand,
            Operator::LessThanOrEqual => {
                prerelease_compatible(version, operand) && version <= operand
            }
            Operator::Pessimistic => pessimistic(version, operand),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.operand)
    }
}

/// A prerelease candidate is only comparable with a prerelease operand of the
/// same core version; stable candidates compare with anything.
fn prerelease_compatible(version: &Version, operand: &Version) -> bool {
    match (operand.is_prerelease(), version.is_prerelease()) {
        (true, true) => version.same_core(operand),
        (false, true) => false,
        _ => true,
    }
}

fn pessimistic(version: &Version, operand: &Version) -> bool {
    if !prerelease_compatible(version, operand) {
        return false;
    }
    // A prerelease operand restricts matches to prereleases and vice versa
    if operand.is_prerelease() != version.is_prerelease() {
        return false;
    }
    if version < operand {
        return false;
    }

    let specified = operand.specified_segments();
    let candidate = version.segments();
    let bound = operand.segments();

    if candidate[..specified - 1] != bound[..specified - 1] {
        return false;
    }
    candidate[specified - 1] >= bound[specified - 1]
}

/// A comma-joined group of clauses that must all match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    source: String,
    clauses: Vec<Clause>,
}

impl Constraint {
    /// Parse a constraint such as `">= 1.3.0, < 1.4.0"`
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        if input.trim().is_empty() {
            return Err(VersionError::InvalidConstraint {
                input: input.to_string(),
                reason: "constraint is empty".to_string(),
            });
        }

        let clauses = input
            .split(',')
            .map(|clause| Clause::parse(input, clause))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: input.trim().to_string(),
            clauses,
        })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// The constraint exactly as it was written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, version: &Version, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Strict => self.matches_strict(version),
            MatchMode::CoreOnly => self.matches_core(version),
        }
    }

    /// Every clause must match; prerelease candidates are rejected unless a
    /// clause names a prerelease of the same core version.
    pub fn matches_strict(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }

    /// Match the candidate's core version only. Operands keep their prerelease.
    pub fn matches_core(&self, version: &Version) -> bool {
        self.matches_strict(&version.core())
    }
}

impl FromStr for Constraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
