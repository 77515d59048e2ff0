//! Newest-satisfying-version resolver
//!
//! Walks the catalog from the highest version down and returns the first
//! candidate that satisfies the constraint and, when a registry is given,
//! has a published image there.

use std::sync::Arc;

use crate::version::artifact::ArtifactChecker;
use crate::version::catalog::Catalog;
use crate::version::constraint::{Constraint, MatchMode};
use crate::version::diagnostics::{DiagnosticEvent, Diagnostics, Evaluation};
use crate::version::error::ResolveError;
use crate::version::semver::Version;

pub struct Resolver {
    checker: Arc<dyn ArtifactChecker>,
    diagnostics: Arc<dyn Diagnostics>,
    mode: MatchMode,
}

impl Resolver {
    pub fn new(checker: Arc<dyn ArtifactChecker>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            checker,
            diagnostics,
            mode: MatchMode::Strict,
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Decide a single candidate.
    ///
    /// The registry is only consulted for constraint matches. A missing image
    /// and a failed lookup both reject the candidate without failing.
    pub async fn evaluate(
        &self,
        constraint: &Constraint,
        candidate: &Version,
        registry: Option<&str>,
    ) -> Evaluation {
        if !constraint.matches(candidate, self.mode) {
            return Evaluation::RejectedByConstraint;
        }

        let Some(registry) = registry else {
            return Evaluation::Matched;
        };

        let reason = match self.checker.check(registry, candidate).await {
            Ok(true) => return Evaluation::Matched,
            Ok(false) => None,
            Err(e) => Some(e.to_string()),
        };
        self.diagnostics.record(DiagnosticEvent::ArtifactUnavailable {
            registry: registry.to_string(),
            version: candidate.to_string(),
            reason,
        });
        Evaluation::RejectedByAvailability
    }

    /// Return the highest version of `catalog` accepted by [`Self::evaluate`].
    ///
    /// An empty or blank `registry` disables the availability check.
    pub async fn resolve(
        &self,
        constraint: &Constraint,
        catalog: Catalog,
        registry: Option<&str>,
    ) -> Result<Version, ResolveError> {
        let registry = registry.map(str::trim).filter(|r| !r.is_empty());

        for candidate in catalog.into_sorted_descending() {
            let evaluation = self.evaluate(constraint, &candidate, registry).await;
            self.diagnostics.record(DiagnosticEvent::CandidateEvaluated {
                version: candidate.to_string(),
                evaluation,
            });

            if evaluation == Evaluation::Matched {
                self.diagnostics.record(DiagnosticEvent::Resolved {
                    version: candidate.to_string(),
                    constraint: constraint.to_string(),
                });
                return Ok(candidate);
            }
        }

        Err(ResolveError::NoMatchingVersion {
            constraint: constraint.to_string(),
        })
    }
}
