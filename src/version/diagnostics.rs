//! Diagnostics sink injected into the fetcher and resolver
//!
//! Components report what they skipped or decided through a [`Diagnostics`]
//! implementation instead of a global logger. The CLI forwards events to
//! `tracing`; tests collect them with [`RecordingDiagnostics`].

use std::sync::Mutex;

use tracing::{debug, error, warn};

/// Outcome of checking a single catalog candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Satisfies the constraint and, if requested, the artifact exists
    Matched,
    RejectedByConstraint,
    RejectedByAvailability,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// One page of the release index was received
    PageFetched { url: String, releases: usize },
    /// A release record whose version could not be parsed was skipped
    MalformedRelease { version: String, reason: String },
    CandidateEvaluated {
        version: String,
        evaluation: Evaluation,
    },
    /// The artifact for a matching candidate is missing or could not be checked
    ArtifactUnavailable {
        registry: String,
        version: String,
        reason: Option<String>,
    },
    Resolved { version: String, constraint: String },
}

pub trait Diagnostics: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::PageFetched { url, releases } => {
                debug!(%url, releases, "Got release list");
            }
            DiagnosticEvent::MalformedRelease { version, reason } => {
                error!(%version, %reason, "Failed to parse the given terraform version");
            }
            DiagnosticEvent::CandidateEvaluated {
                version,
                evaluation,
            } => {
                debug!(%version, ?evaluation, "Check version");
            }
            DiagnosticEvent::ArtifactUnavailable {
                registry,
                version,
                reason,
            } => match reason {
                Some(reason) => error!(%registry, %version, %reason, "No image found"),
                None => warn!(%registry, %version, "No image found"),
            },
            DiagnosticEvent::Resolved {
                version,
                constraint,
            } => {
                debug!(%version, %constraint, "Required version found");
            }
        }
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Keeps every event in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, event: DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_diagnostics_keeps_events_in_order() {
        let diagnostics = RecordingDiagnostics::new();

        diagnostics.record(DiagnosticEvent::PageFetched {
            url: "http://index/releases".to_string(),
            releases: 20,
        });
        diagnostics.record(DiagnosticEvent::MalformedRelease {
            version: "banana".to_string(),
            reason: "unexpected character".to_string(),
        });

        let events = diagnostics.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            DiagnosticEvent::PageFetched { releases: 20, .. }
        ));
        assert!(matches!(events[1], DiagnosticEvent::MalformedRelease { .. }));
    }

    #[test]
    fn null_and_tracing_diagnostics_accept_events() {
        let event = DiagnosticEvent::ArtifactUnavailable {
            registry: "docker.io".to_string(),
            version: "1.3.9".to_string(),
            reason: None,
        };

        NullDiagnostics.record(event.clone());
        TracingDiagnostics.record(event);
    }
}
