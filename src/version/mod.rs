//! Version resolution layer
//!
//! Fetches the release catalog, models versions and constraints, and picks the
//! newest release that satisfies a project's declared constraint.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ ReleaseIndex │────▶│   Catalog   │────▶│   Resolver   │
//! │   (pages)    │     │ (versions)  │     │ (newest hit) │
//! └──────────────┘     └─────────────┘     └──────────────┘
//!        │                                        │
//!        ▼                                        ▼
//! ┌──────────────┐                         ┌──────────────┐
//! │  Registries  │                         │ArtifactChecker│
//! │(releases,oci)│                         │   (images)   │
//! └──────────────┘                         └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: Version parsing and precedence
//! - [`constraint`]: Constraint parsing and matching in strict and core-only modes
//! - [`registry`]: Release index trait and page requests
//! - [`catalog`]: Accumulated versions across pages
//! - [`artifact`]: Image availability trait
//! - [`registries`]: HTTP implementations of the index and the availability check
//! - [`resolver`]: Newest satisfying version selection
//! - [`diagnostics`]: Observation sink for resolution events
//! - [`error`]: Error types

pub mod artifact;
pub mod catalog;
pub mod constraint;
pub mod diagnostics;
pub mod error;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod semver;
