//! Terraform project configuration
//!
//! Only the declared core version is read; nothing else in the configuration
//! is interpreted.

pub mod hcl;
pub mod loader;
pub mod tf_json;
pub mod traits;

pub use loader::{LoadError, ProjectLoader, load_required_version};
