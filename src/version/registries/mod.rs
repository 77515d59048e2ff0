//! HTTP implementations of the release index and the image check

pub mod oci;
pub mod releases;

pub use oci::{ImageReference, OciRegistryChecker};
pub use releases::ReleasesApi;
