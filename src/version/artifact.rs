//! Artifact availability trait

#[cfg(test)]
use mockall::automock;

use crate::version::error::ArtifactError;
use crate::version::semver::Version;

/// Trait for checking whether a runtime image exists for a version
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ArtifactChecker: Send + Sync {
    /// Checks `<registry>/<namespace>/<image>:<version>`
    ///
    /// # Returns
    /// * `Ok(true)` - The image exists
    /// * `Ok(false)` - The registry reports the image as not found
    /// * `Err(ArtifactError)` - Transport, auth or protocol failure
    async fn check(&self, registry: &str, version: &Version) -> Result<bool, ArtifactError>;
}
