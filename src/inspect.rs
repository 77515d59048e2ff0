//! End-to-end resolution for a project directory
//!
//! project loader → constraint → catalog → resolver

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::{self, ConfigError, InspectConfig};
use crate::project::{LoadError, ProjectLoader};
use crate::version::artifact::ArtifactChecker;
use crate::version::catalog::Catalog;
use crate::version::constraint::{Constraint, MatchMode};
use crate::version::diagnostics::Diagnostics;
use crate::version::error::{CatalogError, ResolveError, VersionError};
use crate::version::registries::{OciRegistryChecker, ReleasesApi};
use crate::version::registry::ReleaseIndex;
use crate::version::resolver::Resolver;
use crate::version::semver::Version;

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Constraint(#[from] VersionError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("resolution did not finish within {0:?}")]
    Timeout(Duration),
}

pub struct Inspector {
    loader: ProjectLoader,
    index: Arc<dyn ReleaseIndex>,
    resolver: Resolver,
    diagnostics: Arc<dyn Diagnostics>,
    registry: Option<String>,
    timeout: Option<Duration>,
}

impl Inspector {
    pub fn new(
        index: Arc<dyn ReleaseIndex>,
        checker: Arc<dyn ArtifactChecker>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            loader: ProjectLoader::new(),
            index,
            resolver: Resolver::new(checker, diagnostics.clone()),
            diagnostics,
            registry: None,
            timeout: None,
        }
    }

    /// Build the HTTP-backed inspector described by `config`
    pub fn from_config(
        config: &InspectConfig,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, InspectError> {
        config.validate()?;
        let client = config::http_client()?;

        let index = ReleasesApi::new(client.clone(), &config.releases.endpoint)?
            .with_page_limit(config.releases.page_limit)
            .with_diagnostics(diagnostics.clone());
        let checker =
            OciRegistryChecker::with_image(client, &config.image.namespace, &config.image.name);

        Ok(Self::new(Arc::new(index), Arc::new(checker), diagnostics)
            .with_mode(MatchMode::from_allow_prerelease(config.prerelease))
            .with_registry(config.image.registry.clone())
            .with_timeout(config.timeout()))
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.resolver = self.resolver.with_mode(mode);
        self
    }

    pub fn with_registry(mut self, registry: Option<String>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the newest version satisfying the project in `dir`.
    ///
    /// With a timeout set, in-flight requests are abandoned when it expires.
    pub async fn inspect(&self, dir: &Path) -> Result<Version, InspectError> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.run(dir))
                .await
                .map_err(|_| InspectError::Timeout(timeout))?,
            None => self.run(dir).await,
        }
    }

    async fn run(&self, dir: &Path) -> Result<Version, InspectError> {
        let required = self.loader.required_version(dir)?;
        let constraint = Constraint::parse(&required)?;
        debug!("Required version constraint: {}", constraint);

        let catalog = Catalog::fetch(self.index.as_ref(), self.diagnostics.as_ref()).await?;
        debug!("Fetched {} versions", catalog.len());

        let version = self
            .resolver
            .resolve(&constraint, catalog, self.registry.as_deref())
            .await?;
        Ok(version)
    }
}
