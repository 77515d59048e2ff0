//! OCI distribution API implementation of the artifact check
//!
//! An image exists when `GET /v2/<repository>/manifests/<tag>` succeeds.
//! Registries that answer `401` with a `Bearer` challenge get one retry with
//! an anonymous pull token.

use std::fmt;

use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{IMAGE_NAME, IMAGE_NAMESPACE};
use crate::version::artifact::ArtifactChecker;
use crate::version::error::ArtifactError;
use crate::version::semver::Version;

/// Manifest media types accepted when probing a tag
const MANIFEST_MEDIA_TYPES: [&str; 4] = [
    "application/vnd.oci.image.index.v1+json",
    "application/vnd.oci.image.manifest.v1+json",
    "application/vnd.docker.distribution.manifest.list.v2+json",
    "application/vnd.docker.distribution.manifest.v2+json",
];

/// Docker Hub serves the registry API from a different host than its name
const DOCKER_HUB_ALIASES: [&str; 2] = ["docker.io", "index.docker.io"];
const DOCKER_HUB_REGISTRY: &str = "registry-1.docker.io";

/// A fully qualified `<host>/<repository>:<tag>` image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    scheme: &'static str,
    host: String,
    repository: String,
    tag: String,
}

impl ImageReference {
    /// Build a reference from a registry location such as `docker.io`,
    /// `ghcr.io/mirror` or `http://localhost:5000`.
    pub fn new(
        registry: &str,
        namespace: &str,
        image: &str,
        tag: &str,
    ) -> Result<Self, ArtifactError> {
        let registry = registry.trim();

        let (scheme, location) = if let Some(rest) = registry.strip_prefix("https://") {
            (Some("https"), rest)
        } else if let Some(rest) = registry.strip_prefix("http://") {
            (Some("http"), rest)
        } else {
            (None, registry)
        };
        let location = location.trim_end_matches('/');

        let (host, prefix) = match location.split_once('/') {
            Some((host, prefix)) => (host, prefix.trim_matches('/')),
            None => (location, ""),
        };
        if host.is_empty() {
            return Err(ArtifactError::InvalidReference(format!(
                "registry {registry:?} has no host"
            )));
        }
        if tag.is_empty() {
            return Err(ArtifactError::InvalidReference(format!(
                "empty tag for {registry}/{namespace}/{image}"
            )));
        }

        let host = if DOCKER_HUB_ALIASES.contains(&host) {
            DOCKER_HUB_REGISTRY
        } else {
            host
        };
        let scheme = scheme.unwrap_or(if is_loopback(host) { "http" } else { "https" });

        let repository = if prefix.is_empty() {
            format!("{namespace}/{image}")
        } else {
            format!("{prefix}/{namespace}/{image}")
        };

        Ok(Self {
            scheme,
            host: host.to_string(),
            repository,
            tag: tag.to_string(),
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn manifest_url(&self) -> String {
        format!(
            "{}://{}/v2/{}/manifests/{}",
            self.scheme, self.host, self.repository, self.tag
        )
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.host, self.repository, self.tag)
    }
}

/// Local registries are reached over plain http unless a scheme is given
fn is_loopback(host: &str) -> bool {
    let name = if host.starts_with('[') {
        host.split_inclusive(']').next().unwrap_or(host)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    matches!(name, "localhost" | "127.0.0.1" | "[::1]") || name.ends_with(".localhost")
}

/// Token endpoint response; registries use either field name
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// Artifact checker speaking the OCI distribution protocol
pub struct OciRegistryChecker {
    client: reqwest::Client,
    namespace: String,
    image: String,
    /// Matches `key="value"` pairs of a `WWW-Authenticate` challenge
    challenge_param_re: Regex,
}

impl OciRegistryChecker {
    /// Creates a checker for `hashicorp/terraform` images
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_image(client, IMAGE_NAMESPACE, IMAGE_NAME)
    }

    pub fn with_image(client: reqwest::Client, namespace: &str, image: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            image: image.to_string(),
            challenge_param_re: Regex::new(r#"(\w+)="([^"]*)""#).unwrap(),
        }
    }

    async fn get_manifest(
        &self,
        reference: &ImageReference,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ArtifactError> {
        let mut request = self
            .client
            .get(reference.manifest_url())
            .header(ACCEPT, MANIFEST_MEDIA_TYPES.join(", "));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        request
            .send()
            .await
            .map_err(|source| ArtifactError::Network {
                reference: reference.to_string(),
                source,
            })
    }

    /// Request an anonymous pull token for the realm named in a Bearer challenge
    async fn fetch_token(
        &self,
        reference: &ImageReference,
        challenge: &str,
    ) -> Result<String, ArtifactError> {
        let Some(params) = challenge
            .trim()
            .strip_prefix("Bearer ")
            .or_else(|| challenge.trim().strip_prefix("bearer "))
        else {
            return Err(ArtifactError::Unauthorized(reference.to_string()));
        };

        let mut realm = None;
        let mut service = None;
        let mut scope = None;
        for caps in self.challenge_param_re.captures_iter(params) {
            let value = caps[2].to_string();
            match &caps[1] {
                "realm" => realm = Some(value),
                "service" => service = Some(value),
                "scope" => scope = Some(value),
                _ => {}
            }
        }

        let realm = realm.ok_or_else(|| ArtifactError::InvalidResponse {
            reference: reference.to_string(),
            reason: "bearer challenge without realm".to_string(),
        })?;
        let mut url = Url::parse(&realm).map_err(|e| ArtifactError::InvalidResponse {
            reference: reference.to_string(),
            reason: format!("invalid token realm {realm:?}: {e}"),
        })?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(service) = &service {
                query.append_pair("service", service);
            }
            let scope = scope
                .unwrap_or_else(|| format!("repository:{}:pull", reference.repository()));
            query.append_pair("scope", &scope);
        }

        debug!("Requesting registry token: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ArtifactError::Network {
                reference: reference.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ArtifactError::Unauthorized(reference.to_string()));
        }

        let body: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| ArtifactError::InvalidResponse {
                    reference: reference.to_string(),
                    reason: e.to_string(),
                })?;

        body.token
            .or(body.access_token)
            .ok_or_else(|| ArtifactError::InvalidResponse {
                reference: reference.to_string(),
                reason: "token response without token".to_string(),
            })
    }
}

#[async_trait::async_trait]
impl ArtifactChecker for OciRegistryChecker {
    async fn check(&self, registry: &str, version: &Version) -> Result<bool, ArtifactError> {
        let reference =
            ImageReference::new(registry, &self.namespace, &self.image, &version.to_string())?;
        debug!("Checking image: {}", reference);

        let mut response = self.get_manifest(&reference, None).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let token = self.fetch_token(&reference, &challenge).await?;
            response = self.get_manifest(&reference, Some(&token)).await?;
        }

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ArtifactError::Unauthorized(reference.to_string()))
            }
            status => {
                warn!("Registry returned status {}: {}", status, reference);
                Err(ArtifactError::UnexpectedStatus {
                    reference: reference.to_string(),
                    status: status.as_u16(),
                })
            }
        }
    }
}
