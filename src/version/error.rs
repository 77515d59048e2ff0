use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Invalid version {input:?}: {reason}")]
    InvalidVersion { input: String, reason: String },

    #[error("Invalid constraint {input:?}: {reason}")]
    InvalidConstraint { input: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid release index endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Network error while fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Wrong response content type {content_type:?} from {url} (status {status})")]
    UnexpectedContentType {
        url: String,
        status: u16,
        content_type: String,
    },

    #[error("Release index error {code} from {url}: {message}")]
    Server {
        url: String,
        code: i64,
        message: String,
    },

    #[error("Unexpected status {status} from {url}: {body}")]
    UnexpectedStatus { url: String, status: u16, body: String },

    #[error("Invalid response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Invalid image reference: {0}")]
    InvalidReference(String),

    #[error("Network error while checking {reference}: {source}")]
    Network {
        reference: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unauthorized to read {0}")]
    Unauthorized(String),

    #[error("Unexpected status {status} while checking {reference}")]
    UnexpectedStatus { reference: String, status: u16 },

    #[error("Invalid registry response for {reference}: {reason}")]
    InvalidResponse { reference: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Unsupported terraform core version: nothing satisfies {constraint:?}")]
    NoMatchingVersion { constraint: String },
}
