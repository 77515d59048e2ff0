//! HashiCorp releases API implementation
//!
//! `GET /v1/releases/terraform?limit=20` returns the newest releases first;
//! older pages are requested with `after=<timestamp_created of the last record>`.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{RELEASE_LIST_LIMIT, RESPONSE_CONTENT_TYPE};
use crate::version::diagnostics::{DiagnosticEvent, Diagnostics, TracingDiagnostics};
use crate::version::error::CatalogError;
use crate::version::registry::{PageRequest, Release, ReleaseIndex};

/// Error payload returned with non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    code: i64,
    message: String,
}

/// Release index backed by the HashiCorp releases API
pub struct ReleasesApi {
    client: reqwest::Client,
    endpoint: Url,
    page_limit: usize,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ReleasesApi {
    /// Creates a new ReleasesApi for the given endpoint URL
    pub fn new(client: reqwest::Client, endpoint: &str) -> Result<Self, CatalogError> {
        let endpoint = Url::parse(endpoint).map_err(|e| CatalogError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            page_limit: RELEASE_LIST_LIMIT,
            diagnostics: Arc::new(TracingDiagnostics),
        })
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Build the URL for a page; `limit` is always sent, `after` only with a cursor
    fn page_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(cursor) = request.cursor() {
                query.append_pair("after", &format_cursor(&cursor));
            }
            query.append_pair("limit", &request.limit().to_string());
        }
        url
    }
}

/// Format a cursor as RFC 3339 with nanosecond precision and trailing zeros
/// trimmed, e.g. `2022-10-19T17:54:15.486Z` or `2022-02-02T20:46:14Z`.
pub fn format_cursor(cursor: &DateTime<Utc>) -> String {
    let formatted = cursor.to_rfc3339_opts(SecondsFormat::Nanos, true);
    match formatted
        .strip_suffix('Z')
        .and_then(|rest| rest.split_once('.'))
    {
        Some((seconds, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{seconds}Z")
            } else {
                format!("{seconds}.{fraction}Z")
            }
        }
        None => formatted,
    }
}

/// Compare the media type essence only, ignoring parameters such as charset
fn is_expected_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(RESPONSE_CONTENT_TYPE))
}

#[async_trait::async_trait]
impl ReleaseIndex for ReleasesApi {
    fn page_limit(&self) -> usize {
        self.page_limit
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Release>, CatalogError> {
        let url = self.page_url(request);
        debug!("Fetching release list: {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, RESPONSE_CONTENT_TYPE)
            .send()
            .await
            .map_err(|source| CatalogError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|source| CatalogError::Network {
                url: url.to_string(),
                source,
            })?;

        if !is_expected_content_type(&content_type) {
            warn!(
                "Release index returned content type {:?}: {}",
                content_type, url
            );
            return Err(CatalogError::UnexpectedContentType {
                url: url.to_string(),
                status: status.as_u16(),
                content_type,
            });
        }

        if !status.is_success() {
            warn!("Release index returned status {}: {}", status, url);
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error) => CatalogError::Server {
                    url: url.to_string(),
                    code: error.code,
                    message: error.message,
                },
                Err(_) => CatalogError::UnexpectedStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let releases: Vec<Release> = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse release list response: {}", e);
            CatalogError::InvalidResponse {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        self.diagnostics.record(DiagnosticEvent::PageFetched {
            url: url.to_string(),
            releases: releases.len(),
        });

        Ok(releases)
    }
}
