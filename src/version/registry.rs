//! Release index trait and cursor-based pagination over it

#[cfg(test)]
use mockall::automock;

use chrono::{DateTime, Utc};
use futures::Stream;
use futures::stream;
use serde::Deserialize;

use crate::version::error::CatalogError;

/// A raw release record as published by the index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub version: String,
    /// Only used as the pagination cursor
    #[serde(default)]
    pub timestamp_created: Option<DateTime<Utc>>,
}

impl Release {
    pub fn new(version: &str, timestamp_created: Option<DateTime<Utc>>) -> Self {
        Self {
            version: version.to_string(),
            timestamp_created,
        }
    }
}

/// Parameters of a single page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    after: Option<DateTime<Utc>>,
    limit: usize,
}

impl PageRequest {
    /// Request for the first page of the index
    pub fn first(limit: usize) -> Self {
        Self { after: None, limit }
    }

    /// Request for the page following `cursor`
    pub fn after(cursor: DateTime<Utc>, limit: usize) -> Self {
        Self {
            after: Some(cursor),
            limit,
        }
    }

    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        self.after
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The request that follows a page holding `releases`, or `None` when the
    /// page is the last one: it is shorter than the limit or its last record
    /// carries no timestamp.
    pub fn next(&self, releases: &[Release]) -> Option<Self> {
        if releases.len() < self.limit.max(1) {
            return None;
        }
        releases
            .last()
            .and_then(|release| release.timestamp_created)
            .map(|cursor| Self::after(cursor, self.limit))
    }
}

/// A fetched page together with the request for the page after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub releases: Vec<Release>,
    pub next: Option<PageRequest>,
}

/// Trait for fetching pages of release records from a remote index
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseIndex: Send + Sync {
    /// Page size requested from the index
    fn page_limit(&self) -> usize;

    /// Fetches the release records of a single page
    ///
    /// # Returns
    /// * `Ok(Vec<Release>)` - Records in the order the index returned them
    /// * `Err(CatalogError)` - Transport, content type or server failure
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Release>, CatalogError>;
}

/// Fetch the page described by `request` and compute its successor
pub async fn next_page(
    index: &dyn ReleaseIndex,
    request: &PageRequest,
) -> Result<Page, CatalogError> {
    let releases = index.fetch_page(request).await?;
    let next = request.next(&releases);
    Ok(Page { releases, next })
}

/// Lazy sequence of pages, starting from the first page each time it is called.
///
/// The stream ends after the last page or after the first error.
pub fn pages(
    index: &dyn ReleaseIndex,
) -> impl Stream<Item = Result<Vec<Release>, CatalogError>> + Send + '_ {
    let first = PageRequest::first(index.page_limit());
    stream::try_unfold(Some(first), move |request| async move {
        let Some(request) = request else {
            return Ok::<_, CatalogError>(None);
        };
        let page = next_page(index, &request).await?;
        Ok(Some((page.releases, page.next)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn timestamp(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn releases(count: usize, last_timestamp: Option<&str>) -> Vec<Release> {
        (0..count)
            .map(|i| {
                let ts = if i + 1 == count {
                    last_timestamp.map(timestamp)
                } else {
                    Some(timestamp("2023-01-01T00:00:00Z"))
                };
                Release::new(&format!("1.0.{i}"), ts)
            })
            .collect()
    }

    #[test]
    fn release_deserializes_with_and_without_timestamp() {
        let parsed: Vec<Release> = serde_json::from_str(
            r#"[
                {"version": "1.4.6", "timestamp_created": "2023-04-26T18:26:07.947Z"},
                {"version": "1.4.5", "timestamp_created": null},
                {"version": "1.4.4"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            parsed,
            vec![
                Release::new("1.4.6", Some(timestamp("2023-04-26T18:26:07.947Z"))),
                Release::new("1.4.5", None),
                Release::new("1.4.4", None),
            ]
        );
    }

    #[test]
    fn next_uses_last_timestamp_of_full_page() {
        let request = PageRequest::first(3);
        let page = releases(3, Some("2022-10-19T17:54:15.486Z"));

        assert_eq!(
            request.next(&page),
            Some(PageRequest::after(timestamp("2022-10-19T17:54:15.486Z"), 3))
        );
    }

    #[test]
    fn next_stops_on_short_page() {
        let request = PageRequest::first(3);
        assert_eq!(request.next(&releases(2, Some("2022-10-19T17:54:15Z"))), None);
    }

    #[test]
    fn next_stops_on_empty_page() {
        assert_eq!(PageRequest::first(3).next(&[]), None);
    }

    #[test]
    fn next_stops_on_null_cursor() {
        let request = PageRequest::first(3);
        assert_eq!(request.next(&releases(3, None)), None);
    }

    #[tokio::test]
    async fn pages_follows_cursors_until_short_page() {
        let mut index = MockReleaseIndex::new();
        index.expect_page_limit().return_const(2usize);
        index
            .expect_fetch_page()
            .times(3)
            .returning(|request: &PageRequest| {
                let page = match request.cursor().map(|c| c.to_rfc3339()) {
                    None => vec![
                        Release::new("1.0.2", Some(timestamp("2023-03-01T00:00:00Z"))),
                        Release::new("1.0.1", Some(timestamp("2023-02-01T00:00:00Z"))),
                    ],
                    Some(c) if c.starts_with("2023-02-01") => vec![
                        Release::new("1.0.0", Some(timestamp("2023-01-01T00:00:00Z"))),
                        Release::new("0.9.0", Some(timestamp("2022-12-01T00:00:00Z"))),
                    ],
                    Some(_) => vec![Release::new("0.8.0", None)],
                };
                Ok(page)
            });

        let fetched: Vec<Vec<Release>> = pages(&index).try_collect().await.unwrap();

        let versions: Vec<Vec<&str>> = fetched
            .iter()
            .map(|page| page.iter().map(|r| r.version.as_str()).collect())
            .collect();
        assert_eq!(
            versions,
            vec![vec!["1.0.2", "1.0.1"], vec!["1.0.0", "0.9.0"], vec!["0.8.0"]]
        );
    }

    #[tokio::test]
    async fn pages_stops_at_first_error() {
        let mut index = MockReleaseIndex::new();
        index.expect_page_limit().return_const(20usize);
        index.expect_fetch_page().times(1).returning(|_| {
            Err(CatalogError::InvalidResponse {
                url: "http://index".to_string(),
                reason: "boom".to_string(),
            })
        });

        let result: Result<Vec<Vec<Release>>, CatalogError> = pages(&index).try_collect().await;

        assert!(matches!(result, Err(CatalogError::InvalidResponse { .. })));
    }
}
