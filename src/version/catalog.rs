//! Catalog of published versions assembled from a release index

use std::pin::pin;

use futures::TryStreamExt;

use crate::version::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::version::error::CatalogError;
use crate::version::registry::{ReleaseIndex, pages};
use crate::version::semver::Version;

/// Every successfully parsed version of the index, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    versions: Vec<Version>,
}

impl Catalog {
    pub fn new(versions: Vec<Version>) -> Self {
        Self { versions }
    }

    /// Walk all pages of `index` and parse each release version.
    ///
    /// Records with unparsable versions are reported and skipped; any
    /// transport or protocol error aborts the fetch.
    pub async fn fetch(
        index: &dyn ReleaseIndex,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Self, CatalogError> {
        let mut versions = Vec::new();
        let mut stream = pin!(pages(index));

        while let Some(releases) = stream.try_next().await? {
            versions.reserve(releases.len());
            for release in releases {
                match Version::parse(&release.version) {
                    Ok(version) => versions.push(version),
                    Err(e) => diagnostics.record(DiagnosticEvent::MalformedRelease {
                        version: release.version,
                        reason: e.to_string(),
                    }),
                }
            }
        }

        Ok(Self { versions })
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Versions ordered from highest to lowest precedence.
    ///
    /// The sort is stable, so versions of equal precedence keep arrival order.
    pub fn into_sorted_descending(self) -> Vec<Version> {
        let mut versions = self.versions;
        versions.sort_by(|a, b| b.cmp(a));
        versions
    }
}

impl FromIterator<Version> for Catalog {
    fn from_iter<I: IntoIterator<Item = Version>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
