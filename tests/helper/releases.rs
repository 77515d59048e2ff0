//! Release index test utilities

use mockito::{Matcher, Mock, ServerGuard};

use tf_version_inspect::config::{InspectConfig, ReleasesConfig};

pub const RELEASES_PATH: &str = "/v1/releases/terraform";

const PAGES: [(Option<&str>, &str); 3] = [
    (None, include_str!("../fixtures/releases_page_1.json")),
    (
        Some("2022-10-19T17:54:15.486Z"),
        include_str!("../fixtures/releases_page_2.json"),
    ),
    (
        Some("2022-05-18T21:47:46.272Z"),
        include_str!("../fixtures/releases_page_3.json"),
    ),
];

/// Serve the three fixture pages (20, 20 and 10 releases), each expected once
pub async fn mock_release_pages(server: &mut ServerGuard) -> Vec<Mock> {
    let mut mocks = Vec::with_capacity(PAGES.len());

    for (cursor, body) in PAGES {
        let query = match cursor {
            None => Matcher::Exact("limit=20".to_string()),
            Some(cursor) => Matcher::AllOf(vec![
                Matcher::UrlEncoded("after".into(), cursor.into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
            ]),
        };
        let mock = server
            .mock("GET", RELEASES_PATH)
            .match_query(query)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create_async()
            .await;
        mocks.push(mock);
    }

    mocks
}

/// Configuration pointing the release index at `server`
pub fn test_config(server: &ServerGuard) -> InspectConfig {
    InspectConfig {
        releases: ReleasesConfig {
            endpoint: format!("{}{}", server.url(), RELEASES_PATH),
            ..ReleasesConfig::default()
        },
        ..InspectConfig::default()
    }
}
