//! Shared setup for integration tests

mod project;
mod releases;

#[allow(unused_imports)]
pub use project::create_project;
#[allow(unused_imports)]
pub use releases::{RELEASES_PATH, mock_release_pages, test_config};
