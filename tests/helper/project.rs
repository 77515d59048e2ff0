//! Project directory utilities

use std::fs;

use tempfile::TempDir;

/// Create a temporary project directory containing `files`
pub fn create_project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}
