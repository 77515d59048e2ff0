//! Project directory loader
//!
//! Collects the `required_version` declarations of every configuration file
//! directly inside a project directory and joins them into one constraint.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::project::hcl::HclParser;
use crate::project::tf_json::TfJsonParser;
use crate::project::traits::{ParseError, Parser};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("module path does not exist: {0}")]
    NoDirectory(PathBuf),

    #[error("path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("the directory has no terraform configuration files: {0}")]
    NoConfigurationFiles(PathBuf),

    #[error("terraform \"required_version\" attribute is required")]
    MissingConstraint,

    /// No constraint was found and this file could not be parsed
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    fn io(path: &Path, source: io::Error) -> Self {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error is about the given path rather than its contents
    pub fn is_invalid_path(&self) -> bool {
        matches!(
            self,
            LoadError::NoDirectory(_)
                | LoadError::NotADirectory(_)
                | LoadError::NoConfigurationFiles(_)
        )
    }
}

pub struct ProjectLoader {
    parsers: Vec<Box<dyn Parser>>,
}

impl ProjectLoader {
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(HclParser::new()), Box::new(TfJsonParser)],
        }
    }

    fn parser_for(&self, path: &Path) -> Option<&dyn Parser> {
        self.parsers
            .iter()
            .find(|parser| parser.can_parse(path))
            .map(|parser| &**parser)
    }

    /// Configuration files directly inside `dir`, sorted by file name
    ///
    /// Hidden files and editor leftovers (`#foo.tf#`, `foo.tf~`) are ignored.
    fn configuration_files(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))? {
            let entry = entry.map_err(|e| LoadError::io(dir, e))?;
            let path = entry.path();

            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if name.starts_with('.') || name.starts_with('#') || name.ends_with('~') {
                continue;
            }
            if !path.is_file() || self.parser_for(&path).is_none() {
                continue;
            }
            files.push(path);
        }

        files.sort();
        Ok(files)
    }

    /// Read the joined `required_version` constraint of the project in `dir`
    pub fn required_version(&self, dir: &Path) -> Result<String, LoadError> {
        let dir = std::path::absolute(dir).map_err(|e| LoadError::io(dir, e))?;

        let metadata = match std::fs::metadata(&dir) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::NoDirectory(dir));
            }
            Err(e) => return Err(LoadError::io(&dir, e)),
        };
        if !metadata.is_dir() {
            return Err(LoadError::NotADirectory(dir));
        }

        let files = self.configuration_files(&dir)?;
        if files.is_empty() {
            return Err(LoadError::NoConfigurationFiles(dir));
        }

        let mut constraints = Vec::new();
        let mut first_failure = None;
        for path in &files {
            let Some(parser) = self.parser_for(path) else {
                continue;
            };
            let content = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;

            match parser.parse(&content) {
                Ok(found) => {
                    debug!("Found {} required_version in {}", found.len(), path.display());
                    constraints.extend(found);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    first_failure.get_or_insert((path.clone(), e));
                }
            }
        }

        if constraints.is_empty() {
            return Err(match first_failure {
                Some((path, source)) => LoadError::Parse { path, source },
                None => LoadError::MissingConstraint,
            });
        }
        Ok(constraints.join(", "))
    }
}

impl Default for ProjectLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for [`ProjectLoader::required_version`] with the default parsers
pub fn load_required_version(dir: &Path) -> Result<String, LoadError> {
    ProjectLoader::new().required_version(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn required_version_reads_single_file() {
        let dir = project(&[(
            "versions.tf",
            "terraform {\n  required_version = \">= 1.3.0, < 1.4.0\"\n}\n",
        )]);

        let result = load_required_version(dir.path()).unwrap();

        assert_eq!(result, ">= 1.3.0, < 1.4.0");
    }

    #[test]
    fn required_version_joins_files_in_name_order() {
        let dir = project(&[
            ("z_main.tf", "terraform {\n  required_version = \"< 1.5.0\"\n}\n"),
            (
                "a_versions.tf.json",
                r#"{"terraform": {"required_version": ">= 1.2.0"}}"#,
            ),
            ("outputs.tf", "output \"id\" {\n  value = 1\n}\n"),
        ]);

        let result = load_required_version(dir.path()).unwrap();

        assert_eq!(result, ">= 1.2.0, < 1.5.0");
    }

    #[test]
    fn required_version_ignores_hidden_and_editor_files() {
        let dir = project(&[
            ("main.tf", "terraform {\n  required_version = \"~> 1.3\"\n}\n"),
            (".hidden.tf", "terraform {\n  required_version = \"1.0.0\"\n}\n"),
            ("#main.tf#", "terraform {\n  required_version = \"1.0.1\"\n}\n"),
            ("main.tf~", "terraform {\n  required_version = \"1.0.2\"\n}\n"),
        ]);

        let result = load_required_version(dir.path()).unwrap();

        assert_eq!(result, "~> 1.3");
    }

    #[test]
    fn required_version_skips_unparsable_files() {
        let dir = project(&[
            ("broken.tf.json", "{"),
            ("main.tf", "terraform {\n  required_version = \"1.2.5\"\n}\n"),
        ]);

        let result = load_required_version(dir.path()).unwrap();

        assert_eq!(result, "1.2.5");
    }

    #[test]
    fn required_version_reports_parse_failure_when_nothing_declared() {
        let dir = project(&[
            ("main.tf", "terraform {\n  required_version = \"1.2.5\"\n"),
            ("outputs.tf", "output \"id\" {\n  value = 1\n}\n"),
        ]);

        let err = load_required_version(dir.path()).unwrap_err();

        assert!(
            matches!(err, LoadError::Parse { ref path, .. } if path.ends_with("main.tf")),
            "unexpected error: {err:?}"
        );
        assert!(!err.is_invalid_path());
    }

    #[test]
    fn required_version_reads_heredoc_project() {
        let dir = project(&[(
            "main.tf",
            "locals {\n  msg = <<EOT\nit's a \"quote\nEOT\n}\n\nterraform { required_version = \">= 1.3.0\" }\n",
        )]);

        let result = load_required_version(dir.path()).unwrap();

        assert_eq!(result, ">= 1.3.0");
    }

    #[test]
    fn required_version_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let err = load_required_version(&missing).unwrap_err();

        assert!(matches!(err, LoadError::NoDirectory(_)));
        assert!(err.is_invalid_path());
    }

    #[test]
    fn required_version_fails_for_file_path() {
        let dir = project(&[("main.tf", "")]);

        let err = load_required_version(&dir.path().join("main.tf")).unwrap_err();

        assert!(matches!(err, LoadError::NotADirectory(_)));
        assert!(err.to_string().starts_with("path is not a directory"));
    }

    #[test]
    fn required_version_fails_without_configuration_files() {
        let dir = project(&[("README.md", "# terraform"), ("terraform.tfvars", "")]);

        let err = load_required_version(dir.path()).unwrap_err();

        assert!(matches!(err, LoadError::NoConfigurationFiles(_)));
    }

    #[test]
    fn required_version_fails_without_declaration() {
        let dir = project(&[(
            "main.tf",
            "terraform {\n  required_providers {}\n}\n",
        )]);

        let err = load_required_version(dir.path()).unwrap_err();

        assert!(matches!(err, LoadError::MissingConstraint));
        assert!(!err.is_invalid_path());
        assert_eq!(
            err.to_string(),
            "terraform \"required_version\" attribute is required"
        );
    }
}
