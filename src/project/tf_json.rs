//! Terraform JSON syntax (`.tf.json`) parser
//!
//! Format examples:
//! - Object: `{"terraform": {"required_version": ">= 1.3.0"}}`
//! - Array: `{"terraform": [{"required_version": ">= 1.3.0"}]}`

use std::path::Path;

use serde_json::Value;

use crate::project::traits::{ParseError, Parser, has_suffix};

/// Parser for `.tf.json` files
#[derive(Debug, Default)]
pub struct TfJsonParser;

impl TfJsonParser {
    fn required_version(block: &Value) -> Option<String> {
        block
            .get("required_version")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

impl Parser for TfJsonParser {
    fn can_parse(&self, path: &Path) -> bool {
        has_suffix(path, ".tf.json")
    }

    fn parse(&self, content: &str) -> Result<Vec<String>, ParseError> {
        let root: Value =
            serde_json::from_str(content).map_err(|e| ParseError::ParseFailed(e.to_string()))?;

        let versions = match root.get("terraform") {
            Some(Value::Array(blocks)) => blocks.iter().filter_map(Self::required_version).collect(),
            Some(block @ Value::Object(_)) => Self::required_version(block).into_iter().collect(),
            Some(_) => {
                return Err(ParseError::InvalidSyntax(
                    "\"terraform\" must be an object or an array of objects".to_string(),
                ));
            }
            None => Vec::new(),
        };

        Ok(versions)
    }
}
