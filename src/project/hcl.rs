//! Terraform native syntax (`.tf`) parser
//!
//! The file is parsed as HCL and only top-level `terraform { ... }` blocks are
//! inspected for a direct `required_version` attribute.
//!
//! Format example:
//! ```text
//! terraform {
//!   required_version = ">= 1.3.0, < 1.4.0"
//!
//!   required_providers {
//!     aws = { source = "hashicorp/aws", version = "~> 4.0" }
//!   }
//! }
//! ```

use std::path::Path;

use hcl::{Body, Expression};

use crate::project::traits::{ParseError, Parser, has_suffix};

const TERRAFORM_BLOCK: &str = "terraform";
const REQUIRED_VERSION: &str = "required_version";

/// Parser for `.tf` files
#[derive(Debug, Default)]
pub struct HclParser;

impl HclParser {
    pub fn new() -> Self {
        Self
    }

    fn required_versions(body: &Body) -> Result<Vec<String>, ParseError> {
        body.blocks()
            .filter(|block| block.identifier() == TERRAFORM_BLOCK)
            .flat_map(|block| block.body().attributes())
            .filter(|attribute| attribute.key() == REQUIRED_VERSION)
            .map(|attribute| match attribute.expr() {
                Expression::String(value) => Ok(value.clone()),
                other => Err(ParseError::InvalidSyntax(format!(
                    "{REQUIRED_VERSION} must be a literal string, got {other:?}"
                ))),
            })
            .collect()
    }
}

impl Parser for HclParser {
    fn can_parse(&self, path: &Path) -> bool {
        has_suffix(path, ".tf")
    }

    fn parse(&self, content: &str) -> Result<Vec<String>, ParseError> {
        let body = hcl::parse(content).map_err(|e| ParseError::InvalidSyntax(e.to_string()))?;
        Self::required_versions(&body)
    }
}
