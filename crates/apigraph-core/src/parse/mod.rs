pub mod components;
pub mod document;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;

use crate::error::ParseError;
use crate::transform::dialect::Dialect;
use document::Document;

/// Parse an OpenAPI or Swagger document from YAML.
pub fn from_yaml(input: &str) -> Result<Document, ParseError> {
    let doc: Document = serde_yaml_ng::from_str(input)?;
    Dialect::detect(&doc)?;
    Ok(doc)
}

/// Parse an OpenAPI or Swagger document from JSON.
pub fn from_json(input: &str) -> Result<Document, ParseError> {
    let doc: Document = serde_json::from_str(input)?;
    Dialect::detect(&doc)?;
    Ok(doc)
}
