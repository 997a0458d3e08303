//! Fatal schema errors.
//!
//! Only a container that cannot be tokenized at all is fatal. Problems inside
//! individual records are reported as [`crate::SchemaWarning`]s instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema is not well-formed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("schema text is empty")]
    Empty,

    #[error("schema JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}
