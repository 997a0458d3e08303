//! TON ABI schema
//!
//! Parser and intermediate representation for contract interface schemas.
//!
//! A schema declares named interfaces, read-only get-methods and internal
//! messages. This crate provides:
//!
//! - [`parse_schema`]: XML text to [`SchemaDocument`] plus [`SchemaWarning`]s
//! - [`message`]: the `name#opcode param:type ... = Return;` grammar
//! - [`map_type`]: total mapping from raw type tokens to [`TypeCategory`]
//!
//! # Example
//!
//! ```ignore
//! use ton_abi_schema::{parse_schema, map_type};
//!
//! let parsed = parse_schema(&xml)?;
//! for warning in &parsed.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! let category = map_type("(VarUInteger 16)");
//! ```

pub mod document;
pub mod error;
pub mod message;
pub mod type_map;
pub mod warning;
pub mod xml;

pub use document::{
    GetMethodDecl, InterfaceDecl, MessageBody, MessageDecl, MessageDefinition, Opcode, Parameter,
    SchemaDocument,
};
pub use error::SchemaError;
pub use message::{normalize_whitespace, parse_message_text, split_params};
pub use type_map::{map_parameter, map_type, TypeCategory};
pub use warning::{Namespace, RefKind, SchemaWarning};
pub use xml::{parse_schema, ParsedSchema};
