//! TON ABI Codegen
//!
//! Turns a parsed schema and its resolved interface graph into Rust binding
//! source. Emission happens in two passes:
//!
//! 1. [`builder`] assembles a typed [`BindingModel`]: one [`BindingClass`] per
//!    interface with query, send and probe recipes, plus one [`DataType`] per
//!    distinct message body.
//! 2. [`render`] walks the model once and produces source text.
//!
//! The model is also interpreted directly at runtime by `ton-abi-probe`, so
//! generated and interpreted bindings share argument order, payload layout
//! and probe defaults.
//!
//! # Example
//!
//! ```ignore
//! let parsed = ton_abi_schema::parse_schema(&xml)?;
//! let graph = ton_abi_resolver::resolve(&parsed.document);
//! let emitted = ton_abi_codegen::emit(&parsed.document, &graph);
//! for (file, source) in emitted.files() {
//!     std::fs::write(out_dir.join(file), source)?;
//! }
//! ```

pub mod builder;
pub mod model;
pub mod naming;
pub mod render;
pub mod rust_type;

pub use builder::build_model;
pub use model::{
    BindingClass, BindingModel, DataType, DefaultValue, Field, MessageField, QueryRecipe,
    ResultShape, SendRecipe, StoreOp,
};
pub use render::{render, render_bundle, CodeWriter, EmittedBindings, EmittedFile};

use ton_abi_resolver::InterfaceGraph;
use ton_abi_schema::SchemaDocument;

/// Build the binding model and render it. Pure; performs no I/O.
pub fn emit(doc: &SchemaDocument, graph: &InterfaceGraph) -> EmittedBindings {
    render(&build_model(doc, graph))
}

/// Like [`emit`], but as a single source file of inline modules, suitable for
/// `include!` from a build script's `OUT_DIR`.
pub fn emit_bundle(doc: &SchemaDocument, graph: &InterfaceGraph) -> String {
    let model = build_model(doc, graph);
    render_bundle(&model, &render(&model))
}
