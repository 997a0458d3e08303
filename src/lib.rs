//! ton-abi-bindgen
//!
//! Generates typed Rust bindings from TON contract ABI schemas and checks
//! deployed contracts for conformance with the declared interfaces.
//!
//! The work is split over the workspace crates:
//!
//! - `ton-abi-schema`: XML parser, IR and type mapping
//! - `ton-abi-resolver`: inheritance graph, orders and effective members
//! - `ton-abi-codegen`: binding model and Rust source rendering
//! - `ton-abi-probe`: cell codec, runtime capabilities, registry and prober
//!
//! This crate ties them into a pipeline and adds the schema sources, the
//! artifact writer and the batch config used by the CLI.
//!
//! # Example
//!
//! ```ignore
//! use ton_abi_bindgen::{generate, ArtifactWriter};
//!
//! let generation = generate(&std::fs::read_to_string("abi.xml")?)?;
//! for warning in &generation.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! ArtifactWriter::new("generated").write(&generation)?;
//! ```

pub mod config;
pub mod source;
pub mod writer;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use ton_abi_codegen::{build_model, render, BindingModel, EmittedBindings};
use ton_abi_probe::BindingRegistry;
use ton_abi_resolver::{resolve, InterfaceGraph};
use ton_abi_schema::{parse_schema, SchemaDocument, SchemaWarning};

pub use config::{SourceEntry, SourceKind, SourcesConfig};
pub use source::SchemaSource;
pub use writer::ArtifactWriter;

/// Everything derived from one schema.
#[derive(Debug, Clone)]
pub struct Generation {
    pub document: SchemaDocument,
    pub graph: InterfaceGraph,
    /// The model `emitted` was rendered from; also backs [`Self::registry`].
    pub model: BindingModel,
    pub emitted: EmittedBindings,
    /// Parser warnings followed by resolver warnings.
    pub warnings: Vec<SchemaWarning>,
}

impl Generation {
    /// Interpreted bindings for every interface, in detection order.
    pub fn registry(&self) -> BindingRegistry {
        BindingRegistry::from_model(&self.model)
    }

    /// IR and warnings, as printed by `inspect`.
    pub fn inspect(&self) -> serde_json::Value {
        serde_json::json!({
            "document": self.document,
            "warnings": self.warnings,
        })
    }

    /// Both traversal orders, as printed by `order`.
    pub fn orders(&self) -> serde_json::Value {
        serde_json::json!({
            "topo_order": self.graph.topo_order(),
            "reverse_topo_order": self.graph.reverse_topo_order(),
        })
    }
}

/// Parse, resolve and emit. Fails only when the text is not a schema at all.
pub fn generate(text: &str) -> Result<Generation> {
    let parsed = parse_schema(text).context("failed to parse schema")?;
    Ok(finish(parsed.document, parsed.warnings))
}

/// Resolve and emit an already-built document, such as an `abi.json` dump.
/// Document-level warnings are recovered with [`SchemaDocument::lint`].
pub fn generate_from_document(document: SchemaDocument) -> Generation {
    let warnings = document.lint();
    finish(document, warnings)
}

fn finish(document: SchemaDocument, mut warnings: Vec<SchemaWarning>) -> Generation {
    let graph = resolve(&document);
    let model = build_model(&document, &graph);
    let emitted = render(&model);

    warnings.extend(graph.warnings().iter().cloned());
    for warning in &warnings {
        warn!(%warning, "schema warning");
    }

    Generation {
        document,
        graph,
        model,
        emitted,
        warnings,
    }
}

/// Fetch and generate. Sources ending in `.json` are read as IR dumps.
pub fn generate_from(source: &SchemaSource, timeout: Duration) -> Result<Generation> {
    let text = source.fetch(timeout)?;
    if source.is_ir() {
        let document = SchemaDocument::from_json(&text)
            .with_context(|| format!("failed to load IR from {}", source))?;
        return Ok(generate_from_document(document));
    }
    generate(&text).with_context(|| format!("in schema {}", source))
}

/// Generate from `source` and write the artifacts to `out_dir`.
pub fn generate_to_dir(
    source: &SchemaSource,
    out_dir: &Path,
    dump_ir: bool,
    timeout: Duration,
) -> Result<GenerationSummary> {
    let generation = generate_from(source, timeout)?;
    let files = ArtifactWriter::new(out_dir)
        .with_ir_dump(dump_ir)
        .write(&generation)?;
    info!(
        source = %source,
        out_dir = %out_dir.display(),
        interfaces = generation.emitted.bindings.len(),
        files = files.len(),
        "generated bindings"
    );
    Ok(GenerationSummary {
        source: source.to_string(),
        out_dir: out_dir.to_path_buf(),
        interfaces: generation.emitted.bindings.keys().cloned().collect(),
        files,
        warnings: generation.warnings.len(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub source: String,
    pub out_dir: PathBuf,
    pub interfaces: Vec<String>,
    pub files: Vec<PathBuf>,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub generated: Vec<GenerationSummary>,
    pub failed: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run every source of a config. A failing source is logged and recorded;
/// the remaining sources still run.
pub fn run_batch(
    config: &SourcesConfig,
    base_dir: &Path,
    dump_ir: bool,
    timeout: Duration,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for entry in &config.sources {
        let source = entry.source(base_dir);
        let out_dir = config.output_dir_for(entry);
        match generate_to_dir(&source, &out_dir, dump_ir, timeout) {
            Ok(generated) => summary.generated.push(generated),
            Err(e) => {
                error!(source = %source, error = %format!("{:#}", e), "source failed");
                summary.failed.push(BatchFailure {
                    source: source.to_string(),
                    error: format!("{:#}", e),
                });
            }
        }
    }
    info!(
        generated = summary.generated.len(),
        failed = summary.failed.len(),
        "batch finished"
    );
    summary
}
