//! Rendering of a [`BindingModel`] into Rust source text.
//!
//! Generated code targets the `ton-abi-probe` runtime: bindings hold an
//! `Arc<dyn ContractRuntime>`, message bodies serialize through `CellBuilder`,
//! and `register_all` fills a `BindingRegistry`.

mod binding;
mod data_types;
mod registry;

use indexmap::IndexMap;
use serde::Serialize;

use ton_abi_schema::{SchemaWarning, TypeCategory};

use crate::model::{BindingModel, DefaultValue, Field};
use crate::rust_type::NATIVE_INT_BITS;

pub use binding::render_binding;
pub use data_types::render_data_types;
pub use registry::{render_bundle, render_module_index, render_registry};

/// `use` declarations at the top of every binding module, as `(path, names)`.
pub(crate) const BINDING_IMPORTS: &[(&str, &[&str])] = &[
    ("std::sync", &["Arc"]),
    ("ton_abi_probe::num_bigint", &["BigInt", "BigUint"]),
    (
        "ton_abi_probe",
        &[
            "dispatch_message",
            "invoke_query",
            "Address",
            "BindingError",
            "Cell",
            "ConformanceTarget",
            "ContractRuntime",
            "ProbeFailure",
            "SendOutcome",
            "WireValue",
        ],
    ),
];

/// `use` declarations at the top of `messages.rs`.
pub(crate) const MESSAGE_IMPORTS: &[(&str, &[&str])] = &[
    ("ton_abi_probe::num_bigint", &["BigInt", "BigUint"]),
    (
        "ton_abi_probe",
        &["Address", "Cell", "CellBuilder", "CellError", "CellSlice"],
    ),
];

/// Prelude names the generated code refers to unqualified.
const PRELUDE_NAMES: &[&str] = &[
    "Self", "Option", "Some", "None", "Result", "Ok", "Err", "String", "Vec", "Box",
];

/// Type names a generated item must not take in a module importing `imports`.
pub(crate) fn taken_type_names(
    imports: &[(&'static str, &'static [&'static str])],
) -> Vec<&'static str> {
    imports
        .iter()
        .flat_map(|(_, names)| names.iter().copied())
        .chain(PRELUDE_NAMES.iter().copied())
        .collect()
}

pub const MESSAGES_FILE: &str = "messages.rs";
pub const REGISTRY_FILE: &str = "registry.rs";
pub const MODULE_INDEX_FILE: &str = "mod.rs";

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedFile {
    pub file_name: String,
    pub source: String,
}

/// In-memory output of the emitter, keyed by interface name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmittedBindings {
    pub bindings: IndexMap<String, EmittedFile>,
    pub data_types: String,
    pub registry: String,
    pub module_index: String,
    pub warnings: Vec<SchemaWarning>,
}

impl EmittedBindings {
    /// Every file to persist, bindings first.
    pub fn files(&self) -> Vec<(&str, &str)> {
        let mut files: Vec<(&str, &str)> = self
            .bindings
            .values()
            .map(|f| (f.file_name.as_str(), f.source.as_str()))
            .collect();
        files.push((MESSAGES_FILE, &self.data_types));
        files.push((REGISTRY_FILE, &self.registry));
        files.push((MODULE_INDEX_FILE, &self.module_index));
        files
    }

    pub fn binding_source(&self, interface: &str) -> Option<&str> {
        self.bindings.get(interface).map(|f| f.source.as_str())
    }
}

pub fn render(model: &BindingModel) -> EmittedBindings {
    let bindings = model
        .classes
        .iter()
        .map(|class| {
            let file = EmittedFile {
                file_name: format!("{}.rs", class.module_name.trim_start_matches("r#")),
                source: render_binding(class),
            };
            (class.interface.clone(), file)
        })
        .collect();

    EmittedBindings {
        bindings,
        data_types: render_data_types(&model.data_types),
        registry: render_registry(model),
        module_index: render_module_index(model),
        warnings: model.warnings.clone(),
    }
}

/// Line-oriented source builder with brace-aware indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    const INDENT: &'static str = "    ";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(Self::INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Write `header {` and indent.
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(format!("{} {{", header.as_ref()));
        self.depth += 1;
        self
    }

    /// Dedent and write `}` followed by `suffix`.
    pub fn close(&mut self, suffix: &str) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(format!("}}{}", suffix))
    }

    pub fn finish(self) -> String {
        self.out
    }
}

fn write_imports(w: &mut CodeWriter, imports: &[(&str, &[&str])]) {
    for (path, names) in imports {
        match names {
            [single] => w.line(format!("use {}::{};", path, single)),
            _ => w.line(format!("use {}::{{{}}};", path, names.join(", "))),
        };
    }
}

fn file_header(w: &mut CodeWriter, summary: &str) {
    w.line(format!("//! {}", summary));
    w.line("//!");
    w.line("//! Generated by ton-abi-bindgen. Do not edit manually.");
}

/// Stack reader call for a query output of this category.
fn reader_method(category: &TypeCategory) -> &'static str {
    match category {
        TypeCategory::Integer { bits, signed } => match (*bits <= NATIVE_INT_BITS, signed) {
            (true, false) => "read_u64",
            (true, true) => "read_i64",
            (false, false) => "read_biguint",
            (false, true) => "read_int",
        },
        TypeCategory::VarUInt(_) => "read_biguint",
        TypeCategory::Boolean => "read_bool",
        TypeCategory::Address => "read_address_opt",
        TypeCategory::Text => "read_text",
        TypeCategory::Cell | TypeCategory::Slice | TypeCategory::Builder => "read_cell",
        TypeCategory::Optional(_) => "read_cell_opt",
        TypeCategory::Either(_, _) | TypeCategory::Unknown(_) => "read_any",
    }
}

/// Rust expression for a probe default.
fn default_expr(field: &Field) -> String {
    match field.default {
        DefaultValue::Zero => match field.rust_type.as_str() {
            "u64" | "i64" => "0".to_string(),
            other => format!("{}::default()", other),
        },
        DefaultValue::False => "false".to_string(),
        DefaultValue::EmptyText => "String::new()".to_string(),
        DefaultValue::NullAddress | DefaultValue::Absent => "None".to_string(),
        DefaultValue::ZeroAddress => "Address::zero()".to_string(),
        DefaultValue::EmptyCell if field.rust_type == "WireValue" => {
            "WireValue::Cell(Cell::empty())".to_string()
        }
        DefaultValue::EmptyCell => "Cell::empty()".to_string(),
        DefaultValue::Null => "WireValue::Null".to_string(),
    }
}

fn rust_string(s: &str) -> String {
    format!("{:?}", s)
}
