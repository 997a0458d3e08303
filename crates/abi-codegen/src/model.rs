//! Typed description of what gets emitted.
//!
//! The builder produces this tree from the IR and the resolved graph; the
//! renderer and the runtime interpreter both consume it, so the two never
//! disagree about argument order, serialization or probe defaults.

use serde::Serialize;

use ton_abi_schema::{Opcode, SchemaWarning, TypeCategory};

/// Everything generated for one schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BindingModel {
    /// Parents before children.
    pub classes: Vec<BindingClass>,
    pub data_types: Vec<DataType>,
    /// Interface names in the order `register_all` registers them (most
    /// derived first).
    pub registration_order: Vec<String>,
    pub warnings: Vec<SchemaWarning>,
}

impl BindingModel {
    pub fn class(&self, interface: &str) -> Option<&BindingClass> {
        self.classes.iter().find(|c| c.interface == interface)
    }

    pub fn data_type(&self, type_name: &str) -> Option<&DataType> {
        self.data_types.iter().find(|d| d.type_name == type_name)
    }
}

/// One generated binding struct.
#[derive(Debug, Clone, Serialize)]
pub struct BindingClass {
    /// Interface name as declared in the schema.
    pub interface: String,
    pub type_name: String,
    pub module_name: String,
    pub fingerprint: Option<String>,
    /// The interface followed by its ancestors.
    pub lineage: Vec<String>,
    pub queries: Vec<QueryRecipe>,
    pub sends: Vec<SendRecipe>,
    /// Informational: messages the contract may emit.
    pub outbound_messages: Vec<String>,
}

impl BindingClass {
    pub fn query(&self, method: &str) -> Option<&QueryRecipe> {
        self.queries.iter().find(|q| q.method == method)
    }

    pub fn send(&self, message: &str) -> Option<&SendRecipe> {
        self.sends.iter().find(|s| s.message == message)
    }

    /// No query and no send methods; conformance cannot be decided.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty() && self.sends.is_empty()
    }
}

/// A positional value: query argument, query output or message field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub ident: String,
    pub category: TypeCategory,
    pub rust_type: String,
    pub default: DefaultValue,
}

/// Get-method call: arguments in, positional stack out.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRecipe {
    pub method: String,
    pub fn_name: String,
    pub probe_fn: String,
    /// Probe variant taking caller-supplied arguments; only for methods with
    /// inputs.
    pub probe_with_fn: Option<String>,
    pub inputs: Vec<Field>,
    pub result: ResultShape,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ResultShape {
    Unit,
    Single(Field),
    Record { type_name: String, fields: Vec<Field> },
}

impl ResultShape {
    pub fn fields(&self) -> &[Field] {
        match self {
            ResultShape::Unit => &[],
            ResultShape::Single(field) => std::slice::from_ref(field),
            ResultShape::Record { fields, .. } => fields,
        }
    }
}

/// Internal message send: serialize a body, hand it to the sender.
#[derive(Debug, Clone, Serialize)]
pub struct SendRecipe {
    /// Declaration-site message name.
    pub message: String,
    pub fn_name: String,
    pub probe_fn: String,
    /// Data type holding the body.
    pub data_type: String,
    pub opcode: Opcode,
    pub fields: Vec<MessageField>,
}

/// A message body: opcode prefix followed by the fields in order.
#[derive(Debug, Clone, Serialize)]
pub struct DataType {
    pub type_name: String,
    pub definition_name: String,
    pub opcode: Opcode,
    pub fields: Vec<MessageField>,
    pub return_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageField {
    pub field: Field,
    pub op: StoreOp,
}

/// How one message field is written into the body cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOp {
    Uint { bits: u16 },
    Int { bits: u16 },
    Bit,
    Address,
    /// Presence bit plus a reference when present.
    MaybeRef,
    /// Length prefix bounded by `bound` bytes, then the value bytes.
    VarUInt { bound: u16 },
    Text,
    /// Nested cell reference. Fallback for everything without a dedicated
    /// encoding.
    Ref,
}

/// Argument synthesized for probe calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Zero,
    False,
    EmptyText,
    /// Null stack entry where an address is expected.
    NullAddress,
    /// Structurally valid zero address for message bodies.
    ZeroAddress,
    EmptyCell,
    /// `None` for optional references.
    Absent,
    Null,
}
