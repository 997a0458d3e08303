use super::{file_header, write_imports, CodeWriter, MESSAGE_IMPORTS};
use crate::model::{DataType, MessageField, StoreOp};
use crate::rust_type::NATIVE_INT_BITS;

/// Render `messages.rs`: one body struct per data type.
pub fn render_data_types(types: &[DataType]) -> String {
    let mut w = CodeWriter::new();
    file_header(&mut w, "Internal message bodies.");
    w.blank();
    w.line("#![allow(unused_imports, non_camel_case_types)]");
    w.blank();
    write_imports(&mut w, MESSAGE_IMPORTS);

    for data_type in types {
        w.blank();
        render_data_type(&mut w, data_type);
    }
    w.finish()
}

fn render_data_type(w: &mut CodeWriter, data_type: &DataType) {
    w.line(format!(
        "/// `{}#{}`, returns `{}`.",
        data_type.definition_name,
        data_type.opcode.digits(),
        data_type.return_type
    ));
    w.line("#[derive(Debug, Clone, PartialEq)]");
    if data_type.fields.is_empty() {
        w.line(format!("pub struct {} {{}}", data_type.type_name));
    } else {
        w.open(format!("pub struct {}", data_type.type_name));
        for f in &data_type.fields {
            w.line(format!("pub {}: {},", f.field.ident, f.field.rust_type));
        }
        w.close("");
    }

    w.blank();
    w.open(format!("impl {}", data_type.type_name));
    w.line(format!(
        "pub const OPCODE: u64 = 0x{};",
        data_type.opcode.digits().to_ascii_lowercase()
    ));
    w.blank();
    w.line("/// Write the opcode and every field, in declaration order.");
    w.open("pub fn store(&self, builder: &mut CellBuilder) -> Result<(), CellError>");
    w.line(format!(
        "builder.store_u64(Self::OPCODE, {})?;",
        data_type.opcode.bit_width()
    ));
    for field in &data_type.fields {
        w.line(format!("{}?;", store_call(field)));
    }
    w.line("Ok(())");
    w.close("");
    w.blank();
    w.open("pub fn to_cell(&self) -> Result<Cell, CellError>");
    w.line("let mut builder = CellBuilder::new();");
    w.line("self.store(&mut builder)?;");
    w.line("Ok(builder.build())");
    w.close("");
    w.blank();
    w.line("/// Read a body written by [`Self::store`]. Fails on a different opcode.");
    w.open("pub fn load(slice: &mut CellSlice<'_>) -> Result<Self, CellError>");
    w.line(format!(
        "let opcode = slice.load_u64({})?;",
        data_type.opcode.bit_width()
    ));
    w.open("if opcode != Self::OPCODE");
    w.line("return Err(CellError::OpcodeMismatch { expected: Self::OPCODE, found: opcode });");
    w.close("");
    if data_type.fields.is_empty() {
        w.line("Ok(Self {})");
    } else {
        w.open("Ok(Self");
        for field in &data_type.fields {
            w.line(format!("{}: {}?,", field.field.ident, load_call(field)));
        }
        w.close(")");
    }
    w.close("");
    w.blank();
    w.open("pub fn from_cell(cell: &Cell) -> Result<Self, CellError>");
    w.line("Self::load(&mut cell.parse())");
    w.close("");
    w.close("");
}

fn load_call(field: &MessageField) -> String {
    match field.op {
        StoreOp::Uint { bits } if bits <= NATIVE_INT_BITS => format!("slice.load_u64({})", bits),
        StoreOp::Uint { bits } => format!("slice.load_uint({})", bits),
        StoreOp::Int { bits } if bits <= NATIVE_INT_BITS => format!("slice.load_i64({})", bits),
        StoreOp::Int { bits } => format!("slice.load_int({})", bits),
        StoreOp::Bit => "slice.load_bit()".to_string(),
        StoreOp::Address => "slice.load_std_address()".to_string(),
        StoreOp::MaybeRef => "slice.load_maybe_ref()".to_string(),
        StoreOp::VarUInt { bound } => format!("slice.load_var_uint({})", bound),
        StoreOp::Text => "slice.load_text()".to_string(),
        StoreOp::Ref => "slice.load_ref()".to_string(),
    }
}

fn store_call(field: &MessageField) -> String {
    let ident = &field.field.ident;
    match field.op {
        StoreOp::Uint { bits } if bits <= NATIVE_INT_BITS => {
            format!("builder.store_u64(self.{}, {})", ident, bits)
        }
        StoreOp::Uint { bits } => format!("builder.store_uint(&self.{}, {})", ident, bits),
        StoreOp::Int { bits } if bits <= NATIVE_INT_BITS => {
            format!("builder.store_i64(self.{}, {})", ident, bits)
        }
        StoreOp::Int { bits } => format!("builder.store_int(&self.{}, {})", ident, bits),
        StoreOp::Bit => format!("builder.store_bit(self.{})", ident),
        StoreOp::Address => format!("builder.store_address(Some(&self.{}))", ident),
        StoreOp::MaybeRef => format!("builder.store_maybe_ref(self.{}.as_ref())", ident),
        StoreOp::VarUInt { bound } => {
            format!("builder.store_var_uint(&self.{}, {})", ident, bound)
        }
        StoreOp::Text => format!("builder.store_text(&self.{})", ident),
        StoreOp::Ref => format!("builder.store_ref(&self.{})", ident),
    }
}
