use super::{
    default_expr, file_header, reader_method, rust_string, write_imports, CodeWriter,
    BINDING_IMPORTS,
};
use crate::model::{BindingClass, Field, QueryRecipe, ResultShape, SendRecipe};

/// Render one interface binding file.
pub fn render_binding(class: &BindingClass) -> String {
    let mut w = CodeWriter::new();
    file_header(&mut w, &format!("Binding for the `{}` interface.", class.interface));
    if class.lineage.len() > 1 {
        w.line("//!");
        w.line(format!("//! Inherits: {}", class.lineage[1..].join(" -> ")));
    }
    if let Some(hash) = &class.fingerprint {
        w.line(format!("//! Code hash: `{}`", hash));
    }
    if !class.outbound_messages.is_empty() {
        w.line(format!("//! Emits: {}", class.outbound_messages.join(", ")));
    }
    w.blank();
    w.line("#![allow(unused_imports, non_camel_case_types, clippy::too_many_arguments)]");
    w.blank();
    write_imports(&mut w, BINDING_IMPORTS);

    for query in &class.queries {
        if let ResultShape::Record { type_name, fields } = &query.result {
            w.blank();
            w.line(format!("/// Result of `{}`, in stack order.", query.method));
            w.line("#[derive(Debug, Clone, PartialEq)]");
            w.open(format!("pub struct {}", type_name));
            for field in fields {
                w.line(format!("pub {}: {},", field.ident, field.rust_type));
            }
            w.close("");
        }
    }

    w.blank();
    w.line(format!("/// Typed access to a contract implementing `{}`.", class.interface));
    w.line("#[derive(Clone)]");
    w.open(format!("pub struct {}", class.type_name));
    w.line("address: Address,");
    w.line("runtime: Arc<dyn ContractRuntime>,");
    w.close("");

    w.blank();
    w.open(format!("impl {}", class.type_name));
    w.line(format!(
        "pub const INTERFACE: &'static str = {};",
        rust_string(&class.interface)
    ));
    w.blank();
    w.open("pub fn new(address: Address, runtime: Arc<dyn ContractRuntime>) -> Self");
    w.line("Self { address, runtime }");
    w.close("");
    w.blank();
    w.open("pub fn address(&self) -> &Address");
    w.line("&self.address");
    w.close("");

    for query in &class.queries {
        w.blank();
        render_query(&mut w, query);
    }
    for send in &class.sends {
        w.blank();
        render_send(&mut w, send);
    }
    for query in &class.queries {
        w.blank();
        render_query_probe(&mut w, query);
    }
    for send in &class.sends {
        w.blank();
        render_send_probe(&mut w, send);
    }
    w.close("");

    w.blank();
    render_conformance_impl(&mut w, class);
    w.finish()
}

fn params(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| format!(", {}: {}", f.ident, f.rust_type))
        .collect()
}

fn args(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.ident.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_query(w: &mut CodeWriter, query: &QueryRecipe) {
    let ret = match &query.result {
        ResultShape::Unit => "()".to_string(),
        ResultShape::Single(field) => field.rust_type.clone(),
        ResultShape::Record { type_name, .. } => type_name.clone(),
    };
    let method = rust_string(&query.method);

    w.line(format!("/// Calls get-method `{}`.", query.method));
    w.open(format!(
        "pub async fn {}(&self{}) -> Result<{}, BindingError>",
        query.fn_name,
        params(&query.inputs),
        ret
    ));
    let wire_args = query
        .inputs
        .iter()
        .map(|f| format!("WireValue::from({})", f.ident))
        .collect::<Vec<_>>()
        .join(", ");
    let call = format!(
        "invoke_query(self.runtime.as_ref(), &self.address, {}, vec![{}]).await?",
        method, wire_args
    );

    match &query.result {
        ResultShape::Unit => {
            w.line(format!("{};", call));
            w.line("Ok(())");
        }
        ResultShape::Single(field) => {
            w.line(format!("let mut stack = {};", call));
            w.line(format!(
                "let value = stack.{}().map_err(|e| BindingError::shape({}, e))?;",
                reader_method(&field.category),
                method
            ));
            w.line("Ok(value)");
        }
        ResultShape::Record { type_name, fields } => {
            w.line(format!("let mut stack = {};", call));
            w.line(format!("let shape = |e| BindingError::shape({}, e);", method));
            w.open(format!("Ok({}", type_name));
            for field in fields {
                w.line(format!(
                    "{}: stack.{}().map_err(shape)?,",
                    field.ident,
                    reader_method(&field.category)
                ));
            }
            w.close(")");
        }
    }
    w.close("");
}

fn render_send(w: &mut CodeWriter, send: &SendRecipe) {
    let fields: Vec<Field> = send.fields.iter().map(|f| f.field.clone()).collect();
    let message = rust_string(&send.message);

    w.line(format!(
        "/// Sends internal message `{}` (opcode `{}`).",
        send.message, send.opcode
    ));
    w.open(format!(
        "pub async fn {}(&self{}) -> Result<SendOutcome, BindingError>",
        send.fn_name,
        params(&fields)
    ));
    if fields.is_empty() {
        w.line(format!("let body = super::messages::{} {{}};", send.data_type));
    } else {
        w.line(format!(
            "let body = super::messages::{} {{ {} }};",
            send.data_type,
            args(&fields)
        ));
    }
    w.line(format!(
        "let payload = body.to_cell().map_err(|e| BindingError::payload({}, e))?;",
        message
    ));
    w.line(format!(
        "dispatch_message(self.runtime.as_ref(), &self.address, {}, payload).await",
        message
    ));
    w.close("");
}

fn render_query_probe(w: &mut CodeWriter, query: &QueryRecipe) {
    match &query.probe_with_fn {
        Some(with_fn) => {
            w.line(format!(
                "/// Probes `{}` with default arguments.",
                query.method
            ));
            w.open(format!(
                "pub async fn {}(&self) -> Result<(), ProbeFailure>",
                query.probe_fn
            ));
            let defaults: Vec<String> = query.inputs.iter().map(default_expr).collect();
            w.line(format!("self.{}({}).await", with_fn, defaults.join(", ")));
            w.close("");
            w.blank();
            w.line(format!(
                "/// Probes `{}` with caller-supplied arguments.",
                query.method
            ));
            w.open(format!(
                "pub async fn {}(&self{}) -> Result<(), ProbeFailure>",
                with_fn,
                params(&query.inputs)
            ));
            w.line(format!("self.{}({}).await?;", query.fn_name, args(&query.inputs)));
            w.line("Ok(())");
            w.close("");
        }
        None => {
            w.line(format!("/// Probes `{}`.", query.method));
            w.open(format!(
                "pub async fn {}(&self) -> Result<(), ProbeFailure>",
                query.probe_fn
            ));
            w.line(format!("self.{}().await?;", query.fn_name));
            w.line("Ok(())");
            w.close("");
        }
    }
}

fn render_send_probe(w: &mut CodeWriter, send: &SendRecipe) {
    let defaults: Vec<String> = send.fields.iter().map(|f| default_expr(&f.field)).collect();
    w.line(format!(
        "/// Sends `{}` with default field values; only dispatch is checked.",
        send.message
    ));
    w.open(format!(
        "pub async fn {}(&self) -> Result<(), ProbeFailure>",
        send.probe_fn
    ));
    w.line(format!("self.{}({}).await?;", send.fn_name, defaults.join(", ")));
    w.line("Ok(())");
    w.close("");
}

fn render_conformance_impl(w: &mut CodeWriter, class: &BindingClass) {
    let quoted = |names: Vec<&str>| {
        names
            .into_iter()
            .map(rust_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    w.line("#[ton_abi_probe::async_trait]");
    w.open(format!("impl ConformanceTarget for {}", class.type_name));
    w.open("fn interface_name(&self) -> &str");
    w.line("Self::INTERFACE");
    w.close("");
    w.blank();
    w.open("fn address(&self) -> &Address");
    w.line("&self.address");
    w.close("");
    w.blank();
    w.open("fn query_probes(&self) -> Vec<&str>");
    w.line(format!(
        "vec![{}]",
        quoted(class.queries.iter().map(|q| q.method.as_str()).collect())
    ));
    w.close("");
    w.blank();
    w.open("fn send_probes(&self) -> Vec<&str>");
    w.line(format!(
        "vec![{}]",
        quoted(class.sends.iter().map(|s| s.message.as_str()).collect())
    ));
    w.close("");

    w.blank();
    w.open("async fn run_query_probe(&self, method: &str) -> Result<(), ProbeFailure>");
    w.open("match method");
    for query in &class.queries {
        w.line(format!(
            "{} => self.{}().await,",
            rust_string(&query.method),
            query.probe_fn
        ));
    }
    w.line("other => Err(ProbeFailure::UnknownProbe(other.to_string())),");
    w.close("");
    w.close("");

    w.blank();
    w.open("async fn run_send_probe(&self, message: &str) -> Result<(), ProbeFailure>");
    w.open("match message");
    for send in &class.sends {
        w.line(format!(
            "{} => self.{}().await,",
            rust_string(&send.message),
            send.probe_fn
        ));
    }
    w.line("other => Err(ProbeFailure::UnknownProbe(other.to_string())),");
    w.close("");
    w.close("");
    w.close("");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_model;
    use ton_abi_resolver::resolve;
    use ton_abi_schema::parse_schema;

    const SCHEMA: &str = r#"<abi>
  <interface name="nft_item">
    <code_hash>abc123</code_hash>
    <get_method name="get_nft_data"/>
    <get_method name="get_owner"/>
    <msg_in><internal name="nft_transfer"/><internal name="get_static_data"/></msg_in>
  </interface>
  <get_method name="get_nft_data">
    <output>
      <int name="init">bool</int>
      <int name="index">uint64</int>
      <slice name="owner_address">msgaddress</slice>
      <cell name="content">any</cell>
    </output>
  </get_method>
  <get_method name="get_owner">
    <input><int name="type">uint8</int></input>
    <output><slice name="owner">msgaddress</slice></output>
  </get_method>
  <internal name="nft_transfer">transfer#5fcc3d14 query_id:uint64 new_owner:MsgAddress forward_amount:(VarUInteger 16) = InternalMsgBody;</internal>
  <internal name="get_static_data">get_static_data#2fcb26a2 query_id:uint64 = InternalMsgBody;</internal>
</abi>"#;

    fn source() -> String {
        let doc = parse_schema(SCHEMA).unwrap().document;
        let model = build_model(&doc, &resolve(&doc));
        render_binding(model.class("nft_item").unwrap())
    }

    #[test]
    fn test_binding_struct_and_header() {
        let src = source();
        assert!(src.starts_with("//! Binding for the `nft_item` interface."));
        assert!(src.contains("//! Code hash: `abc123`"));
        assert!(src.contains("pub struct NftItem {"));
        assert!(src.contains("pub const INTERFACE: &'static str = \"nft_item\";"));
    }

    #[test]
    fn test_record_result_query() {
        let src = source();
        assert!(src.contains("pub struct GetNftDataResult {"));
        assert!(src.contains("pub owner_address: Option<Address>,"));
        assert!(src.contains("pub content: WireValue,"));
        assert!(src.contains(
            "pub async fn get_nft_data(&self) -> Result<GetNftDataResult, BindingError> {"
        ));
        assert!(src.contains("index: stack.read_u64().map_err(shape)?,"));
    }

    #[test]
    fn test_single_result_query_with_keyword_input() {
        let src = source();
        assert!(src.contains(
            "pub async fn get_owner(&self, r#type: u64) -> Result<Option<Address>, BindingError> {"
        ));
        assert!(src.contains("vec![WireValue::from(r#type)]"));
        assert!(src.contains("self.probe_get_owner_with(0).await"));
    }

    #[test]
    fn test_every_probe_helper_is_documented() {
        let src = source();
        for signature in [
            "pub async fn probe_get_nft_data(&self)",
            "pub async fn probe_get_owner(&self)",
            "pub async fn probe_get_owner_with(&self, r#type: u64)",
            "pub async fn probe_send_nft_transfer(&self)",
        ] {
            let at = src.find(signature).unwrap();
            let doc_line = src[..at].trim_end().lines().last().unwrap().trim();
            assert!(doc_line.starts_with("/// "), "{} has no doc comment", signature);
        }
        assert!(src.contains("/// Probes `get_nft_data`.\n"));
    }

    #[test]
    fn test_send_and_probe_methods() {
        let src = source();
        assert!(src.contains(
            "pub async fn send_nft_transfer(&self, query_id: u64, new_owner: Address, forward_amount: BigUint) -> Result<SendOutcome, BindingError> {"
        ));
        assert!(src.contains(
            "let body = super::messages::Transfer { query_id, new_owner, forward_amount };"
        ));
        assert!(src.contains(
            "self.send_nft_transfer(0, Address::zero(), BigUint::default()).await?;"
        ));
    }

    #[test]
    fn test_conformance_impl_lists_probes() {
        let src = source();
        assert!(src.contains("impl ConformanceTarget for NftItem {"));
        assert!(src.contains("vec![\"get_nft_data\", \"get_owner\"]"));
        assert!(src.contains("\"nft_transfer\" => self.probe_send_nft_transfer().await,"));
        assert!(src.contains("\"get_static_data\" => self.probe_send_get_static_data().await,"));
    }
}
