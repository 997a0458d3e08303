//! XML container parsing.
//!
//! The root element's children are `interface`, `get_method` and `internal`
//! records. Unknown elements, text and comments are skipped. Individual bad
//! records degrade to warnings; only XML that cannot be tokenized is fatal.

use roxmltree::{Document, Node};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::document::{
    GetMethodDecl, InterfaceDecl, MessageBody, MessageDecl, Parameter, SchemaDocument,
};
use crate::error::SchemaError;
use crate::message::parse_message_text;
use crate::warning::{Namespace, SchemaWarning};

/// Result of parsing one schema text.
#[derive(Debug, Clone, Default)]
pub struct ParsedSchema {
    pub document: SchemaDocument,
    pub warnings: Vec<SchemaWarning>,
}

/// Parse schema XML into the IR.
///
/// # Example
///
/// ```
/// let xml = r#"<abi>
///   <interface name="nft_item"><get_method name="get_nft_data"/></interface>
///   <get_method name="get_nft_data">
///     <output><int name="index">uint64</int></output>
///   </get_method>
/// </abi>"#;
/// let parsed = ton_abi_schema::parse_schema(xml).unwrap();
/// assert_eq!(parsed.document.interfaces[0].get_method_refs, vec!["get_nft_data"]);
/// ```
pub fn parse_schema(text: &str) -> Result<ParsedSchema, SchemaError> {
    if text.trim().is_empty() {
        return Err(SchemaError::Empty);
    }
    let xml = Document::parse(text)?;
    let root = xml.root_element();

    let mut parsed = ParsedSchema::default();
    let mut seen = SeenNames::default();

    for node in root.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "interface" => {
                let iface = parse_interface(node);
                seen.check(Namespace::Interface, &iface.name, &mut parsed.warnings);
                parsed.document.interfaces.push(iface);
            }
            "get_method" => {
                let method = parse_get_method(node);
                seen.check(Namespace::GetMethod, &method.name, &mut parsed.warnings);
                parsed.document.get_methods.push(method);
            }
            "internal" => {
                let msg = parse_internal(node, &mut parsed.warnings);
                seen.check(Namespace::Message, &msg.name, &mut parsed.warnings);
                parsed.document.messages.push(msg);
            }
            other => debug!(element = other, "skipping unsupported schema element"),
        }
    }

    debug!(
        interfaces = parsed.document.interfaces.len(),
        get_methods = parsed.document.get_methods.len(),
        messages = parsed.document.messages.len(),
        warnings = parsed.warnings.len(),
        "parsed schema"
    );
    Ok(parsed)
}

#[derive(Default)]
struct SeenNames {
    names: HashSet<(Namespace, String)>,
}

impl SeenNames {
    fn check(&mut self, namespace: Namespace, name: &str, warnings: &mut Vec<SchemaWarning>) {
        if !self.names.insert((namespace, name.to_string())) {
            warn!(%namespace, name, "duplicate name in schema");
            warnings.push(SchemaWarning::DuplicateName {
                namespace,
                name: name.to_string(),
            });
        }
    }
}

fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn trimmed_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn parse_interface(node: Node<'_, '_>) -> InterfaceDecl {
    let mut iface = InterfaceDecl {
        name: attr(node, "name").unwrap_or_default(),
        parent: attr(node, "inherits").filter(|p| !p.trim().is_empty()),
        ..Default::default()
    };

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "code_hash" => {
                let hash = trimmed_text(child);
                iface.fingerprint = (!hash.is_empty()).then_some(hash);
            }
            "get_method" => {
                if let Some(name) = child.attribute("name") {
                    iface.get_method_refs.push(name.to_string());
                }
            }
            "msg_in" => iface.inbound_message_refs.extend(internal_refs(child)),
            "msg_out" => iface.outbound_message_refs.extend(internal_refs(child)),
            _ => {}
        }
    }
    iface
}

fn internal_refs(section: Node<'_, '_>) -> Vec<String> {
    section
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "internal")
        .filter_map(|n| n.attribute("name").map(str::to_string))
        .collect()
}

fn parse_get_method(node: Node<'_, '_>) -> GetMethodDecl {
    let mut method = GetMethodDecl {
        name: attr(node, "name").unwrap_or_default(),
        ..Default::default()
    };

    for section in node.children().filter(Node::is_element) {
        let target = match section.tag_name().name() {
            "input" => &mut method.inputs,
            "output" => &mut method.outputs,
            _ => continue,
        };
        for param in section.children().filter(Node::is_element) {
            target.push(Parameter::with_category(
                param.tag_name().name(),
                param.attribute("name").unwrap_or_default(),
                trimmed_text(param),
            ));
        }
    }
    method
}

fn parse_internal(node: Node<'_, '_>, warnings: &mut Vec<SchemaWarning>) -> MessageDecl {
    let name = attr(node, "name").unwrap_or_default();
    let text = trimmed_text(node);

    let body = match parse_message_text(&text) {
        Ok(def) => MessageBody::Parsed(def),
        Err(reason) => {
            warn!(message = %name, %reason, "could not parse internal message");
            warnings.push(SchemaWarning::MalformedMessage {
                name: name.clone(),
                original: text.clone(),
                reason: reason.clone(),
            });
            MessageBody::Malformed {
                original: text,
                reason,
            }
        }
    };
    MessageDecl { name, body }
}
