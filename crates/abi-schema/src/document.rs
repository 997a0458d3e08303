//! Intermediate representation of a parsed ABI schema.
//!
//! A [`SchemaDocument`] is built once per parse call and consumed read-only by
//! the resolver, the emitter and the prober. Interfaces reference get-methods
//! and messages by name; those references may dangle and are resolved later.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::SchemaError;
use crate::warning::{Namespace, SchemaWarning};

/// Root of the IR: every interface, get-method and internal message declared
/// in one schema, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub interfaces: Vec<InterfaceDecl>,
    pub get_methods: Vec<GetMethodDecl>,
    pub messages: Vec<MessageDecl>,
}

impl SchemaDocument {
    /// Find an interface by name. The first declaration wins.
    pub fn find_interface(&self, name: &str) -> Option<&InterfaceDecl> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    /// Find a get-method by name. The first declaration wins.
    pub fn find_get_method(&self, name: &str) -> Option<&GetMethodDecl> {
        self.get_methods.iter().find(|m| m.name == name)
    }

    /// Find a message record by its declaration-site name, malformed or not.
    pub fn find_message(&self, name: &str) -> Option<&MessageDecl> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Find a message by name, skipping the lookup result when the first
    /// record with that name failed to parse.
    pub fn find_valid_message(&self, name: &str) -> Option<(&MessageDecl, &MessageDefinition)> {
        let msg = self.find_message(name)?;
        msg.definition().map(|def| (msg, def))
    }

    /// Iterate over every message that parsed successfully.
    pub fn valid_messages(&self) -> impl Iterator<Item = (&MessageDecl, &MessageDefinition)> {
        self.messages
            .iter()
            .filter_map(|m| m.definition().map(|def| (m, def)))
    }

    /// Interface names in declaration order.
    pub fn interface_names(&self) -> Vec<&str> {
        self.interfaces.iter().map(|i| i.name.as_str()).collect()
    }

    /// Load a document previously dumped with [`SchemaDocument::to_json_pretty`].
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Document-level warnings recovered from the IR alone: malformed
    /// messages and duplicate names, namespace by namespace. Used when a
    /// document is loaded from JSON instead of parsed from XML.
    pub fn lint(&self) -> Vec<SchemaWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        let mut check = |namespace: Namespace, name: &str, warnings: &mut Vec<SchemaWarning>| {
            if !seen.insert((namespace, name.to_string())) {
                warnings.push(SchemaWarning::DuplicateName {
                    namespace,
                    name: name.to_string(),
                });
            }
        };
        for iface in &self.interfaces {
            check(Namespace::Interface, &iface.name, &mut warnings);
        }
        for method in &self.get_methods {
            check(Namespace::GetMethod, &method.name, &mut warnings);
        }
        for msg in &self.messages {
            if let MessageBody::Malformed { original, reason } = &msg.body {
                warnings.push(SchemaWarning::MalformedMessage {
                    name: msg.name.clone(),
                    original: original.clone(),
                    reason: reason.clone(),
                });
            }
            check(Namespace::Message, &msg.name, &mut warnings);
        }
        warnings
    }
}

/// A named set of get-methods and messages, optionally extending one parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Opaque code fingerprint (`code_hash`), carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub get_method_refs: Vec<String>,
    #[serde(default)]
    pub inbound_message_refs: Vec<String>,
    #[serde(default)]
    pub outbound_message_refs: Vec<String>,
}

/// A read-only query method with positional inputs and outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMethodDecl {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Parameter>,
    #[serde(default)]
    pub outputs: Vec<Parameter>,
}

/// A positional parameter.
///
/// Get-method parameters carry the element tag they were declared with
/// (`int`, `slice`, `cell`, `tuple`) as `category`; message parameters have none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub name: String,
    #[serde(default)]
    pub raw_type: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            category: None,
            name: name.into(),
            raw_type: raw_type.into(),
        }
    }

    pub fn with_category(
        category: impl Into<String>,
        name: impl Into<String>,
        raw_type: impl Into<String>,
    ) -> Self {
        Self {
            category: Some(category.into()),
            name: name.into(),
            raw_type: raw_type.into(),
        }
    }
}

/// An internal message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDecl {
    /// Declaration-site name (the `name` attribute of the schema node).
    pub name: String,
    pub body: MessageBody,
}

impl MessageDecl {
    pub fn definition(&self) -> Option<&MessageDefinition> {
        match &self.body {
            MessageBody::Parsed(def) => Some(def),
            MessageBody::Malformed { .. } => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.body, MessageBody::Malformed { .. })
    }
}

/// Either a successfully matched message definition or the raw text that
/// failed to match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessageBody {
    Parsed(MessageDefinition),
    Malformed { original: String, reason: String },
}

/// The grammar-level content of an internal message:
/// `name#opcode param:type ... = ReturnType;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDefinition {
    /// Constructor name as written in the grammar; may differ from the
    /// declaration-site name.
    pub definition_name: String,
    pub opcode: Opcode,
    pub params: Vec<Parameter>,
    /// Informational only.
    pub return_type: String,
}

/// Maximum number of hex digits an opcode may carry and still be emitted as a
/// numeric literal.
pub const MAX_OPCODE_DIGITS: usize = 16;

/// Message opcode, kept as the hex digits written in the source.
///
/// Equality ignores ASCII case so `5FCC3D14` and `5fcc3d14` are the same tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Opcode {
    digits: String,
    value: u64,
}

impl Opcode {
    /// Parse hex digits, with or without a `0x` prefix.
    pub fn parse(text: &str) -> Result<Self, String> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if digits.is_empty() {
            return Err("empty opcode".to_string());
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("opcode '{}' is not hexadecimal", digits));
        }
        if digits.len() > MAX_OPCODE_DIGITS {
            return Err(format!(
                "opcode '{}' is wider than {} hex digits",
                digits, MAX_OPCODE_DIGITS
            ));
        }
        let value = u64::from_str_radix(digits, 16).map_err(|e| e.to_string())?;
        Ok(Self {
            digits: digits.to_string(),
            value,
        })
    }

    /// Verbatim hex digits, without prefix.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Width of the opcode prefix in a serialized payload.
    pub fn bit_width(&self) -> u16 {
        if self.digits.len() <= 8 {
            32
        } else {
            (self.digits.len() * 4) as u16
        }
    }
}

impl PartialEq for Opcode {
    fn eq(&self, other: &Self) -> bool {
        self.digits.eq_ignore_ascii_case(&other.digits)
    }
}

impl Eq for Opcode {}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.digits)
    }
}

impl TryFrom<String> for Opcode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Opcode::parse(&value)
    }
}

impl From<Opcode> for String {
    fn from(op: Opcode) -> Self {
        op.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_case_insensitive_eq() {
        let a = Opcode::parse("5FCC3D14").unwrap();
        let b = Opcode::parse("0x5fcc3d14").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.digits(), "5FCC3D14");
        assert_eq!(a.value(), 0x5fcc3d14);
        assert_eq!(b.to_string(), "0x5fcc3d14");
    }

    #[test]
    fn test_opcode_width() {
        assert_eq!(Opcode::parse("1").unwrap().bit_width(), 32);
        assert_eq!(Opcode::parse("0123456789").unwrap().bit_width(), 40);
        assert!(Opcode::parse("00112233445566778").is_err());
        assert!(Opcode::parse("xyz").is_err());
        assert!(Opcode::parse("").is_err());
    }

    #[test]
    fn test_first_declaration_wins() {
        let doc = SchemaDocument {
            get_methods: vec![
                GetMethodDecl {
                    name: "get_a".into(),
                    inputs: vec![],
                    outputs: vec![Parameter::with_category("int", "x", "uint64")],
                },
                GetMethodDecl {
                    name: "get_a".into(),
                    inputs: vec![],
                    outputs: vec![],
                },
            ],
            ..Default::default()
        };
        assert_eq!(doc.find_get_method("get_a").unwrap().outputs.len(), 1);
    }

    #[test]
    fn test_json_roundtrip_keeps_malformed_records() {
        let doc = SchemaDocument {
            messages: vec![MessageDecl {
                name: "broken".into(),
                body: MessageBody::Malformed {
                    original: "not a message".into(),
                    reason: "missing '#'".into(),
                },
            }],
            ..Default::default()
        };
        let json = doc.to_json_pretty().unwrap();
        let back = SchemaDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
        assert!(back.messages[0].is_malformed());
    }

    #[test]
    fn test_lint_matches_parser_warnings() {
        let parsed = crate::parse_schema(
            r#"<abi>
                <interface name="a"/>
                <get_method name="get_x"/>
                <get_method name="get_x"/>
                <internal name="bad">garbage text</internal>
                <internal name="bad">excesses#d53276db = InternalMsgBody;</internal>
                <interface name="a"/>
            </abi>"#,
        )
        .unwrap();
        let mut expected = parsed.warnings.clone();
        let mut linted = parsed.document.lint();
        let key = |w: &SchemaWarning| serde_json::to_string(w).unwrap();
        expected.sort_by_key(key);
        linted.sort_by_key(key);
        assert_eq!(linted, expected);
        assert_eq!(linted.len(), 4);
    }
}
