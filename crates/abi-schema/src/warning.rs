//! Recoverable schema problems.
//!
//! Parse- and graph-level problems degrade gracefully: the offending record
//! is skipped or the offending edge is dropped, and a warning is recorded so
//! one bad record never blocks generation for the rest of the document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which reference list of an interface a dangling name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    GetMethod,
    InboundMessage,
    OutboundMessage,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefKind::GetMethod => "get-method",
            RefKind::InboundMessage => "inbound message",
            RefKind::OutboundMessage => "outbound message",
        };
        f.write_str(s)
    }
}

/// Namespace a duplicate name was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Interface,
    GetMethod,
    Message,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Namespace::Interface => "interface",
            Namespace::GetMethod => "get-method",
            Namespace::Message => "message",
        };
        f.write_str(s)
    }
}

/// Serialized with a `warning` tag naming the variant; `kind` is taken by
/// [`SchemaWarning::DanglingReference`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum SchemaWarning {
    /// A message record did not match the grammar. It stays in the IR but is
    /// excluded from resolution and emission.
    MalformedMessage {
        name: String,
        original: String,
        reason: String,
    },
    /// An interface references a name that is not declared.
    DanglingReference {
        interface: String,
        kind: RefKind,
        name: String,
    },
    /// `inherits` names an interface that is not declared.
    MissingParent { interface: String, parent: String },
    /// The inheritance graph contains a cycle; the closing edge was dropped.
    CycleDetected { path: Vec<String> },
    /// A later declaration reuses a name; lookups resolve to the first one.
    DuplicateName { namespace: Namespace, name: String },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaWarning::MalformedMessage { name, reason, .. } => {
                write!(f, "message '{}' could not be parsed: {}", name, reason)
            }
            SchemaWarning::DanglingReference {
                interface,
                kind,
                name,
            } => write!(
                f,
                "{} '{}' referenced by interface '{}' is not defined",
                kind, name, interface
            ),
            SchemaWarning::MissingParent { interface, parent } => write!(
                f,
                "parent interface '{}' of '{}' is not defined",
                parent, interface
            ),
            SchemaWarning::CycleDetected { path } => {
                write!(f, "inheritance cycle broken: {}", path.join(" -> "))
            }
            SchemaWarning::DuplicateName { namespace, name } => write!(
                f,
                "duplicate {} name '{}'; the first declaration is used",
                namespace, name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let w = SchemaWarning::DanglingReference {
            interface: "nft_item".into(),
            kind: RefKind::GetMethod,
            name: "get_nft_data".into(),
        };
        assert_eq!(
            w.to_string(),
            "get-method 'get_nft_data' referenced by interface 'nft_item' is not defined"
        );

        let w = SchemaWarning::CycleDetected {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(w.to_string(), "inheritance cycle broken: a -> b -> a");
    }

    #[test]
    fn test_dangling_reference_json() {
        let w = SchemaWarning::DanglingReference {
            interface: "nft_item".into(),
            kind: RefKind::InboundMessage,
            name: "nft_transfer".into(),
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "warning": "dangling_reference",
                "interface": "nft_item",
                "kind": "inbound_message",
                "name": "nft_transfer",
            })
        );
        let back: SchemaWarning = serde_json::from_value(json).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn test_every_variant_round_trips() {
        let warnings = vec![
            SchemaWarning::MalformedMessage {
                name: "broken".into(),
                original: "not a message".into(),
                reason: "missing '#'".into(),
            },
            SchemaWarning::MissingParent {
                interface: "a".into(),
                parent: "ghost".into(),
            },
            SchemaWarning::CycleDetected {
                path: vec!["a".into(), "b".into(), "a".into()],
            },
            SchemaWarning::DuplicateName {
                namespace: Namespace::GetMethod,
                name: "seqno".into(),
            },
        ];
        let json = serde_json::to_string(&warnings).unwrap();
        let back: Vec<SchemaWarning> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, warnings);
    }
}
