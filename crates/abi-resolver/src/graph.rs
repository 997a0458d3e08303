//! Inheritance graph over the interfaces of one schema.
//!
//! Each interface has at most one parent, so the graph is a forest once
//! cycles are broken. Resolution never fails: a missing parent leaves the
//! child as a root, and a cycle loses its closing edge. Both cases are
//! reported as [`SchemaWarning`]s.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use ton_abi_schema::{InterfaceDecl, RefKind, SchemaDocument, SchemaWarning};

/// Upper bound on ancestor walks. Cycles are already broken by the time
/// members are collected; this only guards against pathological chains.
pub const MAX_INHERITANCE_DEPTH: usize = 64;

/// Own plus inherited members of one interface, deduplicated by name in
/// child-before-ancestor discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectiveMembers {
    pub get_methods: Vec<String>,
    pub inbound_messages: Vec<String>,
    pub outbound_messages: Vec<String>,
}

impl EffectiveMembers {
    /// No get-methods and no inbound messages. Outbound messages are not
    /// probeable and do not count.
    pub fn is_empty(&self) -> bool {
        self.get_methods.is_empty() && self.inbound_messages.is_empty()
    }
}

/// Resolved inheritance structure of a schema.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InterfaceGraph {
    topo_order: Vec<String>,
    reverse_topo_order: Vec<String>,
    /// Parent edges that survived cycle breaking and missing-parent checks.
    parents: IndexMap<String, Option<String>>,
    lineages: IndexMap<String, Vec<String>>,
    members: IndexMap<String, EffectiveMembers>,
    warnings: Vec<SchemaWarning>,
}

impl InterfaceGraph {
    /// Parents before children.
    pub fn topo_order(&self) -> &[String] {
        &self.topo_order
    }

    /// Most-derived interfaces first.
    pub fn reverse_topo_order(&self) -> &[String] {
        &self.reverse_topo_order
    }

    pub fn parent_of(&self, interface: &str) -> Option<&str> {
        self.parents.get(interface)?.as_deref()
    }

    /// The interface itself followed by its ancestors, nearest first.
    pub fn lineage(&self, interface: &str) -> &[String] {
        self.lineages
            .get(interface)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn effective_members(&self, interface: &str) -> Option<&EffectiveMembers> {
        self.members.get(interface)
    }

    pub fn contains(&self, interface: &str) -> bool {
        self.parents.contains_key(interface)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn warnings(&self) -> &[SchemaWarning] {
        &self.warnings
    }
}

// Visit states for the depth-first walk.
const UNVISITED: u8 = 0;
const VISITING: u8 = 1;
const VISITED: u8 = 2;

/// Build the inheritance graph, orderings and effective members.
pub fn resolve(doc: &SchemaDocument) -> InterfaceGraph {
    // First declaration of each name wins; later duplicates were already
    // reported by the parser.
    let mut decls: Vec<&InterfaceDecl> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for decl in &doc.interfaces {
        if !index.contains_key(decl.name.as_str()) {
            index.insert(decl.name.as_str(), decls.len());
            decls.push(decl);
        }
    }

    let mut warnings = Vec::new();
    let mut edges: Vec<Option<usize>> = decls
        .iter()
        .map(|decl| {
            let parent = decl.parent.as_deref()?;
            match index.get(parent) {
                Some(&p) => Some(p),
                None => {
                    warn!(interface = %decl.name, parent, "parent interface not declared");
                    warnings.push(SchemaWarning::MissingParent {
                        interface: decl.name.clone(),
                        parent: parent.to_string(),
                    });
                    None
                }
            }
        })
        .collect();

    let order = topological_sort(&decls, &mut edges, &mut warnings);
    let topo_order: Vec<String> = order.iter().map(|&i| decls[i].name.clone()).collect();
    let reverse_topo_order: Vec<String> = topo_order.iter().rev().cloned().collect();

    check_references(doc, &decls, &mut warnings);

    let mut parents = IndexMap::new();
    let mut lineages = IndexMap::new();
    let mut members = IndexMap::new();
    for (i, decl) in decls.iter().enumerate() {
        let lineage = collect_lineage(i, &edges);
        members.insert(
            decl.name.clone(),
            collect_members(doc, &decls, &lineage),
        );
        lineages.insert(
            decl.name.clone(),
            lineage.iter().map(|&a| decls[a].name.clone()).collect(),
        );
        parents.insert(decl.name.clone(), edges[i].map(|p| decls[p].name.clone()));
    }

    debug!(
        interfaces = decls.len(),
        warnings = warnings.len(),
        "resolved interface graph"
    );

    InterfaceGraph {
        topo_order,
        reverse_topo_order,
        parents,
        lineages,
        members,
        warnings,
    }
}

/// Post-order DFS along parent edges. A back edge is removed from `edges`
/// and reported, so the walk always completes.
///
/// Every node has at most one parent, so each walk is a single chain: `path`
/// is the whole DFS stack and unwinding it yields the post-order.
fn topological_sort(
    decls: &[&InterfaceDecl],
    edges: &mut [Option<usize>],
    warnings: &mut Vec<SchemaWarning>,
) -> Vec<usize> {
    let n = decls.len();
    let mut state = vec![UNVISITED; n];
    let mut result = Vec::with_capacity(n);
    let mut path: Vec<usize> = Vec::new();

    for i in 0..n {
        if state[i] != UNVISITED {
            continue;
        }
        let mut node = i;
        loop {
            state[node] = VISITING;
            path.push(node);
            match edges[node] {
                Some(parent) if state[parent] == UNVISITED => node = parent,
                Some(parent) if state[parent] == VISITING => {
                    let start = path.iter().position(|&p| p == parent).unwrap_or(0);
                    let mut cycle: Vec<String> = path[start..]
                        .iter()
                        .map(|&i| decls[i].name.clone())
                        .collect();
                    cycle.push(decls[parent].name.clone());
                    warn!(
                        path = %cycle.join(" -> "),
                        "inheritance cycle, dropping edge"
                    );
                    warnings.push(SchemaWarning::CycleDetected { path: cycle });
                    edges[node] = None;
                    break;
                }
                _ => break,
            }
        }
        while let Some(node) = path.pop() {
            state[node] = VISITED;
            result.push(node);
        }
    }

    result
}

fn collect_lineage(start: usize, edges: &[Option<usize>]) -> Vec<usize> {
    let mut lineage = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(start);

    while let Some(node) = current {
        if lineage.len() >= MAX_INHERITANCE_DEPTH || !seen.insert(node) {
            debug!(node, "stopping ancestor walk");
            break;
        }
        lineage.push(node);
        current = edges[node];
    }
    lineage
}

fn collect_members(
    doc: &SchemaDocument,
    decls: &[&InterfaceDecl],
    lineage: &[usize],
) -> EffectiveMembers {
    let mut members = EffectiveMembers::default();
    let mut seen_methods = HashSet::new();
    let mut seen_inbound = HashSet::new();
    let mut seen_outbound = HashSet::new();

    for &i in lineage {
        let decl = decls[i];
        for name in &decl.get_method_refs {
            if doc.find_get_method(name).is_some() && seen_methods.insert(name.as_str()) {
                members.get_methods.push(name.clone());
            }
        }
        for name in &decl.inbound_message_refs {
            if doc.find_valid_message(name).is_some() && seen_inbound.insert(name.as_str()) {
                members.inbound_messages.push(name.clone());
            }
        }
        for name in &decl.outbound_message_refs {
            if doc.find_valid_message(name).is_some() && seen_outbound.insert(name.as_str()) {
                members.outbound_messages.push(name.clone());
            }
        }
    }
    members
}

/// Report references that name nothing. References to malformed messages are
/// silently excluded: the parser already warned about the record itself.
fn check_references(
    doc: &SchemaDocument,
    decls: &[&InterfaceDecl],
    warnings: &mut Vec<SchemaWarning>,
) {
    for decl in decls {
        let refs = decl
            .get_method_refs
            .iter()
            .map(|n| (RefKind::GetMethod, n, doc.find_get_method(n).is_some()))
            .chain(
                decl.inbound_message_refs
                    .iter()
                    .map(|n| (RefKind::InboundMessage, n, doc.find_message(n).is_some())),
            )
            .chain(
                decl.outbound_message_refs
                    .iter()
                    .map(|n| (RefKind::OutboundMessage, n, doc.find_message(n).is_some())),
            );

        for (kind, name, found) in refs {
            if !found {
                warn!(interface = %decl.name, %kind, name = %name, "dangling reference");
                warnings.push(SchemaWarning::DanglingReference {
                    interface: decl.name.clone(),
                    kind,
                    name: name.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ton_abi_schema::{
        GetMethodDecl, MessageBody, MessageDecl, MessageDefinition, Opcode,
    };

    fn iface(name: &str, parent: Option<&str>, methods: &[&str], inbound: &[&str]) -> InterfaceDecl {
        InterfaceDecl {
            name: name.into(),
            parent: parent.map(Into::into),
            get_method_refs: methods.iter().map(|s| s.to_string()).collect(),
            inbound_message_refs: inbound.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn method(name: &str) -> GetMethodDecl {
        GetMethodDecl {
            name: name.into(),
            ..Default::default()
        }
    }

    fn message(name: &str) -> MessageDecl {
        MessageDecl {
            name: name.into(),
            body: MessageBody::Parsed(MessageDefinition {
                definition_name: name.into(),
                opcode: Opcode::parse("01").unwrap(),
                params: vec![],
                return_type: "InternalMsgBody".into(),
            }),
        }
    }

    #[test]
    fn test_chain_orders() {
        let doc = SchemaDocument {
            interfaces: vec![
                iface("A", None, &[], &[]),
                iface("B", Some("A"), &[], &[]),
                iface("C", Some("B"), &[], &[]),
            ],
            ..Default::default()
        };
        let graph = resolve(&doc);
        assert_eq!(graph.topo_order(), ["A", "B", "C"]);
        assert_eq!(graph.reverse_topo_order(), ["C", "B", "A"]);
        assert_eq!(graph.lineage("C"), ["C", "B", "A"]);
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn test_children_declared_before_parents() {
        let doc = SchemaDocument {
            interfaces: vec![
                iface("C", Some("B"), &[], &[]),
                iface("B", Some("A"), &[], &[]),
                iface("A", None, &[], &[]),
            ],
            ..Default::default()
        };
        let graph = resolve(&doc);
        assert_eq!(graph.topo_order(), ["A", "B", "C"]);
    }

    #[test]
    fn test_cycle_is_broken_with_warning() {
        let doc = SchemaDocument {
            interfaces: vec![
                iface("X", Some("Y"), &["get_x"], &[]),
                iface("Y", Some("X"), &["get_y"], &[]),
            ],
            get_methods: vec![method("get_x"), method("get_y")],
            ..Default::default()
        };
        let graph = resolve(&doc);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.topo_order().len(), 2);
        assert_eq!(
            graph.warnings(),
            [SchemaWarning::CycleDetected {
                path: vec!["X".into(), "Y".into(), "X".into()]
            }]
        );
        // The closing edge Y -> X was dropped, X -> Y survives.
        assert_eq!(graph.parent_of("X"), Some("Y"));
        assert_eq!(graph.parent_of("Y"), None);
        assert_eq!(graph.topo_order(), ["Y", "X"]);
        assert_eq!(
            graph.effective_members("X").unwrap().get_methods,
            vec!["get_x", "get_y"]
        );
    }

    #[test]
    fn test_self_cycle() {
        let doc = SchemaDocument {
            interfaces: vec![iface("S", Some("S"), &[], &[])],
            ..Default::default()
        };
        let graph = resolve(&doc);
        assert_eq!(graph.topo_order(), ["S"]);
        assert_eq!(graph.lineage("S"), ["S"]);
        assert_eq!(graph.warnings().len(), 1);
    }

    #[test]
    fn test_missing_parent_is_root() {
        let doc = SchemaDocument {
            interfaces: vec![iface("orphan", Some("ghost"), &[], &[])],
            ..Default::default()
        };
        let graph = resolve(&doc);
        assert_eq!(graph.topo_order(), ["orphan"]);
        assert_eq!(graph.parent_of("orphan"), None);
        assert_eq!(
            graph.warnings(),
            [SchemaWarning::MissingParent {
                interface: "orphan".into(),
                parent: "ghost".into()
            }]
        );
    }

    #[test]
    fn test_child_without_own_members_inherits_all() {
        let doc = SchemaDocument {
            interfaces: vec![
                iface("nft_item", None, &["get_nft_data"], &["transfer"]),
                iface("nft_item_simple", Some("nft_item"), &[], &[]),
            ],
            get_methods: vec![method("get_nft_data")],
            messages: vec![message("transfer")],
        };
        let graph = resolve(&doc);
        assert_eq!(
            graph.effective_members("nft_item_simple"),
            graph.effective_members("nft_item")
        );
        assert_eq!(graph.reverse_topo_order(), ["nft_item_simple", "nft_item"]);
    }

    #[test]
    fn test_members_dedup_child_first() {
        let doc = SchemaDocument {
            interfaces: vec![
                iface("base", None, &["a", "b"], &[]),
                iface("derived", Some("base"), &["c", "a"], &[]),
            ],
            get_methods: vec![method("a"), method("b"), method("c")],
            ..Default::default()
        };
        let graph = resolve(&doc);
        assert_eq!(
            graph.effective_members("derived").unwrap().get_methods,
            vec!["c", "a", "b"]
        );
    }

    #[test]
    fn test_dangling_and_malformed_refs_are_excluded() {
        let doc = SchemaDocument {
            interfaces: vec![iface("w", None, &["missing"], &["broken", "ok", "nowhere"])],
            messages: vec![
                MessageDecl {
                    name: "broken".into(),
                    body: MessageBody::Malformed {
                        original: "junk".into(),
                        reason: "missing '#'".into(),
                    },
                },
                message("ok"),
            ],
            ..Default::default()
        };
        let graph = resolve(&doc);
        let members = graph.effective_members("w").unwrap();
        assert!(members.get_methods.is_empty());
        assert_eq!(members.inbound_messages, vec!["ok"]);

        let dangling: Vec<_> = graph
            .warnings()
            .iter()
            .filter_map(|w| match w {
                SchemaWarning::DanglingReference { name, kind, .. } => Some((*kind, name.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            dangling,
            vec![
                (RefKind::GetMethod, "missing"),
                (RefKind::InboundMessage, "nowhere")
            ]
        );
    }

    #[test]
    fn test_duplicate_interface_first_wins() {
        let doc = SchemaDocument {
            interfaces: vec![
                iface("dup", None, &["a"], &[]),
                iface("dup", None, &["b"], &[]),
            ],
            get_methods: vec![method("a"), method("b")],
            ..Default::default()
        };
        let graph = resolve(&doc);
        assert_eq!(graph.topo_order(), ["dup"]);
        assert_eq!(graph.effective_members("dup").unwrap().get_methods, vec!["a"]);
    }

    #[test]
    fn test_long_chain_declared_child_first() {
        let depth: usize = 10_000;
        let names: Vec<String> = (0..depth).map(|k| format!("n{}", k)).collect();
        let interfaces = (0..depth)
            .rev()
            .map(|k| {
                let parent = k.checked_sub(1).map(|p| names[p].as_str());
                iface(&names[k], parent, &[], &[])
            })
            .collect();
        let doc = SchemaDocument {
            interfaces,
            ..Default::default()
        };
        let graph = resolve(&doc);
        assert_eq!(graph.topo_order(), names.as_slice());
        assert_eq!(graph.reverse_topo_order()[0], names[depth - 1]);
        assert_eq!(graph.lineage(&names[depth - 1]).len(), MAX_INHERITANCE_DEPTH);
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn test_empty_interface_members() {
        let doc = SchemaDocument {
            interfaces: vec![iface("empty", None, &[], &[])],
            ..Default::default()
        };
        assert!(resolve(&doc).effective_members("empty").unwrap().is_empty());
    }
}
