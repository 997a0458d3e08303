//! TON ABI Resolver
//!
//! Interface inheritance resolution for parsed ABI schemas.
//!
//! This crate provides:
//! - [`graph`]: the single-parent inheritance graph with topological and
//!   reverse-topological orderings
//! - [`InterfaceGraph::effective_members`]: own plus inherited get-methods and
//!   messages for every interface
//!
//! # Ordering
//!
//! `topo_order` places parents before children and drives binding generation.
//! `reverse_topo_order` places the most-derived interfaces first and drives
//! conformance probing: a derived interface requires a superset of its
//! ancestor's methods, so it must be tried before the ancestor.

pub mod graph;

pub use graph::{resolve, EffectiveMembers, InterfaceGraph, MAX_INHERITANCE_DEPTH};
