#![allow(dead_code, unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: schema fixtures and the pipeline output for them
//! - `mocks`: in-memory contract runtime

pub mod fixtures;
pub mod mocks;

pub use fixtures::{fixture_path, nft_generation, nft_schema};
pub use mocks::{nft_data_stack, MockRuntime};
