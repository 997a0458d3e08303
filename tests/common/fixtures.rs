//! Fixture loading utilities.

use std::path::PathBuf;

use ton_abi_bindgen::{generate, Generation};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// NFT standard schema: collection, item, item_simple (inherits item),
/// royalty, plus one malformed message.
pub fn nft_schema() -> String {
    std::fs::read_to_string(fixture_path("nft.xml")).expect("nft.xml fixture should exist")
}

pub fn nft_generation() -> Generation {
    generate(&nft_schema()).expect("nft.xml fixture should generate")
}
