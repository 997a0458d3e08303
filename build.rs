use std::path::{Path, PathBuf};

/// Schemas whose generated bindings are compiled into the integration tests.
const BINDING_FIXTURES: &[&str] = &["nft", "reserved_names"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let fixtures = Path::new("tests/fixtures");

    for name in BINDING_FIXTURES {
        let schema = fixtures.join(format!("{}.xml", name));
        println!("cargo:rerun-if-changed={}", schema.display());

        let text = std::fs::read_to_string(&schema)?;
        let parsed = ton_abi_schema::parse_schema(&text)?;
        let graph = ton_abi_resolver::resolve(&parsed.document);
        let bundle = ton_abi_codegen::emit_bundle(&parsed.document, &graph);
        std::fs::write(out_dir.join(format!("{}_bindings.rs", name)), bundle)?;
    }

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
