//! ton-abi-bindgen: typed Rust bindings from TON contract ABI schemas
//!
//! ## Commands
//!
//! - **generate**: parse a schema and write one binding module per interface
//! - **inspect**: print the parsed IR and every warning as JSON
//! - **order**: print the topological interface orders
//! - **batch**: run every source listed in a JSON sources file
//!
//! ## Example Usage
//!
//! ```bash
//! # Generate bindings from a local schema
//! ton-abi-bindgen generate schemas/abi.xml -o src/generated
//!
//! # Generate from a URL, dumping the IR next to the bindings
//! ton-abi-bindgen generate https://example.org/abi.xml --dump-ir
//!
//! # Regenerate from a previously dumped IR
//! ton-abi-bindgen generate generated/abi.json -o src/generated
//!
//! # Run a batch
//! ton-abi-bindgen batch abi-sources.json
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ton_abi_bindgen::config::{http_timeout, resolve_output_dir};
use ton_abi_bindgen::{generate_from, generate_to_dir, run_batch, SchemaSource, SourcesConfig};

#[derive(Parser)]
#[command(
    name = "ton-abi-bindgen",
    author,
    version,
    about = "Generate typed Rust bindings from TON contract ABI schemas"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings from a schema file or URL
    Generate {
        /// Schema path or http(s) URL; `.json` sources are read as IR dumps
        source: String,

        /// Output directory (default: $TON_ABI_OUTPUT_DIR or ./generated)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also write the parsed IR as abi.json
        #[arg(long)]
        dump_ir: bool,
    },

    /// Print the parsed IR and warnings as JSON
    Inspect {
        /// Schema path or http(s) URL
        source: String,
    },

    /// Print topological and reverse topological interface orders
    Order {
        /// Schema path or http(s) URL
        source: String,
    },

    /// Generate bindings for every source in a JSON sources file
    Batch {
        /// Sources config path
        config: PathBuf,

        /// Also write the parsed IR as abi.json for each source
        #[arg(long)]
        dump_ir: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ton_abi_bindgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Cli { command, json } = Cli::parse();
    let timeout = http_timeout();

    match command {
        Commands::Generate {
            source,
            output,
            dump_ir,
        } => {
            let source = SchemaSource::from_arg(&source);
            let out_dir = resolve_output_dir(output.as_deref());
            let summary = generate_to_dir(&source, &out_dir, dump_ir, timeout)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Generated {} interface(s) into {} ({} warning(s))",
                    summary.interfaces.len(),
                    summary.out_dir.display(),
                    summary.warnings
                );
                for file in &summary.files {
                    println!("  {}", file.display());
                }
            }
        }
        Commands::Inspect { source } => {
            let generation = generate_from(&SchemaSource::from_arg(&source), timeout)?;
            println!("{}", serde_json::to_string_pretty(&generation.inspect())?);
        }
        Commands::Order { source } => {
            let generation = generate_from(&SchemaSource::from_arg(&source), timeout)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&generation.orders())?);
            } else {
                println!("topo:    {}", generation.graph.topo_order().join(", "));
                println!(
                    "reverse: {}",
                    generation.graph.reverse_topo_order().join(", ")
                );
            }
        }
        Commands::Batch { config, dump_ir } => {
            let sources = SourcesConfig::load(&config)?;
            let base_dir = config.parent().unwrap_or_else(|| Path::new("."));
            let summary = run_batch(&sources, base_dir, dump_ir, timeout);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for generated in &summary.generated {
                    println!(
                        "ok      {} -> {}",
                        generated.source,
                        generated.out_dir.display()
                    );
                }
                for failure in &summary.failed {
                    println!("failed  {}: {}", failure.source, failure.error);
                }
            }
            if !summary.is_success() {
                bail!(
                    "{} of {} source(s) failed",
                    summary.failed.len(),
                    sources.sources.len()
                );
            }
        }
    }
    Ok(())
}
