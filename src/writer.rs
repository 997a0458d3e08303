//! Persists emitted bindings to a directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::Generation;

pub const IR_DUMP_FILE: &str = "abi.json";

#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    out_dir: PathBuf,
    dump_ir: bool,
}

impl ArtifactWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            dump_ir: false,
        }
    }

    /// Also write the parsed IR as `abi.json`.
    pub fn with_ir_dump(mut self, dump_ir: bool) -> Self {
        self.dump_ir = dump_ir;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Write every generated file, replacing existing ones. Returns the
    /// written paths.
    pub fn write(&self, generation: &Generation) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;

        let mut written = Vec::new();
        for (file_name, source) in generation.emitted.files() {
            written.push(self.write_file(file_name, source)?);
        }
        if self.dump_ir {
            let json = generation
                .document
                .to_json_pretty()
                .context("failed to serialize schema IR")?;
            written.push(self.write_file(IR_DUMP_FILE, &json)?);
        }
        Ok(written)
    }

    fn write_file(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.out_dir.join(file_name);
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
        Ok(path)
    }
}
