//! Where schema text comes from.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::config::DEFAULT_CONNECT_TIMEOUT_SECS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    File(PathBuf),
    Url(String),
}

impl SchemaSource {
    /// `http://` and `https://` arguments are URLs, everything else a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            SchemaSource::Url(arg.to_string())
        } else {
            SchemaSource::File(PathBuf::from(arg))
        }
    }

    /// Whether the source is an IR dump (`.json`) rather than schema XML.
    pub fn is_ir(&self) -> bool {
        let name = match self {
            SchemaSource::File(path) => path.to_string_lossy().into_owned(),
            SchemaSource::Url(url) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
        };
        name.to_ascii_lowercase().ends_with(".json")
    }

    /// Read the schema text. `timeout` only applies to URLs.
    pub fn fetch(&self, timeout: Duration) -> Result<String> {
        match self {
            SchemaSource::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read schema {}", path.display())),
            SchemaSource::Url(url) => {
                debug!(url, ?timeout, "fetching schema");
                let agent = build_agent(timeout, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));
                agent
                    .get(url)
                    .call()
                    .map_err(|e| anyhow!("schema request to {} failed: {}", url, e))?
                    .into_string()
                    .with_context(|| format!("failed to read schema body from {}", url))
            }
        }
    }
}

fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .timeout_connect(connect_timeout)
        .build()
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::File(path) => write!(f, "{}", path.display()),
            SchemaSource::Url(url) => f.write_str(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_arg() {
        assert_eq!(
            SchemaSource::from_arg("https://example.org/abi.xml"),
            SchemaSource::Url("https://example.org/abi.xml".into())
        );
        assert_eq!(
            SchemaSource::from_arg("schemas/abi.xml"),
            SchemaSource::File(PathBuf::from("schemas/abi.xml"))
        );
    }

    #[test]
    fn test_json_sources_are_ir() {
        assert!(SchemaSource::from_arg("out/abi.json").is_ir());
        assert!(SchemaSource::from_arg("https://example.org/ABI.JSON?v=2").is_ir());
        assert!(!SchemaSource::from_arg("schemas/abi.xml").is_ir());
        assert!(!SchemaSource::from_arg("https://example.org/json").is_ir());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = SchemaSource::from_arg("/definitely/not/here.xml")
            .fetch(Duration::from_secs(1))
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.xml"));
    }
}
