//! Tool-server endpoint resolution: base URL + connection timeout per
//! tool server, with environment overrides taking precedence over a `[tools]` TOML table.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// The three tool servers the core consumes.
pub const TOOL_NAMES: [&str; 3] = [
    "application_verification",
    "document_processing",
    "financial_calculations",
];

#[derive(Debug, Error)]
pub enum ToolConfigError {
    #[error("missing tool endpoint config for '{0}' (set MCP_{1}_URL or [tools].{0} in config)")]
    MissingToolConfig(String, String),
    #[error("parse tools config {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("read tools config {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved URL + timeout for one tool server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolEndpoint {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct ToolsFile {
    #[serde(default)]
    tools: HashMap<String, ToolsFileEntry>,
}

#[derive(Debug, Deserialize)]
struct ToolsFileEntry {
    url: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Resolved tool-endpoint configuration for all configured tool servers.
///
/// Precedence per server: `MCP_<NAME_UPPER>_URL` env var, then the `[tools.<name>]` table in
/// `config_path` (if given), then `default_timeout` for the timeout component.
#[derive(Clone, Debug, Default)]
pub struct ToolEndpoints {
    endpoints: HashMap<String, ToolEndpoint>,
}

impl ToolEndpoints {
    /// Loads endpoint config for every name in `TOOL_NAMES`. A name with neither an env
    /// override nor a config entry is simply absent (not an error) — `resolve` is what
    /// fails with `MissingToolConfig`, only when an agent actually asks for that tool.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ToolConfigError> {
        let file = match config_path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path).map_err(|source| ToolConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str::<ToolsFile>(&text).map_err(|source| ToolConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            _ => ToolsFile::default(),
        };

        let mut endpoints = HashMap::new();
        for name in TOOL_NAMES {
            let env_key = format!("MCP_{}_URL", name.to_uppercase());
            let url = std::env::var(&env_key)
                .ok()
                .or_else(|| file.tools.get(name).map(|e| e.url.clone()));
            let timeout_secs = file
                .tools
                .get(name)
                .and_then(|e| e.timeout_secs)
                .unwrap_or(default_timeout_secs(name));
            if let Some(url) = url {
                endpoints.insert(
                    name.to_string(),
                    ToolEndpoint {
                        url,
                        timeout: Duration::from_secs(timeout_secs),
                    },
                );
            }
        }
        Ok(Self { endpoints })
    }

    /// Returns the endpoint for `name`, failing with `MissingToolConfig` if neither an env
    /// override nor config provided a URL. Fatal for the agent that called it.
    pub fn resolve(&self, name: &str) -> Result<&ToolEndpoint, ToolConfigError> {
        self.endpoints
            .get(name)
            .ok_or_else(|| ToolConfigError::MissingToolConfig(name.to_string(), name.to_uppercase()))
    }
}

/// Per-tool default timeout matching each specialist's target wall time.
fn default_timeout_secs(name: &str) -> u64 {
    match name {
        "application_verification" => 5,
        "financial_calculations" => 60,
        "document_processing" => 30,
        _ => 30,
    }
}
