//! Configuration management for the CLI.
//!
//! Settings come from an optional `invox.toml` with environment-variable
//! overrides; secrets are environment-only. The loaded value is threaded
//! explicitly through the pipeline constructors so tests can substitute
//! fakes without touching the environment.

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which pipeline variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Download documents locally and extract from their text.
    Inline,
    /// Hand the model a remote handle and relay its tool calls.
    Tooling,
}

impl Default for PipelineMode {
    fn default() -> Self {
        PipelineMode::Inline
    }
}

impl FromStr for PipelineMode {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inline" => Ok(PipelineMode::Inline),
            "tooling" => Ok(PipelineMode::Tooling),
            other => Err(CliError::Config(format!(
                "Unknown pipeline mode '{other}' (expected 'inline' or 'tooling')"
            ))),
        }
    }
}

/// Tool-execution session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct McpSettings {
    /// Command spawning the MCP server.
    pub command: Option<String>,

    /// Arguments for the command.
    #[serde(default)]
    pub args: Vec<String>,

    /// Tools the model may be offered. Advertised tools outside this list
    /// are never exposed.
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: Vec<String>,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            allowed_tools: default_allowed_tools(),
        }
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Model name for extraction calls.
    #[serde(default = "default_model")]
    pub model: String,

    /// SQLite database path.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Local folder holding downloaded invoices.
    #[serde(default = "default_invoice_dir")]
    pub invoice_dir: PathBuf,

    /// `true` re-extracts and upserts every document; `false` skips
    /// documents already present in the store.
    #[serde(default)]
    pub reprocess: bool,

    /// Pipeline variant.
    #[serde(default)]
    pub mode: PipelineMode,

    /// Box folder to ingest from.
    #[serde(default)]
    pub box_folder_id: Option<String>,

    /// Tool-execution session settings.
    #[serde(default)]
    pub mcp: McpSettings,

    /// Gemini API key (environment only).
    #[serde(skip)]
    pub gemini_api_key: String,

    /// Box access token (environment only).
    #[serde(skip)]
    pub box_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: default_model(),
            database: default_database(),
            invoice_dir: default_invoice_dir(),
            reprocess: false,
            mode: PipelineMode::default(),
            box_folder_id: None,
            mcp: McpSettings::default(),
            gemini_api_key: String::new(),
            box_token: None,
        }
    }
}

impl Settings {
    /// Load configuration: `.env`, then `invox.toml` (or `$INVOX_CONFIG`),
    /// then environment overrides.
    pub fn load() -> Result<Self> {
        // .env is a convenience for local runs; absence is fine.
        let _ = dotenvy::dotenv();

        let path = env::var("INVOX_CONFIG").unwrap_or_else(|_| "invox.toml".to_string());
        let mut settings = Self::from_file(Path::new(&path))?;
        settings.apply_env()?;
        Ok(settings)
    }

    /// Parse the TOML file when present, defaults otherwise.
    pub fn from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = env::var("INVOX_MODEL") {
            self.model = v;
        }
        if let Ok(v) = env::var("INVOX_DATABASE") {
            self.database = PathBuf::from(v);
        }
        if let Ok(v) = env::var("INVOX_INVOICE_DIR") {
            self.invoice_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("INVOX_MODE") {
            self.mode = v.parse()?;
        }
        if let Ok(v) = env::var("INVOX_REPROCESS") {
            self.reprocess = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = env::var("BOX_FOLDER_ID") {
            self.box_folder_id = Some(v);
        }

        self.gemini_api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| CliError::Config("GEMINI_API_KEY is not set".to_string()))?;
        self.box_token = env::var("BOX_DEVELOPER_TOKEN").ok();
        Ok(())
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from("invoices.db")
}

fn default_invoice_dir() -> PathBuf {
    PathBuf::from("invoices")
}

fn default_allowed_tools() -> Vec<String> {
    vec![
        "box_who_am_i".to_string(),
        "box_list_folder_content_by_folder_id".to_string(),
        "box_ai_extract_tool".to_string(),
    ]
}
