use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "qa-report",
    version,
    about = "Discard-aware rollups and reports over QA test manifests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Manifest file or URL (default: manifest.js)
    #[arg(long, global = true)]
    pub manifest: Option<String>,

    /// Discard-status file or URL (default: discard_status.js)
    #[arg(long, global = true)]
    pub discards: Option<String>,

    /// JSONL trace file for dangling discards and stale summaries
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Path to config file (default: qa-report.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the discard-aware report
    Report {
        /// Output format: console, html, junit, json
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show one extension, or one feature with its scenarios and steps
    Show {
        #[arg(long)]
        extension: String,

        #[arg(long)]
        feature: Option<String>,
    },

    /// List the normalized key of every scenario
    Keys,

    /// Report stale stored summaries and dangling discard entries
    Check,

    /// Record a reviewer decision and export the full discard snapshot
    Discard {
        #[arg(long)]
        extension: String,

        #[arg(long)]
        feature: String,

        /// Scenario name; omit to discard the whole feature
        #[arg(long)]
        scenario: Option<String>,

        /// Mark as active again instead of discarded
        #[arg(long)]
        restore: bool,

        /// Where to write the snapshot (default: the discard input file)
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `qa-report.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub inputs: InputConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_discards")]
    pub discards: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            discards: default_discards(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    pub path: Option<String>,
}

// Serde default helpers
fn default_manifest() -> String { "manifest.js".to_string() }
fn default_discards() -> String { "discard_status.js".to_string() }
fn default_console() -> String { "console".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("qa-report.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Resolution (CLI > config > defaults)
// ============================================================================

/// Input locations after merging CLI flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub manifest: String,
    pub discards: String,
    pub trace: Option<String>,
}

pub fn resolve_inputs(cli: &Cli, config: &AppConfig) -> Inputs {
    Inputs {
        manifest: cli
            .manifest
            .clone()
            .unwrap_or_else(|| config.inputs.manifest.clone()),
        discards: cli
            .discards
            .clone()
            .unwrap_or_else(|| config.inputs.discards.clone()),
        trace: cli.trace.clone().or_else(|| config.trace.path.clone()),
    }
}
