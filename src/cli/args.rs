//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// convcache - schema-driven JSON converters
///
/// Builds decoders, encoders and checkers for recursive record types and
/// applies them to JSON documents.
#[derive(Parser, Debug)]
#[command(name = "convcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CONVCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .convcache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a JSON document conforms to a type
    Check(ConvertArgs),

    /// Decode and re-encode a JSON document, applying defaults and tags
    Normalize(ConvertArgs),

    /// List the record types defined by a schema
    Types(TypesArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments shared by commands that convert a document
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Schema file (TOML)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Type expression, e.g. `Node` or `list[tuple[int, str]]`
    #[arg(short = 't', long = "type")]
    pub ty: String,

    /// JSON input file (reads stdin when omitted)
    pub input: Option<PathBuf>,
}

/// Arguments for the types command
#[derive(Parser, Debug)]
pub struct TypesArgs {
    /// Schema file (TOML)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.isolation)
        key: String,
        /// Value to set
        value: String,
        /// Write to project-local .convcache.toml instead of global config
        #[arg(long)]
        local: bool,
    },
}

/// Output format for the types command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
