use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "playscan",
    version,
    about = "Static security and hygiene analysis for automation playbooks"
)]
pub struct Args {
    /// Path to the playbook (YAML)
    #[arg(required_unless_present = "list_rules")]
    pub playbook_path: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Optional git commit hash for tool metadata
    #[arg(long)]
    pub commit: Option<String>,

    /// YAML configuration file (rule selection, failure policy)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run only these rule ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Skip these rule ids (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub disable: Vec<String>,

    /// Abort on the first rule failure instead of reporting it as a finding
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the built plays as JSON and exit
    #[arg(long)]
    pub dump_ast: bool,

    /// List the available rules and exit
    #[arg(long)]
    pub list_rules: bool,

    /// Log pipeline progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
