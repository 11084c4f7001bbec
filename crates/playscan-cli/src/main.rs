use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use playscan_core::report::{model::ToolInfo, render};
use playscan_core::rules::{FailurePolicy, registry};
use playscan_core::{AnalysisConfig, build_plays, inspect_with_config};

mod args;

fn main() -> Result<()> {
    let args = args::Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if args.list_rules {
        let listing: String = registry::catalog()
            .iter()
            .map(|rule| format!("{rule}\n"))
            .collect();
        return emit(&listing, args.out.as_deref());
    }

    let path = args
        .playbook_path
        .as_deref()
        .context("a playbook path is required")?;

    if args.dump_ast {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let plays = build_plays(&text)?;
        return emit(&serde_json::to_string_pretty(&plays)?, args.out.as_deref());
    }

    let config = resolve_config(&args)?;

    let tool = ToolInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: args.commit.clone(),
    };

    let report = inspect_with_config(path, tool, &config)
        .with_context(|| format!("analysis of {} failed", path.display()))?;

    let output = match args.format {
        args::OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        args::OutputFormat::Text => render::render_text(&report),
    };
    emit(&output, args.out.as_deref())?;

    std::process::exit(report.classification.exit_code);
}

/// Configuration file values, overridden by command-line flags.
fn resolve_config(args: &args::Args) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    if !args.select.is_empty() {
        config.rules.select = args.select.clone();
    }
    if !args.disable.is_empty() {
        config.rules.disable = args.disable.clone();
    }
    if args.fail_fast {
        config.failure_policy = FailurePolicy::FailFast;
    }

    log::debug!("effective configuration: {config:?}");
    Ok(config)
}

fn emit(output: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{output}"),
    }
    Ok(())
}
