//! CLI struct definitions for the dp-cto command-line interface.
//!
//! All clap-derived types live here. Dispatch lives in `lib.rs`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "dp-cto",
    version = env!("CARGO_PKG_VERSION"),
    about = "Workflow-stage gatekeeper for the dp-cto plugin: gates skill calls by lifecycle stage and records stage transitions per session."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
    /// Log at debug level to stderr (DP_CTO_LOG overrides the filter).
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// PreToolUse hook: read one event on stdin, print the gate decision.
    Intercept,
    /// PostToolUse hook: read one event on stdin, record the stage transition.
    Transition,
    /// Show the stage record for a session.
    Status(StatusCli),
    /// Check marketplace.json, plugin.json and hooks.json for structural problems.
    Manifests(ManifestsCli),
}

#[derive(clap::Args, Debug)]
pub struct StatusCli {
    #[clap(long)]
    pub session_id: String,
    /// Session working directory (defaults to the current directory).
    #[clap(short, long)]
    pub dir: Option<PathBuf>,
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct ManifestsCli {
    /// Repository root holding `.claude-plugin/` and `plugins/dp-cto/`.
    #[clap(short, long)]
    pub root: Option<PathBuf>,
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
