//! dp-cto: workflow-stage gatekeeper for an agent-orchestration plugin.
//!
//! **dp-cto enforces one lifecycle per session over the skills an agent may
//! call.**
//!
//! ```text
//! idle ──start──▶ planning ──(start ran)──▶ planned ──execute──▶ executing ──(execute ran)──▶ complete
//!   ▲                                                                                            │
//!   └──────────────────────────────────────── start (new cycle) ◀────────────────────────────────┘
//! ```
//!
//! # Two hooks, one record
//!
//! - `dp-cto intercept` (PreToolUse): looks the call up in the stage-gating
//!   table and answers allow/deny. Opening calls (`start`, `execute`)
//!   pre-write the provisional stage before the skill runs.
//! - `dp-cto transition` (PostToolUse): applies the post-invocation
//!   transition and, for `start`, picks the plan path out of the plan index.
//!
//! Both share the per-session Stage Record under `.claude/dp-cto/`. Missing
//! or corrupt records read as `idle`; only a failed write is an error.
//!
//! `superpowers:*` skills are tiered separately (deny / allow / warn / pass)
//! so another plugin's orchestration cannot fork the dp-cto workflow.
//!
//! # Crate Structure
//!
//! - [`core`]: stage record, store, event parsing, decision output, config
//! - [`plugins`]: policy tables, the guard, the recorder, manifest checks

pub mod cli;
pub mod core;
pub mod plugins;

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::cli::{Cli, Command, ManifestsCli, OutputFormat, StatusCli};
use crate::core::error::GuardError;
use crate::core::event::HookEvent;
use crate::core::output::{compact_line, render_decision};
use crate::core::store::SessionId;
use crate::core::{config, time};
use crate::plugins::{intercept, manifest, transition};

/// Which hook a stdin payload is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Intercept,
    Transition,
}

/// Process one raw hook payload and return what belongs on stdout.
///
/// Malformed payloads and out-of-scope events give `Ok(None)`. The only
/// error is a failed stage-record write.
pub fn handle_hook(kind: HookKind, raw: &str) -> Result<Option<String>, GuardError> {
    let Some(event) = HookEvent::parse(raw) else {
        return Ok(None);
    };
    match kind {
        HookKind::Intercept => {
            let decision = intercept::run_intercept(&event)?;
            render_decision(&decision, event.event_name())
        }
        HookKind::Transition => {
            transition::run_transition(&event)?;
            Ok(None)
        }
    }
}

/// Dispatch a parsed command line. `stdin` is only read by the hook
/// subcommands. Returns the process exit code.
pub fn run(cli: Cli, stdin: impl FnOnce() -> String) -> Result<u8, GuardError> {
    match cli.command {
        Command::Intercept => emit(handle_hook(HookKind::Intercept, &stdin())?),
        Command::Transition => emit(handle_hook(HookKind::Transition, &stdin())?),
        Command::Status(status) => show_status(status),
        Command::Manifests(manifests) => check_manifests(manifests),
    }
}

fn emit(stdout: Option<String>) -> Result<u8, GuardError> {
    if let Some(text) = stdout {
        println!("{}", text);
    }
    Ok(0)
}

fn working_dir(dir: Option<PathBuf>) -> Result<PathBuf, GuardError> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

fn show_status(cli: StatusCli) -> Result<u8, GuardError> {
    let cwd = working_dir(cli.dir)?;
    let session = SessionId::parse(&cli.session_id)?;
    let config = config::load_guard_config(&cwd)?;
    let store = intercept::stage_store(&config, &cwd);
    let path = store.record_path(&session);
    let record = store.load(&session);

    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ts": time::now_rfc3339(),
                    "cmd": "status",
                    "status": "ok",
                    "session_id": session.as_str(),
                    "record_path": path.to_string_lossy(),
                    "record_exists": path.exists(),
                    "record": record,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{} {}", "Session:".bold(), session);
            println!("{} {}", "Stage:".bold(), record.stage.as_str().bright_cyan());
            let plan = if record.has_plan() {
                record.plan_path.clone()
            } else {
                "(none)".dimmed().to_string()
            };
            println!("{} {}", "Plan:".bold(), plan);
            if !record.started_at.is_empty() {
                println!("{} {}", "Started:".bold(), record.started_at);
            }
            if !record.history.is_empty() {
                println!(
                    "{} {}",
                    "History:".bold(),
                    compact_line(&record.history.join(" -> "), 160)
                );
            }
            if !path.exists() {
                println!("  {}", "no record on disk; showing idle default".dimmed());
            }
        }
    }
    Ok(0)
}

fn check_manifests(cli: ManifestsCli) -> Result<u8, GuardError> {
    let root = working_dir(cli.root)?;
    let findings = manifest::check_repo(&root);
    let status = if findings.is_empty() { "ok" } else { "failed" };

    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ts": time::now_rfc3339(),
                    "cmd": "manifests",
                    "status": status,
                    "root": root.to_string_lossy(),
                    "findings": findings,
                }))?
            );
        }
        OutputFormat::Text => print_findings(&root, &findings),
    }
    Ok(if findings.is_empty() { 0 } else { 1 })
}

fn print_findings(root: &Path, findings: &[manifest::Finding]) {
    if findings.is_empty() {
        println!("{} manifests under {} are well-formed", "✓".bright_green(), root.display());
        return;
    }
    for finding in findings {
        println!(
            "{} {} {}: {}",
            "✗".bright_red(),
            finding.file.bold(),
            finding.path,
            finding.message
        );
    }
    println!("{} finding(s)", findings.len());
}
