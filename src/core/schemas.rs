//! Centralized names for everything dp-cto reads or writes on disk and on the
//! hook wire.
//!
//! Layout under a session's working directory:
//! 1. `.claude/dp-cto/<session>.stage.json`: one Stage Record per session.
//! 2. `.claude/dp-cto/config.toml`: optional guard configuration.
//! 3. `.claude/plans/_index.md`: plan index written by the planning skill.

// --- Stage records ---
pub const STATE_DIR: &str = ".claude/dp-cto";
pub const STAGE_FILE_SUFFIX: &str = ".stage.json";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// --- Plans ---
pub const PLANS_DIR: &str = ".claude/plans";
pub const PLAN_INDEX_FILE: &str = "_index.md";

// --- Hook wire ---
/// `tool_name` value that marks an event as a skill invocation.
pub const SKILL_TOOL_NAME: &str = "Skill";
pub const DP_CTO_NAMESPACE: &str = "dp-cto:";
pub const SUPERPOWERS_NAMESPACE: &str = "superpowers:";
pub const PRE_TOOL_USE_EVENT: &str = "PreToolUse";

/// Log filter variable, same directive syntax as `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "DP_CTO_LOG";

/// Exit code for a failed stage-record write. The host treats 2 as a
/// blocking error and feeds stderr back to the agent.
pub const EXIT_PERSIST_FAILURE: u8 = 2;
