//! Hook decision rendering.
//!
//! stdout is the hook protocol: either nothing, a single JSON object carrying
//! `hookSpecificOutput`, or a plain `WARNING:` line for flagged-but-allowed
//! calls. Diagnostics go to stderr through `tracing`, never here.

use serde::Serialize;

use crate::core::error::GuardError;

/// Outcome of evaluating one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
    /// Allowed, with a warning for the side channel instead of a decision.
    Warn { message: String },
    /// Out of scope: no output at all.
    Pass,
}

impl Decision {
    pub fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Decision::Deny { .. })
    }

    pub fn is_allowed(&self) -> bool {
        !self.is_deny()
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Decision::Deny { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionDecision {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub permission_decision: PermissionDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_decision_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookResponse {
    pub hook_specific_output: HookSpecificOutput,
}

/// Render `decision` as the exact stdout text, or `None` for silence.
pub fn render_decision(decision: &Decision, event_name: &str) -> Result<Option<String>, GuardError> {
    let (permission, reason) = match decision {
        Decision::Pass => return Ok(None),
        Decision::Warn { message } => return Ok(Some(format!("WARNING: {}", message))),
        Decision::Allow => (PermissionDecision::Allow, None),
        Decision::Deny { reason } => (PermissionDecision::Deny, Some(reason.clone())),
    };
    let response = HookResponse {
        hook_specific_output: HookSpecificOutput {
            hook_event_name: event_name.to_string(),
            permission_decision: permission,
            permission_decision_reason: reason,
        },
    };
    Ok(Some(serde_json::to_string(&response)?))
}

/// Collapse newlines/extra whitespace and bound length for one-line display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}
