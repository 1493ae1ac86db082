//! Hook event payloads as delivered by the host on stdin.
//!
//! Parsing is lenient: a field of the wrong
//! type is treated as absent rather than failing the whole event, and input
//! that is not a JSON object at all yields `None` (pass-through).

use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tracing::warn;

use crate::core::schemas;
use crate::core::store::SessionId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookEvent {
    pub tool_name: Option<String>,
    pub skill: Option<String>,
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub hook_event_name: Option<String>,
}

impl HookEvent {
    pub fn parse(raw: &str) -> Option<Self> {
        let value: JsonValue = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(err) => {
                warn!(error = %err, "hook input is not JSON, passing through");
                return None;
            }
        };
        let Some(obj) = value.as_object() else {
            warn!("hook input is not a JSON object, passing through");
            return None;
        };
        let text = |key: &str| obj.get(key).and_then(JsonValue::as_str).map(str::to_string);
        Some(Self {
            tool_name: text("tool_name"),
            skill: obj
                .get("tool_input")
                .and_then(|input| input.get("skill"))
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            session_id: text("session_id"),
            cwd: text("cwd"),
            hook_event_name: text("hook_event_name"),
        })
    }

    /// Skill-invocation view of the event, or `None` when the event is out of
    /// scope (another tool, or no skill named).
    pub fn as_skill_invocation(&self) -> Option<SkillInvocation> {
        if self.tool_name.as_deref() != Some(schemas::SKILL_TOOL_NAME) {
            return None;
        }
        let skill = self.skill.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let session = match self.session_id.as_deref() {
            Some(raw) => match SessionId::parse(raw) {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!(error = %err, "unusable session_id, evaluating without persistence");
                    None
                }
            },
            None => None,
        };
        let cwd = self
            .cwd
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Some(SkillInvocation {
            skill: SkillName::classify(skill),
            session,
            cwd,
        })
    }

    pub fn event_name(&self) -> &str {
        self.hook_event_name
            .as_deref()
            .unwrap_or(schemas::PRE_TOOL_USE_EVENT)
    }
}

/// A skill name split by the namespace that decides which policy applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillName {
    /// `dp-cto:<name>`; holds `<name>`.
    DpCto(String),
    /// `superpowers:<name>`; holds `<name>`.
    Superpowers(String),
    Other(String),
}

impl SkillName {
    pub fn classify(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(schemas::DP_CTO_NAMESPACE) {
            SkillName::DpCto(name.to_string())
        } else if let Some(name) = raw.strip_prefix(schemas::SUPERPOWERS_NAMESPACE) {
            SkillName::Superpowers(name.to_string())
        } else {
            SkillName::Other(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillInvocation {
    pub skill: SkillName,
    /// `None` when the event carried no usable session id; such events are
    /// evaluated against an idle record and never persisted.
    pub session: Option<SessionId>,
    pub cwd: PathBuf,
}
