//! Lifecycle stages and the per-session Stage Record.
//!
//! A session walks `idle → planning → planned → executing → complete` and may
//! start a new cycle from `complete`. The record is the only mutable state
//! dp-cto owns; see [`crate::core::store`] for how it is loaded and saved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::GuardError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Idle,
    Planning,
    Planned,
    Executing,
    Complete,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Idle,
        Stage::Planning,
        Stage::Planned,
        Stage::Executing,
        Stage::Complete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Planning => "planning",
            Stage::Planned => "planned",
            Stage::Executing => "executing",
            Stage::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| GuardError::Validation(format!("unknown stage '{}'", s)))
    }
}

/// Persisted lifecycle state for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    /// Empty until a plan document is known. Only the `start` transition
    /// rewrites it.
    #[serde(default)]
    pub plan_path: String,
    #[serde(default)]
    pub started_at: String,
    /// Every stage the session has been observed in, oldest first.
    #[serde(default)]
    pub history: Vec<String>,
}

impl StageRecord {
    /// The record every absent, unreadable or corrupt file loads as.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Moves to `stage` and records the visit. `plan_path` is left alone.
    pub fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.history.push(stage.as_str().to_string());
    }

    /// Records a visit to the current stage without changing it.
    pub fn touch(&mut self) {
        self.history.push(self.stage.as_str().to_string());
    }

    pub fn has_plan(&self) -> bool {
        !self.plan_path.is_empty()
    }
}
