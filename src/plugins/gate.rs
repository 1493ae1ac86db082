//! dp-cto stage-gating table.
//!
//! Pure data: `(stage, skill) -> Gate`. The Interception Guard looks the
//! answer up here; nothing in this module touches disk.

use std::fmt;

use crate::core::stage::Stage;

/// The dp-cto skills the guard gates by stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DpCtoSkill {
    Start,
    Execute,
    Ralph,
    Verify,
    RalphCancel,
}

impl DpCtoSkill {
    pub const ALL: [DpCtoSkill; 5] = [
        DpCtoSkill::Start,
        DpCtoSkill::Execute,
        DpCtoSkill::Ralph,
        DpCtoSkill::Verify,
        DpCtoSkill::RalphCancel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DpCtoSkill::Start => "start",
            DpCtoSkill::Execute => "execute",
            DpCtoSkill::Ralph => "ralph",
            DpCtoSkill::Verify => "verify",
            DpCtoSkill::RalphCancel => "ralph-cancel",
        }
    }

    /// Resolve the part after `dp-cto:`. Unknown names are not gated.
    pub fn from_name(name: &str) -> Option<Self> {
        DpCtoSkill::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for DpCtoSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dp-cto:{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    RunStartFirst,
    PlanningInProgress,
    RunExecuteFirst,
    ExecutionInProgress,
}

impl DenyReason {
    pub fn message(self, skill: DpCtoSkill, stage: Stage) -> String {
        match self {
            DenyReason::RunStartFirst => format!(
                "{} is not available yet: run /dp-cto:start first to produce a plan (current stage: {}).",
                skill, stage
            ),
            DenyReason::PlanningInProgress => format!(
                "Please wait: planning in progress. {} is blocked until /dp-cto:start finishes (current stage: {}).",
                skill, stage
            ),
            DenyReason::RunExecuteFirst => format!(
                "{} needs a running execution: run /dp-cto:execute first (current stage: {}).",
                skill, stage
            ),
            DenyReason::ExecutionInProgress => format!(
                "Execution in progress: {} is blocked until the current execution completes (current stage: {}).",
                skill, stage
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allow,
    Deny(DenyReason),
}

use DenyReason::*;
use Gate::{Allow, Deny};

/// Rows follow `Stage::ALL`, columns follow `DpCtoSkill::ALL`:
/// start, execute, ralph, verify, ralph-cancel.
const GATE_TABLE: [[Gate; 5]; 5] = [
    // idle
    [Allow, Deny(RunStartFirst), Deny(RunStartFirst), Allow, Allow],
    // planning
    [
        Deny(PlanningInProgress),
        Deny(PlanningInProgress),
        Deny(PlanningInProgress),
        Deny(PlanningInProgress),
        Allow,
    ],
    // planned
    [Allow, Allow, Deny(RunExecuteFirst), Allow, Allow],
    // executing
    [
        Deny(ExecutionInProgress),
        Deny(ExecutionInProgress),
        Allow,
        Allow,
        Allow,
    ],
    // complete
    [Allow, Deny(RunStartFirst), Deny(RunStartFirst), Allow, Allow],
];

fn stage_row(stage: Stage) -> usize {
    match stage {
        Stage::Idle => 0,
        Stage::Planning => 1,
        Stage::Planned => 2,
        Stage::Executing => 3,
        Stage::Complete => 4,
    }
}

fn skill_column(skill: DpCtoSkill) -> usize {
    match skill {
        DpCtoSkill::Start => 0,
        DpCtoSkill::Execute => 1,
        DpCtoSkill::Ralph => 2,
        DpCtoSkill::Verify => 3,
        DpCtoSkill::RalphCancel => 4,
    }
}

pub fn gate(stage: Stage, skill: DpCtoSkill) -> Gate {
    // ralph-cancel is the safety valve: never blocked.
    if skill == DpCtoSkill::RalphCancel {
        return Allow;
    }
    GATE_TABLE[stage_row(stage)][skill_column(skill)]
}

/// Deny reason text for `(stage, skill)`, or `None` when allowed.
pub fn deny_message(stage: Stage, skill: DpCtoSkill) -> Option<String> {
    match gate(stage, skill) {
        Allow => None,
        Deny(reason) => Some(reason.message(skill, stage)),
    }
}
