//! Interception Guard.
//!
//! Runs before a skill executes. [`decide`] is the pure half: stage record in,
//! decision and optional provisional record out. [`run_intercept`] wires it
//! to the event, config and store, and performs the pre-write so the record
//! already says "in progress" while a slow `start`/`execute` is running.

use tracing::{debug, warn};

use crate::core::config::{self, GuardConfig};
use crate::core::error::GuardError;
use crate::core::event::{HookEvent, SkillName};
use crate::core::output::{Decision, compact_line};
use crate::core::stage::{Stage, StageRecord};
use crate::core::store::StageStore;
use crate::core::time;
use crate::plugins::gate::{self, DpCtoSkill};
use crate::plugins::superpowers::{self, SuperpowersPolicy, Tier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub decision: Decision,
    /// Record to write before the skill runs, when the call opens a phase.
    pub provisional: Option<StageRecord>,
}

impl GuardOutcome {
    fn decided(decision: Decision) -> Self {
        Self {
            decision,
            provisional: None,
        }
    }
}

/// Stage an allowed call moves the session into before it runs.
pub fn provisional_stage(stage: Stage, skill: DpCtoSkill) -> Option<Stage> {
    match (skill, stage) {
        (DpCtoSkill::Start, Stage::Idle | Stage::Complete) => Some(Stage::Planning),
        (DpCtoSkill::Execute, Stage::Planned) => Some(Stage::Executing),
        _ => None,
    }
}

/// Evaluate one skill call against the session's current record.
///
/// `now` stamps `started_at` when the call opens a new cycle.
pub fn decide(
    record: &StageRecord,
    skill: &SkillName,
    policy: &SuperpowersPolicy,
    now: &str,
) -> GuardOutcome {
    match skill {
        SkillName::DpCto(name) => {
            let Some(skill) = DpCtoSkill::from_name(name) else {
                return GuardOutcome::decided(Decision::Pass);
            };
            if let Some(reason) = gate::deny_message(record.stage, skill) {
                return GuardOutcome::decided(Decision::deny(reason));
            }
            let provisional = provisional_stage(record.stage, skill).map(|next| {
                let mut updated = record.clone();
                if next == Stage::Planning {
                    updated.started_at = now.to_string();
                }
                updated.enter(next);
                updated
            });
            GuardOutcome {
                decision: Decision::Allow,
                provisional,
            }
        }
        SkillName::Superpowers(name) => {
            let decision = match policy.classify(name) {
                Tier::Deny { replacement } => {
                    Decision::deny(superpowers::deny_message(name, replacement.as_deref()))
                }
                Tier::Allow => Decision::Allow,
                Tier::Warn { keyword } => Decision::Warn {
                    message: superpowers::warn_message(&compact_line(name, 80), &keyword),
                },
                Tier::Pass => Decision::Pass,
            };
            GuardOutcome::decided(decision)
        }
        SkillName::Other(_) => GuardOutcome::decided(Decision::Pass),
    }
}

/// Handle one PreToolUse event end to end. Only a failed pre-write is an
/// error; everything else resolves to a decision.
pub fn run_intercept(event: &HookEvent) -> Result<Decision, GuardError> {
    let Some(invocation) = event.as_skill_invocation() else {
        return Ok(Decision::Pass);
    };
    let config = config::load_or_default(&invocation.cwd);
    let policy = SuperpowersPolicy::from_config(&config.superpowers);
    let store = stage_store(&config, &invocation.cwd);

    let record = match &invocation.session {
        Some(session) => store.load(session),
        None => StageRecord::idle(),
    };
    let outcome = decide(&record, &invocation.skill, &policy, &time::now_rfc3339());

    if let Decision::Warn { message } = &outcome.decision {
        warn!(skill = ?invocation.skill, "{}", message);
    }
    debug!(
        skill = ?invocation.skill,
        stage = %record.stage,
        decision = ?outcome.decision,
        "intercept evaluated"
    );

    if let (Some(session), Some(provisional)) = (&invocation.session, &outcome.provisional) {
        store.save(session, provisional)?;
        debug!(session = %session, from = %record.stage, to = %provisional.stage, "provisional stage written");
    }
    Ok(outcome.decision)
}

pub(crate) fn stage_store(config: &GuardConfig, cwd: &std::path::Path) -> StageStore {
    StageStore::new(config.state_dir_in(cwd))
}
