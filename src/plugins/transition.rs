//! Stage Transition Recorder.
//!
//! Runs after a skill has run and applies the authoritative post-invocation
//! transitions. The table here only mutates stage; whether a call was allowed
//! is the guard's business, so the two can disagree in timing but not in the
//! final stage.
//!
//! | skill         | transition                         |
//! |---------------|------------------------------------|
//! | start         | planning → planned, plan_path set  |
//! | execute       | executing → complete               |
//! | ralph, verify | none (visit recorded)              |
//! | anything else | ignored                            |

use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::core::config::{self, GuardConfig};
use crate::core::error::GuardError;
use crate::core::event::{HookEvent, SkillName};
use crate::core::stage::{Stage, StageRecord};
use crate::plugins::gate::DpCtoSkill;
use crate::plugins::intercept::stage_store;

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).expect("valid link regex")
});

static BARE_MD_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s`'(\[])((?:[A-Za-z0-9_.-]+/)+[A-Za-z0-9_.-]+\.md)(?:$|[\s`'),.;:\]])")
        .expect("valid path regex")
});

/// Skills whose runs are recorded. `ralph-cancel` is deliberately absent.
pub fn is_tracked(skill: DpCtoSkill) -> bool {
    matches!(
        skill,
        DpCtoSkill::Start | DpCtoSkill::Execute | DpCtoSkill::Ralph | DpCtoSkill::Verify
    )
}

/// Stage the recorder moves to after `skill` ran in `stage`, if it moves.
pub fn post_stage(stage: Stage, skill: DpCtoSkill) -> Option<Stage> {
    match (skill, stage) {
        (DpCtoSkill::Start, Stage::Planning) => Some(Stage::Planned),
        (DpCtoSkill::Execute, Stage::Executing) => Some(Stage::Complete),
        _ => None,
    }
}

/// Apply the post-invocation transition for `skill` to `record`.
///
/// Returns `None` for skills the recorder ignores. `discovered_plan` is only
/// consulted for `start`; `None` leaves `plan_path` as it was.
pub fn transition(
    record: &StageRecord,
    skill: &SkillName,
    discovered_plan: Option<&str>,
) -> Option<StageRecord> {
    let SkillName::DpCto(name) = skill else {
        return None;
    };
    let skill = DpCtoSkill::from_name(name).filter(|s| is_tracked(*s))?;

    let mut updated = record.clone();
    match post_stage(record.stage, skill) {
        Some(next) => updated.enter(next),
        None => updated.touch(),
    }
    if skill == DpCtoSkill::Start
        && let Some(plan) = discovered_plan
    {
        updated.plan_path = plan.to_string();
    }
    Some(updated)
}

fn is_plan_reference(candidate: &str, index_file: &str) -> bool {
    let index_name = Path::new(index_file).file_name();
    candidate.ends_with(".md")
        && !candidate.contains("://")
        && !candidate.starts_with('/')
        && !candidate.split('/').any(|part| part == "..")
        && candidate != index_file
        && Path::new(candidate).file_name() != index_name
}

fn normalize_reference(raw: &str) -> &str {
    let without_anchor = raw.split('#').next().unwrap_or(raw);
    without_anchor.trim_start_matches("./")
}

/// First plan-file reference in an index document: a markdown link target
/// if there is one, otherwise the first bare relative `.md` path that has a
/// directory part (`tui/02-implementation.md`, not `README.md`).
pub fn extract_plan_reference(index_text: &str, index_file: &str) -> Option<String> {
    let linked = MARKDOWN_LINK
        .captures_iter(index_text)
        .filter_map(|c| c.get(1))
        .map(|m| normalize_reference(m.as_str()))
        .find(|r| is_plan_reference(r, index_file));
    if let Some(reference) = linked {
        return Some(reference.to_string());
    }
    index_text.lines().find_map(|line| {
        BARE_MD_PATH
            .captures_iter(line)
            .filter_map(|c| c.get(1))
            .map(|m| normalize_reference(m.as_str()))
            .find(|r| is_plan_reference(r, index_file))
            .map(str::to_string)
    })
}

/// `plans_dir` joined with `reference`, always with `/` separators.
pub fn resolve_plan_path(plans_dir: &str, reference: &str) -> String {
    format!("{}/{}", plans_dir.trim_end_matches('/'), reference)
}

/// Read the plan index under `cwd` and resolve its first plan reference.
/// No index, or an index without references, yields `None`.
pub fn discover_plan_path(config: &GuardConfig, cwd: &Path) -> Option<String> {
    let index_path = config.index_path_in(cwd);
    let text = match fs::read_to_string(&index_path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return None,
        Err(err) => {
            warn!(path = %index_path.display(), error = %err, "unreadable plan index");
            return None;
        }
    };
    let reference = extract_plan_reference(&text, &config.index_file);
    if reference.is_none() {
        debug!(path = %index_path.display(), "plan index names no plan file");
    }
    reference.map(|r| resolve_plan_path(&config.plans_dir, &r))
}

/// Handle one post-invocation event end to end. Returns the record written,
/// or `None` when the event had no effect.
pub fn run_transition(event: &HookEvent) -> Result<Option<StageRecord>, GuardError> {
    let Some(invocation) = event.as_skill_invocation() else {
        return Ok(None);
    };
    let Some(session) = &invocation.session else {
        debug!("no session id, nothing to record");
        return Ok(None);
    };
    let config = config::load_or_default(&invocation.cwd);
    let store = stage_store(&config, &invocation.cwd);
    let record = store.load(session);

    let discovered = match &invocation.skill {
        SkillName::DpCto(name) if name == DpCtoSkill::Start.as_str() => {
            discover_plan_path(&config, &invocation.cwd)
        }
        _ => None,
    };
    let Some(updated) = transition(&record, &invocation.skill, discovered.as_deref()) else {
        return Ok(None);
    };
    store.save(session, &updated)?;
    debug!(
        session = %session,
        from = %record.stage,
        to = %updated.stage,
        plan_path = %updated.plan_path,
        "transition recorded"
    );
    Ok(Some(updated))
}
