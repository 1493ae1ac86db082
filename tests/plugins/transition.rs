use dp_cto::core::config::GuardConfig;
use dp_cto::core::event::HookEvent;
use dp_cto::core::stage::{Stage, StageRecord};
use dp_cto::core::store::{SessionId, StageStore};
use dp_cto::plugins::intercept::run_intercept;
use dp_cto::plugins::transition::{discover_plan_path, run_transition};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SESSION: &str = "test-session";

fn event(dir: &Path, skill: &str) -> HookEvent {
    HookEvent::parse(
        &serde_json::json!({
            "tool_name": "Skill",
            "tool_input": { "skill": skill },
            "session_id": SESSION,
            "cwd": dir.to_string_lossy(),
        })
        .to_string(),
    )
    .expect("valid event")
}

fn store(dir: &Path) -> (StageStore, SessionId) {
    (StageStore::for_cwd(dir), SessionId::parse(SESSION).unwrap())
}

fn seed(dir: &Path, stage: Stage, plan_path: &str) {
    let (store, session) = store(dir);
    let record = StageRecord {
        stage,
        plan_path: plan_path.to_string(),
        started_at: "2026-01-01T00:00:00Z".to_string(),
        history: vec![stage.as_str().to_string()],
    };
    store.save(&session, &record).unwrap();
}

fn load(dir: &Path) -> StageRecord {
    let (store, session) = store(dir);
    store.load(&session)
}

fn seed_index(dir: &Path, body: &str) {
    let plans = dir.join(".claude").join("plans");
    fs::create_dir_all(&plans).unwrap();
    fs::write(plans.join("_index.md"), body).unwrap();
}

#[test]
fn test_start_transitions_planning_to_planned() {
    let tmp = tempdir().unwrap();
    seed(tmp.path(), Stage::Planning, "");
    run_transition(&event(tmp.path(), "dp-cto:start")).unwrap();
    assert_eq!(load(tmp.path()).stage, Stage::Planned);
}

#[test]
fn test_execute_transitions_executing_to_complete() {
    let tmp = tempdir().unwrap();
    seed(tmp.path(), Stage::Executing, "");
    run_transition(&event(tmp.path(), "dp-cto:execute")).unwrap();
    assert_eq!(load(tmp.path()).stage, Stage::Complete);
}

#[test]
fn test_ralph_and_verify_record_visits_without_changing_stage() {
    let tmp = tempdir().unwrap();
    seed(tmp.path(), Stage::Executing, "");
    run_transition(&event(tmp.path(), "dp-cto:ralph")).unwrap();
    run_transition(&event(tmp.path(), "dp-cto:verify")).unwrap();
    let record = load(tmp.path());
    assert_eq!(record.stage, Stage::Executing);
    assert_eq!(record.history, vec!["executing", "executing", "executing"]);
}

#[test]
fn test_non_dp_cto_skill_has_no_side_effects() {
    let tmp = tempdir().unwrap();
    seed(tmp.path(), Stage::Executing, "");
    let before = load(tmp.path());
    let written = run_transition(&event(tmp.path(), "superpowers:test-driven-development")).unwrap();
    assert!(written.is_none());
    assert_eq!(load(tmp.path()), before);
}

#[test]
fn test_start_extracts_plan_path_from_index() {
    let tmp = tempdir().unwrap();
    seed(tmp.path(), Stage::Planning, "");
    seed_index(tmp.path(), "# Plans\n\n- [Implementation](tui/02-implementation.md)\n");
    run_transition(&event(tmp.path(), "dp-cto:start")).unwrap();
    let record = load(tmp.path());
    assert_eq!(record.stage, Stage::Planned);
    assert_eq!(record.plan_path, ".claude/plans/tui/02-implementation.md");
}

#[test]
fn test_start_without_index_leaves_plan_path() {
    let tmp = tempdir().unwrap();
    seed(tmp.path(), Stage::Planning, ".claude/plans/prev/01-plan.md");
    run_transition(&event(tmp.path(), "dp-cto:start")).unwrap();
    assert_eq!(load(tmp.path()).plan_path, ".claude/plans/prev/01-plan.md");
}

#[test]
fn test_discover_plan_path_honours_configured_plans_dir() {
    let tmp = tempdir().unwrap();
    let config = GuardConfig {
        plans_dir: "docs/plans".to_string(),
        ..GuardConfig::default()
    };
    assert_eq!(discover_plan_path(&config, tmp.path()), None);
    fs::create_dir_all(tmp.path().join("docs/plans")).unwrap();
    fs::write(tmp.path().join("docs/plans/_index.md"), "api/01-plan.md\n").unwrap();
    assert_eq!(
        discover_plan_path(&config, tmp.path()).as_deref(),
        Some("docs/plans/api/01-plan.md")
    );
}

#[test]
fn test_full_cycle_guard_then_recorder() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();

    // idle --start--> planning (guard pre-write)
    assert!(run_intercept(&event(dir, "dp-cto:start")).unwrap().is_allowed());
    assert_eq!(load(dir).stage, Stage::Planning);

    // planning --(start ran)--> planned, plan discovered
    seed_index(dir, "[impl](tui/02-implementation.md)\n");
    run_transition(&event(dir, "dp-cto:start")).unwrap();
    assert_eq!(load(dir).stage, Stage::Planned);

    // planned --execute--> executing (guard pre-write)
    assert!(run_intercept(&event(dir, "dp-cto:execute")).unwrap().is_allowed());
    assert_eq!(load(dir).stage, Stage::Executing);

    // executing --(execute ran)--> complete
    run_transition(&event(dir, "dp-cto:execute")).unwrap();
    let record = load(dir);
    assert_eq!(record.stage, Stage::Complete);
    assert_eq!(record.plan_path, ".claude/plans/tui/02-implementation.md");
    assert_eq!(record.history, vec!["planning", "planned", "executing", "complete"]);
    assert!(!record.started_at.is_empty());

    // re-running execute from complete is denied by the guard and a no-op for the recorder
    assert!(run_intercept(&event(dir, "dp-cto:execute")).unwrap().is_deny());
    run_transition(&event(dir, "dp-cto:execute")).unwrap();
    assert_eq!(load(dir).stage, Stage::Complete);
}
