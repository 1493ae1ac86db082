use dp_cto::core::event::SkillName;
use dp_cto::core::output::Decision;
use dp_cto::core::stage::{Stage, StageRecord};
use dp_cto::plugins::gate::{DpCtoSkill, Gate, deny_message, gate};
use dp_cto::plugins::intercept::{decide, provisional_stage};
use dp_cto::plugins::superpowers::SuperpowersPolicy;
use regex::Regex;

const NOW: &str = "2026-02-02T00:00:00Z";

/// Expected outcome per (stage, skill): `None` = allow, `Some(pattern)` =
/// deny with a reason matching the case-insensitive pattern.
fn expected(stage: Stage, skill: DpCtoSkill) -> Option<&'static str> {
    use DpCtoSkill::*;
    use Stage::*;
    match (stage, skill) {
        (_, RalphCancel) => None,
        (Idle, Start) | (Idle, Verify) => None,
        (Idle, Execute) | (Idle, Ralph) => Some("start"),
        (Planning, _) => Some("wait"),
        (Planned, Start) | (Planned, Execute) | (Planned, Verify) => None,
        (Planned, Ralph) => Some("execute"),
        (Executing, Start) | (Executing, Execute) => Some("progress"),
        (Executing, Ralph) | (Executing, Verify) => None,
        (Complete, Start) | (Complete, Verify) => None,
        (Complete, Execute) | (Complete, Ralph) => Some("start"),
    }
}

fn record_at(stage: Stage) -> StageRecord {
    StageRecord {
        stage,
        plan_path: String::new(),
        started_at: "2026-01-01T00:00:00Z".to_string(),
        history: vec![stage.as_str().to_string()],
    }
}

#[test]
fn test_gate_matrix_matches_stage_table() {
    for stage in Stage::ALL {
        for skill in DpCtoSkill::ALL {
            let outcome = gate(stage, skill);
            match expected(stage, skill) {
                None => assert_eq!(outcome, Gate::Allow, "{stage} x {skill} should allow"),
                Some(pattern) => {
                    assert!(
                        matches!(outcome, Gate::Deny(_)),
                        "{stage} x {skill} should deny"
                    );
                    let reason = deny_message(stage, skill).expect("deny has a reason");
                    let re = Regex::new(&format!("(?i){}", pattern)).unwrap();
                    assert!(re.is_match(&reason), "{stage} x {skill}: '{reason}' !~ /{pattern}/i");
                }
            }
        }
    }
}

#[test]
fn test_decide_agrees_with_gate_for_every_cell() {
    let policy = SuperpowersPolicy::builtin();
    for stage in Stage::ALL {
        for skill in DpCtoSkill::ALL {
            let out = decide(
                &record_at(stage),
                &SkillName::DpCto(skill.as_str().to_string()),
                &policy,
                NOW,
            );
            assert_eq!(
                out.decision.is_deny(),
                expected(stage, skill).is_some(),
                "{stage} x {skill}"
            );
            if out.decision.is_deny() {
                assert!(out.provisional.is_none());
            }
        }
    }
}

#[test]
fn test_ralph_cancel_allowed_from_every_stage() {
    let policy = SuperpowersPolicy::builtin();
    for stage in Stage::ALL {
        let out = decide(
            &record_at(stage),
            &SkillName::DpCto("ralph-cancel".to_string()),
            &policy,
            NOW,
        );
        assert_eq!(out.decision, Decision::Allow, "from {stage}");
        assert!(out.provisional.is_none());
    }
}

#[test]
fn test_provisional_stages() {
    assert_eq!(provisional_stage(Stage::Idle, DpCtoSkill::Start), Some(Stage::Planning));
    assert_eq!(provisional_stage(Stage::Complete, DpCtoSkill::Start), Some(Stage::Planning));
    assert_eq!(provisional_stage(Stage::Planned, DpCtoSkill::Execute), Some(Stage::Executing));
    assert_eq!(provisional_stage(Stage::Planned, DpCtoSkill::Start), None);
    assert_eq!(provisional_stage(Stage::Executing, DpCtoSkill::Ralph), None);
    assert_eq!(provisional_stage(Stage::Idle, DpCtoSkill::Verify), None);
}

#[test]
fn test_new_cycle_from_complete_keeps_plan_and_history() {
    let mut done = record_at(Stage::Complete);
    done.plan_path = ".claude/plans/old/02-implementation.md".to_string();
    done.history = vec!["planning".into(), "planned".into(), "executing".into(), "complete".into()];

    let out = decide(
        &done,
        &SkillName::DpCto("start".to_string()),
        &SuperpowersPolicy::builtin(),
        NOW,
    );
    let next = out.provisional.expect("new cycle pre-writes planning");
    assert_eq!(next.stage, Stage::Planning);
    assert_eq!(next.started_at, NOW);
    assert_eq!(next.plan_path, ".claude/plans/old/02-implementation.md");
    assert_eq!(next.history.len(), 5);
    assert_eq!(next.history.last().map(String::as_str), Some("planning"));
}
