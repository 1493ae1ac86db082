use dp_cto::core::config::{GuardConfig, config_path, load_guard_config, load_or_default};
use dp_cto::core::error::GuardError;
use dp_cto::core::stage::{Stage, StageRecord};
use dp_cto::core::store::{SessionId, StageStore};
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::tempdir;

fn session(id: &str) -> SessionId {
    SessionId::parse(id).expect("valid session id")
}

#[test]
fn test_store_defaults_missing_and_corrupt_records_to_idle() {
    let tmp = tempdir().expect("tempdir");
    let store = StageStore::for_cwd(tmp.path());
    let id = session("test-session");

    assert_eq!(store.load(&id), StageRecord::idle());

    fs::create_dir_all(&store.root).unwrap();
    for garbage in ["NOT VALID JSON{{{", "", "[]", r#"{"stage":"done"}"#, r#"{"plan_path":"x"}"#] {
        fs::write(store.record_path(&id), garbage).unwrap();
        assert_eq!(store.load(&id), StageRecord::idle(), "content: {garbage:?}");
    }
}

#[test]
fn test_store_reads_records_written_by_other_tools() {
    let tmp = tempdir().expect("tempdir");
    let store = StageStore::for_cwd(tmp.path());
    let id = session("abc");
    fs::create_dir_all(&store.root).unwrap();
    fs::write(
        store.record_path(&id),
        r#"{"stage":"executing","plan_path":".claude/plans/t/02.md","started_at":"2026-01-01T00:00:00Z","history":["planning","planned","executing"],"extra":1}"#,
    )
    .unwrap();
    let record = store.load(&id);
    assert_eq!(record.stage, Stage::Executing);
    assert_eq!(record.plan_path, ".claude/plans/t/02.md");
    assert_eq!(record.history.len(), 3);
}

#[test]
fn test_store_sessions_are_independent() {
    let tmp = tempdir().expect("tempdir");
    let store = StageStore::for_cwd(tmp.path());
    let mut planning = StageRecord::idle();
    planning.enter(Stage::Planning);
    store.save(&session("one"), &planning).unwrap();

    assert_eq!(store.load(&session("one")).stage, Stage::Planning);
    assert_eq!(store.load(&session("two")).stage, Stage::Idle);
}

#[test]
fn test_store_concurrent_writers_never_expose_partial_records() {
    let tmp = tempdir().expect("tempdir");
    let store = Arc::new(StageStore::for_cwd(tmp.path()));
    let id = session("racy");
    store.save(&id, &StageRecord::idle()).unwrap();

    let writers = 4;
    let barrier = Arc::new(Barrier::new(writers + 1));
    let mut handles = Vec::new();
    for w in 0..writers {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        let id = id.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..25 {
                let mut record = StageRecord::idle();
                record.plan_path = format!(".claude/plans/w{w}/{i}.md");
                for _ in 0..50 {
                    record.enter(Stage::Executing);
                }
                store.save(&id, &record).expect("save");
            }
        }));
    }
    barrier.wait();
    for _ in 0..200 {
        let raw = fs::read_to_string(store.record_path(&id)).expect("record always present");
        let parsed: StageRecord = serde_json::from_str(&raw).expect("never a torn write");
        assert!(parsed.history.is_empty() || parsed.history.len() == 50);
    }
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_invalid_session_ids_are_validation_errors() {
    for bad in ["", "../../etc/passwd", "a b", "sess/1"] {
        assert!(matches!(SessionId::parse(bad), Err(GuardError::Validation(_))), "{bad:?}");
    }
}

#[test]
fn test_config_redirects_state_dir() {
    let tmp = tempdir().expect("tempdir");
    let path = config_path(tmp.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "state_dir = \"var/dp-cto\"\n").unwrap();

    let config = load_guard_config(tmp.path()).unwrap();
    assert_eq!(config.state_dir_in(tmp.path()), tmp.path().join("var/dp-cto"));
    assert_eq!(config.plans_dir, GuardConfig::default().plans_dir);
}

#[test]
fn test_config_unknown_keys_fall_back_to_defaults() {
    let tmp = tempdir().expect("tempdir");
    let path = config_path(tmp.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "stat_dir = \"typo\"\n").unwrap();

    assert!(load_guard_config(tmp.path()).is_err());
    assert_eq!(load_or_default(tmp.path()), GuardConfig::default());
}
