use std::time::{Duration, Instant};

use livedoc::{EditorSession, EngineConfig, EngineError, Format, LineRange, SessionState, SyncOutcome};
use serde_json::json;

fn pod(version: &str, replicas: u64) -> serde_json::Value {
    json!({
        "metadata": {"name": "x", "resourceVersion": version},
        "spec": {"replicas": replicas}
    })
}

#[test]
fn edit_then_server_update_then_merge() {
    let t0 = Instant::now();
    let mut session = EditorSession::open(&pod("1", 1), Some("1"), Format::Json, EngineConfig::default()).unwrap();
    assert_eq!(session.state(), SessionState::Clean);

    let edited = session.text().replace("\"replicas\": 1", "\"replicas\": 2");
    assert_eq!(session.edit(edited, t0).unwrap(), SessionState::Dirty);

    let server = json!({
        "metadata": {"name": "x", "resourceVersion": "2"},
        "spec": {"replicas": 1},
        "status": {"ready": 1}
    });
    let outcome = session.server_update(&server, Some("2"), t0).unwrap();
    assert_eq!(outcome, SyncOutcome::Stale);
    assert_eq!(session.state(), SessionState::DirtyStale);

    let report = session.merge_changes(t0 + Duration::from_millis(10)).unwrap();
    assert_eq!(report.baseline_version.as_deref(), Some("2"));
    assert_eq!(session.state(), SessionState::Clean);

    let merged: serde_json::Value = serde_json::from_str(session.text()).unwrap();
    assert_eq!(merged["spec"]["replicas"], json!(2));
    assert_eq!(merged["metadata"]["resourceVersion"], json!("2"));
    assert_eq!(merged["status"], json!({"ready": 1}));
}

#[test]
fn yaml_session_follows_server_while_clean() {
    let t0 = Instant::now();
    let mut session = EditorSession::open(&pod("1", 1), Some("1"), Format::Yaml, EngineConfig::default()).unwrap();
    assert_eq!(
        session.text(),
        "metadata:\n  name: x\n  resourceVersion: '1'\nspec:\n  replicas: 1\n"
    );

    // Only server-managed fields moved: buffer updated, nothing flagged.
    let outcome = session.server_update(&pod("2", 1), Some("2"), t0).unwrap();
    assert_eq!(outcome, SyncOutcome::Replaced { highlight: None });
    assert!(session.text().contains("resourceVersion: '2'"));
    assert!(session.decorations().is_empty());

    // A real change is flagged, then fades.
    let outcome = session.server_update(&pod("3", 4), Some("3"), t0).unwrap();
    let SyncOutcome::Replaced { highlight: Some(highlight) } = outcome else {
        panic!("expected a highlighted replace, got {outcome:?}");
    };
    assert_eq!(highlight.decorated, vec![LineRange::single(5)]);
    assert_eq!(session.decorations(), &[LineRange::single(5)]);
    assert!(session.poll(t0 + Duration::from_millis(2_500)).highlight_cleared);
    assert!(session.decorations().is_empty());
    assert_eq!(session.baseline_version(), Some("3"));
}

#[test]
fn stale_session_keeps_latest_snapshot_for_merge() {
    let t0 = Instant::now();
    let mut session = EditorSession::open(&pod("1", 1), Some("1"), Format::Yaml, EngineConfig::default()).unwrap();
    let edited = session.text().replace("name: x", "name: y");
    session.edit(edited, t0).unwrap();

    assert_eq!(session.server_update(&pod("2", 2), Some("2"), t0).unwrap(), SyncOutcome::Stale);
    assert_eq!(session.server_update(&pod("3", 3), Some("3"), t0).unwrap(), SyncOutcome::Stale);
    assert_eq!(session.latest_version(), Some("3"));

    session.merge_changes(t0).unwrap();
    assert_eq!(
        session.text(),
        "metadata:\n  name: y\n  resourceVersion: '3'\nspec:\n  replicas: 3\n"
    );
    assert_eq!(session.state(), SessionState::Clean);
}

#[test]
fn conflict_then_reload() {
    let t0 = Instant::now();
    let mut session = EditorSession::open(&pod("1", 1), Some("1"), Format::Yaml, EngineConfig::default()).unwrap();
    let edited = session.text().replace("replicas: 1", "replicas: 5");
    session.edit(edited.clone(), t0).unwrap();
    session.server_update(&pod("2", 2), Some("2"), t0).unwrap();

    let err = session.merge_changes(t0).unwrap_err();
    assert_eq!(err, EngineError::MergeConflict { paths: vec!["spec.replicas".into()] });
    assert_eq!(session.text(), edited);
    assert_eq!(session.state(), SessionState::DirtyStale);

    let highlight = session.reload_from_server(t0).unwrap().unwrap();
    assert_eq!(highlight.decorated, vec![LineRange::single(5)]);
    assert!(session.text().contains("replicas: 2"));
    assert_eq!(session.state(), SessionState::Clean);
}

#[test]
fn merge_rejects_multi_document_buffer() {
    let t0 = Instant::now();
    let mut session = EditorSession::open(&pod("1", 1), Some("1"), Format::Yaml, EngineConfig::default()).unwrap();
    let edited = format!("{}---\nkind: Extra\n", session.text());
    session.edit(edited.clone(), t0).unwrap();
    session.server_update(&pod("2", 1), Some("2"), t0).unwrap();
    assert_eq!(session.merge_changes(t0).unwrap_err(), EngineError::MultiDocument { count: 2 });
    assert_eq!(session.text(), edited);
}

#[test]
fn close_cancels_pending_timers() {
    let t0 = Instant::now();
    let mut session = EditorSession::open(&pod("1", 1), Some("1"), Format::Yaml, EngineConfig::default()).unwrap();
    session.server_update(&pod("2", 9), Some("2"), t0).unwrap();
    session.edit("spec: [\n", t0).unwrap();
    assert!(!session.decorations().is_empty());

    session.close();
    let events = session.poll(t0 + Duration::from_secs(5));
    assert!(!events.validated && !events.highlight_cleared);
    assert!(session.validation_error().is_none());
    assert!(session.decorations().is_empty());
    assert_eq!(session.reload_from_server(t0), Err(EngineError::SessionClosed));
}
