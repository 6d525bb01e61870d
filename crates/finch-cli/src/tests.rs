//! CLI command tests against temporary databases

use crate::commands;

fn temp_db_path(dir: &tempfile::TempDir) -> String {
    dir.path().join("finch-test.db").to_string_lossy().into_owned()
}

#[test]
fn test_resolve_db_path_prefers_flag() {
    let path = commands::resolve_db_path(Some("/tmp/custom.db")).unwrap();
    assert_eq!(path, "/tmp/custom.db");
}

#[test]
fn test_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db_path(&dir);
    commands::cmd_init(&path, true).unwrap();
    assert!(std::path::Path::new(&path).exists());
}

#[test]
fn test_seed_then_assign() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db_path(&dir);
    commands::cmd_seed(&path, true).unwrap();
    commands::cmd_assign(&path, true, finch_core::seed::HIGH_UTILIZATION_USER, false, false)
        .unwrap();
    commands::cmd_traces(&path, true, Some("pending"), 10).unwrap();
}

#[tokio::test]
async fn test_seed_then_recommend_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db_path(&dir);
    commands::cmd_seed(&path, true).unwrap();
    commands::cmd_recommend(&path, true, finch_core::seed::NEW_USER, false, true)
        .await
        .unwrap();
}

#[test]
fn test_unknown_user_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = temp_db_path(&dir);
    commands::cmd_init(&path, true).unwrap();
    assert!(commands::cmd_assign(&path, true, "ghost", false, false).is_err());
}
