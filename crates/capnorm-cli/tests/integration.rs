#![allow(deprecated)]
use assert_cmd::Command;
use capnorm_core::store::{AgentRow, SqliteAgentStore};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn capnorm(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("capnorm").unwrap();
    cmd.current_dir(dir.path())
        .env("CAPNORM_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn agent(id: &str, name: &str, skills: Option<&str>, workflows: Option<&str>) -> AgentRow {
    AgentRow {
        id: Some(id.to_string()),
        name: name.to_string(),
        skills_raw: skills.map(str::to_string),
        workflows_raw: workflows.map(str::to_string),
    }
}

/// Default store location (`tadpole.db` under the root) with the agents from
/// the end-to-end scenarios plus one corrupt row.
fn seed_store(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("tadpole.db");
    let store = SqliteAgentStore::create(&path).unwrap();
    store
        .upsert_agent(&agent(
            "7",
            "Tadpole",
            Some(r#"["Code Review","Deploy to Prod"]"#),
            Some("[]"),
        ))
        .unwrap();
    store
        .upsert_agent(&agent("9", "Frog", Some(r#"["debug"]"#), Some(r#"["git_push"]"#)))
        .unwrap();
    store
        .upsert_agent(&agent("13", "Newt", Some("{oops"), Some(r#"["View Logs"]"#)))
        .unwrap();
    path
}

fn skills_of(db: &Path, id: &str) -> Option<String> {
    SqliteAgentStore::open(db)
        .unwrap()
        .list_agents()
        .unwrap()
        .into_iter()
        .find(|r| r.id.as_deref() == Some(id))
        .unwrap()
        .skills_raw
}

// ---------------------------------------------------------------------------
// capnorm init / config
// ---------------------------------------------------------------------------

#[test]
fn init_writes_default_config() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .capnorm/config.yaml"));
    assert!(dir.path().join(".capnorm/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir).arg("init").assert().success();
    capnorm(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
}

#[test]
fn config_validate_requires_init() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn default_config_validates_with_warnings_only() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir).arg("init").assert().success();
    capnorm(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning]"));
}

#[test]
fn config_show_fills_defaults() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("table: agents"));
}

// ---------------------------------------------------------------------------
// capnorm normalize
// ---------------------------------------------------------------------------

#[test]
fn normalize_prints_identifiers() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir)
        .args(["normalize", "Code Review", "CI/CD Pipeline", "git_push"])
        .assert()
        .success()
        .stdout("code_review\nci/cd_pipeline\ngit_push\n");
}

#[test]
fn normalize_json_marks_canonical_labels() {
    let dir = TempDir::new().unwrap();
    let out = capnorm(&dir)
        .args(["--json", "normalize", "Deploy to Prod", "debug"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value[0]["identifier"], "deploy_to_prod");
    assert_eq!(value[0]["canonical"], false);
    assert_eq!(value[1]["canonical"], true);
}

// ---------------------------------------------------------------------------
// capnorm migrate
// ---------------------------------------------------------------------------

#[test]
fn migrate_rewrites_display_labels_and_converges() {
    let dir = TempDir::new().unwrap();
    let db = seed_store(&dir);

    capnorm(&dir)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updating Agent 'Tadpole' (ID: 7)"))
        .stdout(predicate::str::contains("Skipped Agent 'Newt' (ID: 13)"))
        .stdout(predicate::str::contains("Frog").not())
        .stdout(predicate::str::contains("Done. Updated 1 agents."));

    assert_eq!(
        skills_of(&db, "7").as_deref(),
        Some(r#"["code_review","deploy_to_prod"]"#)
    );
    assert_eq!(skills_of(&db, "13").as_deref(), Some("{oops"));

    capnorm(&dir)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Done. Updated 0 agents."));
    assert!(!dir.path().join("tadpole.db.capnorm.lock").exists());
}

#[test]
fn migrate_dry_run_does_not_write() {
    let dir = TempDir::new().unwrap();
    let db = seed_store(&dir);
    capnorm(&dir)
        .args(["migrate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: 1 agents would be updated."));
    assert_eq!(
        skills_of(&db, "7").as_deref(),
        Some(r#"["Code Review","Deploy to Prod"]"#)
    );
}

#[test]
fn migrate_json_reports_summary() {
    let dir = TempDir::new().unwrap();
    seed_store(&dir);
    let out = capnorm(&dir).args(["-j", "migrate"]).output().unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["summary"]["scanned"], 3);
    assert_eq!(value["summary"]["changed"], 1);
    assert_eq!(value["summary"]["skipped"][0]["id"], "13");
    assert_eq!(value["summary"]["skipped"][0]["error"]["field"], "skills");
}

#[test]
fn migrate_skips_row_with_null_id() {
    let dir = TempDir::new().unwrap();
    let db = seed_store(&dir);
    let mut ghost = agent("0", "Ghost", Some(r#"["Git Push"]"#), None);
    ghost.id = None;
    SqliteAgentStore::open(&db).unwrap().upsert_agent(&ghost).unwrap();

    capnorm(&dir)
        .arg("migrate")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Skipped Agent 'Ghost' (ID: NULL): malformed id",
        ))
        .stdout(predicate::str::contains("Done. Updated 1 agents."));
    assert_eq!(
        skills_of(&db, "7").as_deref(),
        Some(r#"["code_review","deploy_to_prod"]"#)
    );
}

#[test]
fn migrate_explicit_db_path() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("data/agents.db");
    let store = SqliteAgentStore::create(&db).unwrap();
    store
        .upsert_agent(&agent("1", "Ops", Some(r#"["Scale Cluster"]"#), None))
        .unwrap();

    capnorm(&dir)
        .args(["migrate", "--db"])
        .arg(&db)
        .assert()
        .success();
    assert_eq!(skills_of(&db, "1").as_deref(), Some(r#"["scale_cluster"]"#));
}

#[test]
fn migrate_missing_store_is_fatal() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir)
        .arg("migrate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: failed to open agent store"));
    assert!(!dir.path().join("tadpole.db").exists());
    assert!(!dir.path().join("tadpole.db.capnorm.lock").exists());
}

#[test]
fn migrate_refuses_while_locked() {
    let dir = TempDir::new().unwrap();
    let db = seed_store(&dir);
    std::fs::write(dir.path().join("tadpole.db.capnorm.lock"), "pid: 1\n").unwrap();

    capnorm(&dir)
        .arg("migrate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("maintenance lock"));
    assert_eq!(
        skills_of(&db, "7").as_deref(),
        Some(r#"["Code Review","Deploy to Prod"]"#)
    );

    capnorm(&dir)
        .args(["migrate", "--break-lock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Done. Updated 1 agents."));
}

// ---------------------------------------------------------------------------
// capnorm agents list
// ---------------------------------------------------------------------------

#[test]
fn agents_list_shows_label_state() {
    let dir = TempDir::new().unwrap();
    seed_store(&dir);
    capnorm(&dir)
        .args(["agents", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pending"))
        .stdout(predicate::str::contains("canonical"))
        .stdout(predicate::str::contains("malformed"));
}

#[test]
fn agents_list_json() {
    let dir = TempDir::new().unwrap();
    seed_store(&dir);
    let out = capnorm(&dir).args(["--json", "agents", "list"]).output().unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let tadpole = value
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"] == "7")
        .unwrap();
    assert_eq!(tadpole["state"], "pending");
    assert_eq!(tadpole["skills"][1], "Deploy to Prod");
}

// ---------------------------------------------------------------------------
// capnorm seed
// ---------------------------------------------------------------------------

#[test]
fn seed_rewrite_replaces_quoted_literals() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("src/data/mockAgents.ts");
    std::fs::create_dir_all(seed.parent().unwrap()).unwrap();
    std::fs::write(
        &seed,
        "export const agents = [{ name: 'Ops', skills: ['CI/CD Pipeline', 'View Logs'] }];\n",
    )
    .unwrap();

    capnorm(&dir)
        .args(["seed", "rewrite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rewrote 2 literals"));

    let text = std::fs::read_to_string(&seed).unwrap();
    assert!(text.contains("'ci/cd_pipeline'"));
    assert!(!text.contains("'CI/CD Pipeline'"));
    assert!(text.contains("name: 'Ops'"));

    capnorm(&dir)
        .args(["seed", "rewrite"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already normalized"));
}

#[test]
fn seed_rewrite_dry_run_keeps_file() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("agents.json");
    std::fs::write(&seed, r#"{"skills": ["Git Push"]}"#).unwrap();

    capnorm(&dir)
        .args(["seed", "rewrite", "--dry-run", "--file"])
        .arg(&seed)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: 1 literals"));
    assert_eq!(
        std::fs::read_to_string(&seed).unwrap(),
        r#"{"skills": ["Git Push"]}"#
    );
}

#[test]
fn seed_rewrite_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir)
        .args(["seed", "rewrite"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to rewrite"));
}

#[test]
fn seed_vocab_lists_identifiers() {
    let dir = TempDir::new().unwrap();
    capnorm(&dir)
        .args(["seed", "vocab"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quality_gate_review"))
        .stdout(predicate::str::contains(
            "[warning] 'Documentation' is a substring of 'API Documentation'",
        ));
}

// ---------------------------------------------------------------------------
// capnorm audit
// ---------------------------------------------------------------------------

#[test]
fn audit_passes_when_all_clusters_are_mounted() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("workspaces/executive-core")).unwrap();
    std::fs::create_dir_all(dir.path().join("workspaces/engineering-shared")).unwrap();
    capnorm(&dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("[PASS] Executive Core"))
        .stdout(predicate::str::contains("[PASS] Engineering Shared"));
}

#[test]
fn audit_warns_with_distinct_exit_code() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("mnt");
    std::fs::create_dir_all(base.join("executive-core")).unwrap();
    capnorm(&dir)
        .args(["audit", "--base"])
        .arg(&base)
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "[WARN (PATH NOT MOUNTED)] Engineering Shared",
        ))
        .stderr(predicate::str::contains("SECURITY ALERT"));
}
