//! E2E tests running the `lotdesk` binary against the built-in demo listings.
//!
//! Covers: list paging/sorting/filtering JSON, stats counters, seed,
//! project config defaults, export validation, and coded error output.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::net::TcpListener;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn lotdesk_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lotdesk"));
    cmd.current_dir(dir);
    cmd.env("LOTDESK_LOG", "error");
    cmd.env("HOME", dir);
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env_remove("FORMAT");
    cmd.env_remove("LOTDESK_BACKEND_URL");
    cmd.env_remove("LOTDESK_TOKEN");
    cmd
}

fn offline_json(dir: &Path, args: &[&str]) -> Value {
    let output = lotdesk_cmd(dir)
        .args(["--offline", "--format", "json"])
        .args(args)
        .output()
        .expect("lotdesk should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn offline_error(dir: &Path, args: &[&str]) -> Value {
    let output = lotdesk_cmd(dir)
        .args(["--offline", "--format", "json"])
        .args(args)
        .output()
        .expect("lotdesk should not crash");
    assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let start = stderr.find('{').expect("JSON error on stderr");
    let value: Value = serde_json::Deserializer::from_str(&stderr[start..])
        .into_iter::<Value>()
        .next()
        .expect("JSON error on stderr")
        .expect("valid JSON error");
    value["error"].clone()
}

fn ids(page: &Value) -> Vec<String> {
    page["listings"]
        .as_array()
        .expect("listings array")
        .iter()
        .map(|l| l["id"].as_str().expect("id").to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// lotdesk list
// ---------------------------------------------------------------------------

#[test]
fn list_defaults_to_score_descending_with_missing_last() {
    let dir = TempDir::new().expect("tempdir");
    let page = offline_json(dir.path(), &["list"]);

    assert_eq!(page["total"], 8);
    assert_eq!(page["filtered"], 8);
    assert_eq!(page["rows_per_page"], 25);
    assert_eq!(page["sort"]["key"], "score");
    assert_eq!(page["sort"]["direction"], "desc");
    assert_eq!(ids(&page), vec!["3", "1", "7", "2", "5", "4", "6", "8"]);
}

#[test]
fn list_pages_the_filtered_view() {
    let dir = TempDir::new().expect("tempdir");
    let page = offline_json(
        dir.path(),
        &["list", "--status", "scored", "--rows", "2", "--page", "2"],
    );

    assert_eq!(page["filtered"], 5);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["page"], 2);
    assert_eq!(page["first_row"], 3);
    assert_eq!(page["last_row"], 4);
    assert_eq!(ids(&page), vec!["7", "2"]);
}

#[test]
fn list_clamps_page_past_the_end() {
    let dir = TempDir::new().expect("tempdir");
    let page = offline_json(dir.path(), &["list", "--rows", "3", "--page", "99"]);
    assert_eq!(page["page"], 3);
    assert_eq!(ids(&page), vec!["6", "8"]);
}

#[test]
fn list_search_and_make_filters_combine() {
    let dir = TempDir::new().expect("tempdir");
    let page = offline_json(dir.path(), &["list", "--make", "HONDA", "--sort", "id"]);
    assert_eq!(ids(&page), vec!["4", "8"]);

    let page = offline_json(dir.path(), &["list", "--search", "austin"]);
    assert_eq!(ids(&page), vec!["1", "8"]);

    let page = offline_json(dir.path(), &["list", "--search", "austin", "--make", "honda"]);
    assert_eq!(ids(&page), vec!["8"]);
}

#[test]
fn list_with_no_matches_reports_single_empty_page() {
    let dir = TempDir::new().expect("tempdir");
    let page = offline_json(dir.path(), &["list", "--search", "zzz"]);
    assert_eq!(page["filtered"], 0);
    assert_eq!(page["total_pages"], 1);
    assert_eq!(page["page"], 1);
    assert!(ids(&page).is_empty());
}

#[test]
fn list_uses_project_view_config() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(dir.path().join(".lotdesk")).expect("mkdir");
    std::fs::write(
        dir.path().join(".lotdesk/config.toml"),
        "[view]\nrows_per_page = 3\nsort_key = \"make\"\nsort_direction = \"asc\"\n",
    )
    .expect("write config");

    let page = offline_json(dir.path(), &["list"]);
    assert_eq!(page["rows_per_page"], 3);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["sort"]["key"], "make");
    assert_eq!(ids(&page), vec!["7", "5", "4"]);
}

#[test]
fn list_text_output_is_one_row_per_listing() {
    let dir = TempDir::new().expect("tempdir");
    lotdesk_cmd(dir.path())
        .args(["--offline", "--format", "text", "list", "--rows", "2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("3\t5YJ3E1EA7KF317000\tTesla"))
        .stdout(predicate::function(|out: &str| out.lines().count() == 2));
}

#[test]
fn unknown_sort_key_is_coded_error() {
    let dir = TempDir::new().expect("tempdir");
    let error = offline_error(dir.path(), &["list", "--sort", "horsepower"]);
    assert_eq!(error["error_code"], "E2002");
    assert!(error["message"].as_str().expect("message").contains("horsepower"));
}

#[test]
fn zero_rows_per_page_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let error = offline_error(dir.path(), &["list", "--rows", "0"]);
    assert_eq!(error["error_code"], "E2001");
}

#[test]
fn broken_project_config_fails_with_parse_code() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(dir.path().join(".lotdesk")).expect("mkdir");
    std::fs::write(dir.path().join(".lotdesk/config.toml"), "[view\n").expect("write");
    let error = offline_error(dir.path(), &["list"]);
    assert_eq!(error["error_code"], "E1001");
}

// ---------------------------------------------------------------------------
// lotdesk stats / health / seed
// ---------------------------------------------------------------------------

#[test]
fn stats_reports_counters_and_makes() {
    let dir = TempDir::new().expect("tempdir");
    let stats = offline_json(dir.path(), &["stats"]);
    assert_eq!(stats["source"], "offline");
    assert_eq!(stats["status"], "reachable");
    assert_eq!(stats["total"], 8);
    assert_eq!(stats["scored"], 5);
    assert_eq!(stats["pending"], 3);
    assert_eq!(stats["decided"], 3);
    assert_eq!(stats["undecided"], 5);
    assert_eq!(
        stats["makes"],
        serde_json::json!(["BMW", "Ford", "Honda", "Jeep", "Subaru", "Tesla", "Toyota"])
    );

    let kpi = &stats["kpi"];
    assert_eq!(kpi["total_listings"], 8);
    assert_eq!(kpi["active_buyers"], 1);
    assert_eq!(kpi["aged_inventory"], 0);
    assert_eq!(kpi["scoring_rate"], 62.5);
    assert_eq!(kpi["conversion_rate"], 50.0);
    assert_eq!(kpi["total_value"], 186_790.0);
}

#[test]
fn health_offline_is_reachable() {
    let dir = TempDir::new().expect("tempdir");
    let health = offline_json(dir.path(), &["health"]);
    assert_eq!(health["status"], "reachable");
    assert!(health["backend"].is_null());
}

#[test]
fn seed_offline_stores_demo_set() {
    let dir = TempDir::new().expect("tempdir");
    let seeded = offline_json(dir.path(), &["seed"]);
    assert_eq!(seeded["sent"], 8);
    assert_eq!(seeded["stored"], 8);
}

// ---------------------------------------------------------------------------
// lotdesk notify / rescore / export
// ---------------------------------------------------------------------------

#[test]
fn notify_unknown_vin_is_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let error = offline_error(dir.path(), &["notify", "NOPE"]);
    assert_eq!(error["error_code"], "E3001");
}

#[test]
fn backend_only_actions_are_unsupported_offline() {
    let dir = TempDir::new().expect("tempdir");
    for args in [
        &["notify", "1HGCM82633A004352"][..],
        &["rescore"][..],
        &["export", "--type", "all"][..],
    ] {
        let error = offline_error(dir.path(), args);
        assert_eq!(error["error_code"], "E4004", "{args:?}");
        assert!(error["suggestion"].is_string());
    }
}

#[test]
fn export_validation_runs_before_the_source() {
    let dir = TempDir::new().expect("tempdir");

    let error = offline_error(dir.path(), &["export", "--type", "range"]);
    assert_eq!(error["error_code"], "E3003");

    let error = offline_error(
        dir.path(),
        &["export", "--type", "range", "--start", "2024-05-02", "--end", "2024-05-01"],
    );
    assert_eq!(error["error_code"], "E3003");

    let error = offline_error(dir.path(), &["export", "--type", "weekly"]);
    assert_eq!(error["error_code"], "E3003");

    let error = offline_error(dir.path(), &["export", "--type", "selected", "--make", "kia"]);
    assert_eq!(error["error_code"], "E3002");
}

// ---------------------------------------------------------------------------
// Live backend errors
// ---------------------------------------------------------------------------

#[test]
fn unreachable_backend_is_reported_with_hint() {
    let dir = TempDir::new().expect("tempdir");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    lotdesk_cmd(dir.path())
        .args(["--format", "text", "--backend", &format!("http://{addr}/api"), "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E4001]"))
        .stderr(predicate::str::contains("--offline"));

    lotdesk_cmd(dir.path())
        .args(["--format", "text", "--backend", &format!("http://{addr}/api"), "health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not reachable"));
}
