//! Integration tests for the srp CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get an srp command isolated from the caller's environment
fn srp(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("srp").unwrap();
    cmd.current_dir(dir)
        .env_remove("SRP_ROLE")
        .env_remove("SRP_DATA_DIR")
        .env_remove("RUST_LOG")
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd
}

/// Helper to create a workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    srp(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to onboard a supplier and return its ID
fn create_supplier(tmp: &TempDir, name: &str, extra: &[&str]) -> String {
    let output = srp(tmp.path())
        .args(["-q", "supplier", "new", "--name", name, "--contact", "Pat Lee"])
        .args(["--email", &format!("{}@example.com", name.to_lowercase())])
        .args(extra)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "supplier new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn names(rows: &serde_json::Value) -> Vec<String> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|r| r["supplier_name"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();
    srp(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized workspace"));

    let data = tmp.path().join("data");
    assert!(data.join("config.yaml").is_file());
    assert!(data.join("uploaded_files").is_dir());
    assert!(data.join("supplier_records").is_dir());
    for file in [
        "supplier_dummy_data.csv",
        "assets.csv",
        "project_tasks.csv",
        "audit_points.csv",
        "uploaded_files.csv",
        "file_comments.csv",
        "notifications.csv",
        "events.csv",
    ] {
        assert!(data.join(file).is_file(), "{} missing", file);
    }

    let header = fs::read_to_string(data.join("supplier_dummy_data.csv")).unwrap();
    assert!(header.starts_with("supplier_id,supplier_name,contact_person,email"));
}

#[test]
fn test_init_again_keeps_data() {
    let tmp = setup_workspace();
    let id = create_supplier(&tmp, "Acme", &[]);

    srp(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    srp(tmp.path())
        .args(["supplier", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id));
}

#[test]
fn test_commands_fail_outside_workspace() {
    let tmp = TempDir::new().unwrap();
    srp(tmp.path())
        .args(["supplier", "list"])
        .assert()
        .failure();
}

#[test]
fn test_explicit_data_dir() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("elsewhere");
    srp(tmp.path())
        .args(["--data-dir", data.to_str().unwrap(), "init"])
        .assert()
        .success();
    assert!(data.join("supplier_dummy_data.csv").is_file());

    srp(tmp.path())
        .env("SRP_DATA_DIR", &data)
        .args(["supplier", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No suppliers found"));
}

// ============================================================================
// Suppliers
// ============================================================================

#[test]
fn test_supplier_ids_are_sequential() {
    let tmp = setup_workspace();
    assert_eq!(create_supplier(&tmp, "Acme", &[]), "SUP0001");
    assert_eq!(create_supplier(&tmp, "Borealis", &[]), "SUP0002");
}

#[test]
fn test_supplier_id_not_reused_after_delete() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &[]);
    let second = create_supplier(&tmp, "Borealis", &[]);
    srp(tmp.path())
        .args(["supplier", "delete", &second])
        .assert()
        .success();
    assert_eq!(create_supplier(&tmp, "Cobalt", &[]), "SUP0003");
}

#[test]
fn test_supplier_missing_fields_writes_nothing() {
    let tmp = setup_workspace();
    let path = tmp.path().join("data/supplier_dummy_data.csv");
    let before = fs::read_to_string(&path).unwrap();

    srp(tmp.path())
        .args(["supplier", "new", "--name", "Acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("please fill in all required fields"));

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_supplier_rejects_out_of_range_score() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args([
            "supplier", "new", "--name", "Acme", "--contact", "Pat", "--email", "pat@acme.com",
            "--audit-score", "140",
        ])
        .assert()
        .failure();
}

#[test]
fn test_supplier_search_is_case_insensitive() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &[]);
    create_supplier(&tmp, "Borealis", &[]);

    let rows = json_stdout(srp(tmp.path()).args(["supplier", "list", "-s", "ACM", "-f", "json"]));
    assert_eq!(names(&rows), vec!["Acme"]);
}

#[test]
fn test_supplier_filter_by_values_and_range() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &["--risk", "low", "--audit-score", "92"]);
    create_supplier(&tmp, "Borealis", &["--risk", "high", "--audit-score", "60"]);
    create_supplier(&tmp, "Cobalt", &["--risk", "low", "--audit-score", "70"]);

    let rows = json_stdout(srp(tmp.path()).args([
        "supplier", "list", "-c", "risk_level", "--values", "Low", "-f", "json",
    ]));
    assert_eq!(names(&rows), vec!["Acme", "Cobalt"]);

    let rows = json_stdout(srp(tmp.path()).args([
        "supplier", "list", "-c", "last_audit_score", "--min", "65", "-f", "json",
    ]));
    assert_eq!(names(&rows), vec!["Acme", "Cobalt"]);

    let rows = json_stdout(srp(tmp.path()).args([
        "supplier", "list", "-s", "o", "-c", "last_audit_score", "--min", "65", "--max", "75", "-f", "json",
    ]));
    assert_eq!(names(&rows), vec!["Cobalt"]);
}

#[test]
fn test_supplier_bare_column_flag_keeps_rows() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &["--audit-score", "92"]);
    create_supplier(&tmp, "Borealis", &["--audit-score", "60"]);

    let rows = json_stdout(srp(tmp.path()).args(["supplier", "list", "-c", "last_audit_score", "-f", "json"]));
    assert_eq!(names(&rows), vec!["Acme", "Borealis"]);
}

#[test]
fn test_supplier_filter_unknown_column_fails() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &[]);
    srp(tmp.path())
        .args(["supplier", "list", "-c", "no_such_column", "--values", "x"])
        .assert()
        .failure();
}

#[test]
fn test_supplier_filter_on_empty_search_notes_no_data() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &[]);
    srp(tmp.path())
        .args(["supplier", "list", "-s", "zzz", "-c", "risk_level", "--values", "Low"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No data to apply advanced filters"));
}

#[test]
fn test_supplier_show_filters() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &["--risk", "medium"]);
    srp(tmp.path())
        .args(["supplier", "list", "--show-filters"])
        .assert()
        .success()
        .stdout(predicate::str::contains("risk_level"))
        .stdout(predicate::str::contains("multi-select"));
}

#[test]
fn test_supplier_edit_and_show() {
    let tmp = setup_workspace();
    let id = create_supplier(&tmp, "Acme", &[]);

    srp(tmp.path())
        .args(["supplier", "edit", &id, "--agreement", "pending-renewal", "--spend", "250000"])
        .assert()
        .success();

    let row = json_stdout(srp(tmp.path()).args(["supplier", "show", &id, "-f", "json"]));
    assert_eq!(row["agreement_status"], "Pending Renewal");
    assert_eq!(row["annual_spend_usd"], 250000);
    assert_eq!(row["supplier_name"], "Acme");
}

const LEGACY_SUPPLIERS: &str = "supplier_id,supplier_name,contact_person,email,phone,agreement_status,last_audit_score,notes,primary_product_category,on_time_delivery_rate,quality_reject_rate,risk_level,certification,annual_spend_usd,last_performance_review_date,esg_compliance_score,emissions_target_met\n";

#[test]
fn test_supplier_edit_leaves_other_cells_untouched() {
    let tmp = setup_workspace();
    let path = tmp.path().join("data/supplier_dummy_data.csv");
    fs::write(
        &path,
        format!("{}SUP0001,Acme,Pat,p@a.com,,,69.6,old,,,,,,,,69.6,\n", LEGACY_SUPPLIERS),
    )
    .unwrap();

    srp(tmp.path())
        .args(["supplier", "edit", "SUP0001", "--notes", "touched"])
        .assert()
        .success();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(
        written.lines().nth(1),
        Some("SUP0001,Acme,Pat,p@a.com,,,69.6,touched,,,,,,,,69.6,")
    );
}

#[test]
fn test_supplier_edit_unknown_id_fails() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args(["supplier", "edit", "SUP0099", "--notes", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_supplier_csv_output() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &[]);
    srp(tmp.path())
        .args(["supplier", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("supplier_id,supplier_name"))
        .stdout(predicate::str::contains("SUP0001,Acme,Pat Lee"));
}

#[test]
fn test_supplier_recognize_sends_message() {
    let tmp = setup_workspace();
    let id = create_supplier(&tmp, "Acme", &[]);
    srp(tmp.path())
        .args(["supplier", "recognize", &id, "-m", "Great quarter"])
        .assert()
        .success();

    let sent = json_stdout(srp(tmp.path()).args(["mail", "sent", "-f", "json"]));
    assert_eq!(sent[0]["subject"], "Recognition for Excellence - Acme");
    assert_eq!(sent[0]["recipient_role"], "Acme");
}

// ============================================================================
// Role scoping
// ============================================================================

#[test]
fn test_assets_scoped_to_supplier_role() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args(["--role", "Supplier A", "asset", "new", "--name", "Press", "--location", "Plant 1"])
        .assert()
        .success();
    srp(tmp.path())
        .args(["--role", "Supplier B", "asset", "new", "--name", "Lathe", "--location", "Plant 2"])
        .assert()
        .success();

    srp(tmp.path())
        .args(["--role", "Supplier A", "asset", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("AST0001\n");

    srp(tmp.path())
        .args(["asset", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_tasks_scoped_by_assignee() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args(["task", "new", "--name", "Tooling review", "--assign", "Supplier A"])
        .assert()
        .success();
    srp(tmp.path())
        .args(["task", "new", "--name", "Capacity plan", "--assign", "OEM"])
        .assert()
        .success();

    srp(tmp.path())
        .args(["--role", "Supplier A", "task", "list", "-f", "id"])
        .assert()
        .success()
        .stdout("TASK0001\n");
    srp(tmp.path())
        .args(["--role", "Auditor", "task", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

// ============================================================================
// Audits
// ============================================================================

#[test]
fn test_audit_requires_assignee_and_description() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args(["audit", "new", "--description", "Check calibration"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Assignee"));

    srp(tmp.path())
        .args(["-q", "audit", "new", "--description", "Check calibration", "--assign", "Supplier B"])
        .assert()
        .success()
        .stdout("AUDIT0001\n");

    srp(tmp.path())
        .args(["audit", "edit", "AUDIT0001", "--status", "closed", "--resolution", "Recalibrated"])
        .assert()
        .success();
    let row = json_stdout(srp(tmp.path()).args(["audit", "show", "AUDIT0001", "-f", "json"]));
    assert_eq!(row["status"], "Closed");
    assert_eq!(row["resolution"], "Recalibrated");
}

// ============================================================================
// Files and comments
// ============================================================================

fn upload(tmp: &TempDir, name: &str, contents: &str) -> String {
    let source = tmp.path().join(name);
    fs::write(&source, contents).unwrap();
    let output = srp(tmp.path())
        .args(["-q", "file", "upload", source.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_file_upload_and_download() {
    let tmp = setup_workspace();
    let stored = upload(&tmp, "quote.txt", "hello");
    assert!(stored.ends_with("_quote.txt"));
    assert!(tmp.path().join("data/uploaded_files").join(&stored).is_file());

    let out_dir = tmp.path().join("out");
    fs::create_dir(&out_dir).unwrap();
    srp(tmp.path())
        .args(["file", "download", &stored, out_dir.to_str().unwrap()])
        .assert()
        .success();
    assert_eq!(fs::read_to_string(out_dir.join("quote.txt")).unwrap(), "hello");
}

#[test]
fn test_file_download_missing_blob_warns_and_keeps_row() {
    let tmp = setup_workspace();
    let stored = upload(&tmp, "drawing.pdf", "%PDF");
    fs::remove_file(tmp.path().join("data/uploaded_files").join(&stored)).unwrap();

    srp(tmp.path())
        .args(["file", "download", &stored])
        .assert()
        .success()
        .stderr(predicate::str::contains("missing"));

    srp(tmp.path())
        .args(["file", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(stored));
}

#[test]
fn test_file_delete_removes_comments() {
    let tmp = setup_workspace();
    let stored = upload(&tmp, "notes.txt", "x");

    srp(tmp.path())
        .args(["-q", "file", "comment", &stored, "-m", "Please review", "--mention", "Supplier A"])
        .assert()
        .success()
        .stdout("COMM0001\n");
    srp(tmp.path())
        .args(["--role", "Supplier A", "file", "comment", &stored, "-m", "Done", "--reply-to", "COMM0001"])
        .assert()
        .success();

    let threads = json_stdout(srp(tmp.path()).args(["file", "comments", &stored, "-f", "json"]));
    assert_eq!(threads.as_array().unwrap().len(), 1);
    assert_eq!(threads[0]["replies"][0]["comment_text"], "Done");
    assert_eq!(threads[0]["comment"]["mentions"][0], "Supplier A");

    srp(tmp.path())
        .args(["file", "delete", &stored])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 comment(s)"));

    let comments = fs::read_to_string(tmp.path().join("data/file_comments.csv")).unwrap();
    assert_eq!(comments.lines().count(), 1);
}

#[test]
fn test_reply_to_a_reply_joins_the_thread() {
    let tmp = setup_workspace();
    let stored = upload(&tmp, "notes.txt", "x");
    for extra in [&[][..], &["--reply-to", "COMM0001"][..], &["--reply-to", "COMM0002"][..]] {
        srp(tmp.path())
            .args(["file", "comment", &stored, "-m", "text"])
            .args(extra)
            .assert()
            .success();
    }

    let threads = json_stdout(srp(tmp.path()).args(["file", "comments", &stored, "-f", "json"]));
    assert_eq!(threads.as_array().unwrap().len(), 1);
    assert_eq!(threads[0]["replies"].as_array().unwrap().len(), 2);
    assert_eq!(threads[0]["replies"][1]["parent_comment_id"], "COMM0001");
}

#[test]
fn test_comment_on_unknown_file_fails() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args(["file", "comment", "nope.txt", "-m", "hello"])
        .assert()
        .failure();
}

// ============================================================================
// Mailbox
// ============================================================================

#[test]
fn test_mail_send_view_reply() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args(["-q", "mail", "send", "--to", "Supplier A", "--subject", "Forecast", "-m", "See attached"])
        .assert()
        .success()
        .stdout("NOTIF0001\n");

    srp(tmp.path())
        .args(["--role", "Supplier A", "mail", "inbox", "-f", "id"])
        .assert()
        .success()
        .stdout("NOTIF0001\n");
    srp(tmp.path())
        .args(["--role", "Supplier B", "mail", "inbox", "-f", "id"])
        .assert()
        .success()
        .stdout("");

    let viewed = json_stdout(srp(tmp.path()).args(["--role", "Supplier A", "mail", "view", "NOTIF0001", "-f", "json"]));
    assert_eq!(viewed["message"]["status"], "Read");

    srp(tmp.path())
        .args(["--role", "Supplier B", "mail", "reply", "NOTIF0001", "-m", "Not mine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only the sender or recipient"));

    srp(tmp.path())
        .args(["--role", "Supplier A", "mail", "reply", "NOTIF0001", "-m", "Thanks"])
        .assert()
        .success();

    let viewed = json_stdout(srp(tmp.path()).args(["mail", "view", "NOTIF0001", "-f", "json"]));
    assert_eq!(viewed["message"]["status"], "Replied");
    assert_eq!(viewed["replies"][0]["subject"], "Re: Forecast");
    assert_eq!(viewed["replies"][0]["recipient_role"], "OEM");
}

#[test]
fn test_mail_send_requires_subject() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args(["mail", "send", "--to", "Supplier A", "--subject", " ", "-m", "hi"])
        .assert()
        .failure();
}

// ============================================================================
// Calendar
// ============================================================================

#[test]
fn test_calendar_upcoming_for_attendee() {
    let tmp = setup_workspace();
    let start = (today() + chrono::Duration::days(3)).to_string();
    let past = (today() - chrono::Duration::days(10)).to_string();

    srp(tmp.path())
        .args(["calendar", "add", "QBR", "--start", &start, "--attendees", "Supplier A,OEM"])
        .assert()
        .success();
    srp(tmp.path())
        .args(["calendar", "add", "Kickoff", "--start", &past, "--attendees", "Supplier A"])
        .assert()
        .success();

    let events = json_stdout(srp(tmp.path()).args(["--role", "Supplier A", "calendar", "upcoming", "-f", "json"]));
    let titles: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["QBR"]);
}

#[test]
fn test_calendar_end_before_start_fails() {
    let tmp = setup_workspace();
    srp(tmp.path())
        .args(["calendar", "add", "Bad", "--start", "2024-05-10", "--end", "2024-05-01"])
        .assert()
        .failure();
}

// ============================================================================
// Dashboard
// ============================================================================

#[test]
fn test_dashboard_json_summary() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &["--reject-rate", "2.5", "--esg-score", "60"]);
    create_supplier(&tmp, "Borealis", &["--on-time", "99.0", "--risk", "low"]);

    let overdue = (today() - chrono::Duration::days(2)).to_string();
    srp(tmp.path())
        .args(["task", "new", "--name", "Solar retrofit", "--assign", "OEM", "--due", &overdue, "--esg", "true"])
        .assert()
        .success();

    let report = json_stdout(srp(tmp.path()).args(["dashboard", "-f", "json"]));
    assert_eq!(report["summary"]["suppliers"], 2);
    assert_eq!(report["summary"]["high_reject_suppliers"], 1);
    assert_eq!(report["summary"]["low_esg_suppliers"], 1);
    assert_eq!(report["summary"]["overdue_tasks"], 1);
    assert_eq!(report["summary"]["delayed_esg_projects"], 1);
    assert_eq!(report["high_reject_suppliers"][0]["supplier_name"], "Acme");
}

#[test]
fn test_dashboard_fractional_score_and_unrecorded_emissions() {
    let tmp = setup_workspace();
    fs::write(
        tmp.path().join("data/supplier_dummy_data.csv"),
        format!("{}SUP0001,Acme,Pat,p@a.com,,,,,,,,,,,,69.6,\n", LEGACY_SUPPLIERS),
    )
    .unwrap();

    let report = json_stdout(srp(tmp.path()).args(["dashboard", "--section", "summary", "-f", "json"]));
    assert_eq!(report["low_esg_suppliers"], 1);
    assert_eq!(report["emissions_missed"], 0);
}

#[test]
fn test_dashboard_thresholds_from_config() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &["--reject-rate", "1.0"]);
    fs::write(
        tmp.path().join("data/config.yaml"),
        "thresholds:\n  reject_rate_alert: 0.5\n",
    )
    .unwrap();

    let report = json_stdout(srp(tmp.path()).args(["dashboard", "--section", "summary", "-f", "json"]));
    assert_eq!(report["high_reject_suppliers"], 1);
}

#[test]
fn test_dashboard_text_output() {
    let tmp = setup_workspace();
    create_supplier(&tmp, "Acme", &[]);
    srp(tmp.path())
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("Supplier overview"))
        .stdout(predicate::str::contains("Recognition badges"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    srp(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("srp"));
}
