//! Integration tests for the `sb` CLI.
//!
//! Each test creates a temp data directory, runs `sb -C <dir>` as a
//! subprocess, and checks stdout and/or the store on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

/// Get the path to the built `sb` binary.
fn sb_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("sb");
    path
}

/// Run `sb` against the given data directory, returning (stdout, stderr, success).
fn run_sb(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(sb_bin())
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("failed to run sb");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `sb` expecting success, return stdout.
fn run_sb_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_sb(dir, args);
    if !success {
        panic!("sb {:?} failed:\nstdout: {}\nstderr: {}", args, stdout, stderr);
    }
    stdout
}

/// Run `sb --json` expecting success, parse stdout.
fn run_sb_json(dir: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let out = run_sb_ok(dir, &full);
    serde_json::from_str(&out).unwrap_or_else(|e| panic!("bad JSON from {:?}: {}\n{}", args, e, out))
}

/// Add a task and return its full ID.
fn add_task(dir: &Path, column: &str, content: &str) -> String {
    run_sb_json(dir, &["add", column, content])["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn current_board(dir: &Path) -> Value {
    run_sb_json(dir, &["show"])
}

fn column<'a>(board: &'a Value, title: &str) -> &'a Value {
    board["columns"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["title"] == title)
        .unwrap_or_else(|| panic!("no column {}", title))
}

fn contents(tasks: &Value) -> Vec<String> {
    tasks
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["content"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Init and reading
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_default_board() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_sb_ok(tmp.path(), &["init"]);
    assert!(out.contains("board: My Board"));
    assert!(tmp.path().join("stackboard.toml").exists());

    let out = run_sb_ok(tmp.path(), &["show"]);
    assert!(out.starts_with("== My Board =="));
    assert!(out.contains("To Do (0)"));
    assert!(out.contains("In Progress (0)"));
    assert!(out.contains("Done (0)"));
}

#[test]
fn test_no_command_shows_current_board() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_sb_ok(tmp.path(), &[]);
    assert!(out.starts_with("== My Board =="));
}

#[test]
fn test_boards_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    let boards = run_sb_json(tmp.path(), &["boards"]);
    assert_eq!(boards.as_array().unwrap().len(), 1);
    assert_eq!(boards[0]["name"], "My Board");
    assert_eq!(boards[0]["current"], true);
    assert_eq!(boards[0]["columns"], 3);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[test]
fn test_add_and_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "To Do", "Buy milk #errand");
    assert_eq!(id.len(), 32);

    let out = run_sb_ok(tmp.path(), &["show"]);
    assert!(out.contains("To Do (1)"));
    assert!(out.contains(&format!("[ ] {} Buy milk #errand", &id[..8])));

    let board = current_board(tmp.path());
    let task = &column(&board, "To Do")["tasks"][0];
    assert_eq!(task["id"], id.as_str());
    assert_eq!(task["tags"], serde_json::json!(["errand"]));
}

#[test]
fn test_add_by_column_prefix_and_empty_content() {
    let tmp = tempfile::TempDir::new().unwrap();
    let board = current_board(tmp.path());
    let done_id = column(&board, "Done")["id"].as_str().unwrap().to_string();

    run_sb_ok(tmp.path(), &["add", &done_id[..6]]);
    let board = current_board(tmp.path());
    assert_eq!(contents(&column(&board, "Done")["tasks"]), vec![""]);
}

#[test]
fn test_add_unknown_column_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_sb(tmp.path(), &["add", "Nowhere", "x"]);
    assert!(!success);
    assert!(stderr.contains("no column matches 'Nowhere'"));
}

#[test]
fn test_edit_recomputes_tags() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "To Do", "plain");
    run_sb_ok(tmp.path(), &["edit", &id[..8], "now #urgent #ui"]);

    let out = run_sb_ok(tmp.path(), &["tags"]);
    assert!(out.contains("#urgent"));
    assert!(out.contains("#ui"));

    let hits = run_sb_json(tmp.path(), &["filter", "#URGENT"]);
    assert_eq!(hits[0]["id"], id.as_str());
    assert_eq!(hits[0]["column"], "To Do");
}

#[test]
fn test_toggle() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "To Do", "flip me");
    let out = run_sb_ok(tmp.path(), &["toggle", &id]);
    assert!(out.contains("done"));
    let board = current_board(tmp.path());
    assert_eq!(column(&board, "To Do")["tasks"][0]["completed"], true);

    run_sb_ok(tmp.path(), &["toggle", &id]);
    let board = current_board(tmp.path());
    assert_eq!(column(&board, "To Do")["tasks"][0]["completed"], false);
}

#[test]
fn test_delete_undo_redo_across_invocations() {
    let tmp = tempfile::TempDir::new().unwrap();
    add_task(tmp.path(), "To Do", "first");
    let id = add_task(tmp.path(), "To Do", "second");
    add_task(tmp.path(), "To Do", "third");

    run_sb_ok(tmp.path(), &["delete", &id]);
    let board = current_board(tmp.path());
    assert_eq!(contents(&column(&board, "To Do")["tasks"]), vec!["first", "third"]);

    let out = run_sb_ok(tmp.path(), &["undo"]);
    assert!(out.contains("undid: delete task 'second'"));
    let board = current_board(tmp.path());
    assert_eq!(
        contents(&column(&board, "To Do")["tasks"]),
        vec!["first", "second", "third"]
    );

    let status = run_sb_json(tmp.path(), &["redo"]);
    assert_eq!(status["undo"], 1);
    assert_eq!(status["redo"], 0);
    let board = current_board(tmp.path());
    assert_eq!(contents(&column(&board, "To Do")["tasks"]), vec!["first", "third"]);

    run_sb_ok(tmp.path(), &["undo"]);
    let out = run_sb_ok(tmp.path(), &["undo"]);
    assert!(out.contains("nothing to undo"));
}

#[test]
fn test_convert_heading_to_group() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "To Do", "## Release\n- tag v1\n- announce #comms");
    run_sb_ok(tmp.path(), &["convert", &id]);

    let board = current_board(tmp.path());
    let todo = column(&board, "To Do");
    assert_eq!(todo["tasks"], serde_json::json!([]));
    assert_eq!(todo["groups"][0]["title"], "Release");
    assert_eq!(contents(&todo["groups"][0]["tasks"]), vec!["tag v1", "announce #comms"]);
    assert_eq!(todo["groups"][0]["tasks"][1]["tags"], serde_json::json!(["comms"]));
}

#[test]
fn test_convert_without_heading_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "To Do", "just text");
    let (_stdout, stderr, success) = run_sb(tmp.path(), &["convert", &id]);
    assert!(!success);
    assert!(stderr.contains("does not start with a heading"));
}

#[test]
fn test_mv_to_column_and_group() {
    let tmp = tempfile::TempDir::new().unwrap();
    let a = add_task(tmp.path(), "To Do", "a");
    let b = add_task(tmp.path(), "To Do", "b");
    run_sb_ok(tmp.path(), &["group", "add", "Done", "Shipped"]);

    run_sb_ok(tmp.path(), &["mv", &a, "--column", "in progress"]);
    run_sb_ok(tmp.path(), &["mv", &b, "--group", "Shipped"]);
    run_sb_ok(tmp.path(), &["mv", &a, "--group", "shipped", "--index", "0"]);

    let board = current_board(tmp.path());
    assert_eq!(column(&board, "To Do")["tasks"], serde_json::json!([]));
    assert_eq!(column(&board, "In Progress")["tasks"], serde_json::json!([]));
    assert_eq!(contents(&column(&board, "Done")["groups"][0]["tasks"]), vec!["a", "b"]);
}

#[test]
fn test_group_toggle_and_delete() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_sb_ok(tmp.path(), &["group", "add", "To Do", "Chores"]);
    let a = add_task(tmp.path(), "To Do", "dishes");
    run_sb_ok(tmp.path(), &["mv", &a, "--group", "Chores"]);

    let out = run_sb_ok(tmp.path(), &["group", "toggle", "Chores"]);
    assert!(out.contains("group marked done"));
    let board = current_board(tmp.path());
    assert_eq!(column(&board, "To Do")["groups"][0]["tasks"][0]["completed"], true);

    run_sb_ok(tmp.path(), &["group", "rename", "Chores", "House"]);
    let out = run_sb_ok(tmp.path(), &["group", "delete", "House"]);
    assert!(out.contains("deleted group 'House' and 1 task(s)"));
    let board = current_board(tmp.path());
    assert_eq!(column(&board, "To Do")["groups"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

#[test]
fn test_column_management_and_undo() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_sb_ok(tmp.path(), &["column", "add", "Blocked"]);
    run_sb_ok(tmp.path(), &["column", "mv", "Blocked", "0"]);
    run_sb_ok(tmp.path(), &["column", "rename", "Blocked", "Waiting"]);
    run_sb_ok(tmp.path(), &["column", "color", "Waiting", "#d33"]);
    add_task(tmp.path(), "Waiting", "on review");

    let board = current_board(tmp.path());
    assert_eq!(board["columns"][0]["title"], "Waiting");
    assert_eq!(board["columns"][0]["color"], "#d33");

    run_sb_ok(tmp.path(), &["column", "delete", "Waiting"]);
    let board = current_board(tmp.path());
    assert_eq!(board["columns"].as_array().unwrap().len(), 3);

    run_sb_ok(tmp.path(), &["undo"]);
    let board = current_board(tmp.path());
    assert_eq!(board["columns"][0]["title"], "Waiting");
    assert_eq!(contents(&board["columns"][0]["tasks"]), vec!["on review"]);
}

#[test]
fn test_column_mv_out_of_range_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_sb(tmp.path(), &["column", "mv", "Done", "7"]);
    assert!(!success);
    assert!(stderr.contains("out of range"));
}

// ---------------------------------------------------------------------------
// Drag
// ---------------------------------------------------------------------------

#[test]
fn test_drag_task_onto_column() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "To Do", "drag me");
    let result = run_sb_json(tmp.path(), &["drag", "task", &id, "column-area", "Done"]);
    assert_eq!(result["changed"], true);
    assert_eq!(result["command"]["command"], "moveTask");

    let board = current_board(tmp.path());
    assert_eq!(contents(&column(&board, "Done")["tasks"]), vec!["drag me"]);
}

#[test]
fn test_drag_task_onto_task_reorders() {
    let tmp = tempfile::TempDir::new().unwrap();
    let a = add_task(tmp.path(), "To Do", "a");
    add_task(tmp.path(), "To Do", "b");
    let c = add_task(tmp.path(), "To Do", "c");
    run_sb_ok(tmp.path(), &["drag", "task", &c, "task", &a]);
    let board = current_board(tmp.path());
    assert_eq!(contents(&column(&board, "To Do")["tasks"]), vec!["c", "a", "b"]);
}

#[test]
fn test_drag_column_needs_move_mode() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_sb_ok(tmp.path(), &["drag", "column", "Done", "column", "To Do"]);
    assert!(out.contains("column move mode is off"));
    let board = current_board(tmp.path());
    assert_eq!(board["columns"][0]["title"], "To Do");

    run_sb_ok(tmp.path(), &["drag", "column", "Done", "column", "To Do", "--column-move"]);
    let board = current_board(tmp.path());
    assert_eq!(board["columns"][0]["title"], "Done");

    run_sb_ok(tmp.path(), &["config", "move-mode", "on"]);
    run_sb_ok(tmp.path(), &["drag", "column", "Done", "column", "In Progress"]);
    let board = current_board(tmp.path());
    assert_eq!(board["columns"][2]["title"], "Done");
}

#[test]
fn test_drag_onto_itself_is_noop() {
    let tmp = tempfile::TempDir::new().unwrap();
    let id = add_task(tmp.path(), "To Do", "stay");
    let out = run_sb_ok(tmp.path(), &["drag", "task", &id, "task", &id]);
    assert!(out.contains("nothing to do"));
}

#[test]
fn test_drag_bad_kind_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_sb(tmp.path(), &["drag", "card", "x", "column", "Done"]);
    assert!(!success);
    assert!(stderr.contains("invalid drag kind 'card'"));
}

// ---------------------------------------------------------------------------
// Boards
// ---------------------------------------------------------------------------

#[test]
fn test_board_lifecycle() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_sb_ok(tmp.path(), &["board", "new", "Work"]);
    let out = run_sb_ok(tmp.path(), &["boards"]);
    assert!(out.contains("* Work"));

    add_task(tmp.path(), "To Do", "work item");
    run_sb_ok(tmp.path(), &["board", "rename", "Work", "Job"]);
    let board = current_board(tmp.path());
    assert_eq!(board["name"], "Job");
    assert_eq!(board["title"], "Job");

    run_sb_ok(tmp.path(), &["board", "mv", "Job", "0"]);
    let boards = run_sb_json(tmp.path(), &["boards"]);
    assert_eq!(boards[0]["name"], "Job");

    run_sb_ok(tmp.path(), &["board", "delete", "Job"]);
    let boards = run_sb_json(tmp.path(), &["boards"]);
    assert_eq!(boards.as_array().unwrap().len(), 1);
    assert_eq!(boards[0]["current"], true);

    run_sb_ok(tmp.path(), &["undo"]);
    let boards = run_sb_json(tmp.path(), &["boards"]);
    assert_eq!(boards[0]["name"], "Job");
    let job = run_sb_json(tmp.path(), &["show", "Job"]);
    assert_eq!(contents(&column(&job, "To Do")["tasks"]), vec!["work item"]);

    run_sb_ok(tmp.path(), &["board", "switch", "Job"]);
    assert_eq!(current_board(tmp.path())["name"], "Job");
}

#[test]
fn test_undo_board_delete_does_not_clobber_new_board() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_sb_ok(tmp.path(), &["board", "new", "Work"]);
    add_task(tmp.path(), "To Do", "old item");
    run_sb_ok(tmp.path(), &["board", "delete", "Work"]);
    run_sb_ok(tmp.path(), &["board", "new", "Work"]);
    add_task(tmp.path(), "To Do", "new item");

    let (_stdout, stderr, success) = run_sb(tmp.path(), &["undo"]);
    assert!(!success);
    assert!(stderr.contains("board 'Work' already exists"));
    let work = run_sb_json(tmp.path(), &["show", "Work"]);
    assert_eq!(contents(&column(&work, "To Do")["tasks"]), vec!["new item"]);

    // The delete is still undoable once the name is free
    run_sb_ok(tmp.path(), &["board", "rename", "Work", "Work2"]);
    run_sb_ok(tmp.path(), &["undo"]);
    let work = run_sb_json(tmp.path(), &["show", "Work"]);
    assert_eq!(contents(&column(&work, "To Do")["tasks"]), vec!["old item"]);
}

#[test]
fn test_cannot_delete_last_board() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_sb(tmp.path(), &["board", "delete", "My Board"]);
    assert!(!success);
    assert!(stderr.contains("last remaining board"));
}

#[test]
fn test_duplicate_board_name_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_sb(tmp.path(), &["board", "new", "My Board"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn test_search_tasks_groups_and_columns() {
    let tmp = tempfile::TempDir::new().unwrap();
    add_task(tmp.path(), "To Do", "Fix login bug");
    run_sb_ok(tmp.path(), &["group", "add", "Done", "Bugfixes"]);

    let hits = run_sb_json(tmp.path(), &["search", "(?i)bug"]);
    let fields: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["content", "group_title"]);

    let out = run_sb_ok(tmp.path(), &["search", "^Done$"]);
    assert!(out.contains("column: Done"));

    let out = run_sb_ok(tmp.path(), &["search", "zzz"]);
    assert!(out.contains("no matches"));
}

#[test]
fn test_search_invalid_regex_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_sb(tmp.path(), &["search", "("]);
    assert!(!success);
    assert!(stderr.contains("invalid regex"));
}

// ---------------------------------------------------------------------------
// Export / import / publish
// ---------------------------------------------------------------------------

#[test]
fn test_export_import_between_data_dirs() {
    let src = tempfile::TempDir::new().unwrap();
    let dst = tempfile::TempDir::new().unwrap();
    add_task(src.path(), "To Do", "carry me #over");
    run_sb_ok(src.path(), &["board", "new", "Second"]);

    let bundle_path = src.path().join("bundle.json");
    run_sb_ok(src.path(), &["export", "-o", bundle_path.to_str().unwrap()]);
    let bundle: Value = serde_json::from_str(&fs::read_to_string(&bundle_path).unwrap()).unwrap();
    assert_eq!(bundle["version"], 1);
    assert_eq!(
        bundle["boardOrder"],
        serde_json::json!(["board:My Board", "board:Second"])
    );

    add_task(dst.path(), "To Do", "will be replaced");
    let out = run_sb_ok(dst.path(), &["import", bundle_path.to_str().unwrap()]);
    assert!(out.contains("imported 2 board(s)"));

    let board = current_board(dst.path());
    assert_eq!(board["name"], "My Board");
    assert_eq!(contents(&column(&board, "To Do")["tasks"]), vec!["carry me #over"]);
    let out = run_sb_ok(dst.path(), &["undo"]);
    assert!(out.contains("nothing to undo"));
}

#[test]
fn test_import_dry_run_writes_nothing() {
    let tmp = tempfile::TempDir::new().unwrap();
    add_task(tmp.path(), "To Do", "keep me");
    let bundle = tmp.path().join("in.json");
    fs::write(
        &bundle,
        r#"{"boards": {"Other": {"title": "Other", "dataVersion": 2, "columns": []}}, "boardOrder": ["Other"]}"#,
    )
    .unwrap();

    let out = run_sb_ok(tmp.path(), &["import", "--dry-run", bundle.to_str().unwrap()]);
    assert!(out.contains("would import 1 board(s)"));
    let board = current_board(tmp.path());
    assert_eq!(contents(&column(&board, "To Do")["tasks"]), vec!["keep me"]);
}

#[test]
fn test_invalid_import_is_rejected() {
    let tmp = tempfile::TempDir::new().unwrap();
    add_task(tmp.path(), "To Do", "keep me");
    let bundle = tmp.path().join("bad.json");
    fs::write(&bundle, r#"{"boards": {}}"#).unwrap();

    let (_stdout, stderr, success) = run_sb(tmp.path(), &["import", bundle.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("boardOrder"));
    let board = current_board(tmp.path());
    assert_eq!(contents(&column(&board, "To Do")["tasks"]), vec!["keep me"]);
}

#[test]
fn test_publish_html() {
    let tmp = tempfile::TempDir::new().unwrap();
    add_task(tmp.path(), "To Do", "Ship it #release");
    run_sb_ok(tmp.path(), &["config", "tag-color", "#release", "#2a2"]);

    let out_path = tmp.path().join("board.html");
    run_sb_ok(tmp.path(), &["publish", "-o", out_path.to_str().unwrap(), "--title", "Team"]);
    let html = fs::read_to_string(&out_path).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Team</title>"));
    assert!(html.contains("Ship it #release"));
    assert!(html.contains(r##""release":"#2a2""##));
}

// ---------------------------------------------------------------------------
// Persistence and recovery
// ---------------------------------------------------------------------------

#[test]
fn test_v1_board_is_migrated_on_load() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = tmp.path().join("store");
    fs::create_dir_all(&store).unwrap();
    fs::write(
        store.join("board%3ALegacy.json"),
        r#"{"title": "Legacy", "columns": [{"id": 1, "title": "Todo"}], "tasks": [{"id": 7, "content": "old", "columnId": 1}]}"#,
    )
    .unwrap();

    let board = run_sb_json(tmp.path(), &["show", "Legacy"]);
    assert_eq!(board["dataVersion"], 2);
    assert_eq!(board["columns"][0]["tasks"][0]["id"], "7");

    let saved: Value =
        serde_json::from_str(&fs::read_to_string(store.join("board%3ALegacy.json")).unwrap()).unwrap();
    assert_eq!(saved["dataVersion"], 2);

    let out = run_sb_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("migration: board upgraded"));
}

#[test]
fn test_malformed_board_is_logged_and_replaced() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = tmp.path().join("store");
    fs::create_dir_all(&store).unwrap();
    fs::write(store.join("board%3ABroken.json"), "{oops").unwrap();

    let board = run_sb_json(tmp.path(), &["show", "Broken"]);
    assert_eq!(board["title"], "My Board");

    let entries = run_sb_json(tmp.path(), &["recovery"]);
    assert_eq!(entries[0]["category"], "parser");
    assert_eq!(entries[0]["body"], "{oops");

    let pruned = run_sb_json(tmp.path(), &["recovery", "prune", "--all"]);
    assert_eq!(pruned["removed"], 1);
    let out = run_sb_ok(tmp.path(), &["recovery"]);
    assert!(out.contains("recovery log is empty"));
}
