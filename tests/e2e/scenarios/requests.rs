use crate::harness::runner::ScenarioRunner;
use crate::harness::{Assertion, EventKind, Scenario};
use anyhow::ensure;
use serde_json::json;

const PROJECT: &str = "app.sublime-project";
const MAIN: &str = "src/main.js";

#[test]
fn test_completions_from_saved_file() {
    let text = "var total = 0;\ntot";
    Scenario::new("completions_from_saved_file")
        .from_fixture("default")
        .creates_file("src/calc.js", text)
        .opens("src/calc.js")
        .places_caret("src/calc.js", text.len())
        .requests_hints("src/calc.js")
        .assert_hints_include("total")
        .assert_hint_label("total", "total\t(?)")
        .assert_hints_range(15, 18)
        .assert(Assertion::LastQueryFile("src/calc.js".into()))
        .assert(Assertion::LastRequestFiles(0))
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_dirty_buffer_travels_inline() {
    let text = "var util = require('./util');\nutil.makeC";
    let prefix_start = text.rfind("makeC").unwrap();
    Scenario::new("dirty_buffer_travels_inline")
        .from_fixture("default")
        .opens(MAIN)
        .edits(MAIN, text)
        .requests_hints(MAIN)
        .assert_hints_include("makeCounter")
        .assert_hints_exclude("makeC")
        .assert_hint_label("makeCounter", "makeCounter()")
        .assert_hints_range(prefix_start, text.len())
        .assert(Assertion::LastQueryFile("#0".into()))
        .assert(Assertion::LastRequestFiles(1))
        .run()
        .unwrap();
}

#[test]
fn test_member_completion_labels() {
    Scenario::new("member_completion_labels")
        .from_fixture("default")
        .opens(MAIN)
        .edits(MAIN, "counter.")
        .requests_hints(MAIN)
        .assert_hints_range(8, 8)
        .assert_hint_label("increment", "increment()")
        .assert_hint_label("current", "current()")
        .assert_hint_label("count", "count\t(?)")
        .run()
        .unwrap();
}

#[test]
fn test_saved_buffer_is_read_from_disk() {
    let text = "var saved = 1;\nsav";
    Scenario::new("saved_buffer_is_read_from_disk")
        .from_fixture("default")
        .opens(MAIN)
        .edits(MAIN, text)
        .saves(MAIN)
        .requests_hints(MAIN)
        .assert_hints_include("saved")
        .assert(Assertion::LastQueryFile(MAIN.into()))
        .assert(Assertion::LastRequestFiles(0))
        .run()
        .unwrap();
}

#[test]
fn test_request_without_session_is_not_an_error() {
    Scenario::new("request_without_session")
        .from_fixture("default")
        .edits(MAIN, "x")
        .requests_hints(MAIN)
        .assert_no_hints()
        .jumps_to_definition(MAIN)
        .assert(Assertion::NoAnswer)
        .assert_events(EventKind::Created, 0)
        .assert_events(EventKind::Request, 0)
        .run()
        .unwrap();
}

#[test]
fn test_request_after_close_is_not_an_error() {
    Scenario::new("request_after_close")
        .from_fixture("default")
        .opens(MAIN)
        .closes_project(PROJECT)
        .requests_hints(MAIN)
        .assert_no_hints()
        .assert_events(EventKind::Request, 1) // warm-up only
        .run()
        .unwrap();
}

#[test]
fn test_engine_error_surfaces_and_session_survives() {
    Scenario::new("engine_error_surfaces")
        .from_fixture("default")
        .opens(MAIN)
        .engine_fails("Unexpected token (1:4)")
        .requests_hints(MAIN)
        .expect_failure()
        .assert_error_contains("Unexpected token (1:4)")
        .assert_session(PROJECT)
        .requests_hints(MAIN)
        .assert_hints_include("counter")
        .run()
        .unwrap();
}

#[test]
fn test_scripted_completion_answer() {
    Scenario::new("scripted_completion_answer")
        .from_fixture("default")
        .opens(MAIN)
        .engine_answers(json!({
            "from": 2,
            "to": 4,
            "completions": [{"name": "width", "type": "number"}],
            "guess": true
        }))
        .requests_hints(MAIN)
        .assert_hints_range(2, 4)
        .assert_hint_label("width", "width\t(num)")
        .assert(Assertion::Custom(Box::new(|runner: &ScenarioRunner| -> anyhow::Result<()> {
            let hints = runner
                .last_hints()
                .ok_or_else(|| anyhow::anyhow!("no hints"))?;
            ensure!(hints.list.iter().all(|c| c.guess), "guess flag not carried");
            Ok(())
        })))
        .run()
        .unwrap();
}

#[test]
fn test_malformed_completion_answer() {
    Scenario::new("malformed_completion_answer")
        .from_fixture("default")
        .opens(MAIN)
        .engine_answers(json!({"unexpected": true}))
        .requests_hints(MAIN)
        .expect_failure()
        .assert_error_contains("deserialization error")
        .run()
        .unwrap();
}

#[test]
fn test_jump_to_definition() {
    let text = "var util = require('./util');\nutil.makeCounter();";
    let caret = text.find("makeCounter").unwrap() + 2;
    Scenario::new("jump_to_definition")
        .from_fixture("default")
        .opens(MAIN)
        .edits(MAIN, text)
        .places_caret(MAIN, caret)
        .jumps_to_definition(MAIN)
        .assert(Assertion::LastQueryRange {
            start: caret,
            end: caret,
        })
        .assert(Assertion::AnswerPath {
            pointer: "/origin".into(),
            path: "src/util.js".into(),
        })
        .assert_answer("/start", json!(8))
        .assert_answer("/end", json!(19))
        .run()
        .unwrap();
}

#[test]
fn test_definition_at_whitespace_fails() {
    Scenario::new("definition_at_whitespace")
        .from_fixture("default")
        .opens(MAIN)
        .edits(MAIN, "var a = 1;\n\n")
        .jumps_to_definition(MAIN)
        .expect_failure()
        .assert_error_contains("No expression at the given position")
        .run()
        .unwrap();
}

#[test]
fn test_find_references() {
    Scenario::new("find_references")
        .from_fixture("default")
        .opens(MAIN)
        .edits(MAIN, "var counter = 1;\ncounter + counter;")
        .places_caret(MAIN, 5)
        .finds_references(MAIN)
        .assert_answer("/name", json!("counter"))
        .assert(Assertion::AnswerLen {
            pointer: "/refs".into(),
            len: 3,
        })
        .assert_answer("/refs/1/start", json!(17))
        .run()
        .unwrap();
}

#[test]
fn test_selection_sets_query_range() {
    Scenario::new("selection_sets_query_range")
        .from_fixture("default")
        .opens(MAIN)
        .edits(MAIN, "var counter = 1;\ncounter + counter;")
        .selects(MAIN, 11, 4)
        .finds_references(MAIN)
        .assert(Assertion::LastQueryRange { start: 4, end: 11 })
        .assert_answer("/name", json!("counter"))
        .run()
        .unwrap();
}

#[test]
fn test_force_file_update() {
    Scenario::new("force_file_update")
        .from_fixture("default")
        .opens(MAIN)
        .edits(MAIN, "var fresh = 1;")
        .forces_update(MAIN)
        .assert(Assertion::Flushed(true))
        .assert(Assertion::LastQueryFile("#0".into()))
        .assert(Assertion::LastRequestFiles(2))
        .assert(Assertion::Custom(Box::new(|runner: &ScenarioRunner| -> anyhow::Result<()> {
            let log = runner.log();
            let request = log
                .last_request()
                .ok_or_else(|| anyhow::anyhow!("no request"))?;
            ensure!(request.files[0].text.is_empty(), "warm-up file not empty");
            ensure!(
                request.files[1].name == runner.workspace().abs(MAIN),
                "buffer not carried as second file"
            );
            ensure!(request.files[1].text == "var fresh = 1;", "wrong buffer text");
            Ok(())
        })))
        .run()
        .unwrap();
}

#[test]
fn test_force_file_update_without_session() {
    Scenario::new("force_file_update_without_session")
        .from_fixture("default")
        .edits(MAIN, "var fresh = 1;")
        .forces_update(MAIN)
        .assert(Assertion::Flushed(false))
        .assert_events(EventKind::Request, 0)
        .run()
        .unwrap();
}
