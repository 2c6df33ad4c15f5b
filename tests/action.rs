mod common;

use std::collections::HashMap;

use common::{pull, Call, FakeApi, SAMPLE_REPORT};
use covsummary::action::{run, Outcome};
use covsummary::config::Settings;
use covsummary::event::EventPayload;
use covsummary::github::{Comment, Conclusion, Context};
use covsummary::outputs::MemoryOutputs;
use covsummary::report::CREDITS;

fn settings(path: &str, extra: &[(&str, &str)]) -> Settings {
    let mut inputs: HashMap<String, String> = [
        ("repo_token", "token"),
        ("path", path),
        ("skip_covered", "false"),
        ("show_line", "false"),
        ("show_branch", "false"),
        ("minimum_coverage", "80"),
        ("show_class_names", "false"),
        ("show_missing", "true"),
        ("only_changed_files", "false"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        inputs.insert(k.to_string(), v.to_string());
    }
    Settings::load(&inputs).unwrap()
}

fn context() -> Context {
    Context {
        repo: "owner/repo".to_string(),
        sha: Some("ctxsha".to_string()),
        event_path: None,
        api_url: "https://api.github.com".to_string(),
        server_url: "https://github.com".to_string(),
    }
}

fn pr_payload() -> EventPayload {
    serde_json::from_str(
        r#"{"action": "opened", "pull_request": {"number": 9, "head": {"sha": "abc123"}}}"#,
    )
    .unwrap()
}

#[test]
fn run_posts_comment_and_check() {
    let (_dir, path) = common::write_fixture("coverage.json", SAMPLE_REPORT);
    let settings = settings(path.to_str().unwrap(), &[("link_missing_lines", "true")]);
    let api = FakeApi::default();
    let mut outputs = MemoryOutputs::default();

    let outcome = run(&settings, &context(), &pr_payload(), &api, &mut outputs).unwrap();

    let Outcome::Completed {
        comment,
        below_threshold,
    } = outcome
    else {
        panic!("expected a completed run");
    };
    assert!(!below_threshold);
    assert!(comment.contains("| **All files** | `82%` | :white_check_mark: |   |"));
    assert!(comment.contains("| src/util.py | `79%` | :x: |"));
    assert!(comment.contains(
        "[`3-4`](https://github.com/owner/repo/blob/abc123/src/util.py?plain=1#L3-L4)"
    ));

    assert_eq!(outputs.get("lines_total"), Some("40"));
    assert_eq!(outputs.get("lines_covered"), Some("34"));
    assert_eq!(outputs.get("branches_total"), Some("10"));
    assert_eq!(outputs.get("branches_covered"), Some("7"));
    assert_eq!(outputs.get("comment"), Some(comment.as_str()));
    assert_eq!(outputs.get("url_html"), Some("https://github.com/o/r/runs/1"));

    let calls = api.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], Call::CreateComment(9, comment.clone()));
    let Call::CreateCheck(check) = &calls[1] else {
        panic!("expected a check run");
    };
    assert_eq!(check.name, "coverage");
    assert_eq!(check.head_sha, "abc123");
    assert_eq!(check.conclusion, Conclusion::Neutral);
    assert_eq!(check.output.summary, comment);
}

#[test]
fn run_updates_existing_comment() {
    let (_dir, path) = common::write_fixture("coverage.json", SAMPLE_REPORT);
    let settings = settings(
        path.to_str().unwrap(),
        &[("report_name", "Backend"), ("add_check", "false")],
    );
    let api = FakeApi {
        comments: vec![
            Comment {
                id: 11,
                body: Some(format!("<strong>Frontend</strong> {CREDITS}")),
            },
            Comment {
                id: 12,
                body: Some(format!("<strong>Backend</strong> {CREDITS}")),
            },
        ],
        ..Default::default()
    };
    let mut outputs = MemoryOutputs::default();

    run(&settings, &context(), &pr_payload(), &api, &mut outputs).unwrap();

    let calls = api.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::UpdateComment(12, body) if body.contains("<strong>Backend</strong>")));
}

#[test]
fn run_fails_check_below_threshold() {
    let (_dir, path) = common::write_fixture("coverage.json", SAMPLE_REPORT);
    let settings = settings(
        path.to_str().unwrap(),
        &[
            ("minimum_coverage", "90"),
            ("fail_below_threshold", "true"),
            ("add_pr_comment", "false"),
        ],
    );
    let api = FakeApi::default();
    let mut outputs = MemoryOutputs::default();

    let outcome = run(&settings, &context(), &pr_payload(), &api, &mut outputs).unwrap();

    assert!(matches!(
        outcome,
        Outcome::Completed {
            below_threshold: true,
            ..
        }
    ));
    let calls = api.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::CreateCheck(c) if c.conclusion == Conclusion::Failure));
}

#[test]
fn run_restricts_to_changed_files() {
    let (_dir, path) = common::write_fixture("coverage.json", SAMPLE_REPORT);
    let settings = settings(
        path.to_str().unwrap(),
        &[("only_changed_files", "true"), ("add_check", "false")],
    );
    let api = FakeApi {
        changed_files: vec!["src/app.py".to_string()],
        ..Default::default()
    };
    let mut outputs = MemoryOutputs::default();

    run(&settings, &context(), &pr_payload(), &api, &mut outputs).unwrap();

    let comment = outputs.get("comment").unwrap();
    assert!(comment.contains("src/app.py"));
    assert!(!comment.contains("src/util.py"));
    // Totals still describe the whole report.
    assert!(comment.contains("| **All files** | `82%` |"));
}

#[test]
fn run_without_commit_stops_early() {
    let (_dir, path) = common::write_fixture("coverage.json", SAMPLE_REPORT);
    let settings = settings(path.to_str().unwrap(), &[]);
    let api = FakeApi::default();
    let mut outputs = MemoryOutputs::default();

    let outcome = run(
        &settings,
        &context(),
        &EventPayload::default(),
        &api,
        &mut outputs,
    )
    .unwrap();

    assert_eq!(outcome, Outcome::NoCommit);
    assert!(outputs.values.is_empty());
    assert!(api.calls.borrow().is_empty());
}

#[test]
fn run_push_event_creates_check_only() {
    let (_dir, path) = common::write_fixture("coverage.json", SAMPLE_REPORT);
    let settings = settings(path.to_str().unwrap(), &[]);
    let api = FakeApi {
        pulls: vec![pull(3, "zzz")],
        ..Default::default()
    };
    let mut outputs = MemoryOutputs::default();
    let payload: EventPayload = serde_json::from_str(r#"{"after": "p1"}"#).unwrap();

    run(&settings, &context(), &payload, &api, &mut outputs).unwrap();

    let calls = api.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], Call::CreateCheck(c) if c.head_sha == "p1"));
}

#[test]
fn run_missing_coverage_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = dir.path().join("*.json");
    let settings = settings(pattern.to_str().unwrap(), &[]);
    let api = FakeApi::default();
    let mut outputs = MemoryOutputs::default();

    let err = run(&settings, &context(), &pr_payload(), &api, &mut outputs).unwrap_err();
    assert!(format!("{err:#}").contains("No coverage files found"));
}
