//! Log tailing through the orchestration facade.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use dockyard_cli::application::logs_response;
use dockyard_common::ErrorKind;

use crate::helpers::{DAEMON_DOWN, Script, ScriptedRunner, orchestrator, project};

fn tail_arg(runner: &ScriptedRunner) -> String {
    let calls = runner.calls_for("logs");
    let call = calls.last().expect("a logs call");
    let pos = call.args.iter().position(|a| a == "--tail").expect("--tail");
    call.args[pos + 1].clone()
}

#[tokio::test]
async fn requested_count_is_clamped() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    for (requested, expected) in [
        (Some(0), "1"),
        (Some(-5), "1"),
        (Some(5000), "1000"),
        (Some(25), "25"),
        (None, "100"),
    ] {
        orch.get_service_logs(root.path(), "api", requested)
            .await
            .unwrap();
        assert_eq!(tail_arg(&runner), expected, "requested {requested:?}");
    }
}

#[tokio::test]
async fn logs_run_without_color_in_service_directory() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    orch.get_service_logs(root.path(), "api", None).await.unwrap();
    let call = &runner.calls_for("logs")[0];
    assert!(call.args.iter().any(|a| a == "--no-color"));
    assert_eq!(call.service_dir(), "api");
    assert!(!call.args.iter().any(|a| a == "api"));
}

#[tokio::test]
async fn returns_lines_oldest_first() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("logs", Script::ok("api-1  | booting\napi-1  | ready\n"));
    let orch = orchestrator(&runner);

    let lines = orch.get_service_logs(root.path(), "api", Some(10)).await.unwrap();
    assert_eq!(lines, ["api-1  | booting", "api-1  | ready"]);
}

#[tokio::test]
async fn keeps_only_the_requested_tail() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("logs", Script::ok("one\ntwo\nthree\nfour\n"));
    let orch = orchestrator(&runner);

    let lines = orch.get_service_logs(root.path(), "api", Some(2)).await.unwrap();
    assert_eq!(lines, ["three", "four"]);
}

#[tokio::test]
async fn service_without_output_yields_empty_list() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    let lines = orch.get_service_logs(root.path(), "api", None).await.unwrap();
    assert!(lines.is_empty());
    assert!(logs_response(Ok(lines)).success);
}

#[tokio::test]
async fn runtime_error_is_runtime_unavailable() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("logs", Script::fail(1, DAEMON_DOWN));
    let orch = orchestrator(&runner);

    let result = orch.get_service_logs(root.path(), "api", None).await;
    let response = logs_response(result);
    assert!(!response.success);
    assert!(response.lines.is_empty());
    assert_eq!(response.error, Some(ErrorKind::RuntimeUnavailable));
}

#[tokio::test]
async fn missing_runtime_is_runtime_unavailable() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("logs", Script::SpawnError("No such file or directory".into()));
    let orch = orchestrator(&runner);

    let err = orch
        .get_service_logs(root.path(), "api", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RuntimeUnavailable);
}

#[tokio::test]
async fn unknown_service_is_not_found() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    let err = orch
        .get_service_logs(root.path(), "db", Some(5))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(runner.calls().is_empty());
}
