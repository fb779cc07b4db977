//! Lifecycle actions through the orchestration facade.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use dockyard_cli::domain::{ActionRequest, OrchestratorConfig, ServiceError};
use dockyard_common::{ActionKind, ErrorKind, ServiceState};

use crate::helpers::{
    DAEMON_DOWN, Script, ScriptedRunner, orchestrator, orchestrator_with, project, ps_row,
};

#[tokio::test]
async fn start_runs_compose_up_in_service_directory() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    let result = orch.start_service(root.path(), "api").await.unwrap();
    assert!(result.success);
    assert_eq!(result.state, ServiceState::Running);
    assert_eq!(result.exit_code, Some(0));

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    let service_dir = root.path().join("api").canonicalize().unwrap();
    assert_eq!(call.program, "docker");
    assert_eq!(call.cwd, service_dir);
    assert_eq!(
        call.args,
        vec![
            "compose".to_string(),
            "-f".to_string(),
            service_dir.join("compose.yaml").to_string_lossy().into_owned(),
            "up".to_string(),
            "-d".to_string(),
        ]
    );
    assert!(!call.args.iter().any(|a| a == "api"));
}

#[tokio::test]
async fn each_action_uses_its_subcommand() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    orch.stop_service(root.path(), "api").await.unwrap();
    orch.build_service(root.path(), "api").await.unwrap();
    let restart = orch.restart_service(root.path(), "api").await.unwrap();
    assert_eq!(restart.state, ServiceState::Running);

    let tails: Vec<Vec<String>> = runner.calls().iter().map(|c| c.args[3..].to_vec()).collect();
    assert_eq!(
        tails,
        vec![
            vec!["stop".to_string()],
            vec!["build".to_string()],
            vec!["up".to_string(), "-d".to_string(), "--force-recreate".to_string()],
        ]
    );
}

#[tokio::test]
async fn action_timeouts_follow_configuration() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    orch.build_service(root.path(), "api").await.unwrap();
    orch.stop_service(root.path(), "api").await.unwrap();

    let calls = runner.calls();
    assert!(calls[0].limits.timeout > Duration::from_secs(1190));
    assert!(calls[1].limits.timeout <= Duration::from_secs(90));
    assert_eq!(calls[0].limits.grace, Duration::from_secs(10));
}

#[tokio::test]
async fn concurrent_starts_yield_one_run_and_one_busy() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("up", Script::slow(Duration::from_millis(300)));
    let orch = orchestrator(&runner);

    let (first, second) = tokio::join!(orch.start_service(root.path(), "api"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        orch.start_service(root.path(), "api").await
    });

    assert!(first.unwrap().success);
    let err = second.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Busy);
    assert_eq!(runner.calls_for("up").len(), 1);
    assert_eq!(runner.max_concurrent(), 1);
}

#[tokio::test]
async fn both_addressing_forms_share_one_lock() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("up", Script::slow(Duration::from_millis(300)));
    let orch = orchestrator(&runner);
    let service_dir = root.path().join("api");

    let (first, second) = tokio::join!(orch.start_service(root.path(), "api"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        orch.stop_service(&service_dir, "api").await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(ServiceError::Busy(_))));
}

#[tokio::test]
async fn different_services_run_in_parallel() {
    let root = project(&["api", "db", "web"]);
    let runner = ScriptedRunner::new();
    runner.on("up", Script::slow(Duration::from_millis(200)));
    let orch = orchestrator(&runner);

    let (a, b, c) = tokio::join!(
        orch.start_service(root.path(), "api"),
        orch.start_service(root.path(), "db"),
        orch.start_service(root.path(), "web"),
    );
    assert!(a.unwrap().success && b.unwrap().success && c.unwrap().success);
    assert_eq!(runner.max_concurrent(), 3);
}

#[tokio::test]
async fn global_cap_bounds_simultaneous_processes() {
    let root = project(&["api", "db", "web"]);
    let runner = ScriptedRunner::new();
    runner.on("up", Script::slow(Duration::from_millis(100)));
    let mut config = OrchestratorConfig::default();
    config.limits.max_concurrent_processes = 1;
    let orch = orchestrator_with(&runner, config);

    let (a, b, c) = tokio::join!(
        orch.start_service(root.path(), "api"),
        orch.start_service(root.path(), "db"),
        orch.start_service(root.path(), "web"),
    );
    assert!(a.unwrap().success && b.unwrap().success && c.unwrap().success);
    assert_eq!(runner.max_concurrent(), 1);
    assert_eq!(runner.calls_for("up").len(), 3);
}

#[tokio::test]
async fn deadline_expiring_while_waiting_for_slot_is_timeout_without_spawn() {
    let root = project(&["api", "db"]);
    let runner = ScriptedRunner::new();
    runner.on_service("api", "up", Script::slow(Duration::from_secs(2)));
    let mut config = OrchestratorConfig::default();
    config.limits.max_concurrent_processes = 1;
    let orch = orchestrator_with(&runner, config);

    let (first, second) = tokio::join!(orch.start_service(root.path(), "api"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let request =
            ActionRequest::within("db", ActionKind::Start, Duration::from_millis(200));
        orch.run_action(root.path(), &request).await
    });

    assert!(first.unwrap().success);
    assert_eq!(second.unwrap_err().kind(), ErrorKind::Timeout);
    let spawned: Vec<String> = runner.calls().iter().map(|c| c.service_dir()).collect();
    assert_eq!(spawned, vec!["api".to_string()]);
}

#[tokio::test]
async fn build_timeout_releases_lock_for_next_start() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("build", Script::slow(Duration::from_secs(30)));
    let mut config = OrchestratorConfig::default();
    config.timeouts.build_secs = 1;
    let orch = orchestrator_with(&runner, config);

    let build = orch.build_service(root.path(), "api").await.unwrap();
    assert!(!build.success);
    assert_eq!(build.error, Some(ErrorKind::Timeout));
    assert!(build.message.unwrap().contains("timed out"));

    let start = orch.start_service(root.path(), "api").await.unwrap();
    assert!(start.success);
}

#[tokio::test]
async fn nonzero_exit_is_failed_result_with_stderr_tail() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let stderr: String = (1..=30).map(|i| format!("line {i}\n")).collect();
    runner.on("build", Script::fail(2, &stderr));
    let orch = orchestrator(&runner);

    let result = orch.build_service(root.path(), "api").await.unwrap();
    assert!(!result.success);
    assert_eq!(result.exit_code, Some(2));
    assert_eq!(result.error, Some(ErrorKind::Failed));
    let message = result.message.unwrap();
    assert!(message.contains("line 30"));
    assert!(message.contains("line 11"));
    assert!(!message.contains("line 10\n"));
}

#[tokio::test]
async fn unreachable_daemon_on_action_is_runtime_unavailable() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("up", Script::fail(1, DAEMON_DOWN));
    let orch = orchestrator(&runner);

    let result = orch.start_service(root.path(), "api").await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error, Some(ErrorKind::RuntimeUnavailable));
}

#[tokio::test]
async fn spawn_failure_is_runtime_unavailable_and_releases_lock() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("up", Script::SpawnError("No such file or directory".into()));
    let orch = orchestrator(&runner);

    let err = orch.start_service(root.path(), "api").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RuntimeUnavailable);

    runner.on("up", Script::ok(""));
    assert!(orch.start_service(root.path(), "api").await.unwrap().success);
}

#[tokio::test]
async fn cancelled_action_releases_lock() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("up", Script::slow(Duration::from_secs(30)));
    let orch = orchestrator(&runner);

    let cancelled = tokio::time::timeout(
        Duration::from_millis(100),
        orch.start_service(root.path(), "api"),
    )
    .await;
    assert!(cancelled.is_err());

    runner.on("up", Script::ok(""));
    assert!(orch.start_service(root.path(), "api").await.unwrap().success);
}

#[tokio::test]
async fn stop_on_stopped_service_is_noop_success() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    runner.on("ps", Script::ok(""));
    let orch = orchestrator(&runner);

    let result = orch.stop_service(root.path(), "api").await.unwrap();
    assert!(result.success);
    assert_eq!(result.state, ServiceState::Stopped);
}

#[tokio::test]
async fn start_status_stop_round_trip() {
    let root = project(&["api"]);
    let service_dir = root.path().join("api");
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    let started = orch.start_service(&service_dir, "api").await.unwrap();
    assert!(started.success);
    assert_eq!(started.exit_code, Some(0));
    assert_eq!(started.state, ServiceState::Running);

    runner.on("ps", Script::ok(&ps_row("api", "running", "")));
    let status = orch.get_service_status(&service_dir, "api").await.unwrap();
    assert_eq!(status.state, ServiceState::Running);
    assert_eq!(status.containers.len(), 1);

    let stopped = orch.stop_service(&service_dir, "api").await.unwrap();
    assert!(stopped.success);
    assert_eq!(stopped.state, ServiceState::Stopped);
}

#[tokio::test]
async fn unsafe_names_never_reach_the_runtime() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    for name in ["..", "../api", "api/../api", "a\\b", "a\0b", "", "api;rm"] {
        let err = orch.start_service(root.path(), name).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SecurityError, "name {name:?}");
    }
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn unknown_service_is_not_found() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let orch = orchestrator(&runner);

    let err = orch.restart_service(root.path(), "db").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn oversized_budget_does_not_overflow_deadline() {
    let root = project(&["api"]);
    let runner = ScriptedRunner::new();
    let mut config = OrchestratorConfig::default();
    config.timeouts.build_secs = u64::MAX;
    let orch = orchestrator_with(&runner, config);

    let result = orch.build_service(root.path(), "api").await.unwrap();
    assert!(result.success);
    assert!(runner.calls()[0].limits.timeout > Duration::from_secs(86_400));
}
