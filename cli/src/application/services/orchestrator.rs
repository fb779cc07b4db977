//! Application service: the orchestration facade.
//!
//! Owns the lock table and the process semaphore. Every public operation
//! re-resolves the service through the registry before touching the runtime.

use std::path::Path;

use dockyard_common::{ActionKind, ActionResult, LogsResponse, ServiceStatus};
use futures_util::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::application::ports::{CommandRunner, ServiceRegistry};
use crate::domain::status::overlay_in_flight;
use crate::domain::{ActionPhase, ActionRequest, OrchestratorConfig, ServiceError};

use super::locks::LockTable;
use super::{executor, logs, probe};

/// Lifecycle operations over the services of a project.
pub struct Orchestrator<R, C> {
    registry: R,
    runner: C,
    config: OrchestratorConfig,
    locks: LockTable,
    slots: Semaphore,
}

impl<R: ServiceRegistry, C: CommandRunner> Orchestrator<R, C> {
    /// Build a facade. `config` is expected to have passed `validate`.
    pub fn new(registry: R, runner: C, config: OrchestratorConfig) -> Self {
        let slots = Semaphore::new(config.limits.max_concurrent_processes.max(1));
        Self {
            registry,
            runner,
            config,
            locks: LockTable::new(),
            slots,
        }
    }

    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// # Errors
    ///
    /// See [`Self::run_action`].
    pub async fn start_service(&self, dir: &Path, name: &str) -> Result<ActionResult, ServiceError> {
        self.perform(dir, name, ActionKind::Start).await
    }

    /// # Errors
    ///
    /// See [`Self::run_action`].
    pub async fn stop_service(&self, dir: &Path, name: &str) -> Result<ActionResult, ServiceError> {
        self.perform(dir, name, ActionKind::Stop).await
    }

    /// # Errors
    ///
    /// See [`Self::run_action`].
    pub async fn build_service(&self, dir: &Path, name: &str) -> Result<ActionResult, ServiceError> {
        self.perform(dir, name, ActionKind::Build).await
    }

    /// # Errors
    ///
    /// See [`Self::run_action`].
    pub async fn restart_service(
        &self,
        dir: &Path,
        name: &str,
    ) -> Result<ActionResult, ServiceError> {
        self.perform(dir, name, ActionKind::Restart).await
    }

    /// Run `kind` with the configured budget for that action.
    ///
    /// # Errors
    ///
    /// See [`Self::run_action`].
    pub async fn perform(
        &self,
        dir: &Path,
        name: &str,
        kind: ActionKind,
    ) -> Result<ActionResult, ServiceError> {
        let request = ActionRequest::within(name, kind, self.config.timeouts.for_action(kind));
        self.run_action(dir, &request).await
    }

    /// Run a lifecycle action with a caller-supplied deadline.
    ///
    /// # Errors
    ///
    /// Returns an error only when nothing was executed: `Security` or
    /// `NotFound` from resolution, `Busy` when the service already has an
    /// action in progress, `Timeout` when no process slot freed up before
    /// the deadline, `RuntimeUnavailable` when the runtime could not be
    /// launched. Executions that ran are reported as `Ok` with
    /// `success == false` when they failed.
    #[instrument(skip_all, fields(service = %request.service, action = %request.kind))]
    pub async fn run_action(
        &self,
        dir: &Path,
        request: &ActionRequest,
    ) -> Result<ActionResult, ServiceError> {
        let service = self.registry.resolve(dir, &request.service)?;
        let Some(_lease) = self.locks.try_acquire(&service.key(), request.kind) else {
            debug!(phase = %ActionPhase::Busy, "service busy");
            return Err(ServiceError::Busy(service.name));
        };
        executor::execute(&self.runner, &self.slots, &self.config, &service, request).await
    }

    /// Current state of one service.
    ///
    /// Never waits on the service lock. While an action is in flight its
    /// transitional state is reported unless the runtime reports an error.
    ///
    /// # Errors
    ///
    /// Only resolution errors; runtime problems yield an `unknown` status.
    pub async fn get_service_status(
        &self,
        dir: &Path,
        name: &str,
    ) -> Result<ServiceStatus, ServiceError> {
        let service = self.registry.resolve(dir, name)?;
        let mut status = probe::probe(&self.runner, &self.config, &service).await;
        let in_flight = self
            .locks
            .in_flight(&service.key())
            .and_then(ActionKind::transitional_state);
        status.state = overlay_in_flight(status.state, in_flight);
        Ok(status)
    }

    /// Recent log lines of one service, oldest first.
    ///
    /// # Errors
    ///
    /// Resolution errors, or `RuntimeUnavailable` when the runtime cannot
    /// produce logs.
    pub async fn get_service_logs(
        &self,
        dir: &Path,
        name: &str,
        lines: Option<i64>,
    ) -> Result<Vec<String>, ServiceError> {
        let service = self.registry.resolve(dir, name)?;
        logs::collect(&self.runner, &self.config, &service, lines).await
    }

    /// Status of every service in the project, in name order.
    ///
    /// A failure on one service becomes an `unknown` entry carrying its error
    /// kind; it does not fail the whole call.
    ///
    /// # Errors
    ///
    /// Only when the project root itself is missing or invalid.
    pub async fn get_all_services_status(
        &self,
        project_root: &Path,
    ) -> Result<Vec<ServiceStatus>, ServiceError> {
        let names = self.registry.discover(project_root)?;
        debug!(dir = %project_root.display(), services = names.len(), "probing project");
        let statuses: Vec<ServiceStatus> = stream::iter(names)
            .map(|name| async move {
                match self.get_service_status(project_root, &name).await {
                    Ok(status) => status,
                    Err(e) => ServiceStatus {
                        error: Some(e.kind()),
                        ..ServiceStatus::unknown(name, e.to_string())
                    },
                }
            })
            .buffered(self.config.limits.probe_parallelism.max(1))
            .collect()
            .await;
        Ok(statuses)
    }
}

/// Fold a logs result into the response body handed to callers.
#[must_use]
pub fn logs_response(result: Result<Vec<String>, ServiceError>) -> LogsResponse {
    match result {
        Ok(lines) => LogsResponse::ok(lines),
        Err(e) => LogsResponse::failed(e.kind(), e.to_string()),
    }
}
