//! Application context: unified state passed to every command handler.
//!
//! `AppContext` bundles the output context, the loaded configuration, the
//! project root, and the orchestrator wired to its production adapters.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ConfigStore;
use crate::application::Orchestrator;
use crate::domain::OrchestratorConfig;
use crate::infra::{FsServiceRegistry, TokioCommandRunner, YamlConfigStore};
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Explicit configuration file, if any.
    pub config: Option<PathBuf>,
    /// Project root; the current directory when absent.
    pub project: Option<PathBuf>,
}

/// Production orchestrator type.
pub type DefaultOrchestrator = Orchestrator<FsServiceRegistry, TokioCommandRunner>;

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Where the configuration was (or would have been) loaded from.
    pub config_store: YamlConfigStore,
    /// Project root services are resolved against.
    pub project: PathBuf,
    /// Lifecycle facade.
    pub orchestrator: DefaultOrchestrator,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid,
    /// or if no project root was given and the current directory is unreadable.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        let config_store = YamlConfigStore::new(flags.config);
        let config: OrchestratorConfig = config_store.load()?;
        let project = match flags.project {
            Some(dir) => dir,
            None => std::env::current_dir().context("cannot determine current directory")?,
        };

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store,
            project,
            orchestrator: Orchestrator::new(
                FsServiceRegistry::new(),
                TokioCommandRunner::new(),
                config,
            ),
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }
}
