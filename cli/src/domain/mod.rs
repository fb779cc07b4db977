//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod action;
pub mod capture;
pub mod compose;
pub mod config;
pub mod error;
pub mod service;
pub mod status;

pub use action::{ActionPhase, ActionRequest};
pub use config::OrchestratorConfig;
pub use error::{ConfigError, ServiceError};
pub use service::{ResolvedService, ServiceKey, validate_service_name};
