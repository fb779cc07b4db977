//! Service identity: name validation, descriptor files, and lock keys.
//!
//! Pure functions only. No I/O.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ServiceError;

/// Allow-list for service names. Checked before any path join so that a name
/// can never address anything but a direct child of the project root (CWE-22).
pub static SERVICE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern and cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid regex")
});

/// Files that mark a directory as a service, in lookup precedence order.
pub const DESCRIPTOR_FILES: &[&str] = &[
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// Validate a service name against the allow-list.
///
/// The explicit checks run first so that the rejection reason names the
/// actual problem; the regex is the final gate.
///
/// # Errors
///
/// Returns `ServiceError::Security` for any name that is not a plain
/// alphanumeric/`-`/`_` segment.
pub fn validate_service_name(name: &str) -> Result<(), ServiceError> {
    if name.is_empty() {
        return Err(ServiceError::security(name, "name is empty"));
    }
    if name.contains('\0') {
        return Err(ServiceError::security(name, "name contains a null byte"));
    }
    if name.contains("..") {
        return Err(ServiceError::security(
            name,
            "name contains a parent-directory segment",
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ServiceError::security(name, "name contains a path separator"));
    }
    if !SERVICE_NAME_RE.is_match(name) {
        return Err(ServiceError::security(
            name,
            "name must be 1-64 characters of [A-Za-z0-9_-]",
        ));
    }
    Ok(())
}

/// A service whose directory has been canonicalized and checked to live
/// inside its project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService {
    pub name: String,
    /// Canonical absolute service directory.
    pub directory: PathBuf,
    /// Descriptor file inside `directory` handed to the runtime.
    pub descriptor: PathBuf,
}

impl ResolvedService {
    /// Lock-table key for this service.
    #[must_use]
    pub fn key(&self) -> ServiceKey {
        ServiceKey {
            directory: self.directory.clone(),
            name: self.name.clone(),
        }
    }
}

/// Identity of a service for mutual exclusion.
///
/// Keyed on the canonical directory so that the two ways of addressing the
/// same service (`root/name` and `root` itself) share one lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub directory: PathBuf,
    pub name: String,
}

/// Returns `true` when `candidate` is `root` or lies beneath it.
///
/// Both paths must already be canonical; this is a component-wise prefix
/// check, not a string comparison.
#[must_use]
pub fn is_within(root: &Path, candidate: &Path) -> bool {
    candidate.starts_with(root)
}
