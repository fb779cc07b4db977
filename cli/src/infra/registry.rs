//! Filesystem implementation of the `ServiceRegistry` port.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::ports::ServiceRegistry;
use crate::domain::service::{DESCRIPTOR_FILES, is_within};
use crate::domain::{ResolvedService, ServiceError, validate_service_name};

/// Resolves services as directories holding a compose descriptor.
///
/// Every lookup canonicalizes, so symlinks are followed before the
/// containment check.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsServiceRegistry;

impl FsServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ServiceRegistry for FsServiceRegistry {
    fn resolve(&self, project_root: &Path, name: &str) -> Result<ResolvedService, ServiceError> {
        validate_service_name(name)?;
        let root = canonical_root(project_root)?;

        let candidate = root.join(name);
        if let Ok(directory) = candidate.canonicalize() {
            if !is_within(&root, &directory) || directory == root {
                return Err(ServiceError::security(
                    name,
                    "service directory resolves outside the project root",
                ));
            }
            if let Some(descriptor) = find_descriptor(&directory) {
                debug!(service = name, dir = %directory.display(), "resolved");
                return Ok(ResolvedService {
                    name: name.to_string(),
                    directory,
                    descriptor,
                });
            }
        }

        // The project root may itself be the service directory.
        let addressed_by_root = project_root.file_name() == Some(OsStr::new(name))
            || root.file_name() == Some(OsStr::new(name));
        if addressed_by_root {
            if let Some(descriptor) = find_descriptor(&root) {
                debug!(service = name, dir = %root.display(), "resolved to project root");
                return Ok(ResolvedService {
                    name: name.to_string(),
                    directory: root,
                    descriptor,
                });
            }
        }

        Err(ServiceError::NotFound(format!(
            "Service '{name}' not found in {}.",
            project_root.display()
        )))
    }

    fn discover(&self, project_root: &Path) -> Result<Vec<String>, ServiceError> {
        let root = canonical_root(project_root)?;
        let entries = std::fs::read_dir(&root).map_err(|e| {
            ServiceError::NotFound(format!("Cannot read project root {}: {e}", root.display()))
        })?;

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                validate_service_name(&name).ok()?;
                let directory = entry.path().canonicalize().ok()?;
                (directory.is_dir()
                    && is_within(&root, &directory)
                    && find_descriptor(&directory).is_some())
                .then_some(name)
            })
            .collect();

        let own = root.file_name().and_then(OsStr::to_str);
        if let Some(own) = own.filter(|n| validate_service_name(n).is_ok()) {
            if find_descriptor(&root).is_some() {
                names.push(own.to_string());
            }
        }

        names.sort();
        names.dedup();
        debug!(dir = %root.display(), count = names.len(), "discovered services");
        Ok(names)
    }
}

fn canonical_root(project_root: &Path) -> Result<PathBuf, ServiceError> {
    let root = project_root.canonicalize().map_err(|_| {
        ServiceError::NotFound(format!(
            "Project root {} does not exist.",
            project_root.display()
        ))
    })?;
    if !root.is_dir() {
        return Err(ServiceError::NotFound(format!(
            "Project root {} is not a directory.",
            project_root.display()
        )));
    }
    Ok(root)
}

fn find_descriptor(directory: &Path) -> Option<PathBuf> {
    DESCRIPTOR_FILES
        .iter()
        .map(|file| directory.join(file))
        .find(|path| path.is_file())
}
