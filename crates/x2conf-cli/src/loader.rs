//! Filesystem template loader

use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;
use x2conf_core::{Error as CoreError, Result as CoreResult, TemplateLoader};

/// Loads templates from disk, resolving relative paths against a root directory
#[derive(Debug, Clone)]
pub struct FsTemplates {
    root: PathBuf,
}

impl FsTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths are used as-is; anything else is taken relative to the root
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}

impl TemplateLoader for FsTemplates {
    fn load(&self, path: &str) -> CoreResult<String> {
        let resolved = self.resolve(path);
        trace!(template = path, resolved = %resolved.display(), "Loading template");

        std::fs::read_to_string(&resolved).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CoreError::TemplateNotFound {
                path: resolved.display().to_string(),
            },
            _ => CoreError::io_at(resolved, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_relative_and_absolute_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("datax/env")).unwrap();
        std::fs::write(dir.path().join("datax/env/batch-env.conf"), "env {\n}\n").unwrap();
        let absolute = dir.path().join("custom.conf");
        std::fs::write(&absolute, "source {\n}\n").unwrap();

        let loader = FsTemplates::new(dir.path());
        assert_eq!(loader.load("datax/env/batch-env.conf").unwrap(), "env {\n}\n");
        assert_eq!(
            loader.load(absolute.to_str().unwrap()).unwrap(),
            "source {\n}\n"
        );
    }

    #[test]
    fn test_missing_template() {
        let dir = TempDir::new().unwrap();
        let loader = FsTemplates::new(dir.path());

        let err = loader.load("datax/sinks/kafka-sink.conf").unwrap_err();
        match err {
            CoreError::TemplateNotFound { path } => {
                assert!(path.ends_with("kafka-sink.conf"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_bundled_templates_load() {
        let loader = FsTemplates::new(crate::config::bundled_templates_dir());
        for kind in [
            x2conf_core::TemplateKind::Env,
            x2conf_core::TemplateKind::Source,
            x2conf_core::TemplateKind::Sink,
        ] {
            let text = loader.load(kind.fallback_template()).unwrap();
            x2conf_core::conversion::template::validate_template(&text, Some(kind.fallback_template()))
                .unwrap();
        }
    }
}
