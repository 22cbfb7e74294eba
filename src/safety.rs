use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keeps rewrites inside the root directory and away from Go's shared
/// sources: the module cache and vendored dependencies.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical root every rule path is resolved against
    root: PathBuf,
    /// Canonical paths to forbidden directories
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside root: {path} (root: {root})")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("failed to resolve {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn canonicalize(path: &Path) -> Result<PathBuf, SafetyError> {
    path.canonicalize().map_err(|source| SafetyError::Canonicalize {
        path: path.to_path_buf(),
        source,
    })
}

impl WorkspaceGuard {
    /// Create a guard for `root`, canonicalized to see through symlinks.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let root = canonicalize(root.as_ref())?;

        let mut forbidden_paths = Vec::new();

        // $GOMODCACHE, falling back to ~/go/pkg/mod
        let module_cache = std::env::var_os("GOMODCACHE")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| home::home_dir().map(|home| home.join("go/pkg/mod")));
        if let Some(Ok(cache)) = module_cache.map(|cache| cache.canonicalize()) {
            forbidden_paths.push(cache);
        }

        if let Ok(vendor) = root.join("vendor").canonicalize() {
            forbidden_paths.push(vendor);
        }

        Ok(Self {
            root,
            forbidden_paths,
        })
    }

    /// Resolve a rule path against the root and check it is safe to rewrite.
    ///
    /// Returns the canonical absolute path.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        // Resolves symlinks and `..` components
        let canonical = canonicalize(&absolute)?;

        if !canonical.starts_with(&self.root) {
            return Err(SafetyError::OutsideRoot {
                path: canonical,
                root: self.root.clone(),
            });
        }

        if let Some(forbidden) = self
            .forbidden_paths
            .iter()
            .find(|forbidden| canonical.starts_with(forbidden))
        {
            return Err(SafetyError::ForbiddenPath {
                path: canonical,
                forbidden: forbidden.clone(),
            });
        }

        Ok(canonical)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[cfg(test)]
    pub fn with_forbidden(
        root: impl AsRef<Path>,
        forbidden: Vec<PathBuf>,
    ) -> Result<Self, SafetyError> {
        Ok(Self {
            root: canonicalize(root.as_ref())?,
            forbidden_paths: forbidden,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn file_inside_root_is_accepted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let guard = WorkspaceGuard::new(root).unwrap();

        let file = root.join("model/user.go");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"package model\n").unwrap();

        let resolved = guard.validate_path("model/user.go").unwrap();
        assert_eq!(resolved, file.canonicalize().unwrap());
    }

    #[test]
    fn dot_dot_escape_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("project");
        fs::create_dir_all(&root).unwrap();
        fs::write(temp_dir.path().join("other.go"), b"package other\n").unwrap();

        let guard = WorkspaceGuard::new(&root).unwrap();
        let result = guard.validate_path("../other.go");
        assert!(matches!(result, Err(SafetyError::OutsideRoot { .. })));
    }

    #[test]
    fn vendor_directory_is_forbidden() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let file = root.join("vendor/github.com/acme/lib/lib.go");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"package lib\n").unwrap();

        let guard = WorkspaceGuard::new(root).unwrap();
        let result = guard.validate_path("vendor/github.com/acme/lib/lib.go");
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }

    #[test]
    fn custom_forbidden_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let generated = root.join("generated");
        fs::create_dir_all(&generated).unwrap();
        fs::write(generated.join("types.go"), b"package generated\n").unwrap();

        let guard =
            WorkspaceGuard::with_forbidden(root, vec![generated.canonicalize().unwrap()]).unwrap();
        let result = guard.validate_path("generated/types.go");
        assert!(matches!(result, Err(SafetyError::ForbiddenPath { .. })));
    }

    #[test]
    fn missing_file_fails_to_resolve() {
        let temp_dir = tempfile::tempdir().unwrap();
        let guard = WorkspaceGuard::new(temp_dir.path()).unwrap();
        let result = guard.validate_path("absent.go");
        assert!(matches!(result, Err(SafetyError::Canonicalize { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn symlink_escape_is_rejected() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("project");
        fs::create_dir_all(&root).unwrap();

        let outside = temp_dir.path().join("outside.go");
        fs::write(&outside, b"package outside\n").unwrap();
        symlink(&outside, root.join("escape.go")).unwrap();

        let guard = WorkspaceGuard::new(&root).unwrap();
        let result = guard.validate_path("escape.go");
        assert!(matches!(result, Err(SafetyError::OutsideRoot { .. })));
    }
}
