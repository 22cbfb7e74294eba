use crate::go::{GoSource, GoSyntaxError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("mutated source is not valid Go: {0}")]
    InvalidTree(#[from] GoSyntaxError),
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path has no parent directory: {0}")]
    NoParent(PathBuf),
}

/// Serialize the mutated tree.
///
/// Every constructed node went in as text, so the tree is re-validated: a
/// type like `a b` or a tag containing a backtick surfaces here.
pub fn render(source: &GoSource) -> Result<&str, FormatError> {
    source.check_syntax()?;
    Ok(source.text())
}

/// Atomic file write: tempfile + fsync + rename, then an mtime bump so
/// build caches notice the change.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), WriteError> {
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    // Create tempfile in same directory to ensure same filesystem
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Err(WriteError::NoParent(path.to_path_buf())),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(content.as_bytes()).map_err(io_err)?;
    // The tempfile is created 0600; keep the target's mode across the rename.
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(io_err)?;
    }
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    filetime::set_file_mtime(path, filetime::FileTime::now()).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::Edit;

    #[test]
    fn render_rejects_broken_construction() {
        let mut source = GoSource::parse("package main\n\ntype T struct {\n\tA int\n}\n").unwrap();
        let at = source.text().find("\n}").unwrap();
        source.apply(vec![Edit::insert(at, "\n\tB a b c")]).unwrap();

        assert!(matches!(render(&source), Err(FormatError::InvalidTree(_))));
    }

    #[test]
    fn render_passes_valid_tree() {
        let source = GoSource::parse("package main\n").unwrap();
        assert_eq!(render(&source).unwrap(), "package main\n");
    }

    #[test]
    fn write_atomic_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.go");
        fs::write(&path, "package old\n").unwrap();

        write_atomic(&path, "package new\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "package new\n");
    }

    #[test]
    #[cfg(unix)]
    fn write_atomic_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.go");
        fs::write(&path, "package old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_atomic(&path, "package new\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn write_atomic_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("model.go");

        assert!(matches!(
            write_atomic(&path, "package p\n"),
            Err(WriteError::Io { .. })
        ));
    }
}
