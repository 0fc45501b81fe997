use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates a directory structure if it doesn't exist.
///
/// If the path already exists but is not a directory, a
/// [`FileSystemError::NotADirectory`] is returned.
///
/// # Example
///
/// ```no_run
/// use pkgidx_utils::fs::ensure_dir_exists;
///
/// ensure_dir_exists("/tmp/pkgidx/lory/main/binary-amd64").unwrap();
/// ```
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "create",
            source: err,
        })?;
    } else if !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Reads a whole UTF-8 text file.
///
/// The file handle is scoped to this call and released on every path,
/// including decoding failures, which surface as [`FileSystemError::File`]
/// with the offending path attached.
pub fn read_text<P: AsRef<Path>>(path: P) -> FileSystemResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|err| FileSystemError::File {
        path: path.to_path_buf(),
        action: "read",
        source: err,
    })
}

/// Writes `contents` to `path`, creating missing parent directories first.
pub fn write_text<P: AsRef<Path>>(path: P, contents: &str) -> FileSystemResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, contents).map_err(|err| FileSystemError::File {
        path: path.to_path_buf(),
        action: "write",
        source: err,
    })
}

/// Visits every regular file below `dir`.
///
/// With `recursive` unset only the direct children of `dir` are visited.
/// Entries are visited in path order so callers get deterministic results.
/// Symlinked directories are not followed.
pub fn walk_dir<P, F, E>(dir: P, recursive: bool, action: &mut F) -> Result<(), E>
where
    P: AsRef<Path>,
    F: FnMut(&Path) -> Result<(), E>,
    E: From<FileSystemError>,
{
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(FileSystemError::NotFound {
            path: dir.to_path_buf(),
        }
        .into());
    }
    if !dir.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: dir.to_path_buf(),
        }
        .into());
    }

    for path in sorted_entries(dir)? {
        let file_type = fs::symlink_metadata(&path)
            .map_err(|err| FileSystemError::File {
                path: path.clone(),
                action: "stat",
                source: err,
            })?
            .file_type();

        if file_type.is_dir() {
            if recursive {
                walk_dir(&path, true, action)?;
            }
        } else if path.is_file() {
            action(&path)?;
        }
    }

    Ok(())
}

fn sorted_entries(dir: &Path) -> FileSystemResult<Vec<PathBuf>> {
    let read_dir = |err| FileSystemError::Directory {
        path: dir.to_path_buf(),
        action: "read",
        source: err,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_dir)?;
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_ensure_dir_exists() {
        let dir = tempdir().unwrap();
        let new_dir = dir.path().join("lory/main");
        ensure_dir_exists(&new_dir).unwrap();
        assert!(new_dir.is_dir());

        ensure_dir_exists(&new_dir).unwrap();
    }

    #[test]
    fn test_ensure_dir_exists_file_collision() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("Packages");
        fs::write(&file_path, "Package: foo\n").unwrap();
        assert!(matches!(
            ensure_dir_exists(&file_path),
            Err(FileSystemError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_read_text_missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("Packages");
        let err = read_text(&missing).unwrap_err();
        assert!(err.to_string().contains("Packages"));
        assert!(matches!(err, FileSystemError::File { action: "read", .. }));
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Packages");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(read_text(&path).is_err());
    }

    #[test]
    fn test_write_text_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("main/binary-amd64/Packages.json");
        write_text(&path, "[]").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_walk_dir_recursive_and_flat() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("main/binary-amd64")).unwrap();
        fs::write(dir.path().join("Packages"), "").unwrap();
        fs::write(dir.path().join("main/binary-amd64/Packages"), "").unwrap();

        let mut flat = Vec::new();
        walk_dir(dir.path(), false, &mut |p: &Path| -> FileSystemResult<()> {
            flat.push(p.to_path_buf());
            Ok(())
        })
        .unwrap();
        assert_eq!(flat, vec![dir.path().join("Packages")]);

        let mut deep = Vec::new();
        walk_dir(dir.path(), true, &mut |p: &Path| -> FileSystemResult<()> {
            deep.push(p.to_path_buf());
            Ok(())
        })
        .unwrap();
        assert_eq!(
            deep,
            vec![
                dir.path().join("Packages"),
                dir.path().join("main/binary-amd64/Packages"),
            ]
        );
    }

    #[test]
    fn test_walk_dir_missing_root() {
        let dir = tempdir().unwrap();
        let result = walk_dir(
            dir.path().join("absent"),
            true,
            &mut |_: &Path| -> FileSystemResult<()> { Ok(()) },
        );
        assert!(matches!(result, Err(FileSystemError::NotFound { .. })));
    }
}
