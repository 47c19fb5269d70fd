//! Filesystem helpers for reading inputs and writing artefacts.
//!
//! Every operation resolves an ambient base directory once and then works
//! through `cap-std` capabilities relative to it, so callers only ever pass
//! UTF-8 paths from `camino`.
#![forbid(unsafe_code)]

use std::io;
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::{Dir, File};
use cap_std::ambient_authority;

/// Open an existing file for reading.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<File> {
    File::open_ambient(path, ambient_authority())
}

/// Create or truncate a file for writing, creating missing parent
/// directories first.
///
/// # Errors
/// Returns the underlying I/O error when a directory or the file cannot be
/// created.
pub fn create_utf8_file(path: &Utf8Path) -> io::Result<File> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent_dir(path)?;
    dir.create(name)
}

/// Write `contents` to `path`, replacing any existing file.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be written.
pub fn write_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent_dir(path)?;
    dir.write(name, contents)
}

/// Open the directory containing `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or its directory cannot be opened.
pub fn open_parent_dir(path: &Utf8Path) -> io::Result<(Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create the parent directory of `path` and any missing ancestors.
///
/// # Errors
/// Returns the underlying I/O error when a directory cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = split_base(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Report whether `path` names an existing regular file.
///
/// A missing file or missing parent directory yields `Ok(false)`.
///
/// # Errors
/// Returns other I/O errors, such as permission failures, unchanged.
pub fn file_exists(path: &Utf8Path) -> io::Result<bool> {
    let probe = open_parent_dir(path).and_then(|(dir, name)| dir.metadata(name));
    match probe {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Split a directory path into an ambient base directory and the relative
/// remainder beneath it.
fn split_base(parent: &Utf8Path) -> io::Result<(Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (base, relative) = match std_parent.components().next() {
        // Windows drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative_utf8 = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;
    Ok((dir, relative_utf8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temporary directory")
    }

    fn utf8(dir: &TempDir, relative: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(relative)).expect("utf8 path")
    }

    #[rstest]
    fn creates_nested_parents(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "data/out/expanded.csv");
        let mut file = create_utf8_file(&path).expect("create file");
        file.write_all(b"id\n").expect("write");
        assert!(file_exists(&path).expect("probe"));
    }

    #[rstest]
    fn missing_paths_do_not_exist(temp_dir: TempDir) {
        assert!(!file_exists(&utf8(&temp_dir, "nope.csv")).expect("probe"));
        assert!(!file_exists(&utf8(&temp_dir, "no/such/dir/file.csv")).expect("probe"));
    }

    #[rstest]
    fn directories_are_not_files(temp_dir: TempDir) {
        let dir = utf8(&temp_dir, "cache");
        std::fs::create_dir_all(&dir).expect("create dir");
        assert!(!file_exists(&dir).expect("probe"));
    }

    #[rstest]
    fn written_contents_read_back(temp_dir: TempDir) {
        let path = utf8(&temp_dir, "points_cache.csv");
        write_file(&path, b"id,tags\n").expect("write file");
        let mut contents = String::new();
        open_utf8_file(&path)
            .expect("open file")
            .read_to_string(&mut contents)
            .expect("read");
        assert_eq!(contents, "id,tags\n");
    }

    #[rstest]
    fn bare_file_names_resolve_to_current_dir() {
        let (_, name) = open_parent_dir(Utf8Path::new("Cargo.toml")).expect("open cwd");
        assert_eq!(name, "Cargo.toml");
    }
}
