//! Whole-file reads and crash-safe replacement of the backing document.

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

/// Reads the raw document, `None` when it does not exist yet.
pub(crate) fn read_document(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replaces `path` with `contents` so readers see either the old or the new
/// document, never a torn write: temp file in the same directory, fsync,
/// rename.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path);
    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Moves an unreadable document aside so the next save cannot destroy it.
///
/// The first copy goes to `<file>.corrupt`; later ones get a numbered suffix
/// so an earlier copy is never replaced.
pub(crate) fn quarantine(path: &Path) -> io::Result<PathBuf> {
    let target = free_quarantine_path(path)?;
    fs::rename(path, &target)?;
    Ok(target)
}

fn free_quarantine_path(path: &Path) -> io::Result<PathBuf> {
    let first = sibling_with_suffix(path, "corrupt");
    if !first.try_exists()? {
        return Ok(first);
    }
    for n in 1..=MAX_QUARANTINED {
        let candidate = sibling_with_suffix(path, &format!("corrupt.{n}"));
        if !candidate.try_exists()? {
            return Ok(candidate);
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{MAX_QUARANTINED} quarantined copies already exist"),
    ))
}

const MAX_QUARANTINED: u32 = 999;

fn temp_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, &format!("tmp.{}", std::process::id()))
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "habits.json".into());
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_contents_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("habits.json");

        write_atomic(&path, "first").expect("first write");
        write_atomic(&path, "second").expect("second write");

        assert_eq!(fs::read_to_string(&path).expect("read back"), "second");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("list dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn read_document_returns_none_for_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let content = read_document(&dir.path().join("absent.json")).expect("read");
        assert!(content.is_none());
    }

    #[test]
    fn quarantine_moves_file_aside() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("habits.json");
        fs::write(&path, "{ not json").expect("seed");

        let moved = quarantine(&path).expect("quarantine");

        assert!(!path.exists());
        assert_eq!(moved, dir.path().join("habits.json.corrupt"));
    }

    #[test]
    fn quarantine_keeps_earlier_copies() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("habits.json");

        fs::write(&path, "first").expect("seed");
        quarantine(&path).expect("first quarantine");
        fs::write(&path, "second").expect("seed again");
        let moved = quarantine(&path).expect("second quarantine");

        assert_eq!(moved, dir.path().join("habits.json.corrupt.1"));
        let first = fs::read_to_string(dir.path().join("habits.json.corrupt")).expect("read first");
        assert_eq!(first, "first");
        assert_eq!(fs::read_to_string(&moved).expect("read second"), "second");
    }
}
