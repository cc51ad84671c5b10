//! Raw-file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Marker in the stem of the student registration file.
pub const STUDENT_MARKER: &str = "EV";
/// Marker in the stem of the exam-grade file.
pub const EXAM_MARKER: &str = "VAKH";

/// File stem as UTF-8, or an empty string.
pub fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

/// Whether a path looks like a raw eencijfer file.
pub fn is_raw_file(path: &Path) -> bool {
    let is_asc = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("asc"));
    is_asc || file_stem(path).starts_with(STUDENT_MARKER)
}

/// Lists raw files in a directory.
///
/// Returns files sorted by filename.
pub fn list_raw_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && is_raw_file(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files.dedup();
    Ok(files)
}

fn first_with_marker<'a>(paths: &'a [PathBuf], marker: &str) -> Option<&'a PathBuf> {
    paths.iter().find(|p| file_stem(p).contains(marker))
}

/// The student registration table among `paths`.
pub fn find_student_table(paths: &[PathBuf]) -> Option<&PathBuf> {
    first_with_marker(paths, STUDENT_MARKER)
}

/// The exam-grade table among `paths`.
pub fn find_exam_table(paths: &[PathBuf]) -> Option<&PathBuf> {
    first_with_marker(paths, EXAM_MARKER)
}
