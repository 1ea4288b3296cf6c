//! Atomic file replacement.
//!
//! Content is written to a sibling temp file, synced, then persisted over the
//! target. Readers see either the old file or the complete new one.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::Builder;

/// Replace `path` with whatever `write` produces.
///
/// The temp file lives in the same directory as `path` so the final rename
/// never crosses filesystems. The temp file is deleted whenever the replace
/// does not complete, including when `write` panics, and `path` is left
/// untouched.
pub fn replace_file<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = match path.file_name() {
        Some(name) => format!(".{}.", name.to_string_lossy()),
        None => ".replace.".to_string(),
    };

    let (file, temp_path) = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?
        .into_parts();

    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush()?;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    temp_path.persist(path).map_err(|e| e.error)
}
