use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{QuoteError, Result};
use crate::record::QuoteRecord;

/// Write `records` as a pretty-printed JSON array, replacing `path` atomically.
///
/// Nothing is written for an empty slice and `Ok(false)` is returned, so a run
/// that found no quotes never clobbers a good file.
pub fn write_records(path: &Path, records: &[QuoteRecord]) -> Result<bool> {
    if records.is_empty() {
        warn!("No quotes to save to {}", path.display());
        return Ok(false);
    }

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| QuoteError::io(dir, e))?;

    let tmp = NamedTempFile::new_in(dir).map_err(|e| QuoteError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush().map_err(|e| QuoteError::io(tmp.path(), e))?;
    }
    // NamedTempFile is created 0600; carry over the target's mode.
    if let Some(perms) = target_permissions(path) {
        tmp.as_file()
            .set_permissions(perms)
            .map_err(|e| QuoteError::io(tmp.path(), e))?;
    }
    tmp.persist(path).map_err(|e| {
        warn!("Error saving quotes to {}: {}", path.display(), e.error);
        QuoteError::io(path, e.error)
    })?;

    info!(count = records.len(), "Saved quotes to {}", path.display());
    Ok(true)
}

/// Mode of the file being replaced, or 0644 for a new one.
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

pub fn read_records(path: &Path) -> Result<Vec<QuoteRecord>> {
    let raw = fs::read_to_string(path).map_err(|e| QuoteError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<QuoteRecord> {
        let mut r = QuoteRecord::new(
            "O SON OF SPIRIT! My first counsel is this".into(),
            "The Hidden Words, From the Arabic #1".into(),
            "Bahá’u’lláh",
        );
        r.reference = Some("1".into());
        vec![r]
    }

    #[test]
    fn writes_pretty_utf8_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/quotes_hidden_words.json");
        assert!(write_records(&path, &sample()).unwrap());

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"text\""));
        assert!(raw.contains("Bahá’u’lláh"));
        assert_eq!(read_records(&path).unwrap(), sample());
    }

    #[test]
    fn empty_list_leaves_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes_kjv_bible.json");
        write_records(&path, &sample()).unwrap();
        let before = fs::read(&path).unwrap();

        assert!(!write_records(&path, &[]).unwrap());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes_gita_arnold.json");
        write_records(&path, &sample()).unwrap();
        write_records(&path, &sample()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![std::ffi::OsString::from("quotes_gita_arnold.json")]);
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.json");
        write_records(&path, &sample()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o644);

        fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).unwrap();
        write_records(&path, &sample()).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o664);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_records(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, QuoteError::Io { .. }));
    }
}
