use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::CliError;

/// Write `value` as pretty JSON to `out`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(out: Option<&Path>, value: &T) -> Result<(), CliError> {
    let mut data = serde_json::to_vec_pretty(value)?;
    data.push(b'\n');
    match out {
        Some(path) => {
            write_bytes_atomic(path, &data)?;
            tracing::info!(path = %path.display(), bytes = data.len(), "output written");
            Ok(())
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Replace `path` via a sibling temp file so readers never see a partial file.
fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let result = write_and_rename(&tmp_path, path, data);
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_rename(tmp_path: &Path, path: &Path, data: &[u8]) -> Result<(), CliError> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf, CliError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| CliError::InvalidPath(path.display().to_string()))?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_pretty_json_file() {
        let dir = std::env::temp_dir().join(format!("mockweave-output-{}", std::process::id()));
        let path = dir.join("nested").join("out.json");
        write_json(Some(&path), &serde_json::json!({"ok": true})).expect("write json");

        let written = std::fs::read_to_string(&path).expect("read output");
        assert_eq!(written, "{\n  \"ok\": true\n}\n");
        assert!(!path.with_file_name("out.json.tmp").exists());
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = std::env::temp_dir().join(format!("mockweave-rename-{}", std::process::id()));
        let path = dir.join("taken");
        std::fs::create_dir_all(path.join("inner")).expect("create blocking dir");

        let err = write_json(Some(&path), &serde_json::json!({"ok": true})).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
        assert!(!dir.join("taken.tmp").exists());
        assert!(path.is_dir());
        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn rejects_paths_without_file_name() {
        assert!(matches!(temp_path(Path::new("/")), Err(CliError::InvalidPath(_))));
    }
}
