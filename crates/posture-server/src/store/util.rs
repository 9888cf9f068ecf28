use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Runs `op` while holding an exclusive lock on `<path>.lock`.
///
/// The lock is released when the lock file handle drops, including when
/// `op` fails.
pub fn with_file_lock<F, T, E>(path: &Path, op: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<io::Error>,
{
    let lock_path = PathBuf::from(format!("{}.lock", path.display()));
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;
    file.lock_exclusive()?;

    let result = op();
    drop(file);
    result
}

/// Writes `bytes` to a sibling temp file, syncs it, then renames it over
/// `path`. Readers see either the old or the new document, never a torn one.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    for _ in 0..3 {
        let tmp_path = unique_tmp_path(path);
        match write_and_rename(&tmp_path, path, bytes) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(e);
            }
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "failed to create unique temporary file after retries",
    ))
}

fn unique_tmp_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("store");
    path.with_file_name(format!(".{}.tmp.{}.{}", file_name, std::process::id(), nanos))
}

fn write_and_rename(tmp_path: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp_path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()?;

    // rename does not replace an existing file on Windows
    #[cfg(not(unix))]
    if target.exists() {
        let _ = fs::remove_file(target);
    }
    fs::rename(tmp_path, target)
}
