use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the lock file inside the data directory
pub const LOCK_FILE: &str = ".lock";

/// How long a command waits for another `sb` to finish
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Exclusive advisory lock on a data directory (flock on Unix).
///
/// The lock file stays in place after release; only the flock matters. While
/// held it contains the holder's process id, which is reported to anyone
/// who times out waiting.
pub struct FileLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("data directory is busy ({path} held by {holder})")]
    Busy { path: PathBuf, holder: String },
}

impl FileLock {
    /// Lock `data_dir`, retrying until `timeout` runs out
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = data_dir.join(LOCK_FILE);
        let open_err = |source| LockError::Open {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(open_err)?;

        let start = Instant::now();
        while !try_lock(&file) {
            if start.elapsed() >= timeout {
                let holder = read_holder(&mut file)
                    .map(|pid| format!("pid {}", pid))
                    .unwrap_or_else(|| "another sb process".to_string());
                return Err(LockError::Busy {
                    path: path.clone(),
                    holder,
                });
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        write_holder(&mut file).map_err(open_err)?;
        Ok(FileLock { _file: file })
    }

    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, DEFAULT_TIMEOUT)
    }
}

fn write_holder(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.flush()
}

fn read_holder(file: &mut File) -> Option<u32> {
    let mut text = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut text).ok()?;
    text.trim().parse().ok()
}

/// Non-blocking exclusive flock; false if someone else holds it
#[cfg(unix)]
fn try_lock(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;
    unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) == 0 }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn holder_pid_is_recorded() {
        let tmp = TempDir::new().unwrap();
        let _lock = FileLock::acquire_default(tmp.path()).unwrap();
        let text = fs::read_to_string(tmp.path().join(LOCK_FILE)).unwrap();
        assert_eq!(text.trim(), std::process::id().to_string());
    }

    #[test]
    fn lock_can_be_taken_again_after_drop() {
        let tmp = TempDir::new().unwrap();
        drop(FileLock::acquire_default(tmp.path()).unwrap());
        assert!(tmp.path().join(LOCK_FILE).exists());
        assert!(FileLock::acquire_default(tmp.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn second_writer_is_told_who_holds_it() {
        let tmp = TempDir::new().unwrap();
        let _held = FileLock::acquire_default(tmp.path()).unwrap();
        let Err(err) = FileLock::acquire(tmp.path(), Duration::from_millis(50)) else {
            panic!("second lock should fail");
        };
        assert!(matches!(err, LockError::Busy { .. }));
        assert!(err.to_string().contains(&format!("pid {}", std::process::id())));
    }

    #[test]
    fn missing_directory_is_an_open_error() {
        let tmp = TempDir::new().unwrap();
        let result = FileLock::acquire_default(&tmp.path().join("nope"));
        assert!(matches!(result, Err(LockError::Open { .. })));
    }
}
