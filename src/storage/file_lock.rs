use std::fs::{File, OpenOptions};
use std::path::Path;
use crate::core::error::{Error, ErrorKind, Result};

/// Single handle guarantee: one live `Collection` per name and location.
/// Held for the lifetime of the handle, released on drop.
pub struct FileLock {
    pub file: File,
}

impl FileLock {
    pub fn acquire(lock_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)?;

        // Platform-specific locking
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            use libc::{flock, LOCK_EX, LOCK_NB};

            let fd = file.as_raw_fd();
            let rc = unsafe { flock(fd, LOCK_EX | LOCK_NB) };
            if rc != 0 {
                let os = std::io::Error::last_os_error();
                return Err(match os.raw_os_error() {
                    Some(libc::EWOULDBLOCK) => Error::new(
                        ErrorKind::AlreadyOpen,
                        format!("{} is held by another handle", lock_path.display()),
                    ),
                    _ => Error::new(
                        ErrorKind::Io,
                        format!("Failed to acquire lock {}: {}", lock_path.display(), os),
                    ),
                });
            }
        }

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            use libc::{flock, LOCK_UN};

            let fd = self.file.as_raw_fd();
            unsafe {
                flock(fd, LOCK_UN);
            }
        }
    }
}
