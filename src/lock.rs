//! Run lock
//!
//! Mutual exclusion between overlapping watchdog invocations uses `flock(2)` on a
//! well-known file. The lock belongs to the open file description, so it is released
//! when [`RunLock`] is dropped or when the process dies, whichever comes first. The
//! file itself is never removed.

use crate::error::{Error, Result};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Default lock location
pub const DEFAULT_LOCK_PATH: &str = "/run/kiosk-watchdog.lock";

/// Outcome of a non-blocking lock attempt
#[derive(Debug)]
pub enum LockAttempt {
    /// This run owns the lock until the guard is dropped
    Acquired(RunLock),
    /// Another run holds the lock
    Contended,
}

/// Exclusive advisory lock held for the duration of one run
pub struct RunLock {
    _guard: Flock<File>,
    path: PathBuf,
}

impl std::fmt::Debug for RunLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLock").field("path", &self.path).finish()
    }
}

impl RunLock {
    /// Try to take the lock without blocking
    pub fn try_acquire(path: &Path) -> Result<LockAttempt> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| Error::LockOpen {
                path: path.to_path_buf(),
                source: e,
            })?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(guard) => Ok(LockAttempt::Acquired(RunLock {
                _guard: guard,
                path: path.to_path_buf(),
            })),
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => Ok(LockAttempt::Contended),
            Err((_, errno)) => Err(Error::LockFailed {
                path: path.to_path_buf(),
                errno,
            }),
        }
    }

    /// Path of the locked file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
