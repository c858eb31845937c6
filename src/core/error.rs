use std::fmt;

use crate::core::types::{LockId, ThreadId};

/// Every fallible core operation reports through this error type rather than
/// aborting. `DeadlockDetected` is informational: the acquisition that
/// produced it still proceeds to block, it is also latched and delivered
/// through the notifier callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    InvalidHandle(u64),
    NotHeldByCaller { thread: ThreadId, resource: LockId },
    AlreadyInitialized,
    InvalidConfig(String),
    IoFailure(String),
    Timeout,
    DeadlockDetected,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidHandle(id) => write!(f, "invalid or destroyed resource handle {id}"),
            CoreError::NotHeldByCaller { thread, resource } => write!(
                f,
                "thread {thread} is not the holder of resource {resource}"
            ),
            CoreError::AlreadyInitialized => write!(f, "detector is already initialized"),
            CoreError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            CoreError::IoFailure(msg) => write!(f, "log I/O failure: {msg}"),
            CoreError::Timeout => write!(f, "condvar wait timed out"),
            CoreError::DeadlockDetected => write!(f, "a deadlock cycle was detected"),
        }
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;
