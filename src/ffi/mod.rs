//! Thin `extern "C"` adapter over the safe Rust surface. Kept deliberately
//! small: the core contracts in `crate::core` are the thing under test,
//! this module just translates them to the return-code shape described
//! for external adapters and stashes guards across the call boundary.

pub mod condvar;
pub mod mutex;
pub mod rwlock;
pub mod showcase;
pub mod thread;

#[cfg(feature = "stress-test")]
pub mod stress;

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void, CStr, CString};

use crate::core::detector;
use crate::core::error::CoreError;
use crate::core::types::DeadlockInfo;
use crate::Cyclewatch;

thread_local! {
    /// Guards stashed across the FFI boundary, keyed by the raw handle they
    /// were acquired through. A caller must unlock/wait from the same OS
    /// thread that locked, matching the ordinary safe-Rust guard contract.
    static FFI_MUTEX_GUARD: RefCell<HashMap<*mut c_void, crate::MutexGuard<'static, ()>>> =
        RefCell::new(HashMap::new());
    static FFI_READ_GUARD: RefCell<HashMap<*mut c_void, crate::RwLockReadGuard<'static, ()>>> =
        RefCell::new(HashMap::new());
    static FFI_WRITE_GUARD: RefCell<HashMap<*mut c_void, crate::RwLockWriteGuard<'static, ()>>> =
        RefCell::new(HashMap::new());
}

static mut DEADLOCK_CALLBACK: Option<extern "C" fn(*const c_char)> = None;

#[cfg(feature = "stress-test")]
pub(crate) static STRESS_MODE: std::sync::atomic::AtomicU8 = std::sync::atomic::AtomicU8::new(0);
#[cfg(feature = "stress-test")]
static mut STRESS_CONFIG: Option<crate::StressConfig> = None;

/// `0` ok, `1` already initialized, `-1` invalid path, `-2` logger error.
///
/// # Safety
/// `log_path` must be null or a valid null-terminated UTF-8 string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_init(
    log_path: *const c_char,
    callback: Option<extern "C" fn(*const c_char)>,
) -> c_int {
    let path = if log_path.is_null() {
        None
    } else {
        match unsafe { CStr::from_ptr(log_path) }.to_str() {
            Ok(s) if !s.is_empty() => Some(s.to_string()),
            _ => return -1,
        }
    };

    unsafe {
        #[allow(static_mut_refs)]
        {
            DEADLOCK_CALLBACK = callback;
        }
    }

    let mut builder = Cyclewatch::new();
    if let Some(p) = path {
        builder = builder.with_log(p);
    }
    builder = builder.callback(move |info: DeadlockInfo| {
        unsafe {
            #[allow(static_mut_refs)]
            if let Some(cb) = DEADLOCK_CALLBACK {
                if let Ok(json) = serde_json::to_string(&info) {
                    if let Ok(c_json) = CString::new(json) {
                        cb(c_json.as_ptr());
                    }
                }
            }
        }
    });

    #[cfg(feature = "stress-test")]
    {
        builder = apply_pending_stress(builder);
    }

    match builder.start() {
        Ok(()) => 0,
        Err(CoreError::AlreadyInitialized) => 1,
        Err(CoreError::IoFailure(_)) => -2,
        Err(_) => -1,
    }
}

#[cfg(feature = "stress-test")]
fn apply_pending_stress(builder: Cyclewatch) -> Cyclewatch {
    use std::sync::atomic::Ordering;

    let mode = match STRESS_MODE.load(Ordering::SeqCst) {
        1 => crate::StressMode::Random,
        2 => crate::StressMode::ComponentTargeted,
        _ => return builder,
    };
    #[allow(static_mut_refs)]
    let config = unsafe { STRESS_CONFIG.clone() }.unwrap_or_default();
    builder.with_stress(mode, config)
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_is_deadlock_detected() -> c_int {
    detector::is_deadlock_detected() as c_int
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_reset_deadlock_flag() {
    detector::reset_deadlock_flag();
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_is_logging_enabled() -> c_int {
    detector::is_logging_enabled() as c_int
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_flush_logs() -> c_int {
    match detector::flush_logs() {
        Ok(()) => 0,
        Err(_) => -1,
    }
}
