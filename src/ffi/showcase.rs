use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use crate::core::detector;

/// `0` ok, `-1` null/invalid path, `-2` showcase failed, `-3` flush failed.
///
/// # Safety
/// `log_path` must be null-terminated, valid UTF-8.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_showcase(log_path: *const c_char) -> c_int {
    if log_path.is_null() {
        return -1;
    }
    let path = match unsafe { CStr::from_ptr(log_path) }.to_str() {
        Ok(s) => s,
        Err(_) => return -1,
    };
    if detector::flush_logs().is_err() {
        return -3;
    }
    match crate::showcase::showcase(path) {
        Ok(()) => 0,
        Err(_) => -2,
    }
}

/// `0` ok, `-1` no active log file, `-2` showcase failed, `-3` flush failed.
#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_showcase_current() -> c_int {
    if detector::flush_logs().is_err() {
        return -3;
    }
    match crate::showcase::showcase_current() {
        Ok(()) => 0,
        Err(e) => {
            if e.to_string().contains("no active log file") {
                -1
            } else {
                -2
            }
        }
    }
}
