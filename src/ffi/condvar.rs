use std::ffi::c_void;
use std::os::raw::{c_int, c_ulong};
use std::time::Duration;

use crate::core::types::ThreadId;
use crate::ffi::FFI_MUTEX_GUARD;
use crate::Condvar;

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_create_condvar() -> *mut c_void {
    let cv = Box::new(Condvar::new());
    Box::into_raw(cv) as *mut c_void
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_create_condvar_with_creator(creator_thread_id: usize) -> *mut c_void {
    let cv = Box::new(Condvar::with_creator(Some(creator_thread_id as ThreadId)));
    Box::into_raw(cv) as *mut c_void
}

/// # Safety
/// `handle` must be a pointer returned by `cyclewatch_create_condvar`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_destroy_condvar(handle: *mut c_void) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle as *mut Condvar) });
    }
}

/// Returns `0` on success, `-1` null condvar, `-2` null mutex, `-3` mutex
/// not held by this thread via `cyclewatch_lock_mutex`.
///
/// # Safety
/// `condvar` and `mutex` must be live handles; `mutex` must currently be
/// held by this thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_condvar_wait(condvar: *mut c_void, mutex: *mut c_void) -> c_int {
    if condvar.is_null() {
        return -1;
    }
    if mutex.is_null() {
        return -2;
    }
    let condvar_ref = unsafe { &*(condvar as *const Condvar) };
    let mut guard = match FFI_MUTEX_GUARD.with(|map| map.borrow_mut().remove(&mutex)) {
        Some(g) => g,
        None => return -3,
    };
    condvar_ref.wait(&mut guard);
    FFI_MUTEX_GUARD.with(|map| map.borrow_mut().insert(mutex, guard));
    0
}

/// Returns `0` signalled, `1` timed out, `-1`/`-2`/`-3` as in `cyclewatch_condvar_wait`.
///
/// # Safety
/// Same as `cyclewatch_condvar_wait`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_condvar_wait_timeout(
    condvar: *mut c_void,
    mutex: *mut c_void,
    timeout_ms: c_ulong,
) -> c_int {
    if condvar.is_null() {
        return -1;
    }
    if mutex.is_null() {
        return -2;
    }
    let condvar_ref = unsafe { &*(condvar as *const Condvar) };
    let mut guard = match FFI_MUTEX_GUARD.with(|map| map.borrow_mut().remove(&mutex)) {
        Some(g) => g,
        None => return -3,
    };
    let signalled = condvar_ref.wait_timeout(&mut guard, Duration::from_millis(timeout_ms as u64));
    FFI_MUTEX_GUARD.with(|map| map.borrow_mut().insert(mutex, guard));
    if signalled {
        0
    } else {
        1
    }
}

/// # Safety
/// `condvar` must be a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_condvar_notify_one(condvar: *mut c_void) -> c_int {
    if condvar.is_null() {
        return -1;
    }
    unsafe { &*(condvar as *const Condvar) }.notify_one();
    0
}

/// # Safety
/// `condvar` must be a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_condvar_notify_all(condvar: *mut c_void) -> c_int {
    if condvar.is_null() {
        return -1;
    }
    unsafe { &*(condvar as *const Condvar) }.notify_all();
    0
}
