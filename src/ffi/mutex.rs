use std::ffi::c_void;
use std::os::raw::c_int;

use crate::core::types::ThreadId;
use crate::ffi::FFI_MUTEX_GUARD;
use crate::Mutex;

/// # Safety
/// Caller owns the returned handle until it passes it to
/// `cyclewatch_destroy_mutex`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_create_mutex() -> *mut c_void {
    let mutex = Box::new(Mutex::new(()));
    Box::into_raw(mutex) as *mut c_void
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_create_mutex_with_creator(creator_thread_id: usize) -> *mut c_void {
    let mutex = Box::new(Mutex::with_creator((), Some(creator_thread_id as ThreadId)));
    Box::into_raw(mutex) as *mut c_void
}

/// # Safety
/// `handle` must be a pointer returned by `cyclewatch_create_mutex` and not
/// yet destroyed, with no guard currently outstanding on it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_destroy_mutex(handle: *mut c_void) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle as *mut Mutex<()>) });
    }
}

/// # Safety
/// `handle` must be a live mutex handle. Must be paired with a later call
/// to `cyclewatch_unlock_mutex` from the same OS thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_lock_mutex(handle: *mut c_void) -> c_int {
    if handle.is_null() {
        return -1;
    }
    let mutex = unsafe { &*(handle as *const Mutex<()>) };
    let guard = mutex.lock();
    #[allow(clippy::missing_transmute_annotations)]
    FFI_MUTEX_GUARD.with(|map| {
        map.borrow_mut().insert(handle, unsafe { std::mem::transmute(guard) });
    });
    0
}

/// # Safety
/// `handle` must be a live mutex handle currently locked by this thread via
/// `cyclewatch_lock_mutex`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_unlock_mutex(handle: *mut c_void) -> c_int {
    if handle.is_null() {
        return -1;
    }
    let had_guard = FFI_MUTEX_GUARD.with(|map| map.borrow_mut().remove(&handle).is_some());
    if had_guard {
        0
    } else {
        -2
    }
}

/// # Safety
/// `handle` must be a live mutex handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_get_mutex_creator(handle: *mut c_void) -> usize {
    if handle.is_null() {
        return 0;
    }
    let mutex = unsafe { &*(handle as *const Mutex<()>) };
    mutex.creator_thread_id() as usize
}
