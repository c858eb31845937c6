use std::ffi::c_void;
use std::os::raw::c_int;

use crate::core::types::ThreadId;
use crate::ffi::{FFI_READ_GUARD, FFI_WRITE_GUARD};
use crate::RwLock;

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_create_rwlock() -> *mut c_void {
    let rwlock = Box::new(RwLock::new(()));
    Box::into_raw(rwlock) as *mut c_void
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_create_rwlock_with_creator(creator_thread_id: usize) -> *mut c_void {
    let rwlock = Box::new(RwLock::with_creator((), Some(creator_thread_id as ThreadId)));
    Box::into_raw(rwlock) as *mut c_void
}

/// # Safety
/// `handle` must be a pointer returned by `cyclewatch_create_rwlock` with
/// no guard currently outstanding on it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_destroy_rwlock(handle: *mut c_void) {
    if !handle.is_null() {
        drop(unsafe { Box::from_raw(handle as *mut RwLock<()>) });
    }
}

/// # Safety
/// `handle` must be a live rwlock handle; must be paired with
/// `cyclewatch_rw_unlock_read` from the same thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_rw_lock_read(handle: *mut c_void) -> c_int {
    if handle.is_null() {
        return -1;
    }
    let rwlock = unsafe { &*(handle as *const RwLock<()>) };
    let guard = rwlock.read();
    #[allow(clippy::missing_transmute_annotations)]
    FFI_READ_GUARD.with(|map| {
        map.borrow_mut().insert(handle, unsafe { std::mem::transmute(guard) });
    });
    0
}

/// # Safety
/// `handle` must currently hold a read guard taken via
/// `cyclewatch_rw_lock_read` on this thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_rw_unlock_read(handle: *mut c_void) -> c_int {
    if handle.is_null() {
        return -1;
    }
    let had_guard = FFI_READ_GUARD.with(|map| map.borrow_mut().remove(&handle).is_some());
    if had_guard {
        0
    } else {
        -2
    }
}

/// # Safety
/// `handle` must be a live rwlock handle; must be paired with
/// `cyclewatch_rw_unlock_write` from the same thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_rw_lock_write(handle: *mut c_void) -> c_int {
    if handle.is_null() {
        return -1;
    }
    let rwlock = unsafe { &*(handle as *const RwLock<()>) };
    let guard = rwlock.write();
    #[allow(clippy::missing_transmute_annotations)]
    FFI_WRITE_GUARD.with(|map| {
        map.borrow_mut().insert(handle, unsafe { std::mem::transmute(guard) });
    });
    0
}

/// # Safety
/// `handle` must currently hold a write guard taken via
/// `cyclewatch_rw_lock_write` on this thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_rw_unlock_write(handle: *mut c_void) -> c_int {
    if handle.is_null() {
        return -1;
    }
    let had_guard = FFI_WRITE_GUARD.with(|map| map.borrow_mut().remove(&handle).is_some());
    if had_guard {
        0
    } else {
        -2
    }
}

/// # Safety
/// `handle` must be a live rwlock handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_get_rwlock_creator(handle: *mut c_void) -> usize {
    if handle.is_null() {
        return 0;
    }
    let rwlock = unsafe { &*(handle as *const RwLock<()>) };
    rwlock.creator_thread_id() as usize
}
