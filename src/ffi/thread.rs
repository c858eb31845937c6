use std::os::raw::c_int;

use crate::core::detector::thread as engine;
use crate::core::types::{current_thread_id, ThreadId};

/// # Safety
/// Should only be called once per real OS thread, before any resource
/// operation from that thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_register_thread_spawn(thread_id: usize, parent_id: usize) -> c_int {
    let parent = if parent_id == 0 { None } else { Some(parent_id as ThreadId) };
    engine::on_thread_spawn(thread_id as ThreadId, parent);
    0
}

/// # Safety
/// Should only be called once, as the registered thread is actually
/// exiting; triggers cascaded resource destruction.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cyclewatch_register_thread_exit(thread_id: usize) -> c_int {
    engine::on_thread_exit(thread_id as ThreadId);
    0
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_get_thread_id() -> usize {
    current_thread_id() as usize
}
