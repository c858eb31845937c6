use std::os::raw::{c_double, c_int, c_ulong};
use std::sync::atomic::Ordering;

use crate::ffi::{STRESS_CONFIG, STRESS_MODE};
use crate::StressConfig;

/// Must be called before `cyclewatch_init`; inert afterward.
#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_enable_random_stress(
    probability: c_double,
    min_delay_us: c_ulong,
    max_delay_us: c_ulong,
) -> c_int {
    STRESS_MODE.store(1, Ordering::SeqCst);
    unsafe {
        #[allow(static_mut_refs)]
        {
            STRESS_CONFIG = Some(StressConfig {
                probability,
                min_micros: min_delay_us as u64,
                max_micros: max_delay_us as u64,
                preempt_after_release: true,
            });
        }
    }
    0
}

/// Must be called before `cyclewatch_init`; inert afterward.
#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_enable_component_stress(min_delay_us: c_ulong, max_delay_us: c_ulong) -> c_int {
    STRESS_MODE.store(2, Ordering::SeqCst);
    unsafe {
        #[allow(static_mut_refs)]
        {
            STRESS_CONFIG = Some(StressConfig {
                probability: 0.8,
                min_micros: min_delay_us as u64,
                max_micros: max_delay_us as u64,
                preempt_after_release: true,
            });
        }
    }
    0
}

#[unsafe(no_mangle)]
pub extern "C" fn cyclewatch_disable_stress() -> c_int {
    STRESS_MODE.store(0, Ordering::SeqCst);
    unsafe {
        #[allow(static_mut_refs)]
        {
            STRESS_CONFIG = None;
        }
    }
    0
}
