//! `CGlobalVarsBase` (`globalvars_base.h`)

use std::ffi::c_void;

/// Per-frame engine globals shared by client and server
#[repr(C)]
#[derive(Debug)]
pub struct CGlobalVarsBase {
    /// Absolute time (`Plat_FloatTime`)
    pub realtime: f32,
    pub frame_count: i32,
    pub absolute_frame_time: f32,
    /// Game time
    pub curtime: f32,
    pub frame_time: f32,
    pub max_clients: i32,
    pub tick_count: i32,
    pub interval_per_tick: f32,
    pub interpolation_amount: f32,
    pub sim_ticks_this_frame: i32,
    pub network_protocol: i32,
    pub save_data: *mut c_void,
    /// Set on the client instance
    pub is_client: bool,
    pub timestamp_networking_base: i32,
    pub timestamp_randomize_window: i32,
}

impl CGlobalVarsBase {
    /// Convert a tick count to seconds
    #[inline]
    pub fn ticks_to_time(&self, ticks: i32) -> f32 {
        self.interval_per_tick * ticks as f32
    }

    /// Convert seconds to the nearest tick (`TIME_TO_TICKS`)
    #[inline]
    pub fn time_to_ticks(&self, time: f32) -> i32 {
        if self.interval_per_tick <= 0.0 {
            return 0;
        }
        (0.5 + time / self.interval_per_tick) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_layout() {
        assert_eq!(offset_of!(CGlobalVarsBase, curtime), 12);
        assert_eq!(offset_of!(CGlobalVarsBase, interval_per_tick), 28);
        assert_eq!(offset_of!(CGlobalVarsBase, save_data), 48);
        assert_eq!(offset_of!(CGlobalVarsBase, is_client), 56);
        assert_eq!(size_of::<CGlobalVarsBase>(), 72);
    }

    #[test]
    fn test_tick_conversion() {
        let mut globals: CGlobalVarsBase = unsafe { std::mem::zeroed() };
        assert_eq!(globals.time_to_ticks(1.0), 0);

        globals.interval_per_tick = 0.015;
        assert_eq!(globals.time_to_ticks(0.15), 10);
        assert!((globals.ticks_to_time(66) - 0.99).abs() < 1e-5);
    }
}
