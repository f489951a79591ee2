//! Net channel statistics (`INetChannelInfo`)
//!
//! `CNetChannel` implements `INetChannelInfo` as its primary base, so the
//! same pointer serves both.

use std::ffi::{c_char, c_void, CStr};
use std::ptr::NonNull;

use tf2rust_sdk::netchannel::{NetChannelFlow, MAX_FLOWS};
use tf2rust_sdk::{CNetChannel, INetChannelInfo};

use crate::thunk::MemberVFuncThunk;

type GetStringFn = unsafe extern "C" fn(this: *mut c_void) -> *const c_char;
type GetFloatFn = unsafe extern "C" fn(this: *mut c_void) -> f32;
type GetBoolFn = unsafe extern "C" fn(this: *mut c_void) -> bool;
type FlowFloatFn = unsafe extern "C" fn(this: *mut c_void, flow: i32) -> f32;
type FlowIntFn = unsafe extern "C" fn(this: *mut c_void, flow: i32) -> i32;

static GET_NAME: MemberVFuncThunk<GetStringFn> = MemberVFuncThunk::new("INetChannelInfo::GetName", 0);
static GET_ADDRESS: MemberVFuncThunk<GetStringFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetAddress", 1);
static GET_TIME: MemberVFuncThunk<GetFloatFn> = MemberVFuncThunk::new("INetChannelInfo::GetTime", 2);
static GET_TIME_CONNECTED: MemberVFuncThunk<GetFloatFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetTimeConnected", 3);
static IS_LOOPBACK: MemberVFuncThunk<GetBoolFn> =
    MemberVFuncThunk::new("INetChannelInfo::IsLoopback", 6);
static IS_TIMING_OUT: MemberVFuncThunk<GetBoolFn> =
    MemberVFuncThunk::new("INetChannelInfo::IsTimingOut", 7);
static GET_LATENCY: MemberVFuncThunk<FlowFloatFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetLatency", 9);
static GET_AVG_LATENCY: MemberVFuncThunk<FlowFloatFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetAvgLatency", 10);
static GET_AVG_LOSS: MemberVFuncThunk<FlowFloatFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetAvgLoss", 11);
static GET_AVG_CHOKE: MemberVFuncThunk<FlowFloatFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetAvgChoke", 12);
static GET_AVG_DATA: MemberVFuncThunk<FlowFloatFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetAvgData", 13);
static GET_AVG_PACKETS: MemberVFuncThunk<FlowFloatFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetAvgPackets", 14);
static GET_TOTAL_DATA: MemberVFuncThunk<FlowIntFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetTotalData", 15);
static GET_SEQUENCE_NR: MemberVFuncThunk<FlowIntFn> =
    MemberVFuncThunk::new("INetChannelInfo::GetSequenceNr", 16);

/// Per-flow statistics, indexed by `NetChannelFlow as usize`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NetChannelStats {
    /// Current latency in seconds
    pub latency: [f32; MAX_FLOWS],
    pub avg_latency: [f32; MAX_FLOWS],
    /// Packet loss, 0.0 to 1.0
    pub avg_loss: [f32; MAX_FLOWS],
    /// Choked packets, 0.0 to 1.0
    pub avg_choke: [f32; MAX_FLOWS],
    /// Bytes per second
    pub avg_data: [f32; MAX_FLOWS],
    /// Packets per second
    pub avg_packets: [f32; MAX_FLOWS],
    /// Total bytes
    pub total_data: [i32; MAX_FLOWS],
    pub sequence_nr: [i32; MAX_FLOWS],
}

impl NetChannelStats {
    /// Round-trip estimate: outgoing plus incoming latency, in seconds
    pub fn round_trip(&self) -> f32 {
        self.latency.iter().sum()
    }
}

/// Wrapper for a network channel
#[derive(Clone, Copy)]
pub struct NetChannel {
    ptr: NonNull<INetChannelInfo>,
}

impl NetChannel {
    /// # Safety
    /// `ptr` must be null or a valid `INetChannelInfo`.
    pub unsafe fn from_ptr(ptr: *mut INetChannelInfo) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    pub fn as_ptr(&self) -> *mut INetChannelInfo {
        self.ptr.as_ptr()
    }

    /// The channel as `CNetChannel`
    pub fn as_net_channel(&self) -> *mut CNetChannel {
        self.ptr.as_ptr() as *mut CNetChannel
    }

    #[inline]
    fn this(&self) -> *mut c_void {
        self.ptr.as_ptr() as *mut c_void
    }

    fn call_string(&self, thunk: &MemberVFuncThunk<GetStringFn>) -> String {
        unsafe {
            let Some(func) = thunk.get(self.this()) else {
                return String::new();
            };
            let s = func(self.this());
            if s.is_null() {
                String::new()
            } else {
                CStr::from_ptr(s).to_string_lossy().into_owned()
            }
        }
    }

    fn call_float(&self, thunk: &MemberVFuncThunk<GetFloatFn>) -> f32 {
        unsafe { thunk.get(self.this()).map_or(0.0, |func| func(self.this())) }
    }

    fn call_bool(&self, thunk: &MemberVFuncThunk<GetBoolFn>) -> bool {
        unsafe { thunk.get(self.this()).is_some_and(|func| func(self.this())) }
    }

    fn flow_float(&self, thunk: &MemberVFuncThunk<FlowFloatFn>, flow: NetChannelFlow) -> f32 {
        unsafe { thunk.get(self.this()).map_or(0.0, |func| func(self.this(), flow.raw())) }
    }

    fn flow_int(&self, thunk: &MemberVFuncThunk<FlowIntFn>, flow: NetChannelFlow) -> i32 {
        unsafe { thunk.get(self.this()).map_or(0, |func| func(self.this(), flow.raw())) }
    }

    /// Channel name
    pub fn name(&self) -> String {
        self.call_string(&GET_NAME)
    }

    /// Remote address as `ip:port`
    pub fn address(&self) -> String {
        self.call_string(&GET_ADDRESS)
    }

    /// Current net time
    pub fn time(&self) -> f32 {
        self.call_float(&GET_TIME)
    }

    /// Seconds since connecting
    pub fn time_connected(&self) -> f32 {
        self.call_float(&GET_TIME_CONNECTED)
    }

    pub fn is_loopback(&self) -> bool {
        self.call_bool(&IS_LOOPBACK)
    }

    pub fn is_timing_out(&self) -> bool {
        self.call_bool(&IS_TIMING_OUT)
    }

    pub fn latency(&self, flow: NetChannelFlow) -> f32 {
        self.flow_float(&GET_LATENCY, flow)
    }

    pub fn avg_latency(&self, flow: NetChannelFlow) -> f32 {
        self.flow_float(&GET_AVG_LATENCY, flow)
    }

    pub fn avg_loss(&self, flow: NetChannelFlow) -> f32 {
        self.flow_float(&GET_AVG_LOSS, flow)
    }

    pub fn avg_choke(&self, flow: NetChannelFlow) -> f32 {
        self.flow_float(&GET_AVG_CHOKE, flow)
    }

    pub fn avg_data(&self, flow: NetChannelFlow) -> f32 {
        self.flow_float(&GET_AVG_DATA, flow)
    }

    pub fn avg_packets(&self, flow: NetChannelFlow) -> f32 {
        self.flow_float(&GET_AVG_PACKETS, flow)
    }

    pub fn total_data(&self, flow: NetChannelFlow) -> i32 {
        self.flow_int(&GET_TOTAL_DATA, flow)
    }

    /// Last sequence number
    pub fn sequence_nr(&self, flow: NetChannelFlow) -> i32 {
        self.flow_int(&GET_SEQUENCE_NR, flow)
    }

    /// Snapshot of every per-flow statistic
    pub fn stats(&self) -> NetChannelStats {
        let mut stats = NetChannelStats::default();
        for flow in NetChannelFlow::ALL {
            let i = flow as usize;
            stats.latency[i] = self.latency(flow);
            stats.avg_latency[i] = self.avg_latency(flow);
            stats.avg_loss[i] = self.avg_loss(flow);
            stats.avg_choke[i] = self.avg_choke(flow);
            stats.avg_data[i] = self.avg_data(flow);
            stats.avg_packets[i] = self.avg_packets(flow);
            stats.total_data[i] = self.total_data(flow);
            stats.sequence_nr[i] = self.sequence_nr(flow);
        }
        stats
    }
}

impl std::fmt::Debug for NetChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetChannel")
            .field("name", &self.name())
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    struct FakeChannel {
        vtable: *const usize,
        base_latency: f32,
    }

    unsafe fn channel<'a>(this: *mut c_void) -> &'a FakeChannel {
        &*(this as *const FakeChannel)
    }

    unsafe extern "C" fn name(_: *mut c_void) -> *const c_char {
        c"CLIENT".as_ptr()
    }

    unsafe extern "C" fn address(_: *mut c_void) -> *const c_char {
        c"192.0.2.10:27015".as_ptr()
    }

    unsafe extern "C" fn time(_: *mut c_void) -> f32 {
        12.5
    }

    unsafe extern "C" fn no(_: *mut c_void) -> bool {
        false
    }

    unsafe extern "C" fn latency(this: *mut c_void, flow: i32) -> f32 {
        channel(this).base_latency * (flow + 1) as f32
    }

    unsafe extern "C" fn loss(_: *mut c_void, flow: i32) -> f32 {
        if flow == 1 {
            0.25
        } else {
            0.0
        }
    }

    unsafe extern "C" fn total(_: *mut c_void, flow: i32) -> i32 {
        1000 + flow
    }

    fn vtable() -> Vec<usize> {
        let mut vt = vec![0usize; 17];
        vt[0] = name as usize;
        vt[1] = address as usize;
        vt[2] = time as usize;
        vt[3] = time as usize;
        vt[6] = no as usize;
        vt[7] = no as usize;
        vt[9] = latency as usize;
        vt[10] = latency as usize;
        vt[11] = loss as usize;
        vt[15] = total as usize;
        vt[16] = total as usize;
        vt
    }

    #[test]
    fn test_channel_queries() {
        let vt = vtable();
        let mut fake = FakeChannel {
            vtable: vt.as_ptr(),
            base_latency: 0.05,
        };
        let chan = unsafe {
            NetChannel::from_ptr(&mut fake as *mut FakeChannel as *mut INetChannelInfo)
        }
        .unwrap();

        assert_eq!(chan.name(), "CLIENT");
        assert_eq!(chan.address(), "192.0.2.10:27015");
        assert_eq!(chan.time(), 12.5);
        assert!(!chan.is_loopback());
        assert!(!chan.is_timing_out());
        assert_eq!(chan.latency(NetChannelFlow::Outgoing), 0.05);
        assert_eq!(chan.latency(NetChannelFlow::Incoming), 0.1);
        assert_eq!(chan.total_data(NetChannelFlow::Incoming), 1001);
    }

    #[test]
    fn test_stats_snapshot() {
        let vt = vtable();
        let mut fake = FakeChannel {
            vtable: vt.as_ptr(),
            base_latency: 0.5,
        };
        let chan = unsafe {
            NetChannel::from_ptr(&mut fake as *mut FakeChannel as *mut INetChannelInfo)
        }
        .unwrap();

        let stats = chan.stats();
        assert_eq!(stats.latency, [0.5, 1.0]);
        assert_eq!(stats.avg_latency, [0.5, 1.0]);
        assert_eq!(stats.avg_loss, [0.0, 0.25]);
        // empty slots fall back to zero
        assert_eq!(stats.avg_choke, [0.0, 0.0]);
        assert_eq!(stats.avg_data, [0.0, 0.0]);
        assert_eq!(stats.total_data, [1000, 1001]);
        assert_eq!(stats.sequence_nr, [1000, 1001]);
        assert_eq!(stats.round_trip(), 1.5);
    }

    #[test]
    fn test_null_channel() {
        assert!(unsafe { NetChannel::from_ptr(std::ptr::null_mut()) }.is_none());
    }
}
