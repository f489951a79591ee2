//! Net channel flow constants (`inetchannelinfo.h`)

pub const FLOW_OUTGOING: i32 = 0;
pub const FLOW_INCOMING: i32 = 1;
pub const MAX_FLOWS: usize = 2;

/// Direction of traffic for per-flow statistics
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetChannelFlow {
    Outgoing = FLOW_OUTGOING,
    Incoming = FLOW_INCOMING,
}

impl NetChannelFlow {
    pub const ALL: [NetChannelFlow; MAX_FLOWS] = [Self::Outgoing, Self::Incoming];

    #[inline]
    pub fn raw(self) -> i32 {
        self as i32
    }
}

/// Traffic categories for `GetAvgData`-style queries on a single group
pub mod group {
    pub const GENERIC: i32 = 0;
    pub const LOCALPLAYER: i32 = 1;
    pub const OTHERPLAYERS: i32 = 2;
    pub const ENTITIES: i32 = 3;
    pub const SOUNDS: i32 = 4;
    pub const EVENTS: i32 = 5;
    pub const USERMESSAGES: i32 = 6;
    pub const ENTMESSAGES: i32 = 7;
    pub const VOICE: i32 = 8;
    pub const STRINGTABLE: i32 = 9;
    pub const MOVE: i32 = 10;
    pub const STRINGCMD: i32 = 11;
    pub const SIGNON: i32 = 12;
    pub const TOTAL: i32 = 13;
}
