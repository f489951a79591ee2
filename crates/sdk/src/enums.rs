//! Engine and TF2 game enums
//!
//! Values are fixed by the game binaries. `TryFrom<i32>` returns the raw
//! value back as the error when it is out of range.

macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),*
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $(v if v == $value => Ok(Self::$variant),)*
                    other => Err(other),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> i32 {
                value as i32
            }
        }
    };
}

raw_enum! {
    /// `ClientFrameStage_t`, passed to `IBaseClientDLL::FrameStageNotify`
    pub enum ClientFrameStage {
        Undefined = -1,
        Start = 0,
        NetUpdateStart = 1,
        NetUpdatePostDataUpdateStart = 2,
        NetUpdatePostDataUpdateEnd = 3,
        NetUpdateEnd = 4,
        RenderStart = 5,
        RenderEnd = 6,
    }
}

raw_enum! {
    /// Player class (`m_iClass`)
    pub enum TFClass {
        Undefined = 0,
        Scout = 1,
        Sniper = 2,
        Soldier = 3,
        Demoman = 4,
        Medic = 5,
        Heavy = 6,
        Pyro = 7,
        Spy = 8,
        Engineer = 9,
    }
}

raw_enum! {
    /// Team number (`m_iTeamNum`)
    pub enum TFTeam {
        Unassigned = 0,
        Spectator = 1,
        Red = 2,
        Blue = 3,
    }
}

raw_enum! {
    /// `m_lifeState`
    pub enum LifeState {
        Alive = 0,
        Dying = 1,
        Dead = 2,
        Respawnable = 3,
        DiscardBody = 4,
    }
}

raw_enum! {
    /// `MoveType_t`
    pub enum MoveType {
        None = 0,
        Isometric = 1,
        Walk = 2,
        Step = 3,
        Fly = 4,
        FlyGravity = 5,
        VPhysics = 6,
        Push = 7,
        Noclip = 8,
        Ladder = 9,
        Observer = 10,
        Custom = 11,
    }
}

raw_enum! {
    /// Teleporter `m_iState`
    pub enum TeleporterState {
        Building = 0,
        Idle = 1,
        Ready = 2,
        Sending = 3,
        Receiving = 4,
        ReceivingRelease = 5,
        Recharging = 6,
        Upgrading = 7,
    }
}

raw_enum! {
    /// Sentry gun `m_iState`
    pub enum SentryGunState {
        Inactive = 0,
        Searching = 1,
        Attacking = 2,
        Upgrading = 3,
    }
}

raw_enum! {
    /// Building type (`m_iObjectType`)
    pub enum ObjectType {
        Dispenser = 0,
        Teleporter = 1,
        Sentrygun = 2,
        AttachmentSapper = 3,
    }
}

raw_enum! {
    /// Return value of plugin callbacks (`PLUGIN_RESULT`)
    pub enum PluginResult {
        Continue = 0,
        Override = 1,
        Stop = 2,
    }
}

impl TFClass {
    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Scout => "scout",
            Self::Sniper => "sniper",
            Self::Soldier => "soldier",
            Self::Demoman => "demoman",
            Self::Medic => "medic",
            Self::Heavy => "heavy",
            Self::Pyro => "pyro",
            Self::Spy => "spy",
            Self::Engineer => "engineer",
        }
    }
}

impl TFTeam {
    /// Red or Blue
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Red | Self::Blue)
    }
}

/// Player `m_fFlags` bits
pub mod player_flags {
    pub const FL_ONGROUND: i32 = 1 << 0;
    pub const FL_DUCKING: i32 = 1 << 1;
    pub const FL_WATERJUMP: i32 = 1 << 2;
    pub const FL_ONTRAIN: i32 = 1 << 3;
    pub const FL_INRAIN: i32 = 1 << 4;
    pub const FL_FROZEN: i32 = 1 << 5;
    pub const FL_ATCONTROLS: i32 = 1 << 6;
    pub const FL_CLIENT: i32 = 1 << 7;
    pub const FL_FAKECLIENT: i32 = 1 << 8;
    pub const FL_INWATER: i32 = 1 << 9;
}
