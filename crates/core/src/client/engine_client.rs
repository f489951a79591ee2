//! `IVEngineClient` wrapper
//!
//! VTable indices can be configured via gamedata under
//! `IVEngineClient::<Method>` keys.

use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr::NonNull;

use tf2rust_engine::try_engine;
use tf2rust_sdk::{IVEngineClient, PlayerInfo, QAngle, VMatrix};

use super::netchannel::NetChannel;
use crate::thunk::MemberVFuncThunk;

type GetScreenSizeFn = unsafe extern "C" fn(this: *mut c_void, width: *mut i32, height: *mut i32);
type GetPlayerInfoFn =
    unsafe extern "C" fn(this: *mut c_void, index: i32, info: *mut PlayerInfo) -> bool;
type IntArgFn = unsafe extern "C" fn(this: *mut c_void, value: i32) -> i32;
type GetIntFn = unsafe extern "C" fn(this: *mut c_void) -> i32;
type GetBoolFn = unsafe extern "C" fn(this: *mut c_void) -> bool;
type AnglesFn = unsafe extern "C" fn(this: *mut c_void, angles: *mut QAngle);
type WorldToScreenMatrixFn = unsafe extern "C" fn(this: *mut c_void) -> *const VMatrix;
type GetStringFn = unsafe extern "C" fn(this: *mut c_void) -> *const c_char;
type GetNetChannelInfoFn = unsafe extern "C" fn(this: *mut c_void) -> *mut c_void;
type ClientCmdFn = unsafe extern "C" fn(this: *mut c_void, command: *const c_char);

static GET_SCREEN_SIZE: MemberVFuncThunk<GetScreenSizeFn> =
    MemberVFuncThunk::new("IVEngineClient::GetScreenSize", 5);
static GET_PLAYER_INFO: MemberVFuncThunk<GetPlayerInfoFn> =
    MemberVFuncThunk::new("IVEngineClient::GetPlayerInfo", 8);
static GET_PLAYER_FOR_USER_ID: MemberVFuncThunk<IntArgFn> =
    MemberVFuncThunk::new("IVEngineClient::GetPlayerForUserID", 9);
static GET_LOCAL_PLAYER: MemberVFuncThunk<GetIntFn> =
    MemberVFuncThunk::new("IVEngineClient::GetLocalPlayer", 12);
static GET_VIEW_ANGLES: MemberVFuncThunk<AnglesFn> =
    MemberVFuncThunk::new("IVEngineClient::GetViewAngles", 19);
static SET_VIEW_ANGLES: MemberVFuncThunk<AnglesFn> =
    MemberVFuncThunk::new("IVEngineClient::SetViewAngles", 20);
static GET_MAX_CLIENTS: MemberVFuncThunk<GetIntFn> =
    MemberVFuncThunk::new("IVEngineClient::GetMaxClients", 21);
static IS_IN_GAME: MemberVFuncThunk<GetBoolFn> =
    MemberVFuncThunk::new("IVEngineClient::IsInGame", 26);
static IS_CONNECTED: MemberVFuncThunk<GetBoolFn> =
    MemberVFuncThunk::new("IVEngineClient::IsConnected", 27);
static WORLD_TO_SCREEN_MATRIX: MemberVFuncThunk<WorldToScreenMatrixFn> =
    MemberVFuncThunk::new("IVEngineClient::WorldToScreenMatrix", 36);
static GET_LEVEL_NAME: MemberVFuncThunk<GetStringFn> =
    MemberVFuncThunk::new("IVEngineClient::GetLevelName", 51);
static GET_NET_CHANNEL_INFO: MemberVFuncThunk<GetNetChannelInfoFn> =
    MemberVFuncThunk::new("IVEngineClient::GetNetChannelInfo", 72);
static CLIENT_CMD_UNRESTRICTED: MemberVFuncThunk<ClientCmdFn> =
    MemberVFuncThunk::new("IVEngineClient::ClientCmd_Unrestricted", 106);

/// Wrapper for the client engine interface
///
/// # Example
/// ```ignore
/// if let Some(engine) = EngineClient::get() {
///     if engine.is_in_game() {
///         let (w, h) = engine.screen_size();
///         tracing::info!("{} at {}x{}", engine.level_name(), w, h);
///     }
/// }
/// ```
#[derive(Clone, Copy)]
pub struct EngineClient {
    ptr: NonNull<IVEngineClient>,
}

// SAFETY: engine interfaces live for the whole process
unsafe impl Send for EngineClient {}
unsafe impl Sync for EngineClient {}

impl EngineClient {
    /// The engine's `IVEngineClient`, once interfaces are loaded
    pub fn get() -> Option<Self> {
        try_engine().map(|e| Self {
            ptr: e.engine_client,
        })
    }

    /// # Safety
    /// `ptr` must be null or a valid `IVEngineClient`.
    pub unsafe fn from_ptr(ptr: *mut IVEngineClient) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    #[inline]
    fn this(&self) -> *mut c_void {
        self.ptr.as_ptr() as *mut c_void
    }

    /// Screen width and height in pixels
    pub fn screen_size(&self) -> (i32, i32) {
        let (mut width, mut height) = (0, 0);
        unsafe {
            if let Some(func) = GET_SCREEN_SIZE.get(self.this()) {
                func(self.this(), &mut width, &mut height);
            }
        }
        (width, height)
    }

    /// Player info for an entity index; None for empty slots
    pub fn player_info(&self, index: i32) -> Option<PlayerInfo> {
        let mut info = PlayerInfo::zeroed();
        unsafe {
            let func = GET_PLAYER_INFO.get(self.this())?;
            func(self.this(), index, &mut info).then_some(info)
        }
    }

    /// Entity index for a user id (as used in game events)
    pub fn player_for_user_id(&self, user_id: i32) -> i32 {
        unsafe {
            match GET_PLAYER_FOR_USER_ID.get(self.this()) {
                Some(func) => func(self.this(), user_id),
                None => 0,
            }
        }
    }

    /// Entity index of the local player
    pub fn local_player(&self) -> i32 {
        self.call_int(&GET_LOCAL_PLAYER, 0)
    }

    pub fn view_angles(&self) -> QAngle {
        let mut angles = QAngle::default();
        unsafe {
            if let Some(func) = GET_VIEW_ANGLES.get(self.this()) {
                func(self.this(), &mut angles);
            }
        }
        angles
    }

    pub fn set_view_angles(&self, angles: &QAngle) {
        let mut angles = *angles;
        unsafe {
            if let Some(func) = SET_VIEW_ANGLES.get(self.this()) {
                func(self.this(), &mut angles);
            }
        }
    }

    pub fn max_clients(&self) -> i32 {
        self.call_int(&GET_MAX_CLIENTS, 0)
    }

    pub fn is_in_game(&self) -> bool {
        self.call_bool(&IS_IN_GAME)
    }

    pub fn is_connected(&self) -> bool {
        self.call_bool(&IS_CONNECTED)
    }

    /// Current view-projection matrix
    pub fn world_to_screen_matrix(&self) -> Option<VMatrix> {
        unsafe {
            let func = WORLD_TO_SCREEN_MATRIX.get(self.this())?;
            func(self.this()).as_ref().copied()
        }
    }

    /// Map path, e.g. `maps/cp_badlands.bsp`; empty when not in a level
    pub fn level_name(&self) -> String {
        unsafe {
            let Some(func) = GET_LEVEL_NAME.get(self.this()) else {
                return String::new();
            };
            let name = func(self.this());
            if name.is_null() {
                String::new()
            } else {
                CStr::from_ptr(name).to_string_lossy().into_owned()
            }
        }
    }

    /// Channel to the server, while connected
    pub fn net_channel_info(&self) -> Option<NetChannel> {
        unsafe {
            let func = GET_NET_CHANNEL_INFO.get(self.this())?;
            NetChannel::from_ptr(func(self.this()) as *mut _)
        }
    }

    /// Run a console command, bypassing `FCVAR_CLIENTCMD_CAN_EXECUTE`
    ///
    /// Returns false if the command contains a NUL byte or the slot is
    /// unavailable.
    pub fn client_cmd_unrestricted(&self, command: &str) -> bool {
        let Ok(command) = CString::new(command) else {
            return false;
        };
        unsafe {
            match CLIENT_CMD_UNRESTRICTED.get(self.this()) {
                Some(func) => {
                    func(self.this(), command.as_ptr());
                    true
                }
                None => false,
            }
        }
    }

    fn call_int(&self, thunk: &MemberVFuncThunk<GetIntFn>, default: i32) -> i32 {
        unsafe {
            match thunk.get(self.this()) {
                Some(func) => func(self.this()),
                None => default,
            }
        }
    }

    fn call_bool(&self, thunk: &MemberVFuncThunk<GetBoolFn>) -> bool {
        unsafe {
            match thunk.get(self.this()) {
                Some(func) => func(self.this()),
                None => false,
            }
        }
    }
}
