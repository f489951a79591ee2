//! ConVar type definitions for the Source 1 engine
//!
//! Layout of `ConCommandBase` and `ConVar` from `tier1/convar.h` for the
//! 64-bit build. A `ConVar` multiply-inherits `ConCommandBase` and
//! `IConVar`, so it carries a second vtable pointer at `iconvar_vtable`.

use std::ffi::{c_char, c_void, CStr};

/// Base of both commands and variables
#[repr(C)]
pub struct ConCommandBase {
    /// ConCommandBase vtable
    pub vtable: *const *const c_void,

    /// Next entry in the registered list
    pub next: *mut ConCommandBase,

    /// Has been registered with ICvar
    pub registered: bool,

    /// Name (null-terminated C string)
    pub name: *const c_char,

    /// Help string
    pub help_string: *const c_char,

    /// FCVAR_* flags
    pub flags: i32,
}

/// Console variable
#[repr(C)]
pub struct ConVar {
    pub base: ConCommandBase,

    /// `IConVar` secondary vtable
    pub iconvar_vtable: *const *const c_void,

    /// Parent for aliased convars (points at self otherwise)
    pub parent: *mut ConVar,

    /// Default value as a string
    pub default_value: *const c_char,

    /// Current value as a string
    pub string: *mut c_char,
    pub string_length: i32,

    /// Current value as float
    pub float_value: f32,

    /// Current value as int
    pub int_value: i32,

    pub has_min: bool,
    pub min_value: f32,
    pub has_max: bool,
    pub max_value: f32,

    /// Global change callback
    pub change_callback: *const c_void,
}

impl ConVar {
    /// Name of the convar
    ///
    /// # Safety
    /// `base.name` must be null or a valid C string.
    pub unsafe fn name(&self) -> Option<&str> {
        if self.base.name.is_null() {
            None
        } else {
            CStr::from_ptr(self.base.name).to_str().ok()
        }
    }

    /// Byte offset of the `IConVar` subobject
    pub const fn iconvar_offset() -> usize {
        std::mem::offset_of!(ConVar, iconvar_vtable)
    }
}

// ConVar flag constants
pub mod flags {
    /// No flags
    pub const FCVAR_NONE: i32 = 0;
    /// Not yet registered
    pub const FCVAR_UNREGISTERED: i32 = 1 << 0;
    /// Hidden in released products
    pub const FCVAR_DEVELOPMENTONLY: i32 = 1 << 1;
    /// Defined by the game DLL
    pub const FCVAR_GAMEDLL: i32 = 1 << 2;
    /// Defined by the client DLL
    pub const FCVAR_CLIENTDLL: i32 = 1 << 3;
    /// Hidden from find/autocomplete
    pub const FCVAR_HIDDEN: i32 = 1 << 4;
    /// Protected (password-like)
    pub const FCVAR_PROTECTED: i32 = 1 << 5;
    /// Singleplayer only
    pub const FCVAR_SPONLY: i32 = 1 << 6;
    /// Saved to config
    pub const FCVAR_ARCHIVE: i32 = 1 << 7;
    /// Notify players when changed
    pub const FCVAR_NOTIFY: i32 = 1 << 8;
    /// Changes client info string
    pub const FCVAR_USERINFO: i32 = 1 << 9;
    /// Only printable characters allowed
    pub const FCVAR_PRINTABLEONLY: i32 = 1 << 10;
    /// Don't log changes
    pub const FCVAR_UNLOGGED: i32 = 1 << 11;
    /// Never try to print as a string
    pub const FCVAR_NEVER_AS_STRING: i32 = 1 << 12;
    /// Replicated to clients
    pub const FCVAR_REPLICATED: i32 = 1 << 13;
    /// Only with sv_cheats
    pub const FCVAR_CHEAT: i32 = 1 << 14;
    /// Split-screen per-user
    pub const FCVAR_SS: i32 = 1 << 15;
    /// Record in demo
    pub const FCVAR_DEMO: i32 = 1 << 16;
    /// Don't record in demo
    pub const FCVAR_DONTRECORD: i32 = 1 << 17;
    /// Reload materials when changed
    pub const FCVAR_RELOAD_MATERIALS: i32 = 1 << 20;
    /// Reload textures when changed
    pub const FCVAR_RELOAD_TEXTURES: i32 = 1 << 21;
    /// Cannot change when connected
    pub const FCVAR_NOT_CONNECTED: i32 = 1 << 22;
    /// Read from the material system thread
    pub const FCVAR_MATERIAL_SYSTEM_THREAD: i32 = 1 << 23;
    /// Saved on console
    pub const FCVAR_ARCHIVE_XBOX: i32 = 1 << 24;
    /// Usable from any thread
    pub const FCVAR_ACCESSIBLE_FROM_THREADS: i32 = 1 << 25;
    /// Server can execute on clients
    pub const FCVAR_SERVER_CAN_EXECUTE: i32 = 1 << 28;
    /// Server cannot query
    pub const FCVAR_SERVER_CANNOT_QUERY: i32 = 1 << 29;
    /// ClientCmd can execute
    pub const FCVAR_CLIENTCMD_CAN_EXECUTE: i32 = 1 << 30;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_concommandbase_layout() {
        assert_eq!(offset_of!(ConCommandBase, name), 24);
        assert_eq!(offset_of!(ConCommandBase, flags), 40);
        assert_eq!(size_of::<ConCommandBase>(), 48);
    }

    #[test]
    fn test_convar_layout() {
        assert_eq!(ConVar::iconvar_offset(), 48);
        assert_eq!(offset_of!(ConVar, parent), 56);
        assert_eq!(offset_of!(ConVar, string), 72);
        assert_eq!(offset_of!(ConVar, float_value), 84);
        assert_eq!(offset_of!(ConVar, int_value), 88);
        assert_eq!(offset_of!(ConVar, max_value), 104);
        assert_eq!(size_of::<ConVar>(), 120);
    }
}
