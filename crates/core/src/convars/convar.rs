//! Game ConVar access wrapper

use std::ffi::{c_char, CStr};
use std::ptr::NonNull;

use tf2rust_engine::try_engine;
use tf2rust_sdk::convar::{flags, ConVar as RawConVar};

use super::vtable::{find_var, set_value_float, set_value_int, set_value_string};

/// Wrapper for accessing game ConVars
///
/// Reads go straight to the convar's memory, following the `parent` link
/// of aliased convars. Writes go through the `IConVar::SetValue` overloads
/// so the engine runs its clamping and change callbacks.
///
/// # Example
/// ```ignore
/// use tf2rust_core::convars::ConVar;
///
/// if let Some(cheats) = ConVar::find("sv_cheats") {
///     if cheats.get_bool() {
///         tracing::warn!("Cheats are enabled!");
///     }
/// }
/// ```
#[derive(Clone, Copy)]
pub struct ConVar {
    ptr: NonNull<RawConVar>,
}

// SAFETY: convars live for the whole process; all access is through raw pointers
unsafe impl Send for ConVar {}
unsafe impl Sync for ConVar {}

impl ConVar {
    /// Find a ConVar by name
    ///
    /// Returns None if the engine is not initialized or the ConVar doesn't exist.
    pub fn find(name: &str) -> Option<Self> {
        let cvar = try_engine()?.cvar_ptr();
        // SAFETY: cvar comes from the engine's interface store
        unsafe { Self::from_ptr(find_var(cvar, name)) }
    }

    /// Wrap a raw convar pointer
    ///
    /// # Safety
    /// `ptr` must be null or point at a live ConVar.
    pub unsafe fn from_ptr(ptr: *mut RawConVar) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    pub fn as_ptr(&self) -> *mut RawConVar {
        self.ptr.as_ptr()
    }

    fn raw(&self) -> &RawConVar {
        unsafe { self.ptr.as_ref() }
    }

    /// The convar holding the value (self unless aliased)
    fn parent(&self) -> &RawConVar {
        let parent = self.raw().parent;
        if parent.is_null() {
            self.raw()
        } else {
            unsafe { &*parent }
        }
    }

    fn parent_mut(&self) -> *mut RawConVar {
        let parent = self.raw().parent;
        if parent.is_null() {
            self.ptr.as_ptr()
        } else {
            parent
        }
    }

    /// Get the ConVar name
    pub fn name(&self) -> &str {
        unsafe { cstr(self.raw().base.name) }
    }

    /// Get help text
    pub fn help_text(&self) -> &str {
        unsafe { cstr(self.parent().base.help_string) }
    }

    /// FCVAR_* flags
    pub fn flags(&self) -> i32 {
        self.parent().base.flags
    }

    pub fn is_flag_set(&self, flag: i32) -> bool {
        self.flags() & flag != 0
    }

    /// Add FCVAR_* flags
    pub fn add_flags(&self, flags: i32) {
        unsafe { (*self.parent_mut()).base.flags |= flags }
    }

    /// Remove FCVAR_* flags
    pub fn remove_flags(&self, flags: i32) {
        unsafe { (*self.parent_mut()).base.flags &= !flags }
    }

    // ==================== VALUE GETTERS ====================

    pub fn get_float(&self) -> f32 {
        self.parent().float_value
    }

    pub fn get_int(&self) -> i32 {
        self.parent().int_value
    }

    /// Nonzero int value
    pub fn get_bool(&self) -> bool {
        self.get_int() != 0
    }

    /// Get value as string
    ///
    /// Convars flagged `FCVAR_NEVER_AS_STRING` report the flag name, as the
    /// engine does.
    pub fn get_string(&self) -> String {
        if self.is_flag_set(flags::FCVAR_NEVER_AS_STRING) {
            return "FCVAR_NEVER_AS_STRING".to_string();
        }
        unsafe { cstr(self.parent().string).to_string() }
    }

    pub fn default_value(&self) -> &str {
        unsafe { cstr(self.parent().default_value) }
    }

    /// Lower bound, if the convar has one
    pub fn min(&self) -> Option<f32> {
        let parent = self.parent();
        parent.has_min.then_some(parent.min_value)
    }

    /// Upper bound, if the convar has one
    pub fn max(&self) -> Option<f32> {
        let parent = self.parent();
        parent.has_max.then_some(parent.max_value)
    }

    // ==================== VALUE SETTERS ====================
    //
    // Each returns false if the IConVar slot could not be called.

    pub fn set_string(&self, value: &str) -> bool {
        unsafe { set_value_string(self.ptr.as_ptr(), value) }
    }

    pub fn set_float(&self, value: f32) -> bool {
        unsafe { set_value_float(self.ptr.as_ptr(), value) }
    }

    pub fn set_int(&self, value: i32) -> bool {
        unsafe { set_value_int(self.ptr.as_ptr(), value) }
    }

    pub fn set_bool(&self, value: bool) -> bool {
        self.set_int(value as i32)
    }
}

unsafe fn cstr<'a>(ptr: *const c_char) -> &'a str {
    if ptr.is_null() {
        ""
    } else {
        CStr::from_ptr(ptr).to_str().unwrap_or("")
    }
}

impl std::fmt::Debug for ConVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConVar")
            .field("name", &self.name())
            .field("flags", &format_args!("0x{:x}", self.flags()))
            .field("value", &self.get_string())
            .finish()
    }
}

impl std::fmt::Display for ConVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name(), self.get_string())
    }
}
