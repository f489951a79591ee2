//! ICvar and IConVar vtable method wrappers
//!
//! VTable indices can be configured via gamedata.

use std::ffi::{c_char, c_void, CString};

use tf2rust_sdk::convar::ConVar as RawConVar;
use tf2rust_sdk::ICvar;

use crate::thunk::MemberVFuncThunk;

/// Default vtable indices. `IConVar::SetValue` is overloaded, and the two
/// compilers lay the overloads out in opposite order.
#[cfg(not(target_os = "windows"))]
mod default_indices {
    /// ICvar::FindVar, after the IAppSystem base and registration methods
    pub const FIND_VAR: usize = 12;

    pub const SET_VALUE_STRING: usize = 0;
    pub const SET_VALUE_FLOAT: usize = 1;
    pub const SET_VALUE_INT: usize = 2;
}

#[cfg(target_os = "windows")]
mod default_indices {
    pub const FIND_VAR: usize = 12;

    pub const SET_VALUE_INT: usize = 0;
    pub const SET_VALUE_FLOAT: usize = 1;
    pub const SET_VALUE_STRING: usize = 2;
}

pub(crate) use default_indices::{SET_VALUE_FLOAT, SET_VALUE_INT, SET_VALUE_STRING};

/// ConVar* ICvar::FindVar(const char* name)
type FindVarFn = unsafe extern "C" fn(this: *mut c_void, name: *const c_char) -> *mut RawConVar;

/// void IConVar::SetValue(const char*)
pub(crate) type SetStringFn = unsafe extern "C" fn(this: *mut c_void, value: *const c_char);

/// void IConVar::SetValue(float)
pub(crate) type SetFloatFn = unsafe extern "C" fn(this: *mut c_void, value: f32);

/// void IConVar::SetValue(int)
pub(crate) type SetIntFn = unsafe extern "C" fn(this: *mut c_void, value: i32);

static FIND_VAR: MemberVFuncThunk<FindVarFn> =
    MemberVFuncThunk::new("ICvar::FindVar", default_indices::FIND_VAR);

static SET_STRING: MemberVFuncThunk<SetStringFn> =
    MemberVFuncThunk::new("IConVar::SetValue_String", SET_VALUE_STRING);

static SET_FLOAT: MemberVFuncThunk<SetFloatFn> =
    MemberVFuncThunk::new("IConVar::SetValue_Float", SET_VALUE_FLOAT);

static SET_INT: MemberVFuncThunk<SetIntFn> =
    MemberVFuncThunk::new("IConVar::SetValue_Int", SET_VALUE_INT);

/// Find a convar through an `ICvar` instance
///
/// Returns null if the name contains a NUL byte or the convar does not exist.
///
/// # Safety
/// `cvar` must be null or a valid `ICvar`.
pub unsafe fn find_var(cvar: *mut ICvar, name: &str) -> *mut RawConVar {
    let Ok(c_name) = CString::new(name) else {
        tracing::warn!("Invalid convar name: contains null byte");
        return std::ptr::null_mut();
    };

    match FIND_VAR.get(cvar as *const c_void) {
        Some(func) => func(cvar as *mut c_void, c_name.as_ptr()),
        None => std::ptr::null_mut(),
    }
}

/// `this` for `IConVar` calls on a convar
#[inline]
fn iconvar_this(convar: *mut RawConVar) -> *mut c_void {
    // SAFETY: offset stays inside the ConVar object
    unsafe { (convar as *mut u8).add(RawConVar::iconvar_offset()) as *mut c_void }
}

/// Call `IConVar::SetValue(const char*)`; false if the slot is empty
///
/// # Safety
/// `convar` must be a valid ConVar.
pub unsafe fn set_value_string(convar: *mut RawConVar, value: &str) -> bool {
    let Ok(c_value) = CString::new(value) else {
        return false;
    };
    let this = iconvar_this(convar);
    match SET_STRING.get(this) {
        Some(func) => {
            func(this, c_value.as_ptr());
            true
        }
        None => false,
    }
}

/// Call `IConVar::SetValue(float)`
///
/// # Safety
/// `convar` must be a valid ConVar.
pub unsafe fn set_value_float(convar: *mut RawConVar, value: f32) -> bool {
    let this = iconvar_this(convar);
    match SET_FLOAT.get(this) {
        Some(func) => {
            func(this, value);
            true
        }
        None => false,
    }
}

/// Call `IConVar::SetValue(int)`
///
/// # Safety
/// `convar` must be a valid ConVar.
pub unsafe fn set_value_int(convar: *mut RawConVar, value: i32) -> bool {
    let this = iconvar_this(convar);
    match SET_INT.get(this) {
        Some(func) => {
            func(this, value);
            true
        }
        None => false,
    }
}
