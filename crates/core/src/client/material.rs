//! Material system wrappers (`IMaterialSystem`, `IMaterial`)

use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr::NonNull;

use bitflags::bitflags;
use tf2rust_engine::try_engine;
use tf2rust_sdk::{IMaterial, IMaterialSystem};

use crate::thunk::MemberVFuncThunk;

bitflags! {
    /// `MaterialVarFlags_t`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MaterialVarFlags: u32 {
        const DEBUG = 1 << 0;
        const NO_DEBUG_OVERRIDE = 1 << 1;
        const NO_DRAW = 1 << 2;
        const USE_IN_FILLRATE_MODE = 1 << 3;
        const VERTEXCOLOR = 1 << 4;
        const VERTEXALPHA = 1 << 5;
        const SELFILLUM = 1 << 6;
        const ADDITIVE = 1 << 7;
        const ALPHATEST = 1 << 8;
        const MULTIPASS = 1 << 9;
        const ZNEARER = 1 << 10;
        const MODEL = 1 << 11;
        const FLAT = 1 << 12;
        const NOCULL = 1 << 13;
        const NOFOG = 1 << 14;
        const IGNOREZ = 1 << 15;
        const DECAL = 1 << 16;
        const ENVMAPSPHERE = 1 << 17;
        const NOALPHAMOD = 1 << 18;
        const ENVMAPCAMERASPACE = 1 << 19;
        const BASEALPHAENVMAPMASK = 1 << 20;
        const TRANSLUCENT = 1 << 21;
        const NORMALMAPALPHAENVMAPMASK = 1 << 22;
        const NEEDS_SOFTWARE_SKINNING = 1 << 23;
        const OPAQUETEXTURE = 1 << 24;
        const ENVMAPMODE = 1 << 25;
        const SUPPRESS_DECALS = 1 << 26;
        const HALFLAMBERT = 1 << 27;
        const WIREFRAME = 1 << 28;
        const ALLOWALPHATOCOVERAGE = 1 << 29;
        const IGNORE_ALPHA_MODULATION = 1 << 30;
    }
}

/// Texture group names accepted by `find_material`
pub mod texture_group {
    pub const MODEL: &str = "Model textures";
    pub const WORLD: &str = "World textures";
    pub const OTHER: &str = "Other textures";
    pub const VGUI: &str = "VGUI textures";
}

type FindMaterialFn = unsafe extern "C" fn(
    this: *mut c_void,
    name: *const c_char,
    group: *const c_char,
    complain: bool,
    complain_prefix: *const c_char,
) -> *mut IMaterial;
type GetStringFn = unsafe extern "C" fn(this: *mut c_void) -> *const c_char;
type AlphaModulateFn = unsafe extern "C" fn(this: *mut c_void, alpha: f32);
type ColorModulateFn = unsafe extern "C" fn(this: *mut c_void, r: f32, g: f32, b: f32);
type SetVarFlagFn = unsafe extern "C" fn(this: *mut c_void, flag: u32, on: bool);
type GetVarFlagFn = unsafe extern "C" fn(this: *mut c_void, flag: u32) -> bool;

static FIND_MATERIAL: MemberVFuncThunk<FindMaterialFn> =
    MemberVFuncThunk::new("IMaterialSystem::FindMaterial", 73);

static GET_NAME: MemberVFuncThunk<GetStringFn> = MemberVFuncThunk::new("IMaterial::GetName", 0);
static GET_TEXTURE_GROUP_NAME: MemberVFuncThunk<GetStringFn> =
    MemberVFuncThunk::new("IMaterial::GetTextureGroupName", 1);
static ALPHA_MODULATE: MemberVFuncThunk<AlphaModulateFn> =
    MemberVFuncThunk::new("IMaterial::AlphaModulate", 27);
static COLOR_MODULATE: MemberVFuncThunk<ColorModulateFn> =
    MemberVFuncThunk::new("IMaterial::ColorModulate", 28);
static SET_MATERIAL_VAR_FLAG: MemberVFuncThunk<SetVarFlagFn> =
    MemberVFuncThunk::new("IMaterial::SetMaterialVarFlag", 29);
static GET_MATERIAL_VAR_FLAG: MemberVFuncThunk<GetVarFlagFn> =
    MemberVFuncThunk::new("IMaterial::GetMaterialVarFlag", 30);

/// Wrapper for the material system
#[derive(Clone, Copy)]
pub struct MaterialSystem {
    ptr: NonNull<IMaterialSystem>,
}

// SAFETY: engine interfaces live for the whole process
unsafe impl Send for MaterialSystem {}
unsafe impl Sync for MaterialSystem {}

impl MaterialSystem {
    /// None if the material system was not loaded
    pub fn get() -> Option<Self> {
        try_engine()?.material_system.map(|ptr| Self { ptr })
    }

    /// # Safety
    /// `ptr` must be null or a valid `IMaterialSystem`.
    pub unsafe fn from_ptr(ptr: *mut IMaterialSystem) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Look up a material by name within a texture group
    ///
    /// The engine returns its error material for unknown names; check
    /// `Material::name` if that matters.
    pub fn find_material(&self, name: &str, group: &str) -> Option<Material> {
        let name = CString::new(name).ok()?;
        let group = CString::new(group).ok()?;
        let this = self.ptr.as_ptr() as *mut c_void;
        unsafe {
            let func = FIND_MATERIAL.get(this)?;
            let material = func(this, name.as_ptr(), group.as_ptr(), false, std::ptr::null());
            Material::from_ptr(material)
        }
    }
}

/// Wrapper for a material
#[derive(Clone, Copy)]
pub struct Material {
    ptr: NonNull<IMaterial>,
}

unsafe impl Send for Material {}
unsafe impl Sync for Material {}

impl Material {
    /// # Safety
    /// `ptr` must be null or a valid `IMaterial`.
    pub unsafe fn from_ptr(ptr: *mut IMaterial) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    pub fn as_ptr(&self) -> *mut IMaterial {
        self.ptr.as_ptr()
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

    pub fn name(&self) -> String {
        self.call_string(&GET_NAME)
    }

    pub fn texture_group(&self) -> String {
        self.call_string(&GET_TEXTURE_GROUP_NAME)
    }

    /// Set the alpha multiplier, 0.0 to 1.0
    pub fn alpha_modulate(&self, alpha: f32) {
        unsafe {
            if let Some(func) = ALPHA_MODULATE.get(self.this()) {
                func(self.this(), alpha);
            }
        }
    }

    /// Set the colour multiplier, each channel 0.0 to 1.0
    pub fn color_modulate(&self, r: f32, g: f32, b: f32) {
        unsafe {
            if let Some(func) = COLOR_MODULATE.get(self.this()) {
                func(self.this(), r, g, b);
            }
        }
    }

    /// Turn material var flags on or off
    pub fn set_var_flag(&self, flags: MaterialVarFlags, on: bool) {
        unsafe {
            if let Some(func) = SET_MATERIAL_VAR_FLAG.get(self.this()) {
                func(self.this(), flags.bits(), on);
            }
        }
    }

    pub fn var_flag(&self, flag: MaterialVarFlags) -> bool {
        unsafe {
            GET_MATERIAL_VAR_FLAG
                .get(self.this())
                .is_some_and(|func| func(self.this(), flag.bits()))
        }
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name())
            .field("group", &self.texture_group())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    struct FakeMaterial {
        vtable: *const usize,
        flags: u32,
        alpha: f32,
        color: [f32; 3],
    }

    unsafe fn material<'a>(this: *mut c_void) -> &'a mut FakeMaterial {
        &mut *(this as *mut FakeMaterial)
    }

    unsafe extern "C" fn name(_: *mut c_void) -> *const c_char {
        c"debug/debugambientcube".as_ptr()
    }

    unsafe extern "C" fn group(_: *mut c_void) -> *const c_char {
        c"Model textures".as_ptr()
    }

    unsafe extern "C" fn alpha(this: *mut c_void, a: f32) {
        material(this).alpha = a;
    }

    unsafe extern "C" fn color(this: *mut c_void, r: f32, g: f32, b: f32) {
        material(this).color = [r, g, b];
    }

    unsafe extern "C" fn set_flag(this: *mut c_void, flag: u32, on: bool) {
        let m = material(this);
        if on {
            m.flags |= flag;
        } else {
            m.flags &= !flag;
        }
    }

    unsafe extern "C" fn get_flag(this: *mut c_void, flag: u32) -> bool {
        material(this).flags & flag != 0
    }

    #[repr(C)]
    struct FakeMaterialSystem {
        vtable: *const usize,
        material: *mut FakeMaterial,
    }

    unsafe extern "C" fn find_material(
        this: *mut c_void,
        name: *const c_char,
        _group: *const c_char,
        _complain: bool,
        _prefix: *const c_char,
    ) -> *mut IMaterial {
        if CStr::from_ptr(name).to_bytes() == b"debug/debugambientcube" {
            (*(this as *const FakeMaterialSystem)).material as *mut IMaterial
        } else {
            std::ptr::null_mut()
        }
    }

    #[test]
    fn test_material_calls() {
        let mut mat_vt = vec![0usize; 31];
        mat_vt[0] = name as usize;
        mat_vt[1] = group as usize;
        mat_vt[27] = alpha as usize;
        mat_vt[28] = color as usize;
        mat_vt[29] = set_flag as usize;
        mat_vt[30] = get_flag as usize;

        let mut fake_mat = FakeMaterial {
            vtable: mat_vt.as_ptr(),
            flags: 0,
            alpha: 1.0,
            color: [1.0; 3],
        };

        let mut sys_vt = vec![0usize; 74];
        sys_vt[73] = find_material as usize;
        let mut fake_sys = FakeMaterialSystem {
            vtable: sys_vt.as_ptr(),
            material: &mut fake_mat,
        };

        let system = unsafe {
            MaterialSystem::from_ptr(&mut fake_sys as *mut FakeMaterialSystem as *mut IMaterialSystem)
        }
        .unwrap();

        assert!(system.find_material("missing", texture_group::MODEL).is_none());
        let mat = system
            .find_material("debug/debugambientcube", texture_group::MODEL)
            .unwrap();

        assert_eq!(mat.name(), "debug/debugambientcube");
        assert_eq!(mat.texture_group(), "Model textures");

        mat.alpha_modulate(0.5);
        mat.color_modulate(1.0, 0.0, 0.25);
        mat.set_var_flag(MaterialVarFlags::IGNOREZ | MaterialVarFlags::NOFOG, true);
        assert!(mat.var_flag(MaterialVarFlags::IGNOREZ));
        mat.set_var_flag(MaterialVarFlags::NOFOG, false);
        assert!(!mat.var_flag(MaterialVarFlags::NOFOG));

        assert_eq!(fake_mat.alpha, 0.5);
        assert_eq!(fake_mat.color, [1.0, 0.0, 0.25]);
        assert_eq!(fake_mat.flags, MaterialVarFlags::IGNOREZ.bits());
    }

    #[test]
    fn test_flag_values() {
        assert_eq!(MaterialVarFlags::IGNOREZ.bits(), 0x8000);
        assert_eq!(MaterialVarFlags::WIREFRAME.bits(), 0x1000_0000);
        assert!(MaterialSystem::get().is_none());
    }
}
