//! `C_BaseEntity` wrapper
//!
//! A client entity is a C++ object with several vtables: `IClientUnknown`
//! at the start, `IClientRenderable` one pointer in and
//! `IClientNetworkable` two pointers in. Netprops are read at offsets from
//! the start of the object.

use std::ffi::{c_void, CStr};
use std::marker::PhantomData;

use tf2rust_macros::NetClass;
use tf2rust_sdk::{ClientClass, Matrix3x4, QAngle, TFTeam, Vector3};

use super::handle::BaseHandle;
use crate::recvprop::NetClass;
use crate::thunk::{vfunc_index, MemberFuncThunk, MemberVFuncThunk};

/// Default byte offset of the `IClientRenderable` subobject
pub const RENDERABLE_OFFSET: usize = 8;

/// Default byte offset of the `IClientNetworkable` subobject
pub const NETWORKABLE_OFFSET: usize = 16;

type GetVectorFn = unsafe extern "C" fn(this: *mut c_void) -> *const Vector3;
type GetAnglesFn = unsafe extern "C" fn(this: *mut c_void) -> *const QAngle;
type GetClientClassFn = unsafe extern "C" fn(this: *mut c_void) -> *mut ClientClass;
type IsDormantFn = unsafe extern "C" fn(this: *mut c_void) -> bool;
type EntIndexFn = unsafe extern "C" fn(this: *mut c_void) -> i32;
type GetModelFn = unsafe extern "C" fn(this: *mut c_void) -> *const c_void;
type SetupBonesFn = unsafe extern "C" fn(
    this: *mut c_void,
    bone_to_world: *mut Matrix3x4,
    max_bones: i32,
    bone_mask: i32,
    current_time: f32,
) -> bool;

/// CBoneCache* C_BaseAnimating::GetBoneCache(CStudioHdr*)
pub type GetBoneCacheFn =
    unsafe extern "C" fn(this: *mut c_void, studio_hdr: *mut c_void) -> *mut c_void;

static GET_ABS_ORIGIN: MemberVFuncThunk<GetVectorFn> =
    MemberVFuncThunk::new("C_BaseEntity::GetAbsOrigin", 9);
static GET_ABS_ANGLES: MemberVFuncThunk<GetAnglesFn> =
    MemberVFuncThunk::new("C_BaseEntity::GetAbsAngles", 10);

static GET_MODEL: MemberVFuncThunk<GetModelFn> =
    MemberVFuncThunk::new("IClientRenderable::GetModel", 9);
static SETUP_BONES: MemberVFuncThunk<SetupBonesFn> =
    MemberVFuncThunk::new("IClientRenderable::SetupBones", 16);

static GET_CLIENT_CLASS: MemberVFuncThunk<GetClientClassFn> =
    MemberVFuncThunk::new("IClientNetworkable::GetClientClass", 2);
static IS_DORMANT: MemberVFuncThunk<IsDormantFn> =
    MemberVFuncThunk::new("IClientNetworkable::IsDormant", 8);
static ENT_INDEX: MemberVFuncThunk<EntIndexFn> =
    MemberVFuncThunk::new("IClientNetworkable::entindex", 9);

static GET_BONE_CACHE: MemberFuncThunk<GetBoneCacheFn> =
    MemberFuncThunk::new("C_BaseAnimating::GetBoneCache");

/// Wrapper for `C_BaseEntity`
#[derive(NetClass)]
#[netclass(table = "DT_BaseEntity")]
pub struct BaseEntity {
    ptr: *mut c_void,

    #[netprop(prop = "m_iTeamNum")]
    _team: PhantomData<i32>,

    #[netprop(prop = "m_vecOrigin")]
    _origin: PhantomData<Vector3>,

    #[netprop(prop = "m_fFlags")]
    _entity_flags: PhantomData<i32>,

    #[netprop(prop = "m_nModelIndex")]
    _model_index: PhantomData<i32>,

    #[netprop(prop = "m_hOwnerEntity", readonly)]
    _owner: PhantomData<BaseHandle>,

    #[netprop(prop = "m_flSimulationTime", readonly)]
    _simulation_time: PhantomData<f32>,
}

impl BaseEntity {
    fn renderable(&self) -> *mut c_void {
        let offset = vfunc_index("C_BaseEntity::RenderableOffset", RENDERABLE_OFFSET);
        unsafe { self.ptr.byte_add(offset) }
    }

    fn networkable(&self) -> *mut c_void {
        let offset = vfunc_index("C_BaseEntity::NetworkableOffset", NETWORKABLE_OFFSET);
        unsafe { self.ptr.byte_add(offset) }
    }

    /// Team as an enum; None for values outside the TF2 teams
    pub fn tf_team(&self) -> Option<TFTeam> {
        TFTeam::try_from(self.try_team()?).ok()
    }

    /// World-space origin (`GetAbsOrigin`)
    pub fn abs_origin(&self) -> Option<Vector3> {
        unsafe {
            let func = GET_ABS_ORIGIN.get(self.ptr)?;
            let origin = func(self.ptr);
            (!origin.is_null()).then(|| *origin)
        }
    }

    /// World-space angles (`GetAbsAngles`)
    pub fn abs_angles(&self) -> Option<QAngle> {
        unsafe {
            let func = GET_ABS_ANGLES.get(self.ptr)?;
            let angles = func(self.ptr);
            (!angles.is_null()).then(|| *angles)
        }
    }

    /// Networked class of this entity
    pub fn client_class(&self) -> Option<&ClientClass> {
        let networkable = self.networkable();
        unsafe {
            let func = GET_CLIENT_CLASS.get(networkable)?;
            func(networkable).as_ref()
        }
    }

    /// Network class name, e.g. `CTFPlayer`
    pub fn class_name(&self) -> Option<String> {
        let class = self.client_class()?;
        unsafe { class.name().map(str::to_string) }
    }

    /// Runtime class id
    pub fn class_id(&self) -> Option<i32> {
        self.client_class().map(|c| c.class_id)
    }

    /// True if the entity is outside the client's PVS
    pub fn is_dormant(&self) -> bool {
        let networkable = self.networkable();
        unsafe {
            match IS_DORMANT.get(networkable) {
                Some(func) => func(networkable),
                None => true,
            }
        }
    }

    /// Entity index, or -1
    pub fn index(&self) -> i32 {
        let networkable = self.networkable();
        unsafe {
            match ENT_INDEX.get(networkable) {
                Some(func) => func(networkable),
                None => -1,
            }
        }
    }

    /// `model_t*` of the entity, for `ModelInfo`
    pub fn model(&self) -> Option<*const c_void> {
        let renderable = self.renderable();
        unsafe {
            let func = GET_MODEL.get(renderable)?;
            let model = func(renderable);
            (!model.is_null()).then_some(model)
        }
    }

    /// Fill `bones` with bone-to-world transforms
    ///
    /// `bone_mask` takes `BONE_USED_BY_*` bits. Returns false if the
    /// engine refused or the slot is unavailable.
    pub fn setup_bones(&self, bones: &mut [Matrix3x4], bone_mask: i32, current_time: f32) -> bool {
        let renderable = self.renderable();
        let max_bones = bones.len().min(i32::MAX as usize) as i32;
        unsafe {
            match SETUP_BONES.get(renderable) {
                Some(func) => func(renderable, bones.as_mut_ptr(), max_bones, bone_mask, current_time),
                None => false,
            }
        }
    }

    /// Bone cache of an animating entity (`C_BaseAnimating::GetBoneCache`)
    ///
    /// # Safety
    /// The entity must be a `C_BaseAnimating`, and `studio_hdr` null or its
    /// `CStudioHdr`.
    pub unsafe fn bone_cache(&self, studio_hdr: *mut c_void) -> Option<*mut c_void> {
        let func = GET_BONE_CACHE.get()?;
        let cache = func(self.ptr, studio_hdr);
        (!cache.is_null()).then_some(cache)
    }

    /// Reinterpret as another entity wrapper
    ///
    /// # Safety
    /// The entity must actually be of type `T`.
    pub unsafe fn cast<T: NetClass>(&self) -> Option<T> {
        T::from_ptr(self.ptr)
    }
}

/// Name of a client class, usable on a raw class pointer
///
/// # Safety
/// `class` must be null or a valid ClientClass.
pub unsafe fn client_class_name(class: *const ClientClass) -> Option<String> {
    let class = class.as_ref()?;
    if class.network_name.is_null() {
        return None;
    }
    Some(CStr::from_ptr(class.network_name).to_string_lossy().into_owned())
}
