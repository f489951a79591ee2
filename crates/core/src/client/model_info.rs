//! `IVModelInfoClient` wrapper
//!
//! Models are opaque `model_t*` handles; the studio header behind them
//! carries bones and hitboxes.

use std::ffi::{c_char, c_void, CStr, CString};
use std::ptr::NonNull;

use tf2rust_engine::try_engine;
use tf2rust_sdk::studio::{StudioBBox, StudioHdr, StudioHitboxSet};
use tf2rust_sdk::IVModelInfoClient;

use crate::thunk::MemberVFuncThunk;

/// Opaque `model_t`
pub type Model = c_void;

type GetModelIndexFn = unsafe extern "C" fn(this: *mut c_void, name: *const c_char) -> i32;
type GetModelNameFn = unsafe extern "C" fn(this: *mut c_void, model: *const Model) -> *const c_char;
type GetStudiomodelFn =
    unsafe extern "C" fn(this: *mut c_void, model: *const Model) -> *mut StudioHdr;

static GET_MODEL_INDEX: MemberVFuncThunk<GetModelIndexFn> =
    MemberVFuncThunk::new("IVModelInfoClient::GetModelIndex", 2);
static GET_MODEL_NAME: MemberVFuncThunk<GetModelNameFn> =
    MemberVFuncThunk::new("IVModelInfoClient::GetModelName", 3);
static GET_STUDIOMODEL: MemberVFuncThunk<GetStudiomodelFn> =
    MemberVFuncThunk::new("IVModelInfoClient::GetStudiomodel", 28);

/// Wrapper for the client model info interface
#[derive(Clone, Copy)]
pub struct ModelInfo {
    ptr: NonNull<IVModelInfoClient>,
}

// SAFETY: engine interfaces live for the whole process
unsafe impl Send for ModelInfo {}
unsafe impl Sync for ModelInfo {}

impl ModelInfo {
    pub fn get() -> Option<Self> {
        try_engine().map(|e| Self { ptr: e.model_info })
    }

    /// # Safety
    /// `ptr` must be null or a valid `IVModelInfoClient`.
    pub unsafe fn from_ptr(ptr: *mut IVModelInfoClient) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    #[inline]
    fn this(&self) -> *mut c_void {
        self.ptr.as_ptr() as *mut c_void
    }

    /// Model path, e.g. `models/player/engineer.mdl`
    ///
    /// # Safety
    /// `model` must be a `model_t` from the engine.
    pub unsafe fn model_name(&self, model: *const Model) -> Option<String> {
        if model.is_null() {
            return None;
        }
        let func = GET_MODEL_NAME.get(self.this())?;
        let name = func(self.this(), model);
        (!name.is_null()).then(|| CStr::from_ptr(name).to_string_lossy().into_owned())
    }

    /// Precache index of a model path, or -1
    pub fn model_index(&self, name: &str) -> i32 {
        let Ok(name) = CString::new(name) else {
            return -1;
        };
        unsafe {
            match GET_MODEL_INDEX.get(self.this()) {
                Some(func) => func(self.this(), name.as_ptr()),
                None => -1,
            }
        }
    }

    /// Studio header of a model
    ///
    /// # Safety
    /// `model` must be a `model_t` from the engine. The header lives as long
    /// as the model stays loaded.
    pub unsafe fn studio_model<'a>(&self, model: *const Model) -> Option<&'a StudioHdr> {
        if model.is_null() {
            return None;
        }
        let func = GET_STUDIOMODEL.get(self.this())?;
        func(self.this(), model).as_ref()
    }

    /// Hitbox set `set` of a model
    ///
    /// # Safety
    /// Same as [`ModelInfo::studio_model`].
    pub unsafe fn hitbox_set<'a>(
        &self,
        model: *const Model,
        set: usize,
    ) -> Option<&'a StudioHitboxSet> {
        self.studio_model(model)?.hitbox_set(set)
    }

    /// Hitbox `index` of set `set`
    ///
    /// # Safety
    /// Same as [`ModelInfo::studio_model`].
    pub unsafe fn hitbox<'a>(
        &self,
        model: *const Model,
        set: usize,
        index: usize,
    ) -> Option<&'a StudioBBox> {
        self.studio_model(model)?.hitbox(set, index)
    }

    /// Name of bone `bone`
    ///
    /// # Safety
    /// Same as [`ModelInfo::studio_model`].
    pub unsafe fn bone_name(&self, model: *const Model, bone: usize) -> Option<String> {
        let hdr = self.studio_model(model)?;
        hdr.bone(bone)?.name().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;
    use tf2rust_sdk::studio::StudioBone;

    const BONES: usize = 2;

    /// Studio header, two bones, one hitbox set with one box, then names
    fn build_studio() -> Vec<u64> {
        let hdr_size = size_of::<StudioHdr>();
        let bone_start = hdr_size.next_multiple_of(8);
        let set_start = bone_start + BONES * size_of::<StudioBone>();
        let box_start = set_start + size_of::<StudioHitboxSet>();
        let names_start = (box_start + size_of::<StudioBBox>()).next_multiple_of(8);
        let names: &[u8] = b"bip_pelvis\0bip_head\0default\0";
        let total = names_start + names.len();

        let mut buf = vec![0u64; total.div_ceil(8)];
        let base = buf.as_mut_ptr() as *mut u8;
        unsafe {
            let hdr = &mut *(base as *mut StudioHdr);
            hdr.num_bones = BONES as i32;
            hdr.bone_index = bone_start as i32;
            hdr.num_hitbox_sets = 1;
            hdr.hitbox_set_index = set_start as i32;

            let name_offsets = [names_start, names_start + 11];
            for (i, name_at) in name_offsets.iter().enumerate() {
                let bone_at = bone_start + i * size_of::<StudioBone>();
                let bone = &mut *(base.add(bone_at) as *mut StudioBone);
                bone.name_index = (name_at - bone_at) as i32;
                bone.parent = i as i32 - 1;
            }

            let set = &mut *(base.add(set_start) as *mut StudioHitboxSet);
            set.name_index = (names_start + 20 - set_start) as i32;
            set.num_hitboxes = 1;
            set.hitbox_index = (box_start - set_start) as i32;

            let bbox = &mut *(base.add(box_start) as *mut StudioBBox);
            bbox.bone = 1;

            std::ptr::copy_nonoverlapping(names.as_ptr(), base.add(names_start), names.len());
        }
        buf
    }

    #[repr(C)]
    struct FakeModelInfo {
        vtable: *const usize,
        studio: *mut StudioHdr,
    }

    unsafe extern "C" fn model_index(_: *mut c_void, name: *const c_char) -> i32 {
        if CStr::from_ptr(name).to_bytes() == b"models/player/engineer.mdl" {
            7
        } else {
            -1
        }
    }

    unsafe extern "C" fn model_name(_: *mut c_void, _: *const Model) -> *const c_char {
        c"models/player/engineer.mdl".as_ptr()
    }

    unsafe extern "C" fn studio_model(this: *mut c_void, _: *const Model) -> *mut StudioHdr {
        (*(this as *const FakeModelInfo)).studio
    }

    #[test]
    fn test_model_queries() {
        let mut studio = build_studio();
        let mut vt = vec![0usize; 29];
        vt[2] = model_index as usize;
        vt[3] = model_name as usize;
        vt[28] = studio_model as usize;

        let mut fake = FakeModelInfo {
            vtable: vt.as_ptr(),
            studio: studio.as_mut_ptr() as *mut StudioHdr,
        };
        let info = unsafe {
            ModelInfo::from_ptr(&mut fake as *mut FakeModelInfo as *mut IVModelInfoClient)
        }
        .unwrap();

        let model = 0x1000 as *const Model;
        unsafe {
            assert_eq!(info.model_name(model).as_deref(), Some("models/player/engineer.mdl"));
            assert!(info.model_name(std::ptr::null()).is_none());
            assert_eq!(info.studio_model(model).unwrap().num_bones, 2);
            assert_eq!(info.bone_name(model, 0).as_deref(), Some("bip_pelvis"));
            assert_eq!(info.bone_name(model, 1).as_deref(), Some("bip_head"));
            assert!(info.bone_name(model, 2).is_none());

            let set = info.hitbox_set(model, 0).unwrap();
            assert_eq!(set.name(), Some("default"));
            assert_eq!(info.hitbox(model, 0, 0).unwrap().bone, 1);
            assert!(info.hitbox_set(model, 1).is_none());
        }
        assert_eq!(info.model_index("models/player/engineer.mdl"), 7);
        assert_eq!(info.model_index("missing.mdl"), -1);
    }
}
