//! Studio model headers (`studio.h`)
//!
//! Sub-arrays of a studio header are addressed by byte offsets relative to
//! the struct that holds the offset. Only the leading header fields are
//! mirrored; the header is always used by pointer.

use std::ffi::{c_char, CStr};

use crate::math::{Matrix3x4, Vector3};

/// Maximum bones per model
pub const MAXSTUDIOBONES: usize = 128;

/// Bone usage flags
pub mod bone_flags {
    pub const BONE_PHYSICALLY_SIMULATED: i32 = 0x01;
    pub const BONE_PHYSICS_PROCEDURAL: i32 = 0x02;
    pub const BONE_ALWAYS_PROCEDURAL: i32 = 0x04;
    pub const BONE_SCREEN_ALIGN_SPHERE: i32 = 0x08;
    pub const BONE_SCREEN_ALIGN_CYLINDER: i32 = 0x10;
    pub const BONE_USED_BY_HITBOX: i32 = 0x100;
    pub const BONE_USED_BY_ATTACHMENT: i32 = 0x200;
    pub const BONE_USED_BY_VERTEX_MASK: i32 = 0x3FC00;
    pub const BONE_USED_BY_BONE_MERGE: i32 = 0x40000;
    pub const BONE_USED_BY_ANYTHING: i32 = 0x7FF00;
}

/// Hitbox groups
pub mod hitgroup {
    pub const GENERIC: i32 = 0;
    pub const HEAD: i32 = 1;
    pub const CHEST: i32 = 2;
    pub const STOMACH: i32 = 3;
    pub const LEFTARM: i32 = 4;
    pub const RIGHTARM: i32 = 5;
    pub const LEFTLEG: i32 = 6;
    pub const RIGHTLEG: i32 = 7;
    pub const GEAR: i32 = 10;
}

unsafe fn relative<T, U>(base: *const T, offset: i32) -> *const U {
    (base as *const u8).offset(offset as isize) as *const U
}

unsafe fn relative_name<'a, T>(base: *const T, offset: i32) -> Option<&'a str> {
    if offset == 0 {
        return None;
    }
    CStr::from_ptr(relative::<T, c_char>(base, offset)).to_str().ok()
}

/// `studiohdr_t` (leading fields)
#[repr(C)]
pub struct StudioHdr {
    pub id: i32,
    pub version: i32,
    pub checksum: i32,
    pub name: [c_char; 64],
    pub length: i32,
    pub eye_position: Vector3,
    pub illum_position: Vector3,
    pub hull_min: Vector3,
    pub hull_max: Vector3,
    pub view_bbmin: Vector3,
    pub view_bbmax: Vector3,
    pub flags: i32,
    pub num_bones: i32,
    pub bone_index: i32,
    pub num_bone_controllers: i32,
    pub bone_controller_index: i32,
    pub num_hitbox_sets: i32,
    pub hitbox_set_index: i32,
    pub num_local_anim: i32,
    pub local_anim_index: i32,
    pub num_local_seq: i32,
    pub local_seq_index: i32,
    pub activity_list_version: i32,
    pub events_indexed: i32,
    pub num_textures: i32,
    pub texture_index: i32,
}

impl StudioHdr {
    /// Model path stored in the header
    pub fn name(&self) -> String {
        let bytes: Vec<u8> = self
            .name
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Bone `index` (`pBone`)
    ///
    /// # Safety
    /// `self` must be a complete studio header in engine memory.
    pub unsafe fn bone(&self, index: usize) -> Option<&StudioBone> {
        if index >= self.num_bones.max(0) as usize {
            return None;
        }
        let first: *const StudioBone = relative(self, self.bone_index);
        Some(&*first.add(index))
    }

    /// Iterate all bones
    ///
    /// # Safety
    /// Same as [`StudioHdr::bone`].
    pub unsafe fn bones(&self) -> impl Iterator<Item = &StudioBone> + '_ {
        (0..self.num_bones.max(0) as usize).filter_map(move |i| self.bone(i))
    }

    /// Hitbox set `index` (`pHitboxSet`)
    ///
    /// # Safety
    /// `self` must be a complete studio header in engine memory.
    pub unsafe fn hitbox_set(&self, index: usize) -> Option<&StudioHitboxSet> {
        if index >= self.num_hitbox_sets.max(0) as usize {
            return None;
        }
        let first: *const StudioHitboxSet = relative(self, self.hitbox_set_index);
        Some(&*first.add(index))
    }

    /// Hitbox `index` of set `set` (`pHitbox`)
    ///
    /// # Safety
    /// `self` must be a complete studio header in engine memory.
    pub unsafe fn hitbox(&self, set: usize, index: usize) -> Option<&StudioBBox> {
        self.hitbox_set(set)?.hitbox(index)
    }
}

/// `mstudiobone_t`
#[repr(C)]
pub struct StudioBone {
    pub name_index: i32,
    pub parent: i32,
    pub bone_controller: [i32; 6],
    pub pos: Vector3,
    pub quat: [f32; 4],
    pub rot: Vector3,
    pub pos_scale: Vector3,
    pub rot_scale: Vector3,
    pub pose_to_bone: Matrix3x4,
    pub alignment: [f32; 4],
    pub flags: i32,
    pub proc_type: i32,
    pub proc_index: i32,
    pub physics_bone: i32,
    pub surface_prop_index: i32,
    pub contents: i32,
    _unused: [i32; 8],
}

impl StudioBone {
    /// Bone name (`pszName`)
    ///
    /// # Safety
    /// The bone must live inside a studio header.
    pub unsafe fn name(&self) -> Option<&str> {
        relative_name(self, self.name_index)
    }

    /// Parent bone index, `None` for the root
    pub fn parent(&self) -> Option<usize> {
        (self.parent >= 0).then_some(self.parent as usize)
    }

    /// Any of `mask` is set in `flags`
    pub fn has_flag(&self, mask: i32) -> bool {
        self.flags & mask != 0
    }
}

/// `mstudiohitboxset_t`
#[repr(C)]
pub struct StudioHitboxSet {
    pub name_index: i32,
    pub num_hitboxes: i32,
    pub hitbox_index: i32,
}

impl StudioHitboxSet {
    /// Set name
    ///
    /// # Safety
    /// The set must live inside a studio header.
    pub unsafe fn name(&self) -> Option<&str> {
        relative_name(self, self.name_index)
    }

    /// Hitbox `index`
    ///
    /// # Safety
    /// The set must live inside a studio header.
    pub unsafe fn hitbox(&self, index: usize) -> Option<&StudioBBox> {
        if index >= self.num_hitboxes.max(0) as usize {
            return None;
        }
        let first: *const StudioBBox = relative(self, self.hitbox_index);
        Some(&*first.add(index))
    }

    /// Iterate hitboxes of the set
    ///
    /// # Safety
    /// Same as [`StudioHitboxSet::hitbox`].
    pub unsafe fn hitboxes(&self) -> impl Iterator<Item = &StudioBBox> + '_ {
        (0..self.num_hitboxes.max(0) as usize).filter_map(move |i| self.hitbox(i))
    }
}

/// `mstudiobbox_t`
#[repr(C)]
pub struct StudioBBox {
    pub bone: i32,
    pub group: i32,
    pub bbmin: Vector3,
    pub bbmax: Vector3,
    pub name_index: i32,
    _unused: [i32; 8],
}

impl StudioBBox {
    /// Hitbox name, usually absent
    ///
    /// # Safety
    /// The box must live inside a studio header.
    pub unsafe fn name(&self) -> Option<&str> {
        relative_name(self, self.name_index)
    }

    /// Box centre in bone space
    pub fn center(&self) -> Vector3 {
        (self.bbmin + self.bbmax) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_layouts() {
        assert_eq!(offset_of!(StudioHdr, num_bones), 156);
        assert_eq!(offset_of!(StudioHdr, hitbox_set_index), 176);
        assert_eq!(offset_of!(StudioBone, pose_to_bone), 96);
        assert_eq!(offset_of!(StudioBone, flags), 160);
        assert_eq!(size_of::<StudioBone>(), 216);
        assert_eq!(size_of::<StudioHitboxSet>(), 12);
        assert_eq!(size_of::<StudioBBox>(), 68);
    }

    /// Lay out a tiny model: header, 2 bones, 1 hitbox set with 1 box, names.
    fn build_model() -> Vec<u64> {
        const HDR: usize = 0;
        const BONES: usize = 256;
        const SETS: usize = BONES + 2 * 216;
        const BOXES: usize = SETS + 16;
        const NAMES: usize = BOXES + 72;

        let mut storage = vec![0u64; (NAMES + 64) / 8];
        let base = storage.as_mut_ptr() as *mut u8;

        unsafe {
            let write_str = |at: usize, s: &[u8]| {
                std::ptr::copy_nonoverlapping(s.as_ptr(), base.add(at), s.len());
            };
            write_str(NAMES, b"head\0");
            write_str(NAMES + 8, b"pelvis\0");
            write_str(NAMES + 16, b"default\0");

            let hdr = &mut *(base.add(HDR) as *mut StudioHdr);
            write_str(HDR + offset_of!(StudioHdr, name), b"models/player/scout.mdl\0");
            hdr.num_bones = 2;
            hdr.bone_index = BONES as i32;
            hdr.num_hitbox_sets = 1;
            hdr.hitbox_set_index = SETS as i32;

            for i in 0..2 {
                let at = BONES + i * 216;
                let bone = &mut *(base.add(at) as *mut StudioBone);
                bone.name_index = (NAMES + i * 8) as i32 - at as i32;
                bone.parent = i as i32 - 1;
                bone.flags = bone_flags::BONE_USED_BY_HITBOX;
            }

            let set = &mut *(base.add(SETS) as *mut StudioHitboxSet);
            set.name_index = (NAMES + 16) as i32 - SETS as i32;
            set.num_hitboxes = 1;
            set.hitbox_index = (BOXES - SETS) as i32;

            let bbox = &mut *(base.add(BOXES) as *mut StudioBBox);
            bbox.bone = 0;
            bbox.group = hitgroup::HEAD;
            bbox.bbmin = Vector3::new(-2.0, -2.0, -2.0);
            bbox.bbmax = Vector3::new(2.0, 4.0, 6.0);
        }

        storage
    }

    #[test]
    fn test_relative_accessors() {
        let storage = build_model();
        let hdr = unsafe { &*(storage.as_ptr() as *const StudioHdr) };

        assert_eq!(hdr.name(), "models/player/scout.mdl");

        unsafe {
            let names: Vec<&str> = hdr.bones().filter_map(|b| b.name()).collect();
            assert_eq!(names, vec!["head", "pelvis"]);
            assert_eq!(hdr.bone(0).unwrap().parent(), None);
            assert_eq!(hdr.bone(1).unwrap().parent(), Some(0));
            assert!(hdr.bone(2).is_none());

            let set = hdr.hitbox_set(0).unwrap();
            assert_eq!(set.name(), Some("default"));

            let bbox = hdr.hitbox(0, 0).unwrap();
            assert_eq!(bbox.group, hitgroup::HEAD);
            assert_eq!(bbox.center(), Vector3::new(0.0, 1.0, 2.0));
            assert_eq!(bbox.name(), None);
            assert!(hdr.hitbox(0, 1).is_none());
            assert!(hdr.hitbox_set(1).is_none());
        }
    }
}
