//! Physics object access (`IPhysicsObject`)
//!
//! `IPhysicsObject` starts with a virtual destructor, which takes one
//! vtable slot under MSVC and two under the Itanium ABI.

use std::ffi::c_void;
use std::ptr::NonNull;

use tf2rust_sdk::{IPhysicsObject, QAngle, Vector3};

use crate::thunk::MemberVFuncThunk;

#[cfg(target_os = "windows")]
const DTOR_SLOTS: usize = 1;
#[cfg(not(target_os = "windows"))]
const DTOR_SLOTS: usize = 2;

type GetBoolFn = unsafe extern "C" fn(this: *mut c_void) -> bool;
type GetFloatFn = unsafe extern "C" fn(this: *mut c_void) -> f32;
type GetPositionFn =
    unsafe extern "C" fn(this: *mut c_void, position: *mut Vector3, angles: *mut QAngle);

static IS_STATIC: MemberVFuncThunk<GetBoolFn> =
    MemberVFuncThunk::new("IPhysicsObject::IsStatic", DTOR_SLOTS);
static IS_ASLEEP: MemberVFuncThunk<GetBoolFn> =
    MemberVFuncThunk::new("IPhysicsObject::IsAsleep", DTOR_SLOTS + 1);
static GET_MASS: MemberVFuncThunk<GetFloatFn> =
    MemberVFuncThunk::new("IPhysicsObject::GetMass", DTOR_SLOTS + 28);
static GET_POSITION: MemberVFuncThunk<GetPositionFn> =
    MemberVFuncThunk::new("IPhysicsObject::GetPosition", DTOR_SLOTS + 46);

/// Wrapper for a physics object
#[derive(Clone, Copy)]
pub struct PhysicsObject {
    ptr: NonNull<IPhysicsObject>,
}

impl PhysicsObject {
    /// # Safety
    /// `ptr` must be null or a valid `IPhysicsObject`.
    pub unsafe fn from_ptr(ptr: *mut IPhysicsObject) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    #[inline]
    fn this(&self) -> *mut c_void {
        self.ptr.as_ptr() as *mut c_void
    }

    /// Mass in kilograms
    pub fn mass(&self) -> f32 {
        unsafe { GET_MASS.get(self.this()).map_or(0.0, |func| func(self.this())) }
    }

    pub fn is_static(&self) -> bool {
        unsafe { IS_STATIC.get(self.this()).is_some_and(|func| func(self.this())) }
    }

    pub fn is_asleep(&self) -> bool {
        unsafe { IS_ASLEEP.get(self.this()).is_some_and(|func| func(self.this())) }
    }

    /// World position and orientation
    pub fn position(&self) -> Option<(Vector3, QAngle)> {
        let mut position = Vector3::zero();
        let mut angles = QAngle::default();
        unsafe {
            let func = GET_POSITION.get(self.this())?;
            func(self.this(), &mut position, &mut angles);
        }
        Some((position, angles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn is_static(_: *mut c_void) -> bool {
        true
    }

    unsafe extern "C" fn mass(_: *mut c_void) -> f32 {
        85.0
    }

    unsafe extern "C" fn position(_: *mut c_void, pos: *mut Vector3, ang: *mut QAngle) {
        *pos = Vector3::new(1.0, 2.0, 3.0);
        *ang = QAngle::new(0.0, 90.0, 0.0);
    }

    #[test]
    fn test_physics_object() {
        let mut vt = vec![0usize; DTOR_SLOTS + 47];
        vt[DTOR_SLOTS] = is_static as usize;
        vt[DTOR_SLOTS + 28] = mass as usize;
        vt[DTOR_SLOTS + 46] = position as usize;
        let mut object = vt.as_ptr();
        let physics = unsafe {
            PhysicsObject::from_ptr(&mut object as *mut *const usize as *mut IPhysicsObject)
        }
        .unwrap();

        assert!(physics.is_static());
        assert!(!physics.is_asleep());
        assert_eq!(physics.mass(), 85.0);
        assert_eq!(
            physics.position(),
            Some((Vector3::new(1.0, 2.0, 3.0), QAngle::new(0.0, 90.0, 0.0)))
        );
    }
}
