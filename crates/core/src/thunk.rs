//! Typed function-pointer thunks for calling engine code
//!
//! A [`MemberFuncThunk`] names a GameData signature and resolves to a
//! non-virtual function on first use. A [`MemberVFuncThunk`] names a vtable
//! slot (GameData offset key plus a built-in default) and is resolved per
//! object, since every object carries its own vtable pointer.
//!
//! Member functions take `this` as their first argument, so a thunk type
//! looks like `unsafe extern "C" fn(*mut c_void, i32) -> f32`.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::sync::OnceLock;

use crate::gamedata::gamedata;
use crate::sdk_manager::try_sdk;

/// A raw function pointer type that can be built from an address
pub trait FnPtr: Copy + Send + Sync + 'static {
    /// # Safety
    /// `addr` must be the entry point of a function with this signature.
    unsafe fn from_addr(addr: usize) -> Self;

    fn addr(self) -> usize;
}

macro_rules! impl_fn_ptr {
    ($($arg:ident),*) => {
        impl<R: 'static, $($arg: 'static),*> FnPtr for unsafe extern "C" fn($($arg),*) -> R {
            #[inline]
            unsafe fn from_addr(addr: usize) -> Self {
                std::mem::transmute_copy::<usize, Self>(&addr)
            }

            #[inline]
            fn addr(self) -> usize {
                self as usize
            }
        }
    };
}

impl_fn_ptr!();
impl_fn_ptr!(A0);
impl_fn_ptr!(A0, A1);
impl_fn_ptr!(A0, A1, A2);
impl_fn_ptr!(A0, A1, A2, A3);
impl_fn_ptr!(A0, A1, A2, A3, A4);
impl_fn_ptr!(A0, A1, A2, A3, A4, A5);
impl_fn_ptr!(A0, A1, A2, A3, A4, A5, A6);
impl_fn_ptr!(A0, A1, A2, A3, A4, A5, A6, A7);

/// Vtable index for `key`, GameData first, then `default`
pub fn vfunc_index(key: &str, default: usize) -> usize {
    gamedata()
        .and_then(|gd| gd.get_offset(key).ok())
        .and_then(|o| usize::try_from(o).ok())
        .unwrap_or(default)
}

/// Read slot `index` of the vtable of `this`; 0 if the vtable pointer is null
///
/// # Safety
/// `this` must point at an object whose first word is null or a vtable
/// pointer with more than `index` entries.
#[inline]
pub unsafe fn vtable_entry(this: *const c_void, index: usize) -> usize {
    let vtable = *(this as *const *const usize);
    if vtable.is_null() {
        return 0;
    }
    *vtable.add(index)
}

/// Non-virtual engine function located by signature
pub struct MemberFuncThunk<F: FnPtr> {
    name: &'static str,
    address: OnceLock<usize>,
    _marker: PhantomData<F>,
}

impl<F: FnPtr> MemberFuncThunk<F> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            address: OnceLock::new(),
            _marker: PhantomData,
        }
    }

    /// GameData signature name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Function pointer, resolving through the SDK manager on first use
    ///
    /// Returns `None` while the signature is unresolved; a later call tries
    /// again.
    pub fn get(&self) -> Option<F> {
        if let Some(&addr) = self.address.get() {
            return Some(unsafe { F::from_addr(addr) });
        }

        let addr = try_sdk()?.address(self.name)?;
        let addr = *self.address.get_or_init(|| addr);
        tracing::trace!("Thunk {} resolved to {:#x}", self.name, addr);
        Some(unsafe { F::from_addr(addr) })
    }

    /// Bind to a known address; false if already resolved
    ///
    /// # Safety
    /// `addr` must be a function with signature `F`.
    pub unsafe fn bind(&self, addr: usize) -> bool {
        self.address.set(addr).is_ok()
    }

    pub fn is_resolved(&self) -> bool {
        self.address.get().is_some()
    }
}

/// Virtual engine function located by vtable slot
pub struct MemberVFuncThunk<F: FnPtr> {
    key: &'static str,
    default_index: usize,
    _marker: PhantomData<F>,
}

impl<F: FnPtr> MemberVFuncThunk<F> {
    pub const fn new(key: &'static str, default_index: usize) -> Self {
        Self {
            key,
            default_index,
            _marker: PhantomData,
        }
    }

    /// GameData offset key
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Effective vtable index
    pub fn index(&self) -> usize {
        vfunc_index(self.key, self.default_index)
    }

    /// Function in the vtable of `this`
    ///
    /// # Safety
    /// `this` must be null or an object of the interface this thunk
    /// describes.
    pub unsafe fn get(&self, this: *const c_void) -> Option<F> {
        if this.is_null() {
            return None;
        }
        let addr = vtable_entry(this, self.index());
        (addr != 0).then(|| F::from_addr(addr))
    }
}
