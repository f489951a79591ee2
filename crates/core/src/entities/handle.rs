//! Entity handle types for safe entity references
//!
//! Entities are referenced via `CBaseHandle`, a 32-bit value combining an
//! entity-list slot with a serial number. The serial number changes when an
//! entity is deleted and a new one takes its slot, so stale handles fail to
//! resolve.
//!
//! # Handle Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           u32 raw value                          │
//! ├─────────────────────────────┬───────────────────────────────────┤
//! │    Serial Number (20 bits)  │       Entry Index (12 bits)       │
//! │         bits 12-31          │           bits 0-11               │
//! └─────────────────────────────┴───────────────────────────────────┘
//! ```
//!
//! - Invalid handle: 0xFFFFFFFF (all bits set)

use std::ffi::c_void;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::recvprop::NetClass;

/// Edict index bits
pub const MAX_EDICT_BITS: u32 = 11;

/// Maximum number of networked edicts
pub const MAX_EDICTS: u32 = 1 << MAX_EDICT_BITS;

/// Entity-list entry bits (networked plus non-networked entities)
pub const NUM_ENT_ENTRY_BITS: u32 = MAX_EDICT_BITS + 1;

/// Number of entity-list entries
pub const NUM_ENT_ENTRIES: u32 = 1 << NUM_ENT_ENTRY_BITS;

/// Mask for the entry index
pub const ENT_ENTRY_MASK: u32 = NUM_ENT_ENTRIES - 1;

/// Shift of the serial number
pub const NUM_SERIAL_NUM_SHIFT_BITS: u32 = NUM_ENT_ENTRY_BITS;

/// Invalid handle sentinel value
pub const INVALID_EHANDLE_INDEX: u32 = 0xFFFFFFFF;

/// Untyped entity handle (`CBaseHandle`)
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaseHandle(u32);

impl BaseHandle {
    #[inline]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Build a handle from an entry index and serial number
    #[inline]
    pub const fn new(index: u32, serial: u32) -> Self {
        Self((index & ENT_ENTRY_MASK) | (serial << NUM_SERIAL_NUM_SHIFT_BITS))
    }

    #[inline]
    pub const fn invalid() -> Self {
        Self(INVALID_EHANDLE_INDEX)
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Entry index (lower 12 bits)
    #[inline]
    pub const fn index(&self) -> u32 {
        self.0 & ENT_ENTRY_MASK
    }

    /// Serial number (upper 20 bits)
    #[inline]
    pub const fn serial(&self) -> u32 {
        self.0 >> NUM_SERIAL_NUM_SHIFT_BITS
    }

    /// Check if this handle is not the invalid sentinel
    ///
    /// Note: A "valid" handle may still fail to resolve if the entity
    /// was deleted or the serial number doesn't match.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != INVALID_EHANDLE_INDEX
    }

    /// Entity pointer through the client entity list
    pub fn get_ptr(&self) -> Option<*mut c_void> {
        if !self.is_valid() {
            return None;
        }
        super::entity_list::get_client_entity_from_handle(*self)
    }
}

impl Default for BaseHandle {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Debug for BaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "BaseHandle(index={}, serial={})", self.index(), self.serial())
        } else {
            write!(f, "BaseHandle(invalid)")
        }
    }
}

impl fmt::Display for BaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}", self.index(), self.serial())
        } else {
            write!(f, "invalid")
        }
    }
}

/// A type-safe handle to an entity (`CHandle<T>`)
///
/// # Example
///
/// ```ignore
/// let owner: Handle<TFPlayer> = building.builder();
/// if let Some(player) = owner.get() {
///     println!("Builder health: {}", player.health());
/// }
/// ```
#[repr(transparent)]
pub struct Handle<T> {
    base: BaseHandle,
    _marker: PhantomData<T>,
}

impl<T> Handle<T> {
    #[inline]
    pub const fn from_raw(value: u32) -> Self {
        Self {
            base: BaseHandle::from_raw(value),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn invalid() -> Self {
        Self::from_raw(INVALID_EHANDLE_INDEX)
    }

    #[inline]
    pub const fn raw(&self) -> u32 {
        self.base.raw()
    }

    #[inline]
    pub const fn base(&self) -> BaseHandle {
        self.base
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.base.index()
    }

    #[inline]
    pub const fn serial(&self) -> u32 {
        self.base.serial()
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.base.is_valid()
    }

    /// Reinterpret as a handle to another entity type
    #[inline]
    pub const fn cast<U>(self) -> Handle<U> {
        Handle::from_raw(self.raw())
    }

    /// Entity pointer, without type construction
    pub fn get_ptr(&self) -> Option<*mut c_void> {
        self.base.get_ptr()
    }
}

impl<T: NetClass> Handle<T> {
    /// Resolve the handle to an entity
    ///
    /// Returns `None` if the handle is invalid, the entity list is not
    /// available, or the entity no longer exists.
    pub fn get(&self) -> Option<T> {
        let ptr = self.get_ptr()?;
        // SAFETY: the entity list matched index and serial
        unsafe { T::from_ptr(ptr) }
    }
}

impl<T> From<BaseHandle> for Handle<T> {
    fn from(base: BaseHandle) -> Self {
        Self::from_raw(base.raw())
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Handle(index={}, serial={})", self.index(), self.serial())
        } else {
            write!(f, "Handle(invalid)")
        }
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.base, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(NUM_ENT_ENTRY_BITS, 12);
        assert_eq!(ENT_ENTRY_MASK, 0xFFF);
        assert_eq!(NUM_ENT_ENTRIES, 4096);
    }

    #[test]
    fn test_index_serial_split() {
        let handle = BaseHandle::from_raw(0x0003_4005);
        assert_eq!(handle.index(), 0x005);
        assert_eq!(handle.serial(), 0x34);

        let built = BaseHandle::new(5, 0x34);
        assert_eq!(built, handle);
    }

    #[test]
    fn test_index_is_masked() {
        let handle = BaseHandle::new(0x1FFF, 1);
        assert_eq!(handle.index(), 0xFFF);
        assert_eq!(handle.serial(), 1);
    }

    #[test]
    fn test_validity() {
        assert!(BaseHandle::from_raw(0).is_valid());
        assert!(BaseHandle::new(ENT_ENTRY_MASK, 7).is_valid());
        assert!(!BaseHandle::invalid().is_valid());
        assert!(!BaseHandle::default().is_valid());
        assert!(BaseHandle::invalid().get_ptr().is_none());
    }

    #[test]
    fn test_display_debug() {
        let handle: Handle<()> = Handle::from_raw(0x0000_3001);
        assert_eq!(format!("{}", handle), "1:3");
        assert!(format!("{:?}", handle).contains("serial=3"));

        let invalid: Handle<()> = Handle::invalid();
        assert_eq!(format!("{}", invalid), "invalid");
    }

    #[test]
    fn test_typed_handle() {
        let handle: Handle<i32> = Handle::from(BaseHandle::new(42, 9));
        let casted: Handle<u64> = handle.cast();
        assert_eq!(casted.raw(), handle.raw());
        assert_eq!(casted.index(), 42);
        assert_eq!(handle, handle.clone());
        assert_eq!(std::mem::size_of::<Handle<i32>>(), 4);
    }
}
