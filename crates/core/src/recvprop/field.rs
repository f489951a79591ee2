//! Type-safe networked prop accessor
//!
//! A `RecvPropField<T>` lazily resolves a prop offset from the client's
//! RecvTables and provides read/write access to entity memory.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::sync::OnceLock;

use super::system::{get_offset, RecvPropError};

/// Resolve `table.prop` into `slot`, or return the cached value
///
/// Failures are not cached. Used by `#[derive(NetClass)]` accessors.
pub fn resolve_slot(
    slot: &OnceLock<i32>,
    table: &str,
    prop: &str,
) -> Result<i32, RecvPropError> {
    if let Some(&offset) = slot.get() {
        return Ok(offset);
    }

    let resolved = get_offset(table, prop)?.offset;

    // May race with another thread; both resolve to the same value
    Ok(*slot.get_or_init(|| resolved))
}

/// A lazily-resolved networked prop accessor
///
/// The offset is resolved on first access and cached in a `OnceLock` for
/// lock-free subsequent access.
///
/// # Example
///
/// ```ignore
/// static HEALTH: RecvPropField<i32> = RecvPropField::new("DT_BasePlayer", "m_iHealth");
///
/// unsafe {
///     let hp = HEALTH.get(entity_ptr);
///     HEALTH.set(entity_ptr, hp + 10);
/// }
/// ```
pub struct RecvPropField<T: Copy> {
    table: &'static str,
    prop: &'static str,
    offset: OnceLock<i32>,
    _marker: PhantomData<T>,
}

impl<T: Copy> RecvPropField<T> {
    /// Create a new accessor; nothing is resolved until first use
    pub const fn new(table: &'static str, prop: &'static str) -> Self {
        Self {
            table,
            prop,
            offset: OnceLock::new(),
            _marker: PhantomData,
        }
    }

    /// Create an accessor with a known offset
    pub fn with_offset(table: &'static str, prop: &'static str, offset: i32) -> Self {
        let field = Self::new(table, prop);
        let _ = field.offset.set(offset);
        field
    }

    /// Resolve the prop offset (cached after first call)
    pub fn resolve(&self) -> Result<i32, RecvPropError> {
        resolve_slot(&self.offset, self.table, self.prop)
    }

    /// Get the prop offset
    ///
    /// # Panics
    /// Panics if the prop cannot be resolved.
    pub fn offset(&self) -> i32 {
        match self.resolve() {
            Ok(offset) => offset,
            Err(e) => panic!("Failed to resolve {}.{}: {}", self.table, self.prop, e),
        }
    }

    /// Try to get the prop offset without panicking
    pub fn try_offset(&self) -> Option<i32> {
        self.resolve().ok()
    }

    /// Read the prop from an entity pointer
    ///
    /// # Safety
    /// - `base` must be a valid pointer to an entity that has this prop
    /// - `T` must match the prop's in-memory type
    #[inline]
    pub unsafe fn get(&self, base: *const c_void) -> T {
        debug_assert!(!base.is_null(), "Null entity pointer");
        let ptr = base.byte_add(self.offset() as usize) as *const T;
        ptr.read_unaligned()
    }

    /// Write the prop
    ///
    /// # Safety
    /// Same requirements as `get()`
    #[inline]
    pub unsafe fn set(&self, base: *mut c_void, value: T) {
        debug_assert!(!base.is_null(), "Null entity pointer");
        let ptr = base.byte_add(self.offset() as usize) as *mut T;
        ptr.write_unaligned(value);
    }

    /// Read the prop, returning None if the pointer is null or the offset
    /// cannot be resolved
    ///
    /// # Safety
    /// Same requirements as `get()`
    pub unsafe fn try_get(&self, base: *const c_void) -> Option<T> {
        if base.is_null() {
            return None;
        }
        let offset = self.resolve().ok()?;
        let ptr = base.byte_add(offset as usize) as *const T;
        Some(ptr.read_unaligned())
    }

    /// Write the prop, returning success status
    ///
    /// # Safety
    /// Same requirements as `set()`
    pub unsafe fn try_set(&self, base: *mut c_void, value: T) -> bool {
        if base.is_null() {
            return false;
        }
        match self.resolve() {
            Ok(offset) => {
                let ptr = base.byte_add(offset as usize) as *mut T;
                ptr.write_unaligned(value);
                true
            }
            Err(_) => false,
        }
    }

    /// Mutable reference to the prop
    ///
    /// # Safety
    /// - Same requirements as `get()`, and the field must be aligned for `T`
    /// - No other code may access the prop while the reference is held
    #[inline]
    pub unsafe fn get_mut<'a>(&self, base: *mut c_void) -> &'a mut T {
        debug_assert!(!base.is_null(), "Null entity pointer");
        &mut *(base.byte_add(self.offset() as usize) as *mut T)
    }

    pub const fn table(&self) -> &'static str {
        self.table
    }

    pub const fn prop(&self) -> &'static str {
        self.prop
    }

    pub fn is_resolved(&self) -> bool {
        self.offset.get().is_some()
    }
}

// SAFETY: only 'static strings and a OnceLock<i32>; T is never stored
unsafe impl<T: Copy> Send for RecvPropField<T> {}
unsafe impl<T: Copy> Sync for RecvPropField<T> {}
