//! Networked prop offsets (RecvTables)
//!
//! The client describes every networked entity field in its RecvTables.
//! This module resolves field offsets by table and prop name at runtime,
//! the same data `#[derive(NetClass)]` builds its accessors on.
//!
//! # Usage
//!
//! ```ignore
//! use tf2rust_core::recvprop::{get_offset, RecvPropField};
//!
//! static HEALTH: RecvPropField<i32> = RecvPropField::new("DT_BasePlayer", "m_iHealth");
//!
//! unsafe {
//!     let hp = HEALTH.get(entity_ptr);
//! }
//!
//! let offset = get_offset("DT_BaseEntity", "m_vecOrigin")?;
//! ```

pub mod field;
pub mod hash;
pub mod system;

pub use field::{resolve_slot, RecvPropField};
pub use hash::{combined_hash, fnv1a_32};
pub use system::{
    cache_size, clear_cache, client_class_head, dump_table, find_in_table, find_table, get_offset,
    get_offset_from, prefetch_offsets, prefetch_offsets_from, PropOffset, RecvPropError,
};

/// Trait for types that wrap networked entities
///
/// Implemented by `#[derive(NetClass)]`.
pub trait NetClass: Sized {
    /// Raw pointer to the native object
    fn ptr(&self) -> *mut std::ffi::c_void;

    /// RecvTable the wrapper's props default to
    fn table_name(&self) -> &'static str;

    /// Check if the pointer is non-null
    fn is_valid(&self) -> bool;

    /// Create an instance from a raw pointer
    ///
    /// # Safety
    /// The pointer must be valid and point to an instance of this class.
    unsafe fn from_ptr(ptr: *mut std::ffi::c_void) -> Option<Self>;
}
