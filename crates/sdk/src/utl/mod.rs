//! tier1 container layout mirrors
//!
//! These are views, not allocators: memory belongs to the engine (or, for
//! the `from_external` constructors, to the caller). Nothing here grows,
//! frees or reallocates.

pub mod buffer;
pub mod linked_list;
pub mod memory;
pub mod vector;

pub use buffer::UtlBuffer;
pub use linked_list::{ListElem, ListIndex, UtlLinkedList, INVALID_INDEX};
pub use memory::{UtlMemory, EXTERNAL_BUFFER_MARKER, EXTERNAL_CONST_BUFFER_MARKER};
pub use vector::UtlVector;
