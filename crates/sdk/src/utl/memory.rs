//! `CUtlMemory` layout mirror

use std::marker::PhantomData;
use std::ptr;

/// `m_nGrowSize` marker for memory the container does not own
pub const EXTERNAL_BUFFER_MARKER: i32 = -1;

/// `m_nGrowSize` marker for read-only memory the container does not own
pub const EXTERNAL_CONST_BUFFER_MARKER: i32 = -2;

/// Raw allocation backing every tier1 container
///
/// Fields are private: a `UtlMemory` is either empty, aliased from engine
/// memory (which already required `unsafe`), or built with the unsafe
/// `from_external*` constructors. Every accessor relies on that.
#[repr(C)]
pub struct UtlMemory<T> {
    memory: *mut T,
    allocation_count: i32,
    grow_size: i32,
    _marker: PhantomData<T>,
}

impl<T> UtlMemory<T> {
    /// Empty memory (no allocation)
    pub const fn new() -> Self {
        Self {
            memory: ptr::null_mut(),
            allocation_count: 0,
            grow_size: 0,
            _marker: PhantomData,
        }
    }

    /// Wrap a writable buffer owned by someone else
    ///
    /// # Safety
    /// `memory` must be valid for reads and writes of `count` elements for as
    /// long as this value (or any container built on it) is used.
    pub unsafe fn from_external(memory: *mut T, count: usize) -> Self {
        Self {
            memory,
            allocation_count: count as i32,
            grow_size: EXTERNAL_BUFFER_MARKER,
            _marker: PhantomData,
        }
    }

    /// Wrap a read-only buffer owned by someone else
    ///
    /// # Safety
    /// `memory` must be valid for reads of `count` elements for as long as
    /// this value is used.
    pub unsafe fn from_external_const(memory: *const T, count: usize) -> Self {
        Self {
            memory: memory as *mut T,
            allocation_count: count as i32,
            grow_size: EXTERNAL_CONST_BUFFER_MARKER,
            _marker: PhantomData,
        }
    }

    /// Base pointer
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.memory
    }

    /// Number of allocated elements
    #[inline]
    pub fn count(&self) -> usize {
        self.allocation_count.max(0) as usize
    }

    /// Growth policy value (`m_nGrowSize`)
    #[inline]
    pub fn grow_size(&self) -> i32 {
        self.grow_size
    }

    /// Memory is not owned by the container
    #[inline]
    pub fn is_externally_allocated(&self) -> bool {
        self.grow_size < 0
    }

    /// Memory was supplied as a const buffer
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.grow_size == EXTERNAL_CONST_BUFFER_MARKER
    }

    /// Is index in the allocated range
    #[inline]
    pub fn is_idx_valid(&self, index: usize) -> bool {
        index < self.count()
    }

    /// Element at `index`, `None` if out of range
    pub fn get(&self, index: usize) -> Option<&T> {
        if self.memory.is_null() || !self.is_idx_valid(index) {
            return None;
        }
        unsafe { Some(&*self.memory.add(index)) }
    }

    /// Mutable element at `index`, `None` if out of range or read-only
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if self.memory.is_null() || self.is_read_only() || !self.is_idx_valid(index) {
            return None;
        }
        unsafe { Some(&mut *self.memory.add(index)) }
    }

    /// The whole allocation as a slice
    pub fn as_slice(&self) -> &[T] {
        if self.memory.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.memory, self.count()) }
    }
}

impl<T> Default for UtlMemory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for UtlMemory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtlMemory")
            .field("memory", &self.memory)
            .field("allocation_count", &self.allocation_count)
            .field("grow_size", &self.grow_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<UtlMemory<u32>>(), 16);
    }

    #[test]
    fn test_external_memory() {
        let mut backing = [1u32, 2, 3];
        let mut mem = unsafe { UtlMemory::from_external(backing.as_mut_ptr(), backing.len()) };

        assert!(mem.is_externally_allocated());
        assert!(!mem.is_read_only());
        assert_eq!(mem.count(), 3);
        assert_eq!(mem.get(2), Some(&3));
        assert_eq!(mem.get(3), None);

        *mem.get_mut(0).unwrap() = 10;
        assert_eq!(mem.as_slice(), &[10, 2, 3]);
    }

    #[test]
    fn test_const_memory_is_read_only() {
        let backing = [1u8, 2];
        let mut mem = unsafe { UtlMemory::from_external_const(backing.as_ptr(), 2) };
        assert!(mem.is_read_only());
        assert!(mem.get_mut(0).is_none());
        assert_eq!(mem.get(1), Some(&2));
    }

    #[test]
    fn test_empty() {
        let mem: UtlMemory<u64> = UtlMemory::new();
        assert_eq!(mem.count(), 0);
        assert!(mem.as_slice().is_empty());
        assert!(mem.get(0).is_none());
    }
}
