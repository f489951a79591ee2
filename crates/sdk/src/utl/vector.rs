//! `CUtlVector` layout mirror

use super::memory::UtlMemory;

/// Growable array used throughout the engine
///
/// `elements` mirrors `m_pElements`, the debugger-visible copy of the
/// memory base pointer; it always equals `memory.as_ptr()`.
#[repr(C)]
pub struct UtlVector<T> {
    memory: UtlMemory<T>,
    size: i32,
    elements: *mut T,
}

impl<T> UtlVector<T> {
    /// Empty vector
    pub const fn new() -> Self {
        Self {
            memory: UtlMemory::new(),
            size: 0,
            elements: std::ptr::null_mut(),
        }
    }

    /// View `size` initialised elements of a `capacity`-element buffer
    ///
    /// # Safety
    /// `memory` must be valid for reads and writes of `capacity` elements and
    /// the first `size` of them must be initialised, for as long as the
    /// vector is used.
    pub unsafe fn from_external(memory: *mut T, capacity: usize, size: usize) -> Self {
        let size = size.min(capacity);
        Self {
            memory: UtlMemory::from_external(memory, capacity),
            size: size as i32,
            elements: memory,
        }
    }

    /// Number of elements (`Count()`)
    #[inline]
    pub fn len(&self) -> usize {
        (self.size.max(0) as usize).min(self.memory.count())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated element count
    #[inline]
    pub fn capacity(&self) -> usize {
        self.memory.count()
    }

    /// Backing memory
    #[inline]
    pub fn memory(&self) -> &UtlMemory<T> {
        &self.memory
    }

    /// Base pointer (`Base()`)
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.memory.as_ptr()
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        self.memory.get(index)
    }

    /// Mutable element at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        self.memory.get_mut(index)
    }

    /// Initialised elements as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.memory.as_slice()[..self.len()]
    }

    /// Iterate initialised elements
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Index of the first element equal to `value` (`Find()`)
    pub fn find(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|e| e == value)
    }

    /// Whether `m_pElements` agrees with the memory base
    pub fn is_consistent(&self) -> bool {
        self.elements == self.memory.as_ptr()
    }
}

impl<T> Default for UtlVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a UtlVector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for UtlVector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<UtlVector<u32>>(), 32);
    }

    #[test]
    fn test_size_vs_capacity() {
        let mut backing = [5i32, 6, 7, 0, 0];
        let vec = unsafe { UtlVector::from_external(backing.as_mut_ptr(), 5, 3) };

        assert_eq!(vec.len(), 3);
        assert_eq!(vec.capacity(), 5);
        assert_eq!(vec.as_slice(), &[5, 6, 7]);
        assert_eq!(vec.get(3), None);
        assert_eq!(vec.find(&7), Some(2));
        assert_eq!(vec.find(&0), None);
        assert!(vec.is_consistent());
    }

    #[test]
    fn test_size_clamped_to_capacity() {
        let mut backing = [1u8, 2];
        let vec = unsafe { UtlVector::from_external(backing.as_mut_ptr(), 2, 10) };
        assert_eq!(vec.len(), 2);
    }

    #[test]
    fn test_mutation_through_view() {
        let mut backing = [1u16, 2, 3];
        let mut vec = unsafe { UtlVector::from_external(backing.as_mut_ptr(), 3, 3) };
        *vec.get_mut(1).unwrap() = 20;
        let collected: Vec<u16> = vec.iter().copied().collect();
        assert_eq!(collected, vec![1, 20, 3]);
    }

    #[test]
    fn test_empty() {
        let vec: UtlVector<f32> = UtlVector::new();
        assert!(vec.is_empty());
        assert_eq!(format!("{:?}", vec), "[]");
    }
}
