//! `CUtlLinkedList<T, unsigned short>` layout mirror
//!
//! Nodes live in one `UtlMemory` block and link to each other by `u16`
//! index. Free slots are chained through the same `next` field, so a walk
//! always starts from `head`.

use super::memory::UtlMemory;

/// Index type of the list
pub type ListIndex = u16;

/// Terminator / "no element" index
pub const INVALID_INDEX: ListIndex = 0xFFFF;

/// One list node (`UtlLinkedListElem_t`)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ListElem<T> {
    pub element: T,
    pub previous: ListIndex,
    pub next: ListIndex,
}

/// Index-linked list
#[repr(C)]
pub struct UtlLinkedList<T> {
    memory: UtlMemory<ListElem<T>>,
    head: ListIndex,
    tail: ListIndex,
    first_free: ListIndex,
    element_count: ListIndex,
    num_allocated: ListIndex,
    /// `CUtlMemory::Iterator_t` of the last allocation
    last_alloc: i32,
    elements: *mut ListElem<T>,
}

impl<T> UtlLinkedList<T> {
    /// Empty list
    pub const fn new() -> Self {
        Self {
            memory: UtlMemory::new(),
            head: INVALID_INDEX,
            tail: INVALID_INDEX,
            first_free: INVALID_INDEX,
            element_count: 0,
            num_allocated: 0,
            last_alloc: -1,
            elements: std::ptr::null_mut(),
        }
    }

    /// View nodes in caller-owned memory
    ///
    /// # Safety
    /// `nodes` must be valid for `capacity` elements for as long as the list
    /// is used, and `head`/`tail`/`count` must describe the links stored in
    /// those nodes.
    pub unsafe fn from_external(
        nodes: *mut ListElem<T>,
        capacity: usize,
        head: ListIndex,
        tail: ListIndex,
        count: usize,
    ) -> Self {
        Self {
            memory: UtlMemory::from_external(nodes, capacity),
            head,
            tail,
            first_free: INVALID_INDEX,
            element_count: count as ListIndex,
            num_allocated: capacity as ListIndex,
            last_alloc: -1,
            elements: nodes,
        }
    }

    /// Number of linked elements
    #[inline]
    pub fn len(&self) -> usize {
        self.element_count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// First index, `INVALID_INDEX` when empty
    #[inline]
    pub fn head(&self) -> ListIndex {
        self.head
    }

    /// Last index, `INVALID_INDEX` when empty
    #[inline]
    pub fn tail(&self) -> ListIndex {
        self.tail
    }

    /// Node at `index`
    pub fn node(&self, index: ListIndex) -> Option<&ListElem<T>> {
        if index == INVALID_INDEX {
            return None;
        }
        self.memory.get(index as usize)
    }

    /// Element stored at `index`
    pub fn element(&self, index: ListIndex) -> Option<&T> {
        self.node(index).map(|n| &n.element)
    }

    /// Index following `index`
    pub fn next(&self, index: ListIndex) -> ListIndex {
        self.node(index).map(|n| n.next).unwrap_or(INVALID_INDEX)
    }

    /// Index preceding `index`
    pub fn previous(&self, index: ListIndex) -> ListIndex {
        self.node(index).map(|n| n.previous).unwrap_or(INVALID_INDEX)
    }

    /// Iterate elements from head to tail
    ///
    /// The walk stops after `len()` steps even if the links form a cycle.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
            remaining: self.len(),
        }
    }
}

impl<T> Default for UtlLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a [`UtlLinkedList`]
pub struct Iter<'a, T> {
    list: &'a UtlLinkedList<T>,
    current: ListIndex,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.current)?;
        self.current = node.next;
        self.remaining -= 1;
        Some(&node.element)
    }
}

impl<'a, T> IntoIterator for &'a UtlLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(element: u32, previous: ListIndex, next: ListIndex) -> ListElem<u32> {
        ListElem {
            element,
            previous,
            next,
        }
    }

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::offset_of!(UtlLinkedList<u32>, last_alloc), 28);
        assert_eq!(std::mem::offset_of!(UtlLinkedList<u32>, elements), 32);
        assert_eq!(std::mem::size_of::<UtlLinkedList<u32>>(), 40);
        assert_eq!(std::mem::size_of::<ListElem<u32>>(), 8);
    }

    #[test]
    fn test_iteration_follows_links() {
        // Logical order: 2 -> 0 -> 3, slot 1 is free
        let mut nodes = [
            node(20, 2, 3),
            node(99, INVALID_INDEX, INVALID_INDEX),
            node(10, INVALID_INDEX, 0),
            node(30, 0, INVALID_INDEX),
        ];
        let list = unsafe { UtlLinkedList::from_external(nodes.as_mut_ptr(), 4, 2, 3, 3) };

        let values: Vec<u32> = list.iter().copied().collect();
        assert_eq!(values, vec![10, 20, 30]);
        assert_eq!(list.next(2), 0);
        assert_eq!(list.previous(3), 0);
        assert_eq!(list.element(list.tail()), Some(&30));
    }

    #[test]
    fn test_cycle_is_bounded() {
        let mut nodes = [node(1, 1, 1), node(2, 0, 0)];
        let list = unsafe { UtlLinkedList::from_external(nodes.as_mut_ptr(), 2, 0, 1, 2) };
        assert_eq!(list.iter().count(), 2);
    }

    #[test]
    fn test_empty_list() {
        let list: UtlLinkedList<u32> = UtlLinkedList::new();
        assert!(list.is_empty());
        assert_eq!(list.iter().next(), None);
        assert_eq!(list.next(INVALID_INDEX), INVALID_INDEX);
    }
}
