//! Client entity list access
//!
//! Wraps `IClientEntityList`, the client's table of entities indexed by
//! entry slot. Slot 0 is the world; player slots are 1..=max_clients.
//!
//! VTable indices can be configured via gamedata.

use std::ffi::c_void;

use tf2rust_engine::try_engine;
use tf2rust_sdk::IClientEntityList;

use super::handle::BaseHandle;
use crate::thunk::MemberVFuncThunk;

type GetClientNetworkableFn = unsafe extern "C" fn(this: *mut c_void, index: i32) -> *mut c_void;
type GetClientEntityFn = unsafe extern "C" fn(this: *mut c_void, index: i32) -> *mut c_void;
type GetClientEntityFromHandleFn =
    unsafe extern "C" fn(this: *mut c_void, handle: u32) -> *mut c_void;
type NumberOfEntitiesFn =
    unsafe extern "C" fn(this: *mut c_void, include_non_networkable: bool) -> i32;
type GetIntFn = unsafe extern "C" fn(this: *mut c_void) -> i32;

static GET_CLIENT_NETWORKABLE: MemberVFuncThunk<GetClientNetworkableFn> =
    MemberVFuncThunk::new("IClientEntityList::GetClientNetworkable", 0);
static GET_CLIENT_ENTITY: MemberVFuncThunk<GetClientEntityFn> =
    MemberVFuncThunk::new("IClientEntityList::GetClientEntity", 3);
static GET_CLIENT_ENTITY_FROM_HANDLE: MemberVFuncThunk<GetClientEntityFromHandleFn> =
    MemberVFuncThunk::new("IClientEntityList::GetClientEntityFromHandle", 4);
static NUMBER_OF_ENTITIES: MemberVFuncThunk<NumberOfEntitiesFn> =
    MemberVFuncThunk::new("IClientEntityList::NumberOfEntities", 5);
static GET_HIGHEST_ENTITY_INDEX: MemberVFuncThunk<GetIntFn> =
    MemberVFuncThunk::new("IClientEntityList::GetHighestEntityIndex", 6);
static GET_MAX_ENTITIES: MemberVFuncThunk<GetIntFn> =
    MemberVFuncThunk::new("IClientEntityList::GetMaxEntities", 8);

fn entity_list() -> Option<*mut IClientEntityList> {
    try_engine().map(|e| e.entity_list_ptr())
}

#[inline]
fn non_null(ptr: *mut c_void) -> Option<*mut c_void> {
    (!ptr.is_null()).then_some(ptr)
}

/// Entity at `index` in a given entity list
///
/// # Safety
/// `list` must be null or a valid `IClientEntityList`.
pub unsafe fn get_client_entity_in(list: *mut IClientEntityList, index: i32) -> Option<*mut c_void> {
    if index < 0 {
        return None;
    }
    let this = list as *mut c_void;
    let func = GET_CLIENT_ENTITY.get(this)?;
    non_null(func(this, index))
}

/// Entity by handle in a given entity list
///
/// # Safety
/// `list` must be null or a valid `IClientEntityList`.
pub unsafe fn get_client_entity_from_handle_in(
    list: *mut IClientEntityList,
    handle: BaseHandle,
) -> Option<*mut c_void> {
    if !handle.is_valid() {
        return None;
    }
    let this = list as *mut c_void;
    let func = GET_CLIENT_ENTITY_FROM_HANDLE.get(this)?;
    non_null(func(this, handle.raw()))
}

/// Highest entity index in a given entity list, or -1
///
/// # Safety
/// `list` must be null or a valid `IClientEntityList`.
pub unsafe fn highest_entity_index_in(list: *mut IClientEntityList) -> i32 {
    let this = list as *mut c_void;
    match GET_HIGHEST_ENTITY_INDEX.get(this) {
        Some(func) => func(this),
        None => -1,
    }
}

/// Get entity pointer by index
///
/// # Example
///
/// ```ignore
/// if let Some(ptr) = get_client_entity(5) {
///     let entity = unsafe { BaseEntity::from_ptr(ptr) };
/// }
/// ```
pub fn get_client_entity(index: i32) -> Option<*mut c_void> {
    unsafe { get_client_entity_in(entity_list()?, index) }
}

/// Get entity pointer from a handle; None if stale
pub fn get_client_entity_from_handle(handle: BaseHandle) -> Option<*mut c_void> {
    unsafe { get_client_entity_from_handle_in(entity_list()?, handle) }
}

/// Networkable interface of the entity at `index`
pub fn get_client_networkable(index: i32) -> Option<*mut c_void> {
    let this = entity_list()? as *mut c_void;
    unsafe {
        let func = GET_CLIENT_NETWORKABLE.get(this)?;
        non_null(func(this, index))
    }
}

/// Number of live entities
pub fn number_of_entities(include_non_networkable: bool) -> i32 {
    let Some(list) = entity_list() else {
        return 0;
    };
    let this = list as *mut c_void;
    unsafe {
        match NUMBER_OF_ENTITIES.get(this) {
            Some(func) => func(this, include_non_networkable),
            None => 0,
        }
    }
}

/// Highest index in use, or -1 if unavailable
pub fn highest_entity_index() -> i32 {
    match entity_list() {
        Some(list) => unsafe { highest_entity_index_in(list) },
        None => -1,
    }
}

/// Size of the entity list
pub fn max_entities() -> i32 {
    let Some(list) = entity_list() else {
        return 0;
    };
    let this = list as *mut c_void;
    unsafe {
        match GET_MAX_ENTITIES.get(this) {
            Some(func) => func(this),
            None => 0,
        }
    }
}

/// Iterate all entities
///
/// Empty if the entity list is unavailable.
pub fn iter_entities() -> EntityIterator {
    match entity_list() {
        Some(list) => unsafe { EntityIterator::new(list) },
        None => EntityIterator::empty(),
    }
}

/// Iterator over `(index, entity)` for every occupied slot up to the
/// highest entity index
pub struct EntityIterator {
    list: *mut IClientEntityList,
    current: i32,
    highest: i32,
}

impl EntityIterator {
    /// # Safety
    /// `list` must be a valid `IClientEntityList` for the iterator's lifetime.
    pub unsafe fn new(list: *mut IClientEntityList) -> Self {
        Self {
            list,
            current: 0,
            highest: highest_entity_index_in(list),
        }
    }

    pub fn empty() -> Self {
        Self {
            list: std::ptr::null_mut(),
            current: 0,
            highest: -1,
        }
    }
}

impl Iterator for EntityIterator {
    type Item = (i32, *mut c_void);

    fn next(&mut self) -> Option<Self::Item> {
        while self.current <= self.highest {
            let index = self.current;
            self.current += 1;
            if let Some(ptr) = unsafe { get_client_entity_in(self.list, index) } {
                return Some((index, ptr));
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod test_list {
    //! Synthetic entity list with the real vtable layout

    use super::*;

    #[repr(C)]
    pub struct FakeEntityList {
        vtable: *const usize,
        pub entities: Vec<*mut c_void>,
        pub serials: Vec<u32>,
    }

    unsafe fn list<'a>(this: *mut c_void) -> &'a FakeEntityList {
        &*(this as *const FakeEntityList)
    }

    unsafe extern "C" fn get_client_entity(this: *mut c_void, index: i32) -> *mut c_void {
        list(this)
            .entities
            .get(index as usize)
            .copied()
            .unwrap_or(std::ptr::null_mut())
    }

    unsafe extern "C" fn from_handle(this: *mut c_void, handle: u32) -> *mut c_void {
        let handle = BaseHandle::from_raw(handle);
        let list = list(this);
        let index = handle.index() as usize;
        match list.serials.get(index) {
            Some(&serial) if serial == handle.serial() => list.entities[index],
            _ => std::ptr::null_mut(),
        }
    }

    unsafe extern "C" fn highest(this: *mut c_void) -> i32 {
        list(this).entities.len() as i32 - 1
    }

    pub fn vtable() -> Vec<usize> {
        let mut vtable = vec![0usize; 9];
        vtable[3] = get_client_entity as usize;
        vtable[4] = from_handle as usize;
        vtable[6] = highest as usize;
        vtable
    }

    pub fn build(vtable: &[usize], entities: Vec<*mut c_void>) -> Box<FakeEntityList> {
        let serials = vec![1; entities.len()];
        Box::new(FakeEntityList {
            vtable: vtable.as_ptr(),
            entities,
            serials,
        })
    }

    impl FakeEntityList {
        pub fn as_list(&mut self) -> *mut IClientEntityList {
            self as *mut FakeEntityList as *mut IClientEntityList
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_list::{build, vtable};
    use super::*;

    #[test]
    fn test_lookup_by_index() {
        let mut a = 1u64;
        let mut b = 2u64;
        let pa = &mut a as *mut u64 as *mut c_void;
        let pb = &mut b as *mut u64 as *mut c_void;

        let vt = vtable();
        let mut fake = build(&vt, vec![pa, std::ptr::null_mut(), pb]);
        let list = fake.as_list();

        unsafe {
            assert_eq!(get_client_entity_in(list, 0), Some(pa));
            assert_eq!(get_client_entity_in(list, 1), None);
            assert_eq!(get_client_entity_in(list, 2), Some(pb));
            assert_eq!(get_client_entity_in(list, 7), None);
            assert_eq!(get_client_entity_in(list, -1), None);
            assert_eq!(highest_entity_index_in(list), 2);
        }
    }

    #[test]
    fn test_handle_checks_serial() {
        let mut a = 1u64;
        let pa = &mut a as *mut u64 as *mut c_void;

        let vt = vtable();
        let mut fake = build(&vt, vec![std::ptr::null_mut(), pa]);
        let list = fake.as_list();

        unsafe {
            assert_eq!(get_client_entity_from_handle_in(list, BaseHandle::new(1, 1)), Some(pa));
            assert_eq!(get_client_entity_from_handle_in(list, BaseHandle::new(1, 2)), None);
            assert_eq!(get_client_entity_from_handle_in(list, BaseHandle::invalid()), None);
        }
    }

    #[test]
    fn test_iterator_skips_empty_slots() {
        let mut values = [10u64, 20, 30];
        let ptrs: Vec<*mut c_void> = values
            .iter_mut()
            .map(|v| v as *mut u64 as *mut c_void)
            .collect();

        let vt = vtable();
        let mut fake = build(&vt, vec![ptrs[0], std::ptr::null_mut(), ptrs[1], ptrs[2]]);
        let indices: Vec<i32> = unsafe { EntityIterator::new(fake.as_list()) }
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_without_engine() {
        assert!(get_client_entity(1).is_none());
        assert_eq!(highest_entity_index(), -1);
        assert_eq!(max_entities(), 0);
        assert_eq!(iter_entities().count(), 0);
    }
}
