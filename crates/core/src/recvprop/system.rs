//! RecvTable walker for networked property offsets
//!
//! Offsets come from the client's reflection data: the `ClientClass` list
//! returned by `IBaseClientDLL::GetAllClasses`. A prop inside a nested data
//! table (including the `baseclass` chain) is at the sum of the offsets
//! along the path. Results are cached.

use std::ffi::{c_void, CStr};
use std::sync::LazyLock;

use dashmap::DashMap;
use tracing::{debug, trace};

use tf2rust_sdk::recv::{ClientClass, RecvTable, SendPropType};

use super::hash::combined_hash;
use crate::thunk::MemberVFuncThunk;

/// Error type for RecvProp operations
#[derive(Debug, thiserror::Error)]
pub enum RecvPropError {
    #[error("Client class list not available")]
    NotInitialized,

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Prop not found: {table}.{prop}")]
    PropNotFound { table: String, prop: String },
}

/// Resolved prop location
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropOffset {
    /// Byte offset from the entity base
    pub offset: i32,
    /// Wire type of the prop itself, `None` if unrecognized
    pub prop_type: Option<SendPropType>,
}

/// Global offset cache: (table_hash << 32 | prop_hash) -> PropOffset
static OFFSET_CACHE: LazyLock<DashMap<u64, PropOffset>> = LazyLock::new(DashMap::new);

/// Nesting deeper than this is treated as a cycle
const MAX_DEPTH: usize = 32;

type GetAllClassesFn = unsafe extern "C" fn(this: *mut c_void) -> *mut ClientClass;

static GET_ALL_CLASSES: MemberVFuncThunk<GetAllClassesFn> =
    MemberVFuncThunk::new("IBaseClientDLL::GetAllClasses", 8);

/// Head of the engine's `ClientClass` list
pub fn client_class_head() -> Result<*mut ClientClass, RecvPropError> {
    let engine = tf2rust_engine::try_engine().ok_or(RecvPropError::NotInitialized)?;
    let client = engine.client_ptr() as *mut c_void;

    unsafe {
        let get_all_classes = GET_ALL_CLASSES
            .get(client)
            .ok_or(RecvPropError::NotInitialized)?;
        let head = get_all_classes(client);
        if head.is_null() {
            Err(RecvPropError::NotInitialized)
        } else {
            Ok(head)
        }
    }
}

/// Get a networked prop offset
///
/// Cached: subsequent calls with the same table/prop skip the walk.
///
/// # Arguments
/// * `table` - RecvTable name (e.g., "DT_BasePlayer")
/// * `prop` - Prop name (e.g., "m_iHealth")
pub fn get_offset(table: &str, prop: &str) -> Result<PropOffset, RecvPropError> {
    if let Some(hit) = cached(table, prop) {
        return Ok(hit);
    }
    let head = client_class_head()?;
    // SAFETY: the list comes straight from the client DLL
    unsafe { get_offset_from(head, table, prop) }
}

/// Same as [`get_offset`] against an explicit class list
///
/// # Safety
/// `head` must be null or a valid `ClientClass` list.
pub unsafe fn get_offset_from(
    head: *const ClientClass,
    table: &str,
    prop: &str,
) -> Result<PropOffset, RecvPropError> {
    if let Some(hit) = cached(table, prop) {
        return Ok(hit);
    }

    let table_ptr =
        find_table(head, table).ok_or_else(|| RecvPropError::TableNotFound(table.to_string()))?;

    let offset = find_in_table(table_ptr, prop).ok_or_else(|| RecvPropError::PropNotFound {
        table: table.to_string(),
        prop: prop.to_string(),
    })?;

    debug!("Resolved {}.{}: offset={}", table, prop, offset.offset);
    OFFSET_CACHE.insert(combined_hash(table.as_bytes(), prop.as_bytes()), offset);
    Ok(offset)
}

fn cached(table: &str, prop: &str) -> Option<PropOffset> {
    let key = combined_hash(table.as_bytes(), prop.as_bytes());
    let hit = OFFSET_CACHE.get(&key).map(|e| *e);
    if let Some(ref entry) = hit {
        trace!("Cache hit for {}.{}: offset={}", table, prop, entry.offset);
    }
    hit
}

unsafe fn cstr_eq(ptr: *const std::ffi::c_char, expected: &str) -> bool {
    !ptr.is_null() && CStr::from_ptr(ptr).to_bytes() == expected.as_bytes()
}

/// Find a table by name in the class list
///
/// Top-level class tables are checked first, then tables nested inside them.
///
/// # Safety
/// `head` must be null or a valid `ClientClass` list.
pub unsafe fn find_table(head: *const ClientClass, name: &str) -> Option<*const RecvTable> {
    let mut class = head;
    while let Some(cc) = class.as_ref() {
        if !cc.recv_table.is_null() && cstr_eq((*cc.recv_table).net_table_name, name) {
            return Some(cc.recv_table as *const RecvTable);
        }
        class = cc.next;
    }

    let mut class = head;
    while let Some(cc) = class.as_ref() {
        if let Some(found) = find_nested_table(cc.recv_table, name, 0) {
            return Some(found);
        }
        class = cc.next;
    }
    None
}

unsafe fn find_nested_table(
    table: *const RecvTable,
    name: &str,
    depth: usize,
) -> Option<*const RecvTable> {
    let table = table.as_ref()?;
    if depth > MAX_DEPTH {
        return None;
    }
    for prop in table.props() {
        let Some(child) = prop.data_table() else {
            continue;
        };
        if cstr_eq((*child).net_table_name, name) {
            return Some(child as *const RecvTable);
        }
        if let Some(found) = find_nested_table(child, name, depth + 1) {
            return Some(found);
        }
    }
    None
}

/// Find `prop` in `table` or any table nested inside it
///
/// Direct props win over nested ones at the same level; a nested match is
/// offset by the data-table prop that holds it.
///
/// # Safety
/// `table` must be null or a valid `RecvTable`.
pub unsafe fn find_in_table(table: *const RecvTable, prop: &str) -> Option<PropOffset> {
    find_in_table_at(table, prop, 0)
}

unsafe fn find_in_table_at(table: *const RecvTable, prop: &str, depth: usize) -> Option<PropOffset> {
    let table = table.as_ref()?;
    if depth > MAX_DEPTH {
        return None;
    }

    let props = table.props();

    if let Some(p) = props.iter().find(|p| cstr_eq(p.var_name, prop)) {
        return Some(PropOffset {
            offset: p.offset,
            prop_type: p.prop_type(),
        });
    }

    for p in props {
        let Some(child) = p.data_table() else {
            continue;
        };
        if let Some(inner) = find_in_table_at(child, prop, depth + 1) {
            return Some(PropOffset {
                offset: p.offset + inner.offset,
                prop_type: inner.prop_type,
            });
        }
    }
    None
}

/// Render a table and its nested tables, one prop per line
///
/// # Safety
/// `table` must be null or a valid `RecvTable`.
pub unsafe fn dump_table_ptr(table: *const RecvTable) -> Vec<String> {
    let mut lines = Vec::new();
    dump_into(table, 0, 0, &mut lines);
    lines
}

unsafe fn dump_into(table: *const RecvTable, base: i32, depth: usize, out: &mut Vec<String>) {
    let Some(table) = table.as_ref() else {
        return;
    };
    if depth > MAX_DEPTH {
        return;
    }
    let indent = "  ".repeat(depth);
    out.push(format!("{}{}", indent, table.name().unwrap_or("<unnamed>")));

    for p in table.props() {
        let name = p.name().unwrap_or("<unnamed>");
        out.push(format!(
            "{}  {} @ {:#x} ({:?})",
            indent,
            name,
            base + p.offset,
            p.prop_type()
        ));
        if let Some(child) = p.data_table() {
            dump_into(child, base + p.offset, depth + 1, out);
        }
    }
}

/// Debug listing of a table from the engine's class list
pub fn dump_table(table: &str) -> Result<Vec<String>, RecvPropError> {
    let head = client_class_head()?;
    unsafe {
        let ptr =
            find_table(head, table).ok_or_else(|| RecvPropError::TableNotFound(table.to_string()))?;
        let lines = dump_table_ptr(ptr);
        for line in &lines {
            debug!("{}", line);
        }
        Ok(lines)
    }
}

/// Clear the offset cache
///
/// Needed when the client DLL is reloaded.
pub fn clear_cache() {
    OFFSET_CACHE.clear();
    debug!("RecvProp offset cache cleared");
}

/// Get the number of cached offsets
pub fn cache_size() -> usize {
    OFFSET_CACHE.len()
}

/// Prefetch offsets for a list of table/prop pairs
///
/// Warms the cache during plugin load and surfaces missing props early.
/// Without a class list every pair fails, even ones already cached.
pub fn prefetch_offsets(pairs: &[(&str, &str)]) -> Vec<Result<PropOffset, RecvPropError>> {
    match client_class_head() {
        // SAFETY: the list comes straight from the client DLL
        Ok(head) => unsafe { prefetch_offsets_from(head, pairs) },
        Err(_) => pairs
            .iter()
            .map(|_| Err(RecvPropError::NotInitialized))
            .collect(),
    }
}

/// Same as [`prefetch_offsets`] against an explicit class list
///
/// # Safety
/// `head` must be null or a valid `ClientClass` list.
pub unsafe fn prefetch_offsets_from(
    head: *const ClientClass,
    pairs: &[(&str, &str)],
) -> Vec<Result<PropOffset, RecvPropError>> {
    if head.is_null() {
        return pairs
            .iter()
            .map(|_| Err(RecvPropError::NotInitialized))
            .collect();
    }
    pairs
        .iter()
        .map(|(table, prop)| get_offset_from(head, table, prop))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_tables {
    //! Synthetic client class list shared by tests

    use std::ffi::c_char;

    use tf2rust_sdk::recv::{ClientClass, RecvProp, RecvTable, SendPropType};

    pub fn prop(name: &'static [u8], ty: SendPropType, offset: i32) -> RecvProp {
        // SAFETY: all-zero is a valid RecvProp (null pointers, zero ints)
        let mut p: RecvProp = unsafe { std::mem::zeroed() };
        p.var_name = name.as_ptr() as *const c_char;
        p.recv_type = ty as i32;
        p.offset = offset;
        p
    }

    pub fn table_prop(name: &'static [u8], offset: i32, table: *mut RecvTable) -> RecvProp {
        let mut p = prop(name, SendPropType::DataTable, offset);
        p.data_table = table;
        p
    }

    pub fn table(name: &'static [u8], props: &mut Vec<RecvProp>) -> RecvTable {
        RecvTable {
            props: props.as_mut_ptr(),
            num_props: props.len() as i32,
            decoder: std::ptr::null_mut(),
            net_table_name: name.as_ptr() as *const c_char,
            initialized: true,
            in_main_list: false,
        }
    }

    /// DT_TFPlayer { baseclass -> DT_BasePlayer { baseclass -> DT_BaseEntity },
    ///   m_PlayerClass @0x1B00 -> DT_TFPlayerClassShared { m_iClass @0x4 } }
    pub struct World {
        pub entity_props: Vec<RecvProp>,
        pub entity: Box<RecvTable>,
        pub player_props: Vec<RecvProp>,
        pub player: Box<RecvTable>,
        pub class_props: Vec<RecvProp>,
        pub class_shared: Box<RecvTable>,
        pub tf_props: Vec<RecvProp>,
        pub tf_player: Box<RecvTable>,
        pub classes: Vec<ClientClass>,
    }

    impl World {
        pub fn head(&self) -> *const ClientClass {
            &self.classes[0]
        }
    }

    pub fn build() -> Box<World> {
        let mut world = Box::new(World {
            entity_props: vec![
                prop(b"m_iTeamNum\0", SendPropType::Int, 0xDC),
                prop(b"m_vecOrigin\0", SendPropType::Vector, 0x328),
                prop(b"m_fFlags\0", SendPropType::Int, 0x460),
            ],
            entity: Box::new(unsafe { std::mem::zeroed() }),
            player_props: Vec::new(),
            player: Box::new(unsafe { std::mem::zeroed() }),
            class_props: vec![prop(b"m_iClass\0", SendPropType::Int, 0x4)],
            class_shared: Box::new(unsafe { std::mem::zeroed() }),
            tf_props: Vec::new(),
            tf_player: Box::new(unsafe { std::mem::zeroed() }),
            classes: Vec::new(),
        });

        *world.entity = table(b"DT_BaseEntity\0", &mut world.entity_props);
        let entity_ptr: *mut RecvTable = &mut *world.entity;

        world.player_props = vec![
            table_prop(b"baseclass\0", 0, entity_ptr),
            prop(b"m_iHealth\0", SendPropType::Int, 0xD4),
            prop(b"m_lifeState\0", SendPropType::Int, 0xA5),
        ];
        *world.player = table(b"DT_BasePlayer\0", &mut world.player_props);
        let player_ptr: *mut RecvTable = &mut *world.player;

        *world.class_shared = table(b"DT_TFPlayerClassShared\0", &mut world.class_props);
        let class_ptr: *mut RecvTable = &mut *world.class_shared;

        world.tf_props = vec![
            table_prop(b"baseclass\0", 0, player_ptr),
            table_prop(b"m_PlayerClass\0", 0x1B00, class_ptr),
            prop(b"m_nPlayerCond\0", SendPropType::Int, 0x1C40),
        ];
        *world.tf_player = table(b"DT_TFPlayer\0", &mut world.tf_props);
        let tf_ptr: *mut RecvTable = &mut *world.tf_player;

        world.classes = vec![
            ClientClass {
                create_fn: std::ptr::null(),
                create_event_fn: std::ptr::null(),
                network_name: b"CTFPlayer\0".as_ptr() as *const c_char,
                recv_table: tf_ptr,
                next: std::ptr::null_mut(),
                class_id: 247,
            },
            ClientClass {
                create_fn: std::ptr::null(),
                create_event_fn: std::ptr::null(),
                network_name: b"CBaseEntity\0".as_ptr() as *const c_char,
                recv_table: entity_ptr,
                next: std::ptr::null_mut(),
                class_id: 1,
            },
        ];
        let second: *mut ClientClass = &mut world.classes[1];
        world.classes[0].next = second;

        world
    }
}
