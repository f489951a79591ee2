//! `IServerPluginCallbacks` implemented as a static object
//!
//! The engine only ever calls through the vtable pointer at offset 0, so
//! the object is a `#[repr(C)]` struct holding a reference to a static
//! table of `extern "C"` functions in declaration order.

use std::ffi::{c_char, c_int, c_void, CStr};

use tf2rust_core::listeners;
use tf2rust_core::thunk::MemberVFuncThunk;
use tf2rust_engine::try_engine;
use tf2rust_sdk::{CreateInterfaceFn, PluginResult};

use super::exports;

/// `edict_t`, only passed through
pub type Edict = c_void;

type IndexOfEdictFn = unsafe extern "C" fn(this: *mut c_void, edict: *const Edict) -> c_int;

static INDEX_OF_EDICT: MemberVFuncThunk<IndexOfEdictFn> =
    MemberVFuncThunk::new("IVEngineServer::IndexOfEdict", 18);

/// Slot layout of `IServerPluginCallbacks` (interface version 003)
#[repr(C)]
pub struct PluginCallbacksVTable {
    pub load: unsafe extern "C" fn(
        this: *mut c_void,
        interface_factory: Option<CreateInterfaceFn>,
        game_server_factory: Option<CreateInterfaceFn>,
    ) -> bool,
    pub unload: unsafe extern "C" fn(this: *mut c_void),
    pub pause: unsafe extern "C" fn(this: *mut c_void),
    pub unpause: unsafe extern "C" fn(this: *mut c_void),
    pub get_plugin_description: unsafe extern "C" fn(this: *mut c_void) -> *const c_char,
    pub level_init: unsafe extern "C" fn(this: *mut c_void, map_name: *const c_char),
    pub server_activate: unsafe extern "C" fn(
        this: *mut c_void,
        edict_list: *mut Edict,
        edict_count: c_int,
        client_max: c_int,
    ),
    pub game_frame: unsafe extern "C" fn(this: *mut c_void, simulating: bool),
    pub level_shutdown: unsafe extern "C" fn(this: *mut c_void),
    pub client_active: unsafe extern "C" fn(this: *mut c_void, entity: *mut Edict),
    pub client_fully_connect: unsafe extern "C" fn(this: *mut c_void, entity: *mut Edict),
    pub client_disconnect: unsafe extern "C" fn(this: *mut c_void, entity: *mut Edict),
    pub client_put_in_server:
        unsafe extern "C" fn(this: *mut c_void, entity: *mut Edict, player_name: *const c_char),
    pub set_command_client: unsafe extern "C" fn(this: *mut c_void, index: c_int),
    pub client_settings_changed: unsafe extern "C" fn(this: *mut c_void, entity: *mut Edict),
    pub client_connect: unsafe extern "C" fn(
        this: *mut c_void,
        allow_connect: *mut bool,
        entity: *mut Edict,
        name: *const c_char,
        address: *const c_char,
        reject: *mut c_char,
        max_reject_len: c_int,
    ) -> PluginResult,
    pub client_command:
        unsafe extern "C" fn(this: *mut c_void, entity: *mut Edict, args: *const c_void) -> PluginResult,
    pub network_id_validated: unsafe extern "C" fn(
        this: *mut c_void,
        user_name: *const c_char,
        network_id: *const c_char,
    ) -> PluginResult,
    pub on_query_cvar_value_finished: unsafe extern "C" fn(
        this: *mut c_void,
        cookie: c_int,
        entity: *mut Edict,
        status: c_int,
        cvar_name: *const c_char,
        cvar_value: *const c_char,
    ),
    pub on_edict_allocated: unsafe extern "C" fn(this: *mut c_void, edict: *mut Edict),
    pub on_edict_freed: unsafe extern "C" fn(this: *mut c_void, edict: *const Edict),
}

/// Number of slots in [`PluginCallbacksVTable`]
pub const CALLBACK_SLOTS: usize = 21;

/// The object handed to the engine
#[repr(C)]
pub struct ServerPlugin {
    vtable: &'static PluginCallbacksVTable,
}

impl ServerPlugin {
    pub fn as_ptr(&'static self) -> *mut c_void {
        self as *const ServerPlugin as *mut c_void
    }
}

static VTABLE: PluginCallbacksVTable = PluginCallbacksVTable {
    load,
    unload,
    pause,
    unpause,
    get_plugin_description,
    level_init,
    server_activate,
    game_frame,
    level_shutdown,
    client_active,
    client_fully_connect,
    client_disconnect,
    client_put_in_server,
    set_command_client,
    client_settings_changed,
    client_connect,
    client_command,
    network_id_validated,
    on_query_cvar_value_finished,
    on_edict_allocated,
    on_edict_freed,
};

pub static PLUGIN: ServerPlugin = ServerPlugin { vtable: &VTABLE };

static DESCRIPTION: &CStr = c"tf2rust 0.1.0 - Team Fortress 2 Rust plugin framework";

/// Player slot (entity index - 1) of a client edict
fn edict_slot(edict: *const Edict) -> Option<i32> {
    if edict.is_null() {
        return None;
    }
    let server = try_engine()?.engine_server?.as_ptr() as *mut c_void;
    // SAFETY: engine_server is a live IVEngineServer
    let index = unsafe {
        let func = INDEX_OF_EDICT.get(server)?;
        func(server, edict)
    };
    (index > 0).then(|| index - 1)
}

unsafe extern "C" fn load(
    _this: *mut c_void,
    interface_factory: Option<CreateInterfaceFn>,
    game_server_factory: Option<CreateInterfaceFn>,
) -> bool {
    exports::plugin_load(interface_factory, game_server_factory)
}

unsafe extern "C" fn unload(_this: *mut c_void) {
    exports::plugin_unload();
}

unsafe extern "C" fn pause(_this: *mut c_void) {
    tracing::info!("Paused");
}

unsafe extern "C" fn unpause(_this: *mut c_void) {
    tracing::info!("Unpaused");
}

unsafe extern "C" fn get_plugin_description(_this: *mut c_void) -> *const c_char {
    DESCRIPTION.as_ptr()
}

unsafe extern "C" fn level_init(_this: *mut c_void, map_name: *const c_char) {
    if map_name.is_null() {
        return;
    }
    let name = CStr::from_ptr(map_name).to_string_lossy();
    listeners::fire_level_init(&name);
}

unsafe extern "C" fn server_activate(
    _this: *mut c_void,
    _edict_list: *mut Edict,
    _edict_count: c_int,
    client_max: c_int,
) {
    listeners::fire_server_activate(client_max);
}

unsafe extern "C" fn game_frame(_this: *mut c_void, simulating: bool) {
    listeners::fire_game_frame(simulating);
}

unsafe extern "C" fn level_shutdown(_this: *mut c_void) {
    listeners::fire_level_shutdown();
}

unsafe extern "C" fn client_active(_this: *mut c_void, entity: *mut Edict) {
    if let Some(slot) = edict_slot(entity) {
        listeners::fire_client_active(slot);
    }
}

unsafe extern "C" fn client_fully_connect(_this: *mut c_void, _entity: *mut Edict) {}

unsafe extern "C" fn client_disconnect(_this: *mut c_void, entity: *mut Edict) {
    if let Some(slot) = edict_slot(entity) {
        listeners::fire_client_disconnect(slot);
    }
}

unsafe extern "C" fn client_put_in_server(
    _this: *mut c_void,
    _entity: *mut Edict,
    _player_name: *const c_char,
) {
}

unsafe extern "C" fn set_command_client(_this: *mut c_void, _index: c_int) {}

unsafe extern "C" fn client_settings_changed(_this: *mut c_void, _entity: *mut Edict) {}

unsafe extern "C" fn client_connect(
    _this: *mut c_void,
    _allow_connect: *mut bool,
    _entity: *mut Edict,
    _name: *const c_char,
    _address: *const c_char,
    _reject: *mut c_char,
    _max_reject_len: c_int,
) -> PluginResult {
    PluginResult::Continue
}

unsafe extern "C" fn client_command(
    _this: *mut c_void,
    _entity: *mut Edict,
    _args: *const c_void,
) -> PluginResult {
    PluginResult::Continue
}

unsafe extern "C" fn network_id_validated(
    _this: *mut c_void,
    _user_name: *const c_char,
    _network_id: *const c_char,
) -> PluginResult {
    PluginResult::Continue
}

unsafe extern "C" fn on_query_cvar_value_finished(
    _this: *mut c_void,
    _cookie: c_int,
    _entity: *mut Edict,
    _status: c_int,
    _cvar_name: *const c_char,
    _cvar_value: *const c_char,
) {
}

unsafe extern "C" fn on_edict_allocated(_this: *mut c_void, _edict: *mut Edict) {}

unsafe extern "C" fn on_edict_freed(_this: *mut c_void, _edict: *const Edict) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    fn vtable_slot(index: usize) -> usize {
        let table = PLUGIN.vtable as *const PluginCallbacksVTable as *const usize;
        unsafe { *table.add(index) }
    }

    #[test]
    fn test_vtable_layout() {
        assert_eq!(
            std::mem::size_of::<PluginCallbacksVTable>(),
            CALLBACK_SLOTS * std::mem::size_of::<usize>()
        );
        assert_eq!(vtable_slot(4), get_plugin_description as usize);
        assert_eq!(vtable_slot(7), game_frame as usize);
        assert_eq!(vtable_slot(15), client_connect as usize);
        assert_eq!(vtable_slot(CALLBACK_SLOTS - 1), on_edict_freed as usize);
    }

    #[test]
    fn test_object_points_at_vtable() {
        let vtable = unsafe { *(PLUGIN.as_ptr() as *const *const PluginCallbacksVTable) };
        assert!(std::ptr::eq(vtable, &VTABLE));
    }

    #[test]
    fn test_description() {
        let desc = unsafe { CStr::from_ptr((PLUGIN.vtable.get_plugin_description)(PLUGIN.as_ptr())) };
        assert!(desc.to_str().unwrap().starts_with("tf2rust"));
    }

    #[test]
    fn test_unused_slots_continue() {
        let this = PLUGIN.as_ptr();
        let mut allow = true;
        let result = unsafe {
            (PLUGIN.vtable.client_connect)(
                this,
                &mut allow,
                std::ptr::null_mut(),
                c"player".as_ptr(),
                c"127.0.0.1".as_ptr(),
                std::ptr::null_mut(),
                0,
            )
        };
        assert_eq!(result, PluginResult::Continue);
        assert!(allow);
        let result = unsafe {
            (PLUGIN.vtable.network_id_validated)(this, c"player".as_ptr(), c"[U:1:1]".as_ptr())
        };
        assert_eq!(result, PluginResult::Continue);
    }

    #[test]
    fn test_game_frame_reaches_listeners() {
        let frames = Arc::new(AtomicI32::new(0));
        let sink = Arc::clone(&frames);
        let key = listeners::on_game_frame(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        unsafe { (PLUGIN.vtable.game_frame)(PLUGIN.as_ptr(), true) };
        listeners::remove_listener(key);

        assert!(frames.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn test_edict_slot_without_engine() {
        let mut edict = 0u64;
        assert_eq!(edict_slot(std::ptr::null()), None);
        assert_eq!(edict_slot(&mut edict as *mut u64 as *const Edict), None);
    }
}
