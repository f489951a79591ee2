//! Global engine interface storage
//!
//! Engine interfaces are acquired once during plugin load and stored here.
//! Access is thread-safe via OnceLock.

use std::ptr::NonNull;
use std::sync::OnceLock;
use std::thread::ThreadId;

use parking_lot::RwLock;

use tf2rust_sdk::{
    CGlobalVarsBase, IBaseClientDLL, IClientEntityList, ICvar, IEngineTrace, IEngineVGui,
    IGameEventManager2, IInputSystem, IMaterialSystem, IPanel, IPhysics, IPhysicsCollision,
    IPlayerInfoManager, IServerGameDLL, IStudioRender, ISurface, IVEngineClient, IVEngineServer,
    IVModelInfoClient, IVModelRender, IVRenderView,
};

use crate::error::InterfaceError;

/// Global engine state containing all acquired interfaces
pub struct EngineGlobals {
    /// Client-side engine (required)
    pub engine_client: NonNull<IVEngineClient>,

    /// Client DLL, owner of the ClientClass list (required)
    pub client: NonNull<IBaseClientDLL>,

    /// Client entity list (required)
    pub entity_list: NonNull<IClientEntityList>,

    /// Model info (required)
    pub model_info: NonNull<IVModelInfoClient>,

    /// Console variable system (required)
    pub cvar: NonNull<ICvar>,

    pub engine_trace: Option<NonNull<IEngineTrace>>,
    pub material_system: Option<NonNull<IMaterialSystem>>,
    pub render_view: Option<NonNull<IVRenderView>>,
    pub model_render: Option<NonNull<IVModelRender>>,
    pub studio_render: Option<NonNull<IStudioRender>>,
    pub physics: Option<NonNull<IPhysics>>,
    pub physics_collision: Option<NonNull<IPhysicsCollision>>,
    pub game_event_manager: Option<NonNull<IGameEventManager2>>,
    pub input_system: Option<NonNull<IInputSystem>>,
    pub panel: Option<NonNull<IPanel>>,
    pub surface: Option<NonNull<ISurface>>,
    pub engine_vgui: Option<NonNull<IEngineVGui>>,

    /// Server-side interfaces, only present on a listen/dedicated server
    pub engine_server: Option<NonNull<IVEngineServer>>,
    pub player_info_manager: Option<NonNull<IPlayerInfoManager>>,
    pub server_game_dll: Option<NonNull<IServerGameDLL>>,

    /// Global vars - set later, once resolved from GameData
    global_vars: RwLock<Option<NonNull<CGlobalVarsBase>>>,

    /// Main game thread ID for thread safety checks
    pub main_thread_id: ThreadId,
}

// SAFETY: All pointers are to engine interfaces that live for the entire plugin lifetime.
// Access is synchronized via OnceLock for initialization and RwLock for global_vars.
unsafe impl Send for EngineGlobals {}
unsafe impl Sync for EngineGlobals {}

/// Global engine state storage
static ENGINE: OnceLock<EngineGlobals> = OnceLock::new();

/// Initialize engine globals
///
/// Called once during plugin load. Returns error if already initialized.
pub fn init_engine(globals: EngineGlobals) -> Result<(), InterfaceError> {
    ENGINE
        .set(globals)
        .map_err(|_| InterfaceError::AlreadyInitialized)
}

/// Get engine globals
///
/// # Panics
/// Panics if called before `init_engine`
pub fn engine() -> &'static EngineGlobals {
    ENGINE.get().expect("Engine not initialized")
}

/// Try to get engine globals without panicking
pub fn try_engine() -> Option<&'static EngineGlobals> {
    ENGINE.get()
}

/// Check if engine is initialized
pub fn is_engine_initialized() -> bool {
    ENGINE.get().is_some()
}

/// Check if current thread is the main game thread
pub fn is_main_thread() -> bool {
    ENGINE
        .get()
        .map(|g| std::thread::current().id() == g.main_thread_id)
        .unwrap_or(false)
}

impl EngineGlobals {
    /// Create new EngineGlobals from the required interfaces
    ///
    /// Optional interfaces start as `None`. The calling thread is recorded
    /// as the main thread.
    pub fn new(
        engine_client: NonNull<IVEngineClient>,
        client: NonNull<IBaseClientDLL>,
        entity_list: NonNull<IClientEntityList>,
        model_info: NonNull<IVModelInfoClient>,
        cvar: NonNull<ICvar>,
    ) -> Self {
        Self {
            engine_client,
            client,
            entity_list,
            model_info,
            cvar,
            engine_trace: None,
            material_system: None,
            render_view: None,
            model_render: None,
            studio_render: None,
            physics: None,
            physics_collision: None,
            game_event_manager: None,
            input_system: None,
            panel: None,
            surface: None,
            engine_vgui: None,
            engine_server: None,
            player_info_manager: None,
            server_game_dll: None,
            global_vars: RwLock::new(None),
            main_thread_id: std::thread::current().id(),
        }
    }

    pub fn engine_client_ptr(&self) -> *mut IVEngineClient {
        self.engine_client.as_ptr()
    }

    pub fn client_ptr(&self) -> *mut IBaseClientDLL {
        self.client.as_ptr()
    }

    pub fn entity_list_ptr(&self) -> *mut IClientEntityList {
        self.entity_list.as_ptr()
    }

    pub fn model_info_ptr(&self) -> *mut IVModelInfoClient {
        self.model_info.as_ptr()
    }

    pub fn cvar_ptr(&self) -> *mut ICvar {
        self.cvar.as_ptr()
    }

    /// Get global vars pointer (None until resolved)
    pub fn global_vars_ptr(&self) -> Option<*mut CGlobalVarsBase> {
        self.global_vars.read().map(|nn| nn.as_ptr())
    }

    /// Set global vars pointer
    pub fn set_global_vars(&self, ptr: *mut CGlobalVarsBase) {
        if let Some(nn) = NonNull::new(ptr) {
            *self.global_vars.write() = Some(nn);
            tracing::info!("CGlobalVarsBase set: {:p}", ptr);
        }
    }

    /// Clear global vars pointer
    pub fn clear_global_vars(&self) {
        *self.global_vars.write() = None;
        tracing::debug!("CGlobalVarsBase cleared");
    }

    /// Number of optional interfaces that were found
    pub fn optional_count(&self) -> usize {
        [
            self.engine_trace.is_some(),
            self.material_system.is_some(),
            self.render_view.is_some(),
            self.model_render.is_some(),
            self.studio_render.is_some(),
            self.physics.is_some(),
            self.physics_collision.is_some(),
            self.game_event_manager.is_some(),
            self.input_system.is_some(),
            self.panel.is_some(),
            self.surface.is_some(),
            self.engine_vgui.is_some(),
            self.engine_server.is_some(),
            self.player_info_manager.is_some(),
            self.server_game_dll.is_some(),
        ]
        .into_iter()
        .filter(|&found| found)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dangling<T>() -> NonNull<T> {
        NonNull::dangling()
    }

    #[test]
    fn test_global_vars_set_and_clear() {
        let globals = EngineGlobals::new(dangling(), dangling(), dangling(), dangling(), dangling());
        assert!(globals.global_vars_ptr().is_none());

        let mut vars: CGlobalVarsBase = unsafe { std::mem::zeroed() };
        globals.set_global_vars(&mut vars);
        assert_eq!(globals.global_vars_ptr(), Some(&mut vars as *mut _));

        // Null is ignored
        globals.set_global_vars(std::ptr::null_mut());
        assert!(globals.global_vars_ptr().is_some());

        globals.clear_global_vars();
        assert!(globals.global_vars_ptr().is_none());
        assert_eq!(globals.optional_count(), 0);
    }
}
