//! Engine interface loading via CreateInterface pattern

use std::collections::HashMap;
use std::ffi::CStr;
use std::ptr::NonNull;

use tf2rust_sdk::{
    versions, CreateInterfaceFn, IBaseClientDLL, IClientEntityList, ICvar, IVEngineClient,
    IVModelInfoClient,
};

use crate::error::InterfaceError;
use crate::globals::EngineGlobals;

/// Wrapper around a CreateInterface factory function
#[derive(Clone, Copy)]
pub struct InterfaceFactory {
    factory: CreateInterfaceFn,
    name: &'static str,
}

impl InterfaceFactory {
    /// Create a new factory wrapper
    ///
    /// # Arguments
    /// * `factory` - The CreateInterface function pointer
    /// * `name` - Module name for error messages (e.g., "client", "engine")
    pub fn new(factory: CreateInterfaceFn, name: &'static str) -> Self {
        Self { factory, name }
    }

    /// Module this factory belongs to
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get an interface by version string
    ///
    /// # Arguments
    /// * `version` - Null-terminated version string (e.g., b"VEngineClient014\0")
    ///
    /// # Safety
    /// The returned pointer is only valid if T matches the actual interface type
    pub unsafe fn get<T>(&self, version: &[u8]) -> Result<NonNull<T>, InterfaceError> {
        let version_str = CStr::from_bytes_with_nul(version).map_err(|_| {
            InterfaceError::InvalidVersionString(String::from_utf8_lossy(version).into_owned())
        })?;

        let mut ret_code: i32 = 0;
        let ptr = (self.factory)(version_str.as_ptr(), &mut ret_code);

        NonNull::new(ptr as *mut T).ok_or_else(|| InterfaceError::NotFound {
            version: version_str.to_string_lossy().into_owned(),
            module: self.name.to_string(),
            code: ret_code,
        })
    }

    /// Try to get an interface, returning None on failure instead of error
    ///
    /// # Safety
    /// Same as `get`
    pub unsafe fn try_get<T>(&self, version: &[u8]) -> Option<NonNull<T>> {
        self.get(version).ok()
    }
}

/// CreateInterface factories keyed by module short name
#[derive(Default, Clone)]
pub struct ModuleFactories {
    factories: HashMap<&'static str, InterfaceFactory>,
}

impl ModuleFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory of `module`
    pub fn insert(&mut self, module: &'static str, factory: CreateInterfaceFn) {
        self.factories
            .insert(module, InterfaceFactory::new(factory, module));
    }

    pub fn get(&self, module: &str) -> Option<&InterfaceFactory> {
        self.factories.get(module)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Acquire a required interface
    ///
    /// # Safety
    /// Same as [`InterfaceFactory::get`]
    pub unsafe fn require<T>(
        &self,
        module: &'static str,
        version: &[u8],
    ) -> Result<NonNull<T>, InterfaceError> {
        let factory = self
            .get(module)
            .ok_or_else(|| InterfaceError::MissingFactory(module.to_string()))?;
        factory.get(version)
    }

    /// Acquire an optional interface, logging when absent
    ///
    /// # Safety
    /// Same as [`InterfaceFactory::get`]
    pub unsafe fn optional<T>(&self, module: &'static str, version: &[u8]) -> Option<NonNull<T>> {
        let label = String::from_utf8_lossy(version.strip_suffix(&[0]).unwrap_or(version));

        let found = self.get(module).and_then(|f| f.try_get::<T>(version));
        match found {
            Some(ptr) => tracing::info!("{}: {:p}", label, ptr.as_ptr()),
            None => tracing::debug!("{}: not available", label),
        }
        found
    }
}

/// Load all engine interfaces
///
/// Required: engine client, client DLL, entity list, model info and cvar.
/// Any other interface that cannot be found is left `None`.
///
/// # Safety
/// Every registered factory must be a callable CreateInterface.
#[tracing::instrument(skip_all)]
pub unsafe fn load_interfaces(factories: &ModuleFactories) -> Result<EngineGlobals, InterfaceError> {
    // Required interfaces - fail if any are missing
    let engine_client = factories.require::<IVEngineClient>("engine", versions::ENGINE_CLIENT)?;
    tracing::info!("IVEngineClient: {:p}", engine_client.as_ptr());

    let client = factories.require::<IBaseClientDLL>("client", versions::CLIENT_DLL)?;
    tracing::info!("IBaseClientDLL: {:p}", client.as_ptr());

    let entity_list =
        factories.require::<IClientEntityList>("client", versions::CLIENT_ENTITY_LIST)?;
    tracing::info!("IClientEntityList: {:p}", entity_list.as_ptr());

    let model_info = factories.require::<IVModelInfoClient>("engine", versions::MODEL_INFO)?;
    tracing::info!("IVModelInfoClient: {:p}", model_info.as_ptr());

    let cvar = factories.require::<ICvar>("vstdlib", versions::CVAR)?;
    tracing::info!("ICvar: {:p}", cvar.as_ptr());

    let mut globals = EngineGlobals::new(engine_client, client, entity_list, model_info, cvar);

    // Optional interfaces - log but don't fail
    globals.engine_trace = factories.optional("engine", versions::ENGINE_TRACE);
    globals.material_system = factories.optional("materialsystem", versions::MATERIAL_SYSTEM);
    globals.render_view = factories.optional("engine", versions::RENDER_VIEW);
    globals.model_render = factories.optional("engine", versions::MODEL_RENDER);
    globals.studio_render = factories.optional("studiorender", versions::STUDIO_RENDER);
    globals.physics = factories.optional("vphysics", versions::PHYSICS);
    globals.physics_collision = factories.optional("vphysics", versions::PHYSICS_COLLISION);
    globals.game_event_manager = factories.optional("engine", versions::GAME_EVENT_MANAGER);
    globals.input_system = factories.optional("inputsystem", versions::INPUT_SYSTEM);
    globals.panel = factories.optional("vgui2", versions::VGUI_PANEL);
    globals.surface = factories.optional("vguimatsurface", versions::VGUI_SURFACE);
    globals.engine_vgui = factories.optional("engine", versions::ENGINE_VGUI);
    globals.engine_server = factories.optional("engine", versions::ENGINE_SERVER);
    globals.player_info_manager = factories.optional("server", versions::PLAYER_INFO_MANAGER);
    globals.server_game_dll = factories.optional("server", versions::SERVER_GAME_DLL);

    tracing::info!(
        "Loaded 5 required and {} optional interfaces",
        globals.optional_count()
    );

    Ok(globals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{c_char, c_void};

    static SENTINEL: [u64; 1] = [0];

    fn sentinel() -> *mut c_void {
        SENTINEL.as_ptr() as *mut c_void
    }

    /// Knows the five required interfaces plus the material system
    unsafe extern "C" fn fake_factory(name: *const c_char, ret: *mut i32) -> *mut c_void {
        let name = CStr::from_ptr(name).to_bytes_with_nul();
        let known = [
            versions::ENGINE_CLIENT,
            versions::CLIENT_DLL,
            versions::CLIENT_ENTITY_LIST,
            versions::MODEL_INFO,
            versions::CVAR,
            versions::MATERIAL_SYSTEM,
        ];
        let found = known.contains(&name);
        if !ret.is_null() {
            *ret = if found { 0 } else { 1 };
        }
        if found {
            sentinel()
        } else {
            std::ptr::null_mut()
        }
    }

    unsafe extern "C" fn null_factory(_: *const c_char, _: *mut i32) -> *mut c_void {
        std::ptr::null_mut()
    }

    fn all_modules(factory: CreateInterfaceFn) -> ModuleFactories {
        let mut factories = ModuleFactories::new();
        for module in ["engine", "client", "vstdlib", "materialsystem", "vphysics"] {
            factories.insert(module, factory);
        }
        factories
    }

    #[test]
    fn test_get_rejects_unterminated_version() {
        let factory = InterfaceFactory::new(fake_factory, "engine");
        let err = unsafe { factory.get::<c_void>(b"VEngineClient014") }.unwrap_err();
        assert!(matches!(err, InterfaceError::InvalidVersionString(_)));
    }

    #[test]
    fn test_get_maps_null_to_error() {
        let factory = InterfaceFactory::new(null_factory, "engine");
        let err = unsafe { factory.get::<c_void>(versions::ENGINE_CLIENT) }.unwrap_err();
        match err {
            InterfaceError::NotFound { version, module, .. } => {
                assert_eq!(version, "VEngineClient014");
                assert_eq!(module, "engine");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_with_optional_missing() {
        let factories = all_modules(fake_factory);
        let globals = unsafe { load_interfaces(&factories) }.unwrap();

        assert_eq!(globals.engine_client_ptr() as *mut c_void, sentinel());
        assert!(globals.material_system.is_some());
        assert!(globals.physics.is_none());
        assert_eq!(globals.optional_count(), 1);
    }

    #[test]
    fn test_load_fails_on_required() {
        let factories = all_modules(null_factory);
        let err = unsafe { load_interfaces(&factories) }.err().unwrap();
        assert!(matches!(err, InterfaceError::NotFound { code: 0, .. }));

        let mut partial = ModuleFactories::new();
        partial.insert("engine", fake_factory);
        let err = unsafe { load_interfaces(&partial) }.err().unwrap();
        assert!(matches!(err, InterfaceError::MissingFactory(ref m) if m == "client"));
    }
}
