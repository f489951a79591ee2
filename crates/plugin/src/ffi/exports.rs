//! `CreateInterface` export and the load/unload sequence

use std::ffi::{c_char, c_void, CStr};
use std::panic::catch_unwind;
use std::path::PathBuf;

use tracing::{error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

use tf2rust_core::config::{tf2rust_base_dir, ConfigResult, CoreConfig};
use tf2rust_core::engine::ModuleFactories;
use tf2rust_core::{gamedata, init_gamedata, Gamedata, NativeModules, SdkError, SdkManager};
use tf2rust_sdk::versions::PLUGIN_CALLBACKS;
use tf2rust_sdk::{CreateInterfaceFn, IFACE_FAILED, IFACE_OK};

use super::callbacks::PLUGIN;

/// Environment variable overriding `CoreConfig::log_level`
pub const LOG_ENV: &str = "TF2RUST_LOG";

/// Entry point the engine resolves on the plugin binary
///
/// Only `ISERVERPLUGINCALLBACKS003` is served.
///
/// # Safety
/// `name` must be null or a valid C string; `return_code` null or writable.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn CreateInterface(name: *const c_char, return_code: *mut i32) -> *mut c_void {
    let served = !name.is_null() && CStr::from_ptr(name).to_bytes_with_nul() == PLUGIN_CALLBACKS;

    if !return_code.is_null() {
        *return_code = if served { IFACE_OK } else { IFACE_FAILED };
    }
    if served {
        PLUGIN.as_ptr()
    } else {
        std::ptr::null_mut()
    }
}

/// `IServerPluginCallbacks::Load`
///
/// Returning `false` makes the engine report the plugin as failed; the
/// reason is only in the log.
pub(crate) fn plugin_load(
    interface_factory: Option<CreateInterfaceFn>,
    game_server_factory: Option<CreateInterfaceFn>,
) -> bool {
    let supplied = supplied_factories(interface_factory, game_server_factory);

    match catch_unwind(move || load(supplied)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!("tf2rust failed to load: {}", e);
            false
        }
        Err(_) => {
            error!("Panic during load");
            false
        }
    }
}

/// `IServerPluginCallbacks::Unload`
pub(crate) fn plugin_unload() {
    if catch_unwind(crate::shutdown).is_err() {
        error!("Panic during shutdown");
    }
}

/// Factories handed to `Load`, keyed by the module that serves them
fn supplied_factories(
    interface_factory: Option<CreateInterfaceFn>,
    game_server_factory: Option<CreateInterfaceFn>,
) -> ModuleFactories {
    let mut factories = ModuleFactories::new();
    if let Some(factory) = interface_factory {
        factories.insert("engine", factory);
    }
    if let Some(factory) = game_server_factory {
        factories.insert("server", factory);
    }
    factories
}

fn load(supplied: ModuleFactories) -> Result<(), SdkError> {
    let (config, config_error) = match CoreConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (CoreConfig::default(), Some(e)),
    };
    init_logging(&config.log_level);

    info!("tf2rust loading...");
    if let Some(e) = config_error {
        warn!("Using default core config: {}", e);
    }
    if supplied.len() < 2 {
        warn!("Engine passed a null factory, falling back to module exports");
    }

    let fallback;
    let gd = match load_gamedata(&config) {
        Some(gd) => gd,
        None => {
            fallback = Gamedata::default();
            &fallback
        }
    };

    match SdkManager::init(gd, &NativeModules, supplied) {
        Ok(sdk) => info!("SDK ready: {} signatures resolved", sdk.resolved_count()),
        Err(SdkError::AlreadyInitialized) => warn!("SDK already initialized"),
        Err(e) => return Err(e),
    }

    if config.prefetch_netvars {
        tf2rust_core::prefetch_netvars();
    }

    info!("tf2rust loaded");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn gamedata_path(config: &CoreConfig) -> ConfigResult<PathBuf> {
    Ok(config.gamedata_file(&tf2rust_base_dir()?))
}

#[instrument(skip_all)]
fn load_gamedata(config: &CoreConfig) -> Option<&'static Gamedata> {
    if let Some(gd) = gamedata() {
        return Some(gd);
    }

    let path = match gamedata_path(config) {
        Ok(path) => path,
        Err(e) => {
            warn!("No gamedata path: {}", e);
            return None;
        }
    };

    match init_gamedata(&path) {
        Ok(gd) => Some(gd),
        Err(e) => {
            warn!("Gamedata {:?} not loaded, using built-in indices: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_interface_serves_plugin() {
        let mut code = -1;
        let ptr = unsafe { CreateInterface(c"ISERVERPLUGINCALLBACKS003".as_ptr(), &mut code) };
        assert_eq!(ptr, PLUGIN.as_ptr());
        assert_eq!(code, IFACE_OK);
    }

    #[test]
    fn test_create_interface_rejects_other_names() {
        let mut code = -1;
        let ptr = unsafe { CreateInterface(c"ISERVERPLUGINCALLBACKS002".as_ptr(), &mut code) };
        assert!(ptr.is_null());
        assert_eq!(code, IFACE_FAILED);

        let ptr = unsafe { CreateInterface(std::ptr::null(), std::ptr::null_mut()) };
        assert!(ptr.is_null());
    }

    unsafe extern "C" fn null_factory(_: *const c_char, _: *mut i32) -> *mut c_void {
        std::ptr::null_mut()
    }

    #[test]
    fn test_supplied_factories_skip_null() {
        let both = supplied_factories(Some(null_factory), Some(null_factory));
        assert_eq!(both.len(), 2);
        assert_eq!(both.get("engine").map(|f| f.name()), Some("engine"));
        assert_eq!(both.get("server").map(|f| f.name()), Some("server"));

        let engine_only = supplied_factories(Some(null_factory), None);
        assert_eq!(engine_only.len(), 1);
        assert!(engine_only.get("server").is_none());

        assert!(supplied_factories(None, None).is_empty());
    }

    #[test]
    fn test_gamedata_path_is_under_base() {
        let config = CoreConfig::default();
        if let Ok(path) = gamedata_path(&config) {
            assert!(path.ends_with("gamedata/tf2rust.games.json"));
        }
    }
}
