//! Startup resolution of engine interfaces and signatures
//!
//! The [`SdkManager`] is built once during plugin load. It acquires every
//! interface in the version table, installs the engine globals, binds
//! `CGlobalVarsBase`, and scans each GameData signature in its library.
//! Signatures that fail to resolve are recorded and logged, never fatal.

use std::collections::{BTreeSet, HashMap};
use std::ffi::c_void;
use std::sync::OnceLock;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use tf2rust_engine::{
    init_engine, load_interfaces, try_engine, EngineGlobals, InterfaceError, ModuleFactories,
};
use tf2rust_sdk::versions::INTERFACE_TABLE;
use tf2rust_sdk::CGlobalVarsBase;

use crate::gamedata::{find_signature_in, Gamedata, GamedataError};
use crate::modules::{ModuleInfo, ModuleResolver};
use crate::thunk::MemberVFuncThunk;

type GetGlobalVarsFn = unsafe extern "C" fn(this: *mut c_void) -> *mut CGlobalVarsBase;

static GET_GLOBAL_VARS: MemberVFuncThunk<GetGlobalVarsFn> =
    MemberVFuncThunk::new("IPlayerInfoManager::GetGlobalVars", 1);

/// Error type for SDK manager initialization
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("Interface error: {0}")]
    Interface(#[from] InterfaceError),

    #[error("Gamedata error: {0}")]
    Gamedata(#[from] GamedataError),

    #[error("SDK manager already initialized")]
    AlreadyInitialized,
}

/// Resolved addresses of interfaces and signatures
#[derive(Debug, Default)]
pub struct SdkManager {
    /// Signature name -> address
    addresses: DashMap<String, usize>,
    /// Interface name (from the version table) -> pointer
    interfaces: DashMap<String, usize>,
    /// Signatures that could not be resolved, with the reason
    failed: DashMap<String, String>,
}

static SDK: OnceLock<SdkManager> = OnceLock::new();

impl SdkManager {
    /// Initialize the global SDK manager
    ///
    /// Loads interfaces (required ones fail the call), stores the engine
    /// globals, then resolves every signature in `gamedata`.
    ///
    /// `supplied` holds the factories the engine passed to `Load`; modules
    /// it does not cover are looked up through `resolver`.
    #[tracing::instrument(skip_all)]
    pub fn init(
        gamedata: &Gamedata,
        resolver: &dyn ModuleResolver,
        supplied: ModuleFactories,
    ) -> Result<&'static SdkManager, SdkError> {
        if SDK.get().is_some() {
            return Err(SdkError::AlreadyInitialized);
        }

        let factories = collect_factories(resolver, supplied);
        info!("Found CreateInterface in {} modules", factories.len());

        // SAFETY: every factory came from the engine or a module's CreateInterface export
        let globals = unsafe { load_interfaces(&factories)? };
        init_engine(globals)?;
        if let Some(engine) = try_engine() {
            bind_global_vars(engine);
        }

        let manager = SdkManager::default();
        manager.record_interfaces(&factories);
        manager.resolve_signatures(gamedata, resolver);

        SDK.set(manager).map_err(|_| SdkError::AlreadyInitialized)?;
        SDK.get().ok_or(SdkError::AlreadyInitialized)
    }

    /// Resolve every signature in `gamedata` against `resolver`
    ///
    /// Usable without the global instance.
    pub fn resolve(gamedata: &Gamedata, resolver: &dyn ModuleResolver) -> SdkManager {
        let manager = SdkManager::default();
        manager.resolve_signatures(gamedata, resolver);
        manager
    }

    fn record_interfaces(&self, factories: &ModuleFactories) {
        for (name, module, version) in INTERFACE_TABLE {
            let Some(factory) = factories.get(module) else {
                continue;
            };
            // SAFETY: stored as an address only
            if let Some(ptr) = unsafe { factory.try_get::<u8>(version) } {
                self.interfaces
                    .insert((*name).to_string(), ptr.as_ptr() as usize);
            }
        }
        debug!("Recorded {} interface pointers", self.interfaces.len());
    }

    fn resolve_signatures(&self, gamedata: &Gamedata, resolver: &dyn ModuleResolver) {
        let mut modules: HashMap<String, Option<ModuleInfo>> = HashMap::new();
        let names: BTreeSet<&str> = gamedata.signature_names().collect();

        for name in names {
            let library = gamedata.get_signature_library(name).unwrap_or("client");
            let module = modules
                .entry(library.to_string())
                .or_insert_with(|| resolver.module(library));

            let Some(module) = module else {
                warn!("Signature {}: module {} not loaded", name, library);
                self.failed
                    .insert(name.to_string(), format!("module {library} not loaded"));
                continue;
            };

            // SAFETY: the resolver reports a mapped, readable range
            match unsafe { find_signature_in(gamedata, name, module.base_ptr(), module.size) } {
                Ok(addr) => {
                    debug!("Signature {} -> {:p}", name, addr);
                    self.addresses.insert(name.to_string(), addr as usize);
                }
                Err(e) => {
                    warn!("Signature {}: {}", name, e);
                    self.failed.insert(name.to_string(), e.to_string());
                }
            }
        }

        info!(
            "Resolved {} signatures ({} failed)",
            self.addresses.len(),
            self.failed.len()
        );
    }

    /// Address of a resolved signature
    pub fn address(&self, name: &str) -> Option<usize> {
        self.addresses.get(name).map(|e| *e)
    }

    /// Pointer of an acquired interface, by version-table name
    pub fn interface(&self, name: &str) -> Option<usize> {
        self.interfaces.get(name).map(|e| *e)
    }

    pub fn resolved_count(&self) -> usize {
        self.addresses.len()
    }

    /// Names of signatures that failed, sorted
    pub fn failed_signatures(&self) -> Vec<String> {
        let mut names: Vec<String> = self.failed.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Failure reason for a signature
    pub fn failure_reason(&self, name: &str) -> Option<String> {
        self.failed.get(name).map(|e| e.value().clone())
    }
}

/// Point `globals` at the server's `CGlobalVarsBase`
///
/// Needs `IPlayerInfoManager`; returns whether the pointer was set.
pub fn bind_global_vars(globals: &EngineGlobals) -> bool {
    let Some(manager) = globals.player_info_manager else {
        debug!("No IPlayerInfoManager, global vars unavailable");
        return false;
    };
    let this = manager.as_ptr() as *mut c_void;

    // SAFETY: player_info_manager is a live IPlayerInfoManager
    let vars = unsafe {
        match GET_GLOBAL_VARS.get(this) {
            Some(get_global_vars) => get_global_vars(this),
            None => std::ptr::null_mut(),
        }
    };
    if vars.is_null() {
        warn!("IPlayerInfoManager::GetGlobalVars returned null");
        return false;
    }
    globals.set_global_vars(vars);
    true
}

fn collect_factories(resolver: &dyn ModuleResolver, supplied: ModuleFactories) -> ModuleFactories {
    let mut factories = supplied;
    for (_, module, _) in INTERFACE_TABLE {
        if factories.get(module).is_some() {
            continue;
        }
        match resolver.create_interface(module) {
            Some(factory) => factories.insert(*module, factory),
            None => debug!("No CreateInterface for {}", module),
        }
    }
    factories
}

/// Get the SDK manager
///
/// # Panics
/// Panics if called before `SdkManager::init`
pub fn sdk() -> &'static SdkManager {
    SDK.get().expect("SDK manager not initialized")
}

/// Try to get the SDK manager without panicking
pub fn try_sdk() -> Option<&'static SdkManager> {
    SDK.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_char;
    use std::ptr::NonNull;
    use tf2rust_sdk::{CreateInterfaceFn, IPlayerInfoManager};

    /// Serves one in-memory "client" module
    struct FakeModules {
        client: Vec<u8>,
    }

    impl ModuleResolver for FakeModules {
        fn module(&self, module: &str) -> Option<ModuleInfo> {
            (module == "client").then(|| ModuleInfo {
                name: module.to_string(),
                base: self.client.as_ptr() as usize,
                size: self.client.len(),
            })
        }

        fn create_interface(&self, _module: &str) -> Option<CreateInterfaceFn> {
            None
        }
    }

    const GAMEDATA: &str = r#"{
        "CBaseAnimating::GetBoneCache": {
            "signatures": {
                "library": "client",
                "linux": "55 48 89 E5 ? 57",
                "windows": "55 48 89 E5 ? 57"
            }
        },
        "Missing::Function": {
            "signatures": {
                "library": "client",
                "linux": "DE AD BE EF",
                "windows": "DE AD BE EF"
            }
        },
        "Server::Only": {
            "signatures": {
                "library": "server",
                "linux": "55",
                "windows": "55"
            }
        },
        "GetAllClasses": { "offsets": { "linux": 8, "windows": 8 } }
    }"#;

    #[test]
    #[cfg(any(target_os = "linux", target_os = "windows"))]
    fn test_resolve_records_successes_and_failures() {
        let gamedata = Gamedata::load_from_str(GAMEDATA).unwrap();
        let mut client = vec![0xCCu8; 64];
        client[20..26].copy_from_slice(&[0x55, 0x48, 0x89, 0xE5, 0x41, 0x57]);
        let modules = FakeModules { client };

        let manager = SdkManager::resolve(&gamedata, &modules);

        let expected = modules.client.as_ptr() as usize + 20;
        assert_eq!(manager.address("CBaseAnimating::GetBoneCache"), Some(expected));
        assert_eq!(manager.resolved_count(), 1);
        assert_eq!(
            manager.failed_signatures(),
            vec!["Missing::Function".to_string(), "Server::Only".to_string()]
        );
        assert!(manager
            .failure_reason("Server::Only")
            .unwrap()
            .contains("not loaded"));
        assert!(manager.address("Missing::Function").is_none());
        assert!(manager.interface("EngineClient").is_none());
    }

    static ENGINE_SIDE: [u64; 1] = [1];
    static MODULE_SIDE: [u64; 1] = [2];

    unsafe extern "C" fn engine_factory(_: *const c_char, _: *mut i32) -> *mut c_void {
        ENGINE_SIDE.as_ptr() as *mut c_void
    }

    unsafe extern "C" fn module_factory(_: *const c_char, _: *mut i32) -> *mut c_void {
        MODULE_SIDE.as_ptr() as *mut c_void
    }

    /// Every module exports `module_factory`
    struct ExportingModules;

    impl ModuleResolver for ExportingModules {
        fn module(&self, _module: &str) -> Option<ModuleInfo> {
            None
        }

        fn create_interface(&self, _module: &str) -> Option<CreateInterfaceFn> {
            Some(module_factory)
        }
    }

    #[test]
    fn test_supplied_factories_take_precedence() {
        let mut supplied = ModuleFactories::new();
        supplied.insert("engine", engine_factory);

        let factories = collect_factories(&ExportingModules, supplied);
        let served = |module: &str| unsafe {
            factories
                .get(module)
                .and_then(|f| f.try_get::<u64>(b"VEngineClient014\0"))
                .map(|p| p.as_ptr() as *const u64)
        };

        assert_eq!(served("engine"), Some(ENGINE_SIDE.as_ptr()));
        assert_eq!(served("client"), Some(MODULE_SIDE.as_ptr()));
    }

    #[repr(C)]
    struct FakeInfoManager {
        vtable: *const usize,
        vars: *mut CGlobalVarsBase,
    }

    unsafe extern "C" fn get_global_vars(this: *mut c_void) -> *mut CGlobalVarsBase {
        (*(this as *mut FakeInfoManager)).vars
    }

    #[test]
    fn test_bind_global_vars() {
        let globals = EngineGlobals::new(
            NonNull::dangling(),
            NonNull::dangling(),
            NonNull::dangling(),
            NonNull::dangling(),
            NonNull::dangling(),
        );
        assert!(!bind_global_vars(&globals));

        // SAFETY: all-zero is a valid CGlobalVarsBase
        let mut vars: CGlobalVarsBase = unsafe { std::mem::zeroed() };
        let vtable = [0usize, get_global_vars as usize];
        let mut manager = FakeInfoManager {
            vtable: vtable.as_ptr(),
            vars: std::ptr::null_mut(),
        };
        let manager_ptr = &mut manager as *mut FakeInfoManager;
        let mut globals = globals;
        globals.player_info_manager = NonNull::new(manager_ptr as *mut IPlayerInfoManager);

        // Null from the engine leaves the pointer unset
        assert!(!bind_global_vars(&globals));
        assert!(globals.global_vars_ptr().is_none());

        unsafe { (*manager_ptr).vars = &mut vars };
        assert!(bind_global_vars(&globals));
        assert_eq!(globals.global_vars_ptr(), Some(&mut vars as *mut CGlobalVarsBase));
    }

    #[test]
    fn test_init_fails_without_factories() {
        let gamedata = Gamedata::default();
        let modules = FakeModules { client: Vec::new() };

        let err = SdkManager::init(&gamedata, &modules, ModuleFactories::new()).unwrap_err();
        assert!(matches!(
            err,
            SdkError::Interface(InterfaceError::MissingFactory(_))
        ));
        assert!(try_sdk().is_none());
    }
}
