//! Source 1 engine interface type definitions
//!
//! Opaque types standing in for C++ interfaces. Only pointers to them are
//! ever held; methods are reached through the vtable at offset 0.

use std::ffi::c_void;

macro_rules! opaque_interface {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            pub struct $name {
                _opaque: [u8; 0],
            }
        )*
    };
}

opaque_interface! {
    /// Client-side engine interface (`engine` module)
    IVEngineClient;

    /// Client game DLL entry point, owner of `GetAllClasses`
    IBaseClientDLL;

    /// Client entity list
    IClientEntityList;

    /// Client-side entity (`C_BaseEntity` through `IClientEntity`)
    IClientEntity;

    /// Networkable subobject of a client entity
    IClientNetworkable;

    /// Model info (names, studio headers)
    IVModelInfoClient;

    /// Ray and hull traces
    IEngineTrace;

    /// Console variable registry
    ICvar;

    /// Material system
    IMaterialSystem;

    /// A single material
    IMaterial;

    /// Render view (blend, colour modulation)
    IVRenderView;

    /// Model renderer
    IVModelRender;

    /// Studio model renderer
    IStudioRender;

    /// VPhysics environment factory
    IPhysics;

    /// VPhysics collision queries
    IPhysicsCollision;

    /// One physics object
    IPhysicsObject;

    /// Legacy game event manager
    IGameEventManager2;

    /// Input system
    IInputSystem;

    /// VGUI panel interface
    IPanel;

    /// VGUI drawing surface
    ISurface;

    /// Engine VGUI hooks
    IEngineVGui;

    /// Server-side engine interface
    IVEngineServer;

    /// Server player info manager
    IPlayerInfoManager;

    /// Server game DLL
    IServerGameDLL;

    /// Read-only net channel statistics
    INetChannelInfo;

    /// Engine net channel implementation
    CNetChannel;

    /// Plugin callback interface implemented by us
    IServerPluginCallbacks;
}

/// CreateInterface function signature
///
/// Each engine module exports one. Returns the interface registered under
/// `name` or null; `return_code` (nullable) receives `IFACE_OK`/`IFACE_FAILED`.
pub type CreateInterfaceFn =
    unsafe extern "C" fn(name: *const std::ffi::c_char, return_code: *mut i32) -> *mut c_void;

/// `CreateInterface` succeeded
pub const IFACE_OK: i32 = 0;

/// `CreateInterface` did not know the name
pub const IFACE_FAILED: i32 = 1;
