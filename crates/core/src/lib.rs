//! TF2 Rust Plugin - Core Logic
//!
//! This crate contains the framework logic built on top of the layout
//! mirrors in [`sdk`] and the interface globals in [`engine`]: GameData,
//! signature scanning, function thunks, RecvProp resolution and the typed
//! wrappers built from them.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and engine crates for convenience:
//! - [`sdk`] - Source 1 type definitions and interface version strings
//! - [`engine`] - Engine globals and interface loading

// Allow the crate to refer to itself as `tf2rust_core` for proc macro compatibility
extern crate self as tf2rust_core;

use tracing::info;

// Re-export SDK and engine crates
pub use tf2rust_engine as engine;
pub use tf2rust_sdk as sdk;

pub mod client;
pub mod config;
pub mod convars;
pub mod entities;
pub mod gamedata;
pub mod listeners;
pub mod modules;
pub mod recvprop;
pub mod sdk_manager;
pub mod thunk;

// Re-export commonly used items
pub use gamedata::{gamedata, init_gamedata, Gamedata, GamedataError};
pub use modules::{ModuleInfo, ModuleResolver, NativeModules};
pub use recvprop::{get_offset, NetClass, PropOffset, RecvPropError, RecvPropField};
pub use sdk_manager::{sdk, try_sdk, SdkError, SdkManager};
pub use thunk::{MemberFuncThunk, MemberVFuncThunk};

// Re-export wrapper types
pub use client::{EngineClient, Material, MaterialSystem, ModelInfo, NetChannel, Panel, PhysicsObject};
pub use entities::{BaseEntity, BaseHandle, BaseObject, Handle, Sentrygun, TFPlayer, Teleporter};

// Re-export listeners
pub use listeners::{
    on_client_active, on_client_disconnect, on_frame_stage, on_game_frame, on_level_init,
    on_level_shutdown, on_server_activate, remove_listener, ListenerKey,
};

// Re-export convar types
pub use convars::ConVar;

// Re-export config types
pub use config::{ConfigError, ConfigResult, CoreConfig, PluginConfig};

// Re-export macros
pub use tf2rust_macros::NetClass;

/// Resolve the props of every built-in wrapper
///
/// Returns the number of props that resolved.
pub fn prefetch_netvars() -> usize {
    let results = recvprop::prefetch_offsets(entities::KNOWN_PROPS);
    let resolved = results.iter().filter(|r| r.is_ok()).count();
    info!("Prefetched {}/{} netvars", resolved, results.len());
    resolved
}

/// Shutdown the plugin
///
/// Called from the FFI layer when the engine unloads the plugin.
pub fn shutdown() {
    info!("tf2rust shutting down...");
    listeners::clear_all();
    recvprop::clear_cache();
    if let Some(engine) = engine::try_engine() {
        engine.clear_global_vars();
    }
}
