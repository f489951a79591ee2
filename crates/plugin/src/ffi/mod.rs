//! Engine-facing exports and the plugin callbacks object

pub mod callbacks;
pub mod exports;

pub use callbacks::{PluginCallbacksVTable, ServerPlugin, PLUGIN};
pub use exports::CreateInterface;
