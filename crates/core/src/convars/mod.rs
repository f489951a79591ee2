//! ConVar System - Access game convars
//!
//! # Example
//!
//! ```ignore
//! use tf2rust_core::convars::ConVar;
//!
//! if let Some(cheats) = ConVar::find("sv_cheats") {
//!     if cheats.get_bool() {
//!         tracing::warn!("Cheats are enabled!");
//!     }
//!     cheats.set_int(0);
//! }
//! ```

mod convar;
mod vtable;

pub use convar::ConVar;
pub use vtable::{find_var, set_value_float, set_value_int, set_value_string};

// Re-export SDK types for convenience
pub use tf2rust_sdk::convar::{flags, ConCommandBase};
