//! TF2 Rust SDK - Source 1 Engine Type Definitions
//!
//! Layout mirrors and opaque handles for the 64-bit Team Fortress 2
//! binaries. This crate has no dependencies and compiles quickly, allowing
//! parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`math`] - Vectors, angles and matrices
//! - [`utl`] - tier1 container views (`CUtlVector`, `CUtlBuffer`, ...)
//! - [`interfaces`] - Opaque C++ interface types
//! - [`versions`] - Interface version strings for CreateInterface
//! - [`recv`] - Client class and RecvTable reflection data
//! - [`convar`] - ConVar layout and flags
//! - [`studio`] - Studio model headers
//! - [`enums`] - Frame stages, classes, building states

pub mod convar;
pub mod enums;
pub mod globals;
pub mod interfaces;
pub mod math;
pub mod netchannel;
pub mod player_info;
pub mod recv;
pub mod studio;
pub mod utl;
pub mod versions;

pub use convar::{ConCommandBase, ConVar};
pub use enums::*;
pub use globals::CGlobalVarsBase;
pub use interfaces::*;
pub use math::{Matrix3x4, QAngle, VMatrix, Vector2D, Vector3, Vector4D};
pub use player_info::PlayerInfo;
pub use recv::{ClientClass, RecvProp, RecvTable, SendPropType};
pub use versions::INTERFACE_TABLE;
