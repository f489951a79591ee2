//! TF2 Rust Plugin - FFI Layer
//!
//! This crate is the boundary between the engine's server plugin loader
//! and the Rust core logic. It compiles to a cdylib (.so/.dll) that the
//! engine loads from `tf/addons/tf2rust/bin/`.

pub mod ffi;

pub use tf2rust_core::shutdown;
