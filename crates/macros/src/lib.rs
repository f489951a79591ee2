//! TF2 Rust Proc Macros
//!
//! - `#[derive(NetClass)]` - Generate typed accessors for networked entity props
//!
//! # Example
//!
//! ```ignore
//! use tf2rust_macros::NetClass;
//! use std::ffi::c_void;
//! use std::marker::PhantomData;
//!
//! #[derive(NetClass)]
//! #[netclass(table = "DT_TFPlayer")]
//! pub struct TFPlayer {
//!     ptr: *mut c_void,
//!
//!     #[netprop(prop = "m_iHealth", table = "DT_BasePlayer")]
//!     health: PhantomData<i32>,
//!
//!     #[netprop(prop = "m_iClass", readonly)]
//!     class: PhantomData<i32>,
//! }
//!
//! // Generated:
//! // - player.health() -> i32, player.try_health() -> Option<i32>
//! // - player.set_health(300)
//! // - player.class() -> i32 (no setter)
//! // - TFPlayer::health_offset() -> Result<i32, RecvPropError>
//! ```
//!
//! # Attributes
//!
//! ## Struct Attributes
//!
//! - `#[netclass(table = "DT_Name")]` - **Required.** Default RecvTable for props.
//!
//! ## Field Attributes
//!
//! - `#[netprop(prop = "m_name")]` - Mark as a networked prop.
//! - `#[netprop(table = "DT_Other")]` - Look the prop up in another table.
//! - `#[netprop(readonly)]` - Don't generate a setter.

mod net_class;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for networked entity wrappers
///
/// The struct must have a `ptr: *mut c_void` field pointing at the entity.
/// Every field with `#[netprop(prop = "...")]` gets:
///
/// - A getter (`fn health(&self) -> i32`), panicking if the prop is unknown
/// - A fallible getter (`fn try_health(&self) -> Option<i32>`)
/// - A setter (`fn set_health(&mut self, value: i32)`) unless `readonly`
/// - `HEALTH_PROP` / `HEALTH_TABLE` constants and `health_offset()`
///
/// Offsets are resolved once and cached in a per-field static. The struct
/// also gets `TABLE_NAME`, `as_ptr()` and a `NetClass` implementation.
#[proc_macro_derive(NetClass, attributes(netclass, netprop))]
pub fn derive_net_class(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    net_class::derive_net_class(input).into()
}
