//! Wrappers over client-side engine interfaces
//!
//! Each wrapper holds a non-null interface pointer and calls through
//! [`MemberVFuncThunk`](crate::thunk::MemberVFuncThunk)s, so every vtable
//! index can be overridden from gamedata. Calls on an empty slot return a
//! neutral value instead of crashing.
//!
//! ```ignore
//! use tf2rust_core::client::EngineClient;
//! use tf2rust_sdk::netchannel::NetChannelFlow;
//!
//! let engine = EngineClient::get()?;
//! if let Some(chan) = engine.net_channel_info() {
//!     let ping = chan.latency(NetChannelFlow::Outgoing) * 1000.0;
//!     tracing::info!("{} ping {:.0}ms", chan.address(), ping);
//! }
//! ```

pub mod engine_client;
pub mod material;
pub mod model_info;
pub mod netchannel;
pub mod physics;
pub mod vgui;

pub use engine_client::EngineClient;
pub use material::{texture_group, Material, MaterialSystem, MaterialVarFlags};
pub use model_info::{Model, ModelInfo};
pub use netchannel::{NetChannel, NetChannelStats};
pub use physics::PhysicsObject;
pub use vgui::{Panel, VPanel};
