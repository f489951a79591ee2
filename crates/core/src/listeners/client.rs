//! Client and frame stage listeners
//!
//! - ClientActive: a client finished connecting and is in game
//! - ClientDisconnect: a client is leaving
//! - FrameStage: a `FrameStageNotify` stage on the client

use std::sync::Arc;

use tf2rust_sdk::ClientFrameStage;

use super::{register, snapshot, Listener, ListenerKey};

// Callback types
pub type ClientActiveCallback = Arc<dyn Fn(i32) + Send + Sync>;
pub type ClientDisconnectCallback = Arc<dyn Fn(i32) + Send + Sync>;
pub type FrameStageCallback = Arc<dyn Fn(ClientFrameStage) + Send + Sync>;

// === ClientActive ===

/// Register a callback for when a client becomes active
///
/// The callback receives the player slot (entity index - 1).
pub fn on_client_active<F>(callback: F) -> ListenerKey
where
    F: Fn(i32) + Send + Sync + 'static,
{
    register(Listener::ClientActive(Arc::new(callback)))
}

pub fn fire_client_active(slot: i32) {
    tracing::debug!("Firing ClientActive: slot {}", slot);
    let callbacks = snapshot(|listener| match listener {
        Listener::ClientActive(callback) => Some(Arc::clone(callback)),
        _ => None,
    });
    for callback in callbacks {
        callback(slot);
    }
}

// === ClientDisconnect ===

/// Register a callback for when a client disconnects
///
/// The callback receives the player slot.
pub fn on_client_disconnect<F>(callback: F) -> ListenerKey
where
    F: Fn(i32) + Send + Sync + 'static,
{
    register(Listener::ClientDisconnect(Arc::new(callback)))
}

pub fn fire_client_disconnect(slot: i32) {
    tracing::debug!("Firing ClientDisconnect: slot {}", slot);
    let callbacks = snapshot(|listener| match listener {
        Listener::ClientDisconnect(callback) => Some(Arc::clone(callback)),
        _ => None,
    });
    for callback in callbacks {
        callback(slot);
    }
}

// === FrameStage ===

/// Register a callback for client frame stages
pub fn on_frame_stage<F>(callback: F) -> ListenerKey
where
    F: Fn(ClientFrameStage) + Send + Sync + 'static,
{
    register(Listener::FrameStage(Arc::new(callback)))
}

/// Fire frame stage callbacks (from a `FrameStageNotify` hook)
pub fn fire_frame_stage(stage: ClientFrameStage) {
    let callbacks = snapshot(|listener| match listener {
        Listener::FrameStage(callback) => Some(Arc::clone(callback)),
        _ => None,
    });
    for callback in callbacks {
        callback(stage);
    }
}
