//! Global listeners for level lifecycle, client, and frame events
//!
//! Callbacks are stored in one thread-safe registry and invoked when the
//! plugin callbacks (or a `FrameStageNotify` hook) report the event.
//!
//! # Example
//!
//! ```ignore
//! use tf2rust_core::listeners;
//!
//! let key = listeners::on_level_init(|map_name| {
//!     tracing::info!("Level init: {}", map_name);
//! });
//!
//! // Later, unregister if needed
//! listeners::remove_listener(key);
//! ```

pub mod client;
pub mod server;

use std::sync::LazyLock;

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key for registered listeners, used for removal
    pub struct ListenerKey;
}

/// A registered callback, tagged by the event it listens to
pub(crate) enum Listener {
    LevelInit(server::LevelInitCallback),
    ServerActivate(server::ServerActivateCallback),
    GameFrame(server::GameFrameCallback),
    LevelShutdown(server::LevelShutdownCallback),
    ClientActive(client::ClientActiveCallback),
    ClientDisconnect(client::ClientDisconnectCallback),
    FrameStage(client::FrameStageCallback),
}

#[derive(Default)]
pub(crate) struct Registry {
    listeners: SlotMap<ListenerKey, Listener>,
}

impl Registry {
    pub(crate) fn insert(&mut self, listener: Listener) -> ListenerKey {
        self.listeners.insert(listener)
    }

    pub(crate) fn remove(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.listeners.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Clone out the callbacks matching `select` so they run without the lock
    pub(crate) fn collect<T>(&self, select: impl Fn(&Listener) -> Option<T>) -> Vec<T> {
        self.listeners.values().filter_map(select).collect()
    }
}

static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::default()));

fn register(listener: Listener) -> ListenerKey {
    REGISTRY.write().insert(listener)
}

fn snapshot<T>(select: impl Fn(&Listener) -> Option<T>) -> Vec<T> {
    REGISTRY.read().collect(select)
}

/// Remove a listener by its key
///
/// Returns `true` if the listener was found and removed.
pub fn remove_listener(key: ListenerKey) -> bool {
    REGISTRY.write().remove(key)
}

/// Drop every registered listener (called on plugin unload)
pub fn clear_all() {
    let mut registry = REGISTRY.write();
    tracing::debug!("Clearing {} listeners", registry.len());
    registry.clear();
}

/// Number of registered listeners
pub fn listener_count() -> usize {
    REGISTRY.read().len()
}

// Re-export public API
pub use client::{on_client_active, on_client_disconnect, on_frame_stage};
pub use server::{on_game_frame, on_level_init, on_level_shutdown, on_server_activate};

// Fire functions for the plugin crate
pub use client::{fire_client_active, fire_client_disconnect, fire_frame_stage};
pub use server::{fire_game_frame, fire_level_init, fire_level_shutdown, fire_server_activate};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_registry_remove_and_clear() {
        let mut registry = Registry::default();
        let a = registry.insert(Listener::LevelShutdown(Arc::new(|| {})));
        let b = registry.insert(Listener::ClientActive(Arc::new(|_| {})));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert_eq!(registry.len(), 1);

        registry.clear();
        assert!(!registry.remove(b));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_collect_filters_by_kind() {
        let mut registry = Registry::default();
        registry.insert(Listener::LevelShutdown(Arc::new(|| {})));
        registry.insert(Listener::ClientActive(Arc::new(|_| {})));
        registry.insert(Listener::ClientActive(Arc::new(|_| {})));

        let active = registry.collect(|listener| match listener {
            Listener::ClientActive(callback) => Some(Arc::clone(callback)),
            _ => None,
        });
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_remove_unknown_key() {
        assert!(!remove_listener(ListenerKey::default()));
    }
}
