//! Level lifecycle listeners
//!
//! - LevelInit: a map is loading
//! - ServerActivate: the map is loaded and edicts are allocated
//! - GameFrame: once per server frame
//! - LevelShutdown: the map is unloading

use std::sync::Arc;

use super::{register, snapshot, Listener, ListenerKey};

// Callback types
pub type LevelInitCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type ServerActivateCallback = Arc<dyn Fn(i32) + Send + Sync>;
pub type GameFrameCallback = Arc<dyn Fn(bool) + Send + Sync>;
pub type LevelShutdownCallback = Arc<dyn Fn() + Send + Sync>;

// === LevelInit ===

/// Register a callback for level init
///
/// The callback receives the map name (e.g., "ctf_2fort").
pub fn on_level_init<F>(callback: F) -> ListenerKey
where
    F: Fn(&str) + Send + Sync + 'static,
{
    register(Listener::LevelInit(Arc::new(callback)))
}

pub fn fire_level_init(map_name: &str) {
    tracing::info!("Firing LevelInit: {}", map_name);
    let callbacks = snapshot(|listener| match listener {
        Listener::LevelInit(callback) => Some(Arc::clone(callback)),
        _ => None,
    });
    for callback in callbacks {
        callback(map_name);
    }
}

// === ServerActivate ===

/// Register a callback for server activation
///
/// The callback receives the maximum client count.
pub fn on_server_activate<F>(callback: F) -> ListenerKey
where
    F: Fn(i32) + Send + Sync + 'static,
{
    register(Listener::ServerActivate(Arc::new(callback)))
}

pub fn fire_server_activate(max_clients: i32) {
    tracing::info!("Firing ServerActivate: {} clients", max_clients);
    let callbacks = snapshot(|listener| match listener {
        Listener::ServerActivate(callback) => Some(Arc::clone(callback)),
        _ => None,
    });
    for callback in callbacks {
        callback(max_clients);
    }
}

// === GameFrame ===

/// Register a callback to be called every server frame
///
/// `simulating` is false while the server is paused or hibernating.
pub fn on_game_frame<F>(callback: F) -> ListenerKey
where
    F: Fn(bool) + Send + Sync + 'static,
{
    register(Listener::GameFrame(Arc::new(callback)))
}

pub fn fire_game_frame(simulating: bool) {
    let callbacks = snapshot(|listener| match listener {
        Listener::GameFrame(callback) => Some(Arc::clone(callback)),
        _ => None,
    });
    for callback in callbacks {
        callback(simulating);
    }
}

// === LevelShutdown ===

pub fn on_level_shutdown<F>(callback: F) -> ListenerKey
where
    F: Fn() + Send + Sync + 'static,
{
    register(Listener::LevelShutdown(Arc::new(callback)))
}

pub fn fire_level_shutdown() {
    tracing::info!("Firing LevelShutdown");
    let callbacks = snapshot(|listener| match listener {
        Listener::LevelShutdown(callback) => Some(Arc::clone(callback)),
        _ => None,
    });
    for callback in callbacks {
        callback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::remove_listener;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn test_level_init_receives_map() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&seen);
        let key = on_level_init(move |map| sink.lock().push(map.to_owned()));

        fire_level_init("ctf_2fort");
        assert!(remove_listener(key));
        fire_level_init("pl_badwater");

        let seen = seen.lock();
        assert!(seen.iter().any(|m| m == "ctf_2fort"));
        assert!(!seen.iter().any(|m| m == "pl_badwater"));
    }

    #[test]
    fn test_server_activate_and_frame() {
        let max = Arc::new(AtomicI32::new(0));
        let frames = Arc::new(AtomicI32::new(0));

        let max_sink = Arc::clone(&max);
        let activate = on_server_activate(move |n| max_sink.store(n, Ordering::SeqCst));
        let frame_sink = Arc::clone(&frames);
        let frame = on_game_frame(move |simulating| {
            if simulating {
                frame_sink.fetch_add(1, Ordering::SeqCst);
            }
        });

        fire_server_activate(24);
        fire_game_frame(true);
        fire_game_frame(false);
        fire_game_frame(true);

        assert!(remove_listener(activate));
        assert!(remove_listener(frame));
        assert_eq!(max.load(Ordering::SeqCst), 24);
        assert_eq!(frames.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_callback_may_register_during_fire() {
        let inner_keys = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&inner_keys);
        let outer = on_level_shutdown(move || {
            sink.lock().push(on_level_shutdown(|| {}));
        });

        fire_level_shutdown();

        assert!(remove_listener(outer));
        for key in inner_keys.lock().drain(..) {
            assert!(remove_listener(key));
        }
    }
}
