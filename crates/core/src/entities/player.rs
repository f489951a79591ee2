//! Player entity wrapper and utilities
//!
//! # Player Access
//!
//! ```ignore
//! use tf2rust_core::entities::{local_player, players};
//!
//! if let Some(me) = local_player() {
//!     println!("{:?} with {} HP", me.tf_class(), me.health());
//! }
//!
//! for player in players().filter(TFPlayer::is_alive) {
//!     println!("{:?}", player.eye_position());
//! }
//! ```

use std::ffi::c_void;
use std::marker::PhantomData;

use tf2rust_macros::NetClass;
use tf2rust_sdk::enums::player_flags;
use tf2rust_sdk::{LifeState, TFClass, Vector3};

use super::base_entity::BaseEntity;
use super::entity_list::get_client_entity;
use crate::client::EngineClient;
use crate::recvprop::NetClass;

/// Maximum number of player slots
pub const MAX_PLAYERS: usize = 101;

/// Wrapper for `C_TFPlayer`
///
/// Props live in nested tables (`m_PlayerClass`, `m_Shared`, the local
/// player data); lookups through `DT_TFPlayer` and `DT_BasePlayer` walk
/// into them and add the nested offsets.
#[derive(NetClass)]
#[netclass(table = "DT_TFPlayer")]
pub struct TFPlayer {
    ptr: *mut c_void,

    #[netprop(prop = "m_iHealth", table = "DT_BasePlayer")]
    _health: PhantomData<i32>,

    #[netprop(prop = "m_lifeState", table = "DT_BasePlayer")]
    _life_state: PhantomData<u8>,

    #[netprop(prop = "m_fFlags", table = "DT_BasePlayer", readonly)]
    _flags: PhantomData<i32>,

    #[netprop(prop = "m_nTickBase", table = "DT_BasePlayer", readonly)]
    _tick_base: PhantomData<i32>,

    #[netprop(prop = "m_vecViewOffset[0]", table = "DT_BasePlayer", readonly)]
    _view_offset: PhantomData<Vector3>,

    #[netprop(prop = "m_iClass", readonly)]
    _player_class: PhantomData<i32>,

    #[netprop(prop = "m_nPlayerCond")]
    _player_cond: PhantomData<i32>,
}

impl TFPlayer {
    /// The player as a plain entity
    pub fn entity(&self) -> Option<BaseEntity> {
        // SAFETY: every player is a C_BaseEntity
        unsafe { BaseEntity::from_ptr(self.ptr) }
    }

    pub fn is_alive(&self) -> bool {
        self.try_life_state()
            .is_some_and(|state| LifeState::try_from(i32::from(state)) == Ok(LifeState::Alive))
    }

    /// Life state as an enum
    pub fn life(&self) -> Option<LifeState> {
        LifeState::try_from(i32::from(self.try_life_state()?)).ok()
    }

    /// Player class; None if unresolved or out of range
    pub fn tf_class(&self) -> Option<TFClass> {
        TFClass::try_from(self.try_player_class()?).ok()
    }

    /// Player condition bit `cond` (for the first 32 conditions)
    pub fn in_cond(&self, cond: u32) -> bool {
        cond < 32 && self.try_player_cond().is_some_and(|bits| bits & (1 << cond) != 0)
    }

    pub fn is_on_ground(&self) -> bool {
        self.try_flags()
            .is_some_and(|flags| flags & player_flags::FL_ONGROUND != 0)
    }

    /// Eye position: absolute origin plus view offset
    pub fn eye_position(&self) -> Option<Vector3> {
        let view_offset = self.try_view_offset()?;
        Some(self.entity()?.abs_origin()? + view_offset)
    }
}

/// Player in slot `index` (1-based entity index)
pub fn get_player(index: i32) -> Option<TFPlayer> {
    if index < 1 || index as usize > MAX_PLAYERS {
        return None;
    }
    let ptr = get_client_entity(index)?;
    unsafe { TFPlayer::from_ptr(ptr) }
}

/// The local player
pub fn local_player() -> Option<TFPlayer> {
    get_player(EngineClient::get()?.local_player())
}

/// Iterate players in slots 1..=max_clients
pub fn players() -> impl Iterator<Item = TFPlayer> {
    let max_clients = EngineClient::get().map_or(0, |e| e.max_clients());
    (1..=max_clients).filter_map(get_player)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_metadata() {
        assert_eq!(TFPlayer::TABLE_NAME, "DT_TFPlayer");
        assert_eq!(TFPlayer::HEALTH_TABLE, "DT_BasePlayer");
        assert_eq!(TFPlayer::PLAYER_CLASS_TABLE, "DT_TFPlayer");
        assert_eq!(TFPlayer::PLAYER_CLASS_PROP, "m_iClass");
        assert_eq!(TFPlayer::VIEW_OFFSET_PROP, "m_vecViewOffset[0]");
    }

    #[test]
    fn test_without_engine() {
        let mut memory = [0u8; 64];
        let player =
            unsafe { TFPlayer::from_ptr(memory.as_mut_ptr() as *mut c_void) }.unwrap();

        assert!(!player.is_alive());
        assert!(player.tf_class().is_none());
        assert!(!player.in_cond(5));
        assert!(player.eye_position().is_none());
        assert!(get_player(1).is_none());
        assert!(get_player(0).is_none());
        assert!(local_player().is_none());
        assert_eq!(players().count(), 0);
    }

    #[test]
    #[ignore]
    fn test_local_player_in_game() {
        let me = local_player().expect("in game");
        assert!(me.tf_class().is_some());
    }
}
