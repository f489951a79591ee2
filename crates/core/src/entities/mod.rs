//! Entity wrappers using the NetClass derive
//!
//! Each wrapper provides getter/setter methods for networked props with
//! automatic offset resolution through the client's RecvTables.
//!
//! # Entity List
//!
//! ```ignore
//! use tf2rust_core::entities::{iter_entities, BaseEntity};
//!
//! for (index, ptr) in iter_entities() {
//!     let entity = unsafe { BaseEntity::from_ptr(ptr) }.unwrap();
//!     if !entity.is_dormant() {
//!         println!("{index}: {:?}", entity.class_name());
//!     }
//! }
//! ```
//!
//! # Entity Handles
//!
//! Handles provide safe references to entities that may be deleted:
//!
//! ```ignore
//! use tf2rust_core::entities::{BaseObject, Handle, TFPlayer};
//!
//! let builder: Handle<TFPlayer> = building.builder();
//! if let Some(engineer) = builder.get() {
//!     println!("Built by a player with {} HP", engineer.health());
//! }
//! ```

pub mod base_entity;
pub mod entity_list;
pub mod handle;
pub mod objects;
pub mod player;

pub use base_entity::{client_class_name, BaseEntity, NETWORKABLE_OFFSET, RENDERABLE_OFFSET};
pub use entity_list::{
    get_client_entity, get_client_entity_from_handle, get_client_networkable,
    highest_entity_index, iter_entities, max_entities, number_of_entities, EntityIterator,
};
pub use handle::{
    BaseHandle, Handle, ENT_ENTRY_MASK, INVALID_EHANDLE_INDEX, MAX_EDICTS, MAX_EDICT_BITS,
    NUM_ENT_ENTRIES, NUM_ENT_ENTRY_BITS,
};
pub use objects::{BaseObject, Sentrygun, Teleporter};
pub use player::{get_player, local_player, players, TFPlayer, MAX_PLAYERS};

/// Table/prop pairs used by the wrappers, for prefetching
pub const KNOWN_PROPS: &[(&str, &str)] = &[
    (BaseEntity::TEAM_TABLE, BaseEntity::TEAM_PROP),
    (BaseEntity::ORIGIN_TABLE, BaseEntity::ORIGIN_PROP),
    (BaseEntity::ENTITY_FLAGS_TABLE, BaseEntity::ENTITY_FLAGS_PROP),
    (BaseEntity::MODEL_INDEX_TABLE, BaseEntity::MODEL_INDEX_PROP),
    (BaseEntity::OWNER_TABLE, BaseEntity::OWNER_PROP),
    (BaseEntity::SIMULATION_TIME_TABLE, BaseEntity::SIMULATION_TIME_PROP),
    (TFPlayer::HEALTH_TABLE, TFPlayer::HEALTH_PROP),
    (TFPlayer::LIFE_STATE_TABLE, TFPlayer::LIFE_STATE_PROP),
    (TFPlayer::FLAGS_TABLE, TFPlayer::FLAGS_PROP),
    (TFPlayer::TICK_BASE_TABLE, TFPlayer::TICK_BASE_PROP),
    (TFPlayer::VIEW_OFFSET_TABLE, TFPlayer::VIEW_OFFSET_PROP),
    (TFPlayer::PLAYER_CLASS_TABLE, TFPlayer::PLAYER_CLASS_PROP),
    (TFPlayer::PLAYER_COND_TABLE, TFPlayer::PLAYER_COND_PROP),
    (BaseObject::HEALTH_TABLE, BaseObject::HEALTH_PROP),
    (BaseObject::UPGRADE_LEVEL_TABLE, BaseObject::UPGRADE_LEVEL_PROP),
    (BaseObject::BUILDING_TABLE, BaseObject::BUILDING_PROP),
    (BaseObject::OBJECT_TYPE_TABLE, BaseObject::OBJECT_TYPE_PROP),
    (BaseObject::BUILDER_TABLE, BaseObject::BUILDER_PROP),
    (Sentrygun::STATE_TABLE, Sentrygun::STATE_PROP),
    (Teleporter::STATE_TABLE, Teleporter::STATE_PROP),
];
