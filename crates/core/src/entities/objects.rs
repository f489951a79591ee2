//! Engineer building wrappers

use std::ffi::c_void;
use std::marker::PhantomData;

use tf2rust_macros::NetClass;
use tf2rust_sdk::{ObjectType, SentryGunState, TeleporterState};

use super::handle::Handle;
use super::player::TFPlayer;
use crate::recvprop::NetClass;

/// Wrapper for `C_BaseObject`, common to all buildings
#[derive(NetClass)]
#[netclass(table = "DT_BaseObject")]
pub struct BaseObject {
    ptr: *mut c_void,

    #[netprop(prop = "m_iHealth")]
    _health: PhantomData<i32>,

    #[netprop(prop = "m_iMaxHealth", readonly)]
    _max_health: PhantomData<i32>,

    #[netprop(prop = "m_iUpgradeLevel", readonly)]
    _upgrade_level: PhantomData<i32>,

    #[netprop(prop = "m_bBuilding", readonly)]
    _building: PhantomData<bool>,

    #[netprop(prop = "m_bHasSapper", readonly)]
    _has_sapper: PhantomData<bool>,

    #[netprop(prop = "m_bCarried", readonly)]
    _carried: PhantomData<bool>,

    #[netprop(prop = "m_iObjectType", readonly)]
    _object_type: PhantomData<i32>,

    #[netprop(prop = "m_hBuilder", readonly)]
    _builder: PhantomData<Handle<TFPlayer>>,
}

impl BaseObject {
    /// Building kind; None if unresolved or unknown
    pub fn kind(&self) -> Option<ObjectType> {
        ObjectType::try_from(self.try_object_type()?).ok()
    }

    /// Engineer who built this
    pub fn owner(&self) -> Option<TFPlayer> {
        self.try_builder()?.get()
    }

    /// Reinterpret as a sentry if it is one
    pub fn as_sentrygun(&self) -> Option<Sentrygun> {
        if self.kind()? != ObjectType::Sentrygun {
            return None;
        }
        unsafe { Sentrygun::from_ptr(self.ptr) }
    }

    /// Reinterpret as a teleporter if it is one
    pub fn as_teleporter(&self) -> Option<Teleporter> {
        if self.kind()? != ObjectType::Teleporter {
            return None;
        }
        unsafe { Teleporter::from_ptr(self.ptr) }
    }
}

/// Wrapper for `C_ObjectSentrygun`
#[derive(NetClass)]
#[netclass(table = "DT_ObjectSentrygun")]
pub struct Sentrygun {
    ptr: *mut c_void,

    #[netprop(prop = "m_iState", readonly)]
    _state: PhantomData<i32>,

    #[netprop(prop = "m_iAmmoShells", readonly)]
    _ammo_shells: PhantomData<i32>,

    #[netprop(prop = "m_iAmmoRockets", readonly)]
    _ammo_rockets: PhantomData<i32>,

    #[netprop(prop = "m_iUpgradeLevel", table = "DT_BaseObject", readonly)]
    _upgrade_level: PhantomData<i32>,
}

impl Sentrygun {
    pub fn sentry_state(&self) -> Option<SentryGunState> {
        SentryGunState::try_from(self.try_state()?).ok()
    }

    pub fn base(&self) -> Option<BaseObject> {
        unsafe { BaseObject::from_ptr(self.ptr) }
    }
}

/// Wrapper for `C_ObjectTeleporter`
#[derive(NetClass)]
#[netclass(table = "DT_ObjectTeleporter")]
pub struct Teleporter {
    ptr: *mut c_void,

    #[netprop(prop = "m_iState", readonly)]
    _state: PhantomData<i32>,

    #[netprop(prop = "m_flRechargeTime", readonly)]
    _recharge_time: PhantomData<f32>,

    #[netprop(prop = "m_iTimesUsed", readonly)]
    _times_used: PhantomData<i32>,

    #[netprop(prop = "m_iUpgradeLevel", table = "DT_BaseObject", readonly)]
    _upgrade_level: PhantomData<i32>,
}

impl Teleporter {
    pub fn teleporter_state(&self) -> Option<TeleporterState> {
        TeleporterState::try_from(self.try_state()?).ok()
    }

    /// Ready to send a player
    pub fn is_ready(&self) -> bool {
        self.teleporter_state() == Some(TeleporterState::Ready)
    }

    pub fn base(&self) -> Option<BaseObject> {
        unsafe { BaseObject::from_ptr(self.ptr) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables() {
        assert_eq!(BaseObject::TABLE_NAME, "DT_BaseObject");
        assert_eq!(Sentrygun::STATE_TABLE, "DT_ObjectSentrygun");
        assert_eq!(Sentrygun::UPGRADE_LEVEL_TABLE, "DT_BaseObject");
        assert_eq!(Teleporter::STATE_PROP, "m_iState");
    }

    #[test]
    fn test_state_offsets_injected() {
        __SENTRYGUN__STATE_OFFSET.set(8).unwrap();
        __TELEPORTER__STATE_OFFSET.set(12).unwrap();

        let mut memory = [0i32; 4];
        memory[2] = SentryGunState::Attacking as i32;
        memory[3] = TeleporterState::Ready as i32;
        let ptr = memory.as_mut_ptr() as *mut c_void;

        let sentry = unsafe { Sentrygun::from_ptr(ptr) }.unwrap();
        assert_eq!(sentry.sentry_state(), Some(SentryGunState::Attacking));

        let teleporter = unsafe { Teleporter::from_ptr(ptr) }.unwrap();
        assert_eq!(teleporter.teleporter_state(), Some(TeleporterState::Ready));
        assert!(teleporter.is_ready());

        memory[3] = 42;
        assert_eq!(teleporter.teleporter_state(), None);
    }

    #[test]
    fn test_base_object_without_engine() {
        let mut memory = [0u8; 32];
        let object = unsafe { BaseObject::from_ptr(memory.as_mut_ptr() as *mut c_void) }.unwrap();
        assert!(object.kind().is_none());
        assert!(object.owner().is_none());
        assert!(object.as_sentrygun().is_none());
    }
}
