//! `player_info_t` as filled by `IVEngineClient::GetPlayerInfo`

use std::ffi::c_char;

pub const MAX_PLAYER_NAME_LENGTH: usize = 32;
pub const SIGNED_GUID_LEN: usize = 32;
pub const MAX_CUSTOM_FILES: usize = 4;

#[repr(C)]
#[derive(Clone, Copy)]
pub struct PlayerInfo {
    pub name: [c_char; MAX_PLAYER_NAME_LENGTH],
    pub user_id: i32,
    pub guid: [c_char; SIGNED_GUID_LEN + 1],
    pub friends_id: u32,
    pub friends_name: [c_char; MAX_PLAYER_NAME_LENGTH],
    pub fake_player: bool,
    pub is_hltv: bool,
    pub is_replay: bool,
    pub custom_files: [u32; MAX_CUSTOM_FILES],
    pub files_downloaded: u8,
}

fn fixed_str(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl PlayerInfo {
    /// Zeroed buffer to pass to the engine
    pub fn zeroed() -> Self {
        // SAFETY: plain data, all-zero is valid for every field
        unsafe { std::mem::zeroed() }
    }

    /// Display name
    pub fn name(&self) -> String {
        fixed_str(&self.name)
    }

    /// Steam ID text (`STEAM_...` or `[U:1:...]`)
    pub fn guid(&self) -> String {
        fixed_str(&self.guid)
    }

    /// Bot or HLTV/replay proxy
    pub fn is_fake(&self) -> bool {
        self.fake_player || self.is_hltv || self.is_replay
    }
}

impl std::fmt::Debug for PlayerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerInfo")
            .field("name", &self.name())
            .field("user_id", &self.user_id)
            .field("guid", &self.guid())
            .field("friends_id", &self.friends_id)
            .field("fake_player", &self.fake_player)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_layout() {
        assert_eq!(offset_of!(PlayerInfo, user_id), 32);
        assert_eq!(offset_of!(PlayerInfo, guid), 36);
        assert_eq!(offset_of!(PlayerInfo, friends_id), 72);
        assert_eq!(offset_of!(PlayerInfo, fake_player), 108);
        assert_eq!(offset_of!(PlayerInfo, custom_files), 112);
        assert_eq!(size_of::<PlayerInfo>(), 132);
    }

    #[test]
    fn test_name_stops_at_nul() {
        let mut info = PlayerInfo::zeroed();
        for (slot, b) in info.name.iter_mut().zip(b"Heavy\0junk") {
            *slot = *b as c_char;
        }
        assert_eq!(info.name(), "Heavy");
        assert_eq!(info.guid(), "");
        assert!(!info.is_fake());

        info.fake_player = true;
        assert!(info.is_fake());
    }
}
