//! Config path resolution
//!
//! Paths are resolved from the location of the plugin binary itself, which
//! the engine loads from `tf/addons/tf2rust/bin/tf2rust.so` (`.dll` on
//! Windows). The host executable lives elsewhere, so `current_exe` is no use.

use std::path::{Path, PathBuf};

use super::{ConfigError, ConfigResult};

/// Path of the shared object containing this code
pub fn plugin_binary_path() -> ConfigResult<PathBuf> {
    platform::binary_path_of(plugin_binary_path as usize).ok_or(ConfigError::NoConfigDirectory)
}

/// Returns the tf2rust base directory by navigating up from the plugin binary.
///
/// `tf/addons/tf2rust/bin/tf2rust.so` -> `tf/addons/tf2rust/`
pub fn tf2rust_base_dir() -> ConfigResult<PathBuf> {
    base_dir_from_binary(&plugin_binary_path()?)
}

/// `<base>/bin/<binary>` -> `<base>`
pub fn base_dir_from_binary(binary: &Path) -> ConfigResult<PathBuf> {
    binary
        .parent() // bin/
        .and_then(|p| p.parent()) // tf2rust/
        .map(PathBuf::from)
        .ok_or(ConfigError::NoConfigDirectory)
}

/// Returns the base configs directory.
///
/// Path: `tf/addons/tf2rust/configs/`
pub fn configs_dir() -> ConfigResult<PathBuf> {
    Ok(tf2rust_base_dir()?.join("configs"))
}

/// Returns the gamedata directory.
///
/// Path: `tf/addons/tf2rust/gamedata/`
pub fn gamedata_dir() -> ConfigResult<PathBuf> {
    Ok(tf2rust_base_dir()?.join("gamedata"))
}

/// Returns the path for a plugin's config file.
///
/// Path: `tf/addons/tf2rust/configs/plugins/{plugin_name}/{plugin_name}.toml`
pub fn plugin_config_path(plugin_name: &str) -> ConfigResult<PathBuf> {
    Ok(plugin_config_path_in(&configs_dir()?, plugin_name))
}

pub(crate) fn plugin_config_path_in(configs: &Path, plugin_name: &str) -> PathBuf {
    configs
        .join("plugins")
        .join(plugin_name)
        .join(format!("{plugin_name}.toml"))
}

/// Returns the core framework config path.
///
/// Path: `tf/addons/tf2rust/configs/core.toml`
pub fn core_config_path() -> ConfigResult<PathBuf> {
    Ok(configs_dir()?.join("core.toml"))
}

#[cfg(unix)]
mod platform {
    use std::ffi::{c_void, CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;
    use std::path::PathBuf;

    pub fn binary_path_of(address: usize) -> Option<PathBuf> {
        unsafe {
            let mut info: libc::Dl_info = std::mem::zeroed();
            if libc::dladdr(address as *const c_void, &mut info) == 0 || info.dli_fname.is_null() {
                return None;
            }
            let name = CStr::from_ptr(info.dli_fname);
            Some(PathBuf::from(OsStr::from_bytes(name.to_bytes())))
        }
    }
}

#[cfg(windows)]
mod platform {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use std::path::PathBuf;

    use winapi::shared::minwindef::HMODULE;
    use winapi::um::libloaderapi::{
        GetModuleFileNameW, GetModuleHandleExW, GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS,
        GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
    };

    pub fn binary_path_of(address: usize) -> Option<PathBuf> {
        unsafe {
            let mut module: HMODULE = std::ptr::null_mut();
            let flags = GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS
                | GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT;
            if GetModuleHandleExW(flags, address as *const u16, &mut module) == 0 {
                return None;
            }
            let mut buffer = [0u16; 1024];
            let len = GetModuleFileNameW(module, buffer.as_mut_ptr(), buffer.len() as u32);
            if len == 0 {
                return None;
            }
            Some(PathBuf::from(OsString::from_wide(&buffer[..len as usize])))
        }
    }
}

#[cfg(not(any(unix, windows)))]
mod platform {
    pub fn binary_path_of(_address: usize) -> Option<std::path::PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_from_binary() {
        let binary = PathBuf::from("/srv/tf/addons/tf2rust/bin/tf2rust.so");
        assert_eq!(
            base_dir_from_binary(&binary).unwrap(),
            PathBuf::from("/srv/tf/addons/tf2rust")
        );
        assert!(base_dir_from_binary(Path::new("tf2rust.so")).is_err());
    }

    #[test]
    fn test_plugin_config_path_format() {
        let configs = PathBuf::from("/srv/tf/addons/tf2rust/configs");
        let path = plugin_config_path_in(&configs, "my_plugin");
        assert!(path.ends_with("plugins/my_plugin/my_plugin.toml"));
    }

    #[cfg(unix)]
    #[test]
    fn test_plugin_binary_path_resolves() {
        // In tests the code lives in the test executable
        let path = plugin_binary_path().unwrap();
        assert!(path.file_name().is_some());
    }
}
