//! Gamedata system for loading signatures and offsets from JSON
//!
//! Signatures and vtable indices are loaded from `tf2rust.games.json`
//! deployed with the plugin. This allows updating them after a game patch
//! without recompiling.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading gamedata
#[derive(Debug, Error)]
pub enum GamedataError {
    #[error("Failed to read gamedata file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse gamedata JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Gamedata not initialized")]
    NotInitialized,

    #[error("Gamedata already initialized")]
    AlreadyInitialized,

    #[error("Signature not found: {0}")]
    SignatureNotFound(String),

    #[error("Offset not found: {0}")]
    OffsetNotFound(String),

    #[error("Invalid signature format: {0}")]
    InvalidSignature(String),

    #[error("Failed to find signature in memory: {0}")]
    ScanFailed(String),
}

/// Platform-specific signature entry
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureEntry {
    /// Library to scan (e.g., "client", "engine")
    #[serde(default = "default_library")]
    pub library: String,
    /// Windows signature pattern
    pub windows: Option<String>,
    /// Linux signature pattern
    pub linux: Option<String>,
    /// Position of a rel32 operand inside the match, if the signature
    /// points at a reference rather than at the target itself
    pub read_offset: Option<usize>,
}

fn default_library() -> String {
    "client".to_string()
}

/// Platform-specific offset entry
#[derive(Debug, Clone, Deserialize)]
pub struct OffsetEntry {
    /// Windows offset value
    pub windows: Option<i64>,
    /// Linux offset value
    pub linux: Option<i64>,
}

/// Loaded gamedata
#[derive(Debug, Default)]
pub struct Gamedata {
    signatures: HashMap<String, SignatureEntry>,
    offsets: HashMap<String, OffsetEntry>,
}

/// Global gamedata instance
static GAMEDATA: OnceLock<Gamedata> = OnceLock::new();

impl Gamedata {
    /// Load gamedata from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GamedataError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    /// Load gamedata from a JSON string
    pub fn load_from_str(json: &str) -> Result<Self, GamedataError> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut gamedata = Gamedata::default();

        for (name, value) in raw {
            if let Some(signatures) = value.get("signatures") {
                let entry: SignatureEntry = serde_json::from_value(signatures.clone())?;
                gamedata.signatures.insert(name, entry);
            } else if let Some(offsets) = value.get("offsets") {
                let entry: OffsetEntry = serde_json::from_value(offsets.clone())?;
                gamedata.offsets.insert(name, entry);
            }
            // Bare signature object
            else if value.get("linux").is_some() || value.get("windows").is_some() {
                let entry: SignatureEntry = serde_json::from_value(value)?;
                gamedata.signatures.insert(name, entry);
            } else {
                tracing::warn!("Ignoring gamedata entry '{}' (no signatures or offsets)", name);
            }
        }

        tracing::info!(
            "Loaded gamedata: {} signatures, {} offsets",
            gamedata.signatures.len(),
            gamedata.offsets.len()
        );

        Ok(gamedata)
    }

    /// Get a signature by name for the current platform
    pub fn get_signature(&self, name: &str) -> Result<&str, GamedataError> {
        let entry = self
            .signatures
            .get(name)
            .ok_or_else(|| GamedataError::SignatureNotFound(name.to_string()))?;

        #[cfg(target_os = "linux")]
        let sig = entry.linux.as_deref();

        #[cfg(target_os = "windows")]
        let sig = entry.windows.as_deref();

        #[cfg(not(any(target_os = "linux", target_os = "windows")))]
        let sig: Option<&str> = None;

        sig.ok_or_else(|| {
            GamedataError::SignatureNotFound(format!("{} (no signature for this platform)", name))
        })
    }

    /// Get an offset by name for the current platform
    pub fn get_offset(&self, name: &str) -> Result<i64, GamedataError> {
        let entry = self
            .offsets
            .get(name)
            .ok_or_else(|| GamedataError::OffsetNotFound(name.to_string()))?;

        #[cfg(target_os = "linux")]
        let offset = entry.linux;

        #[cfg(target_os = "windows")]
        let offset = entry.windows;

        #[cfg(not(any(target_os = "linux", target_os = "windows")))]
        let offset: Option<i64> = None;

        offset.ok_or_else(|| {
            GamedataError::OffsetNotFound(format!("{} (no offset for this platform)", name))
        })
    }

    /// Whether an offset exists for the current platform
    pub fn has_offset(&self, name: &str) -> bool {
        self.get_offset(name).is_ok()
    }

    /// Get the library name for a signature
    pub fn get_signature_library(&self, name: &str) -> Option<&str> {
        self.signatures.get(name).map(|e| e.library.as_str())
    }

    /// rel32 position for a signature, if it has one
    pub fn get_read_offset(&self, name: &str) -> Option<usize> {
        self.signatures.get(name).and_then(|e| e.read_offset)
    }

    /// Names of every signature entry
    pub fn signature_names(&self) -> impl Iterator<Item = &str> {
        self.signatures.keys().map(String::as_str)
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    pub fn offset_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Initialize global gamedata from file
pub fn init_gamedata<P: AsRef<Path>>(path: P) -> Result<&'static Gamedata, GamedataError> {
    let gd = Gamedata::load_from_file(path)?;
    GAMEDATA
        .set(gd)
        .map_err(|_| GamedataError::AlreadyInitialized)?;
    GAMEDATA.get().ok_or(GamedataError::NotInitialized)
}

/// Get the global gamedata instance
pub fn gamedata() -> Option<&'static Gamedata> {
    GAMEDATA.get()
}

/// Parse a signature pattern string into bytes
///
/// Supports:
/// - Hex bytes: "55 48 89 E5"
/// - Wildcards: "55 ? 89 E5" or "55 ?? 89 E5"
pub fn parse_signature(pattern: &str) -> Result<Vec<Option<u8>>, GamedataError> {
    let mut result = Vec::new();

    for part in pattern.split_whitespace() {
        if part == "?" || part == "??" {
            result.push(None); // Wildcard
        } else {
            let byte = u8::from_str_radix(part, 16).map_err(|_| {
                GamedataError::InvalidSignature(format!("Invalid hex byte: {}", part))
            })?;
            result.push(Some(byte));
        }
    }

    if result.is_empty() {
        return Err(GamedataError::InvalidSignature(
            "Empty signature pattern".to_string(),
        ));
    }

    Ok(result)
}

/// Scan memory for a signature pattern
///
/// # Safety
/// The memory region must be valid and readable.
pub unsafe fn scan_signature(
    start: *const u8,
    size: usize,
    pattern: &[Option<u8>],
) -> Option<*const u8> {
    if pattern.is_empty() || size < pattern.len() {
        return None;
    }

    let end = size - pattern.len();

    'outer: for offset in 0..=end {
        for (i, expected) in pattern.iter().enumerate() {
            if let Some(byte) = expected {
                let actual = *start.add(offset + i);
                if actual != *byte {
                    continue 'outer;
                }
            }
        }
        // All bytes matched
        return Some(start.add(offset));
    }

    None
}

/// Follow a rel32 operand located `read_offset` bytes into `address`
///
/// The target is relative to the end of the 4-byte operand.
///
/// # Safety
/// `address + read_offset .. +4` must be readable.
pub unsafe fn resolve_relative(address: *const u8, read_offset: usize) -> *const u8 {
    let operand = address.add(read_offset);
    let displacement = (operand as *const i32).read_unaligned();
    operand.add(4).offset(displacement as isize)
}

/// Find an address by signature name in `gamedata`
///
/// Applies `read_offset` when the entry has one.
///
/// # Safety
/// Module memory must be valid and readable.
pub unsafe fn find_signature_in(
    gamedata: &Gamedata,
    name: &str,
    module_base: *const u8,
    module_size: usize,
) -> Result<*const u8, GamedataError> {
    let sig_str = gamedata.get_signature(name)?;
    let pattern = parse_signature(sig_str)?;

    let found = scan_signature(module_base, module_size, &pattern)
        .ok_or_else(|| GamedataError::ScanFailed(name.to_string()))?;

    match gamedata.get_read_offset(name) {
        Some(read_offset) if read_offset + 4 <= pattern.len() => {
            Ok(resolve_relative(found, read_offset))
        }
        Some(read_offset) => Err(GamedataError::InvalidSignature(format!(
            "{}: read_offset {} outside pattern",
            name, read_offset
        ))),
        None => Ok(found),
    }
}

/// Find a function address by signature name in the global gamedata
///
/// # Arguments
/// * `name` - Signature name in gamedata
/// * `module_base` - Base address of the module to scan
/// * `module_size` - Size of the module
///
/// # Safety
/// Module memory must be valid and readable.
pub unsafe fn find_signature(
    name: &str,
    module_base: *const u8,
    module_size: usize,
) -> Result<*const u8, GamedataError> {
    let gd = gamedata().ok_or(GamedataError::NotInitialized)?;
    find_signature_in(gd, name, module_base, module_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signature() {
        let pattern = parse_signature("55 48 89 E5").unwrap();
        assert_eq!(
            pattern,
            vec![Some(0x55), Some(0x48), Some(0x89), Some(0xE5)]
        );

        let pattern = parse_signature("55 ? 89 ??").unwrap();
        assert_eq!(pattern, vec![Some(0x55), None, Some(0x89), None]);

        assert!(parse_signature("").is_err());
        assert!(parse_signature("55 GG").is_err());
    }

    #[test]
    fn test_scan_signature() {
        let data = [0x00, 0x55, 0x48, 0x89, 0xE5, 0x00];
        let pattern = vec![Some(0x55), Some(0x48), Some(0x89), Some(0xE5)];

        unsafe {
            let result = scan_signature(data.as_ptr(), data.len(), &pattern);
            assert_eq!(result, Some(data.as_ptr().add(1)));
        }
    }

    #[test]
    fn test_scan_signature_with_wildcard() {
        let data = [0x00, 0x55, 0xFF, 0x89, 0xE5, 0x00];
        let pattern = vec![Some(0x55), None, Some(0x89), Some(0xE5)];

        unsafe {
            let result = scan_signature(data.as_ptr(), data.len(), &pattern);
            assert_eq!(result, Some(data.as_ptr().add(1)));

            // Pattern longer than the region
            assert!(scan_signature(data.as_ptr(), 3, &pattern).is_none());
        }
    }

    #[test]
    fn test_load_gamedata_mixed_format() {
        let json = r#"{
            "CBaseAnimating::GetBoneCache": {
                "signatures": {
                    "library": "client",
                    "linux": "55 48 89 E5 41 57 49 89 F7",
                    "windows": "48 89 5C 24 08"
                }
            },
            "GetAllClasses": {
                "offsets": { "windows": 8, "linux": 8 }
            },
            "CNetChannel::SendNetMsg": {
                "library": "engine",
                "linux": "55 48 8D 05 ? ? ? ?",
                "windows": "48 85 C9 0F 84"
            }
        }"#;

        let gd = Gamedata::load_from_str(json).unwrap();
        assert_eq!(gd.signature_count(), 2);
        assert_eq!(gd.offset_count(), 1);
        assert_eq!(gd.get_signature_library("CNetChannel::SendNetMsg"), Some("engine"));
        assert_eq!(
            gd.get_signature_library("CBaseAnimating::GetBoneCache"),
            Some("client")
        );
        assert!(gd.get_offset("Missing").is_err());

        #[cfg(any(target_os = "linux", target_os = "windows"))]
        {
            assert!(gd.has_offset("GetAllClasses"));
            assert_eq!(gd.get_offset("GetAllClasses").unwrap(), 8);
        }

        #[cfg(target_os = "linux")]
        {
            let sig = gd.get_signature("CBaseAnimating::GetBoneCache").unwrap();
            assert!(sig.starts_with("55 48"));
        }
    }

    #[test]
    fn test_resolve_relative() {
        // mov rax, [rip + 0x10]  =>  48 8B 05 10 00 00 00
        let mut data = [0u8; 32];
        data[4..11].copy_from_slice(&[0x48, 0x8B, 0x05, 0x10, 0x00, 0x00, 0x00]);

        unsafe {
            let insn = data.as_ptr().add(4);
            // operand at insn+3, ends at insn+7, target = insn + 7 + 0x10
            assert_eq!(resolve_relative(insn, 3), insn.add(7 + 0x10));
        }
    }

    #[test]
    fn test_find_signature_in_with_read_offset() {
        let json = r#"{
            "g_pGlobals": {
                "signatures": {
                    "library": "engine",
                    "linux": "48 8B 05 ? ? ? ? F3",
                    "windows": "48 8B 05 ? ? ? ? F3",
                    "read_offset": 3
                }
            }
        }"#;
        let gd = Gamedata::load_from_str(json).unwrap();

        let mut data = [0x90u8; 48];
        // displacement -8
        data[8..16].copy_from_slice(&[0x48, 0x8B, 0x05, 0xF8, 0xFF, 0xFF, 0xFF, 0xF3]);

        #[cfg(any(target_os = "linux", target_os = "windows"))]
        unsafe {
            let base = data.as_ptr();
            let found = find_signature_in(&gd, "g_pGlobals", base, data.len()).unwrap();
            assert_eq!(found, base.add(8 + 7 - 8));
        }
    }

    #[test]
    fn test_shipped_gamedata_parses() {
        let gd = Gamedata::load_from_str(include_str!("../../../gamedata/tf2rust.games.json"))
            .unwrap();
        assert_eq!(gd.get_signature_library("C_BaseAnimating::GetBoneCache"), Some("client"));
        assert!(gd.has_offset("ICvar::FindVar"));
        assert!(gd.signature_count() >= 1);

        #[cfg(any(target_os = "linux", target_os = "windows"))]
        {
            assert_eq!(gd.get_offset("C_BaseEntity::RenderableOffset").unwrap(), 8);
            let pattern = gd.get_signature("C_BaseAnimating::GetBoneCache").unwrap();
            assert!(parse_signature(pattern).is_ok());
        }
    }
}
