//! Loaded module lookup
//!
//! Maps engine module short names ("client", "engine", ...) to the shared
//! library loaded in the game process, its code range for signature scans,
//! and its exported `CreateInterface`.

use tf2rust_sdk::CreateInterfaceFn;

/// A code range inside a loaded module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Short name the module was requested by
    pub name: String,
    /// Start of the range to scan
    pub base: usize,
    /// Length of the range in bytes
    pub size: usize,
}

impl ModuleInfo {
    pub fn contains(&self, address: usize) -> bool {
        address >= self.base && address < self.base + self.size
    }

    pub fn base_ptr(&self) -> *const u8 {
        self.base as *const u8
    }
}

/// Source of module ranges and interface factories
///
/// [`NativeModules`] queries the running process; tests supply their own.
pub trait ModuleResolver: Send + Sync {
    /// Code range of `module`, if it is loaded
    fn module(&self, module: &str) -> Option<ModuleInfo>;

    /// `CreateInterface` export of `module`
    fn create_interface(&self, module: &str) -> Option<CreateInterfaceFn>;
}

/// Platform file name for a module short name
///
/// Names that already contain a `.` are treated as file names.
pub fn module_file_name(module: &str) -> String {
    if module.contains('.') {
        return module.to_string();
    }

    #[cfg(windows)]
    {
        format!("{module}.dll")
    }

    #[cfg(not(windows))]
    {
        match module {
            "tier0" | "vstdlib" | "steam_api" => format!("lib{module}.so"),
            _ => format!("{module}.so"),
        }
    }
}

/// Resolver backed by the dynamic loader of the current process
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeModules;

impl ModuleResolver for NativeModules {
    fn module(&self, module: &str) -> Option<ModuleInfo> {
        let file = module_file_name(module);
        let found = platform::find_module(&file).map(|(base, size)| ModuleInfo {
            name: module.to_string(),
            base,
            size,
        });
        if found.is_none() {
            tracing::debug!("Module {} ({}) is not loaded", module, file);
        }
        found
    }

    fn create_interface(&self, module: &str) -> Option<CreateInterfaceFn> {
        let file = module_file_name(module);
        let addr = platform::find_export(&file, "CreateInterface")?;
        // SAFETY: CreateInterface has this signature in every Source module
        Some(unsafe { std::mem::transmute::<usize, CreateInterfaceFn>(addr) })
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use std::ffi::{c_int, c_void, CStr, CString};

    struct PhdrSearch<'a> {
        file_name: &'a str,
        path: Option<CString>,
        range: Option<(usize, usize)>,
    }

    unsafe extern "C" fn phdr_callback(
        info: *mut libc::dl_phdr_info,
        _size: libc::size_t,
        data: *mut c_void,
    ) -> c_int {
        let search = &mut *(data as *mut PhdrSearch);
        let info = &*info;

        if info.dlpi_name.is_null() || info.dlpi_phdr.is_null() {
            return 0;
        }
        let path = CStr::from_ptr(info.dlpi_name);
        let path_str = path.to_string_lossy();
        let file = path_str.rsplit('/').next().unwrap_or(&path_str);
        if file != search.file_name {
            return 0;
        }

        let headers = std::slice::from_raw_parts(info.dlpi_phdr, info.dlpi_phnum as usize);
        let code = headers
            .iter()
            .find(|ph| ph.p_type == libc::PT_LOAD && ph.p_flags & libc::PF_X != 0);

        if let Some(ph) = code {
            search.range = Some((
                info.dlpi_addr as usize + ph.p_vaddr as usize,
                ph.p_memsz as usize,
            ));
            search.path = Some(path.to_owned());
            return 1;
        }
        0
    }

    fn search(file_name: &str) -> PhdrSearch<'_> {
        let mut search = PhdrSearch {
            file_name,
            path: None,
            range: None,
        };
        unsafe {
            libc::dl_iterate_phdr(
                Some(phdr_callback),
                &mut search as *mut PhdrSearch as *mut c_void,
            );
        }
        search
    }

    /// Executable segment of a loaded library
    pub fn find_module(file_name: &str) -> Option<(usize, usize)> {
        search(file_name).range
    }

    /// Exported symbol of an already loaded library
    pub fn find_export(file_name: &str, symbol: &str) -> Option<usize> {
        let path = search(file_name).path?;
        let symbol = CString::new(symbol).ok()?;

        unsafe {
            // RTLD_NOLOAD: only take a reference to what the engine loaded
            let handle = libc::dlopen(path.as_ptr(), libc::RTLD_NOW | libc::RTLD_NOLOAD);
            if handle.is_null() {
                return None;
            }
            let addr = libc::dlsym(handle, symbol.as_ptr()) as usize;
            libc::dlclose(handle);
            (addr != 0).then_some(addr)
        }
    }
}

#[cfg(windows)]
mod platform {
    use std::ffi::CString;

    use winapi::um::libloaderapi::{GetModuleHandleA, GetProcAddress};
    use winapi::um::processthreadsapi::GetCurrentProcess;
    use winapi::um::psapi::{GetModuleInformation, MODULEINFO};

    /// Full image of a loaded module
    pub fn find_module(file_name: &str) -> Option<(usize, usize)> {
        let name = CString::new(file_name).ok()?;
        unsafe {
            let handle = GetModuleHandleA(name.as_ptr());
            if handle.is_null() {
                return None;
            }
            let mut info: MODULEINFO = std::mem::zeroed();
            let ok = GetModuleInformation(
                GetCurrentProcess(),
                handle,
                &mut info,
                std::mem::size_of::<MODULEINFO>() as u32,
            );
            if ok == 0 {
                return None;
            }
            Some((info.lpBaseOfDll as usize, info.SizeOfImage as usize))
        }
    }

    /// Exported symbol of a loaded module
    pub fn find_export(file_name: &str, symbol: &str) -> Option<usize> {
        let name = CString::new(file_name).ok()?;
        let symbol = CString::new(symbol).ok()?;
        unsafe {
            let handle = GetModuleHandleA(name.as_ptr());
            if handle.is_null() {
                return None;
            }
            let addr = GetProcAddress(handle, symbol.as_ptr()) as usize;
            (addr != 0).then_some(addr)
        }
    }
}

#[cfg(not(any(target_os = "linux", windows)))]
mod platform {
    pub fn find_module(_file_name: &str) -> Option<(usize, usize)> {
        None
    }

    pub fn find_export(_file_name: &str, _symbol: &str) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_file_name() {
        assert_eq!(module_file_name("server.so"), "server.so");

        #[cfg(not(windows))]
        {
            assert_eq!(module_file_name("client"), "client.so");
            assert_eq!(module_file_name("vstdlib"), "libvstdlib.so");
        }

        #[cfg(windows)]
        {
            assert_eq!(module_file_name("client"), "client.dll");
            assert_eq!(module_file_name("vstdlib"), "vstdlib.dll");
        }
    }

    #[test]
    fn test_missing_module() {
        assert!(NativeModules.module("tf2rust_no_such_module").is_none());
        assert!(NativeModules
            .create_interface("tf2rust_no_such_module")
            .is_none());
    }

    #[test]
    fn test_module_info_contains() {
        let info = ModuleInfo {
            name: "client".into(),
            base: 0x1000,
            size: 0x100,
        };
        assert!(info.contains(0x1000));
        assert!(info.contains(0x10FF));
        assert!(!info.contains(0x1100));
    }
}
