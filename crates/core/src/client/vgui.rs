//! VGUI panel access (`IPanel`)

use std::ffi::{c_char, c_void, CStr};
use std::ptr::NonNull;

use tf2rust_engine::try_engine;
use tf2rust_sdk::IPanel;

use crate::thunk::MemberVFuncThunk;

/// Panel handle (`VPANEL`)
pub type VPanel = usize;

type GetNameFn = unsafe extern "C" fn(this: *mut c_void, panel: VPanel) -> *const c_char;

static GET_NAME: MemberVFuncThunk<GetNameFn> = MemberVFuncThunk::new("IPanel::GetName", 36);

/// Wrapper for the VGUI panel interface
#[derive(Clone, Copy)]
pub struct Panel {
    ptr: NonNull<IPanel>,
}

unsafe impl Send for Panel {}
unsafe impl Sync for Panel {}

impl Panel {
    pub fn get() -> Option<Self> {
        try_engine()?.panel.map(|ptr| Self { ptr })
    }

    /// # Safety
    /// `ptr` must be null or a valid `IPanel`.
    pub unsafe fn from_ptr(ptr: *mut IPanel) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Name of a panel, e.g. `FocusOverlayPanel`
    pub fn name(&self, panel: VPanel) -> Option<String> {
        let this = self.ptr.as_ptr() as *mut c_void;
        unsafe {
            let func = GET_NAME.get(this)?;
            let name = func(this, panel);
            (!name.is_null()).then(|| CStr::from_ptr(name).to_string_lossy().into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn get_name(_: *mut c_void, panel: VPanel) -> *const c_char {
        match panel {
            1 => c"FocusOverlayPanel".as_ptr(),
            _ => std::ptr::null(),
        }
    }

    #[test]
    fn test_panel_name() {
        let mut vt = vec![0usize; 37];
        vt[36] = get_name as usize;
        let mut object = vt.as_ptr();
        let panel =
            unsafe { Panel::from_ptr(&mut object as *mut *const usize as *mut IPanel) }.unwrap();

        assert_eq!(panel.name(1).as_deref(), Some("FocusOverlayPanel"));
        assert!(panel.name(2).is_none());
    }
}
