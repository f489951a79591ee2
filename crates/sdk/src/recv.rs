//! Client-side network table types (`dt_recv.h`, `client_class.h`)
//!
//! `IBaseClientDLL::GetAllClasses` returns the head of a `ClientClass`
//! linked list. Each class points at a `RecvTable` whose `RecvProp`s carry
//! the byte offset of a networked field inside the entity.

use std::ffi::{c_char, c_void, CStr};

/// Wire type of a networked property (`SendPropType`)
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendPropType {
    Int = 0,
    Float = 1,
    Vector = 2,
    VectorXY = 3,
    String = 4,
    Array = 5,
    DataTable = 6,
    Int64 = 7,
}

impl TryFrom<i32> for SendPropType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Int,
            1 => Self::Float,
            2 => Self::Vector,
            3 => Self::VectorXY,
            4 => Self::String,
            5 => Self::Array,
            6 => Self::DataTable,
            7 => Self::Int64,
            other => return Err(other),
        })
    }
}

/// Name of the nested table holding the parent class's props
pub const BASECLASS_PROP: &str = "baseclass";

/// One networked property
#[repr(C)]
pub struct RecvProp {
    pub var_name: *const c_char,
    /// Raw `SendPropType`, see [`RecvProp::prop_type`]
    pub recv_type: i32,
    pub flags: i32,
    pub string_buffer_size: i32,
    pub inside_array: bool,
    pub extra_data: *const c_void,
    pub array_prop: *mut RecvProp,
    pub array_length_proxy: *const c_void,
    pub proxy_fn: *const c_void,
    pub data_table_proxy_fn: *const c_void,
    pub data_table: *mut RecvTable,
    pub offset: i32,
    pub element_stride: i32,
    pub elements: i32,
    pub parent_array_prop_name: *const c_char,
}

impl RecvProp {
    /// Property name
    ///
    /// # Safety
    /// `var_name` must be null or a valid C string.
    pub unsafe fn name(&self) -> Option<&str> {
        cstr(self.var_name)
    }

    /// Wire type, `None` for values this build does not know
    pub fn prop_type(&self) -> Option<SendPropType> {
        SendPropType::try_from(self.recv_type).ok()
    }

    /// Nested table for `DataTable` props
    pub fn data_table(&self) -> Option<*mut RecvTable> {
        (self.prop_type() == Some(SendPropType::DataTable) && !self.data_table.is_null())
            .then_some(self.data_table)
    }
}

/// Table of networked properties
#[repr(C)]
pub struct RecvTable {
    pub props: *mut RecvProp,
    pub num_props: i32,
    pub decoder: *mut c_void,
    pub net_table_name: *const c_char,
    pub initialized: bool,
    pub in_main_list: bool,
}

impl RecvTable {
    /// Table name, e.g. `DT_TFPlayer`
    ///
    /// # Safety
    /// `net_table_name` must be null or a valid C string.
    pub unsafe fn name(&self) -> Option<&str> {
        cstr(self.net_table_name)
    }

    /// Props as a slice
    ///
    /// # Safety
    /// `props` must point at `num_props` valid entries.
    pub unsafe fn props(&self) -> &[RecvProp] {
        if self.props.is_null() || self.num_props <= 0 {
            return &[];
        }
        std::slice::from_raw_parts(self.props, self.num_props as usize)
    }
}

/// One networkable client class
#[repr(C)]
pub struct ClientClass {
    pub create_fn: *const c_void,
    pub create_event_fn: *const c_void,
    pub network_name: *const c_char,
    pub recv_table: *mut RecvTable,
    pub next: *mut ClientClass,
    pub class_id: i32,
}

impl ClientClass {
    /// Network class name, e.g. `CTFPlayer`
    ///
    /// # Safety
    /// `network_name` must be null or a valid C string.
    pub unsafe fn name(&self) -> Option<&str> {
        cstr(self.network_name)
    }
}

unsafe fn cstr<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        None
    } else {
        CStr::from_ptr(ptr).to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_recv_prop_layout() {
        assert_eq!(offset_of!(RecvProp, data_table), 64);
        assert_eq!(offset_of!(RecvProp, offset), 72);
        assert_eq!(size_of::<RecvProp>(), 96);
    }

    #[test]
    fn test_unknown_prop_type_is_none() {
        // SAFETY: all-zero is a valid RecvProp
        let mut prop: RecvProp = unsafe { std::mem::zeroed() };
        prop.recv_type = SendPropType::DataTable as i32;
        assert_eq!(prop.prop_type(), Some(SendPropType::DataTable));
        // Null table pointer still means no nested table
        assert!(prop.data_table().is_none());

        prop.recv_type = 42;
        assert_eq!(prop.prop_type(), None);
        assert_eq!(SendPropType::try_from(-1), Err(-1));
    }

    #[test]
    fn test_recv_table_layout() {
        assert_eq!(offset_of!(RecvTable, net_table_name), 24);
        assert_eq!(size_of::<RecvTable>(), 40);
    }

    #[test]
    fn test_client_class_layout() {
        assert_eq!(offset_of!(ClientClass, next), 32);
        assert_eq!(offset_of!(ClientClass, class_id), 40);
        assert_eq!(size_of::<ClientClass>(), 48);
    }
}
