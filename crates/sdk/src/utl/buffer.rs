//! `CUtlBuffer` layout mirror with binary get/put cursors
//!
//! Only binary-mode access is implemented. Text-mode parsing and the
//! overflow callbacks stay with the engine; `get_overflow` / `put_overflow`
//! are kept as opaque member-function-pointer storage.

use super::memory::UtlMemory;

/// Buffer mode flags (`m_Flags`)
pub mod flags {
    pub const TEXT_BUFFER: u8 = 0x1;
    pub const EXTERNAL_GROWABLE: u8 = 0x2;
    pub const CONTAINS_CRLF: u8 = 0x4;
    pub const READ_ONLY: u8 = 0x8;
    pub const AUTO_TABS_DISABLED: u8 = 0x10;
}

/// Error bits (`m_Error`)
pub mod errors {
    pub const GET_OVERFLOW: u8 = 0x1;
    pub const PUT_OVERFLOW: u8 = 0x2;
}

/// Pointer-to-member-function storage (two words on Itanium ABI)
#[cfg(not(windows))]
type MemberFnStorage = [usize; 2];

#[cfg(windows)]
type MemberFnStorage = usize;

/// Serialisation buffer
#[repr(C)]
pub struct UtlBuffer {
    memory: UtlMemory<u8>,
    get: i32,
    put: i32,
    error: u8,
    flags: u8,
    reserved: u8,
    tab: i32,
    max_put: i32,
    offset: i32,
    get_overflow: MemberFnStorage,
    put_overflow: MemberFnStorage,
    byteswap: u32,
}

impl UtlBuffer {
    /// Wrap caller memory holding `size` bytes of which `put` are valid data
    ///
    /// # Safety
    /// `memory` must be valid for reads (and writes unless `READ_ONLY` is in
    /// `buffer_flags`) of `size` bytes while the buffer is used.
    pub unsafe fn from_external(memory: *mut u8, size: usize, put: usize, buffer_flags: u8) -> Self {
        let memory = if buffer_flags & flags::READ_ONLY != 0 {
            UtlMemory::from_external_const(memory, size)
        } else {
            UtlMemory::from_external(memory, size)
        };
        let put = put.min(size) as i32;

        Self {
            memory,
            get: 0,
            put,
            error: 0,
            flags: buffer_flags,
            reserved: 0,
            tab: 0,
            max_put: put,
            offset: 0,
            get_overflow: Default::default(),
            put_overflow: Default::default(),
            byteswap: 0,
        }
    }

    /// Read cursor (`TellGet()`)
    #[inline]
    pub fn tell_get(&self) -> i32 {
        self.get
    }

    /// Write cursor (`TellPut()`)
    #[inline]
    pub fn tell_put(&self) -> i32 {
        self.put
    }

    /// Highest write position seen (`TellMaxPut()`)
    #[inline]
    pub fn tell_max_put(&self) -> i32 {
        self.max_put
    }

    /// Bytes between the read and write cursors
    pub fn bytes_remaining(&self) -> usize {
        (self.put - self.get).max(0) as usize
    }

    /// Move the read cursor to an absolute position
    ///
    /// Returns false (and leaves the cursor) if `position` is past `put`.
    pub fn seek_get(&mut self, position: i32) -> bool {
        if position < self.offset || position > self.put {
            return false;
        }
        self.get = position;
        true
    }

    /// No overflow has happened
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.error == 0
    }

    /// Raw error bits
    #[inline]
    pub fn error_bits(&self) -> u8 {
        self.error
    }

    /// Clear overflow bits
    pub fn clear_errors(&mut self) {
        self.error = 0;
    }

    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        self.flags & flags::TEXT_BUFFER != 0
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.flags & flags::READ_ONLY != 0 || self.memory.is_read_only()
    }

    /// Valid data (`Base()` up to `TellPut()`)
    pub fn data(&self) -> &[u8] {
        let slice = self.memory.as_slice();
        let end = ((self.put - self.offset).max(0) as usize).min(slice.len());
        &slice[..end]
    }

    /// Take `len` bytes from the read cursor
    fn take(&mut self, len: usize) -> Option<&[u8]> {
        if !self.is_valid() || self.bytes_remaining() < len {
            self.error |= errors::GET_OVERFLOW;
            return None;
        }
        let start = (self.get - self.offset) as usize;
        self.get += len as i32;
        self.memory.as_slice().get(start..start + len)
    }

    fn take_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Some(out)
    }

    pub fn get_u8(&mut self) -> Option<u8> {
        self.take_array::<1>().map(|b| b[0])
    }

    pub fn get_i16(&mut self) -> Option<i16> {
        self.take_array().map(i16::from_le_bytes)
    }

    pub fn get_i32(&mut self) -> Option<i32> {
        self.take_array().map(i32::from_le_bytes)
    }

    pub fn get_u32(&mut self) -> Option<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn get_f32(&mut self) -> Option<f32> {
        self.take_array().map(f32::from_le_bytes)
    }

    pub fn get_f64(&mut self) -> Option<f64> {
        self.take_array().map(f64::from_le_bytes)
    }

    /// Copy `out.len()` bytes (`Get()`)
    pub fn get_bytes(&mut self, out: &mut [u8]) -> bool {
        match self.take(out.len()) {
            Some(bytes) => {
                out.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    /// Read a NUL-terminated string (`GetString()` in binary mode)
    ///
    /// The terminator is consumed. Missing terminator is an overflow.
    pub fn get_cstring(&mut self) -> Option<String> {
        if !self.is_valid() {
            self.error |= errors::GET_OVERFLOW;
            return None;
        }
        let start = (self.get - self.offset).max(0) as usize;
        let end = (self.put - self.offset).max(0) as usize;
        let window = self.memory.as_slice().get(start..end)?;

        let Some(nul) = window.iter().position(|&b| b == 0) else {
            self.error |= errors::GET_OVERFLOW;
            return None;
        };

        let s = String::from_utf8_lossy(&window[..nul]).into_owned();
        self.get += nul as i32 + 1;
        Some(s)
    }

    /// Append bytes at the write cursor (`Put()`)
    ///
    /// External buffers never grow; a full or read-only buffer sets
    /// `PUT_OVERFLOW`.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> bool {
        let start = (self.put - self.offset).max(0) as usize;
        let fits = start + bytes.len() <= self.memory.count();

        if self.is_read_only() || !fits {
            self.error |= errors::PUT_OVERFLOW;
            return false;
        }

        for (i, b) in bytes.iter().enumerate() {
            if let Some(slot) = self.memory.get_mut(start + i) {
                *slot = *b;
            }
        }
        self.put += bytes.len() as i32;
        self.max_put = self.max_put.max(self.put);
        true
    }

    pub fn put_u8(&mut self, value: u8) -> bool {
        self.put_bytes(&[value])
    }

    pub fn put_i32(&mut self, value: i32) -> bool {
        self.put_bytes(&value.to_le_bytes())
    }

    pub fn put_f32(&mut self, value: f32) -> bool {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Append a string and its NUL terminator (`PutString()` in binary mode)
    pub fn put_cstring(&mut self, value: &str) -> bool {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        self.put_bytes(&bytes)
    }
}

impl std::fmt::Debug for UtlBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtlBuffer")
            .field("get", &self.get)
            .field("put", &self.put)
            .field("error", &self.error)
            .field("flags", &format_args!("0x{:x}", self.flags))
            .finish()
    }
}
