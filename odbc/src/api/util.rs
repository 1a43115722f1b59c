//! Text marshalling helpers shared by the exported `SQL*` functions: reading
//! caller-supplied input strings (narrow or wide, explicit length or
//! nul-terminated) and writing the small `*_length_ptr` out-params that
//! accompany almost every call.

use odbc_sys::{Integer, SmallInt, WChar};

/// Reads a narrow input string. `len < 0` means nul-terminated (`SQL_NTS`).
pub fn input_text_to_string(text: *const u8, len: Integer) -> String {
    if text.is_null() {
        return String::new();
    }
    if len < 0 {
        let cstr = unsafe { std::ffi::CStr::from_ptr(text as *const i8) };
        cstr.to_string_lossy().into_owned()
    } else {
        let slice = unsafe { std::slice::from_raw_parts(text, len as usize) };
        String::from_utf8_lossy(slice).into_owned()
    }
}

/// Reads a wide (UTF-16) input string. `len < 0` means nul-terminated.
pub fn input_wtext_to_string(text: *const WChar, len: Integer) -> String {
    if text.is_null() {
        return String::new();
    }
    if len < 0 {
        let mut dst = Vec::new();
        let mut p = text;
        unsafe {
            while *p != 0 {
                dst.push(*p);
                p = p.add(1);
            }
        }
        String::from_utf16_lossy(&dst)
    } else {
        let slice = unsafe { std::slice::from_raw_parts(text, len as usize) };
        String::from_utf16_lossy(slice)
    }
}

pub fn set_str_length(ptr: *mut Integer, length: Integer) {
    if !ptr.is_null() {
        unsafe { *ptr = length };
    }
}

pub fn set_str_length_small(ptr: *mut SmallInt, length: SmallInt) {
    if !ptr.is_null() {
        unsafe { *ptr = length };
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn narrow_explicit_length_stops_at_len_not_first_nul() {
        let bytes = b"ab\0cd";
        assert_eq!(input_text_to_string(bytes.as_ptr(), 5), "ab\u{0}cd");
    }

    #[test]
    fn wide_nts_stops_at_nul() {
        let units: Vec<u16> = "hi".encode_utf16().chain(std::iter::once(0)).collect();
        assert_eq!(input_wtext_to_string(units.as_ptr(), -1), "hi");
    }

    #[test]
    fn null_pointer_is_empty_string() {
        assert_eq!(input_text_to_string(std::ptr::null(), 5), "");
    }
}
