//! Diagnostics retrieval (spec §4.6): `SQLGetDiagRec`/`SQLGetDiagField` and
//! their wide variants. Records are read-only views over a handle's
//! `Vec<ODBCError>`; retrieval never mutates it (clearing happens when the
//! next operation against the handle runs, not here).

use crate::definitions::DiagType;
use crate::errors::ODBCError;
use odbc_sys::{Char, Integer, Pointer, SmallInt, SqlReturn, WChar};
use std::ptr::copy_nonoverlapping;

/// `SQL_ROW_NUMBER_UNKNOWN`.
const SQL_ROW_NUMBER_UNKNOWN: isize = -2;

unsafe fn ptr_safe_write<T>(ptr: *mut T, data: T) {
    if !ptr.is_null() {
        *ptr = data;
    }
}

/// Writes a 5-character SQLSTATE plus terminator to `output_ptr`.
///
/// # Safety
/// Writes through a raw C pointer.
pub unsafe fn set_sql_state(sql_state: &str, output_ptr: *mut Char) {
    if output_ptr.is_null() {
        return;
    }
    let bytes = format!("{sql_state}\0").into_bytes();
    copy_nonoverlapping(bytes.as_ptr(), output_ptr, 6);
}

/// # Safety
/// Writes through a raw C pointer.
pub unsafe fn set_sql_statew(sql_state: &str, output_ptr: *mut WChar) {
    if output_ptr.is_null() {
        return;
    }
    let units: Vec<u16> = format!("{sql_state}\0").encode_utf16().collect();
    copy_nonoverlapping(units.as_ptr(), output_ptr, 6);
}

pub(crate) fn truncate_text_narrow(message: &str, output_ptr: *mut Char, buffer_length: SmallInt, text_length_ptr: *mut SmallInt) -> SqlReturn {
    unsafe { ptr_safe_write(text_length_ptr, message.len() as SmallInt) };
    if output_ptr.is_null() {
        return SqlReturn::SUCCESS_WITH_INFO;
    }
    let cap = (buffer_length.max(0) as usize).saturating_sub(1);
    let bytes = message.as_bytes();
    let n = cap.min(bytes.len());
    unsafe {
        copy_nonoverlapping(bytes.as_ptr(), output_ptr, n);
        *output_ptr.add(n) = 0;
    }
    if n < bytes.len() {
        SqlReturn::SUCCESS_WITH_INFO
    } else {
        SqlReturn::SUCCESS
    }
}

pub(crate) fn truncate_text_wide(message: &str, output_ptr: *mut WChar, buffer_length: SmallInt, text_length_ptr: *mut SmallInt) -> SqlReturn {
    let units: Vec<u16> = message.encode_utf16().collect();
    unsafe { ptr_safe_write(text_length_ptr, units.len() as SmallInt) };
    if output_ptr.is_null() {
        return SqlReturn::SUCCESS_WITH_INFO;
    }
    let cap = (buffer_length.max(0) as usize).saturating_sub(1);
    let n = cap.min(units.len());
    unsafe {
        copy_nonoverlapping(units.as_ptr(), output_ptr, n);
        *output_ptr.add(n) = 0;
    }
    if n < units.len() {
        SqlReturn::SUCCESS_WITH_INFO
    } else {
        SqlReturn::SUCCESS
    }
}

/// # Safety
/// Writes through multiple raw C pointers.
pub unsafe fn get_diag_rec(
    error: &ODBCError,
    state: *mut Char,
    message_text: *mut Char,
    buffer_length: SmallInt,
    text_length_ptr: *mut SmallInt,
    native_error_ptr: *mut Integer,
) -> SqlReturn {
    ptr_safe_write(native_error_ptr, error.native_err_code());
    set_sql_state(error.sql_state(), state);
    truncate_text_narrow(&error.to_string(), message_text, buffer_length, text_length_ptr)
}

/// # Safety
/// Writes through multiple raw C pointers.
pub unsafe fn get_diag_recw(
    error: &ODBCError,
    state: *mut WChar,
    message_text: *mut WChar,
    buffer_length: SmallInt,
    text_length_ptr: *mut SmallInt,
    native_error_ptr: *mut Integer,
) -> SqlReturn {
    ptr_safe_write(native_error_ptr, error.native_err_code());
    set_sql_statew(error.sql_state(), state);
    truncate_text_wide(&error.to_string(), message_text, buffer_length, text_length_ptr)
}

/// Header-level diag fields that don't index into the error list (spec
/// §4.6's statement-level `SQL_DIAG_ROW_COUNT`/`SQL_DIAG_ROW_NUMBER`).
///
/// # Safety
/// Writes through a raw C pointer.
pub unsafe fn get_stmt_diag_field(diag_identifier: DiagType, diag_info_ptr: Pointer, row_count: i64) -> SqlReturn {
    match diag_identifier {
        DiagType::SQL_DIAG_ROW_COUNT => {
            ptr_safe_write(diag_info_ptr as *mut isize, row_count as isize);
            SqlReturn::SUCCESS
        }
        DiagType::SQL_DIAG_ROW_NUMBER => {
            ptr_safe_write(diag_info_ptr as *mut isize, SQL_ROW_NUMBER_UNKNOWN);
            SqlReturn::SUCCESS
        }
        _ => SqlReturn::ERROR,
    }
}

/// # Safety
/// Writes through multiple raw C pointers.
pub unsafe fn get_diag_field(
    errors: &[ODBCError],
    diag_identifier: DiagType,
    diag_info_ptr: Pointer,
    record_number: i16,
    buffer_length: i16,
    string_length_ptr: *mut i16,
    is_wstring: bool,
) -> SqlReturn {
    if diag_identifier == DiagType::SQL_DIAG_NUMBER {
        ptr_safe_write(diag_info_ptr as *mut Integer, errors.len() as Integer);
        return SqlReturn::SUCCESS;
    }
    if buffer_length < 0 || record_number < 1 {
        return SqlReturn::ERROR;
    }
    let Some(error) = errors.get((record_number - 1) as usize) else {
        return SqlReturn::NO_DATA;
    };
    match diag_identifier {
        DiagType::SQL_DIAG_RETURNCODE => SqlReturn::SUCCESS,
        DiagType::SQL_DIAG_SQLSTATE => {
            if is_wstring {
                truncate_text_wide(error.sql_state(), diag_info_ptr as *mut WChar, buffer_length, string_length_ptr)
            } else {
                truncate_text_narrow(error.sql_state(), diag_info_ptr as *mut Char, buffer_length, string_length_ptr)
            }
        }
        DiagType::SQL_DIAG_NATIVE => {
            ptr_safe_write(diag_info_ptr as *mut Integer, error.native_err_code());
            SqlReturn::SUCCESS
        }
        DiagType::SQL_DIAG_MESSAGE_TEXT => {
            let message = error.to_string();
            if is_wstring {
                truncate_text_wide(&message, diag_info_ptr as *mut WChar, buffer_length, string_length_ptr)
            } else {
                truncate_text_narrow(&message, diag_info_ptr as *mut Char, buffer_length, string_length_ptr)
            }
        }
        _ => SqlReturn::ERROR,
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn diag_number_reports_error_count() {
        let errors = vec![ODBCError::FunctionSequenceError, ODBCError::FunctionSequenceError];
        let mut out: Integer = 0;
        let ret = unsafe {
            get_diag_field(
                &errors,
                DiagType::SQL_DIAG_NUMBER,
                &mut out as *mut Integer as Pointer,
                0,
                0,
                std::ptr::null_mut(),
                false,
            )
        };
        assert_eq!(ret, SqlReturn::SUCCESS);
        assert_eq!(out, 2);
    }

    #[test]
    fn record_past_the_end_is_no_data() {
        let errors = vec![ODBCError::FunctionSequenceError];
        let ret = unsafe {
            get_diag_field(
                &errors,
                DiagType::SQL_DIAG_MESSAGE_TEXT,
                std::ptr::null_mut(),
                2,
                0,
                std::ptr::null_mut(),
                false,
            )
        };
        assert_eq!(ret, SqlReturn::NO_DATA);
    }

    #[test]
    fn sql_state_round_trips_through_narrow_buffer() {
        let mut buf = [0u8; 6];
        let mut len: SmallInt = 0;
        unsafe {
            set_sql_state("HY010", buf.as_mut_ptr());
            let _ = get_diag_rec(
                &ODBCError::FunctionSequenceError,
                buf.as_mut_ptr(),
                std::ptr::null_mut(),
                0,
                &mut len,
                std::ptr::null_mut(),
            );
        }
        assert_eq!(&buf[..5], b"HY010");
    }
}
