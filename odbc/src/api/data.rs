//! Typed column retrieval (spec §4.4): converts a `RowStore` cell's
//! canonical string form into whatever C type the caller asked for and
//! writes it into their buffer. Every cell in a `RowStore` is already text,
//! so unlike a driver that retrieves typed wire values, this module's whole
//! job is string parsing plus the ODBC truncation/indicator contract.

use cstr::{to_widechar_vec, write_binary_slice_to_buffer, write_fixed_data, write_string_slice_to_buffer, write_wstring_slice_to_buffer, WideChar};
use odbc_sys::{CDataType, Date, Len, Pointer, SqlReturn, Time, Timestamp};
use std::mem::size_of;

/// `SQL_NULL_DATA`.
pub const NULL_DATA: Len = -1;

unsafe fn ptr_safe_write<T>(ptr: *mut T, data: T) {
    if !ptr.is_null() {
        *ptr = data;
    }
}

unsafe fn write_text(bytes: &[u8], output_ptr: Pointer, buffer_length: Len, indicator_ptr: *mut Len) -> SqlReturn {
    ptr_safe_write(indicator_ptr, bytes.len() as Len);
    if output_ptr.is_null() {
        return SqlReturn::SUCCESS_WITH_INFO;
    }
    let written = write_string_slice_to_buffer(bytes, buffer_length, output_ptr as *mut u8) as usize;
    if written == 0 && buffer_length <= 0 {
        return SqlReturn::SUCCESS_WITH_INFO;
    }
    // written counts the terminator; truncation happened if we couldn't fit
    // the whole value plus terminator.
    if (written as i64) < (bytes.len() as i64) + 1 {
        SqlReturn::SUCCESS_WITH_INFO
    } else {
        SqlReturn::SUCCESS
    }
}

unsafe fn write_wtext(text: &str, output_ptr: Pointer, buffer_length: Len, indicator_ptr: *mut Len) -> SqlReturn {
    let wide = to_widechar_vec(text);
    ptr_safe_write(indicator_ptr, (wide.len() * size_of::<WideChar>()) as Len);
    if output_ptr.is_null() {
        return SqlReturn::SUCCESS_WITH_INFO;
    }
    let buffer_len_chars = buffer_length / size_of::<WideChar>() as Len;
    let written = write_wstring_slice_to_buffer(&wide, buffer_len_chars, output_ptr as *mut WideChar) as usize;
    if (written as i64) < (wide.len() as i64) + 1 {
        SqlReturn::SUCCESS_WITH_INFO
    } else {
        SqlReturn::SUCCESS
    }
}

unsafe fn write_binary(bytes: &[u8], output_ptr: Pointer, buffer_length: Len, indicator_ptr: *mut Len) -> SqlReturn {
    ptr_safe_write(indicator_ptr, bytes.len() as Len);
    if output_ptr.is_null() || buffer_length <= 0 {
        return SqlReturn::SUCCESS_WITH_INFO;
    }
    let written = write_binary_slice_to_buffer(bytes, buffer_length as usize, output_ptr as *mut u8);
    if written < bytes.len() {
        SqlReturn::SUCCESS_WITH_INFO
    } else {
        SqlReturn::SUCCESS
    }
}

unsafe fn write_fixed<T: std::fmt::Debug>(value: &T, output_ptr: Pointer, indicator_ptr: *mut Len) -> SqlReturn {
    ptr_safe_write(indicator_ptr, size_of::<T>() as Len);
    if output_ptr.is_null() {
        return SqlReturn::SUCCESS_WITH_INFO;
    }
    write_fixed_data(value, output_ptr);
    SqlReturn::SUCCESS
}

/// Parses a signed decimal; per spec §4.4 a parse failure yields zero
/// silently rather than an error.
fn parse_i64(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

fn parse_u64(text: &str) -> u64 {
    text.trim().parse().unwrap_or(0)
}

fn parse_f64(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

fn parse_bit(text: &str) -> u8 {
    match text.trim() {
        "1" => 1,
        _ => 0,
    }
}

/// `YYYY-MM-DD[ HH:MM:SS[.fff]]` -> component parts. Missing components
/// default to zero, matching a date-only or time-only source value.
fn parse_datetime_parts(text: &str) -> (i16, u16, u16, u16, u16, u16, u32) {
    let (date_part, time_part) = match text.split_once(' ') {
        Some((d, t)) => (d, Some(t)),
        None if text.contains(':') => ("", Some(text)),
        None => (text, None),
    };
    let (year, month, day) = if date_part.is_empty() {
        (0, 0, 0)
    } else {
        let mut it = date_part.split('-');
        (
            it.next().and_then(|s| s.parse().ok()).unwrap_or(0),
            it.next().and_then(|s| s.parse().ok()).unwrap_or(0),
            it.next().and_then(|s| s.parse().ok()).unwrap_or(0),
        )
    };
    let (hour, minute, second, nanos) = match time_part {
        None => (0, 0, 0, 0),
        Some(t) => {
            let (hms, frac) = match t.split_once('.') {
                Some((a, b)) => (a, b),
                None => (t, ""),
            };
            let mut it = hms.split(':');
            let h = it.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let m = it.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let s = it.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let frac_digits: String = frac.chars().take(9).collect();
            let nanos = if frac_digits.is_empty() {
                0
            } else {
                let padded = format!("{frac_digits:0<9}");
                padded.parse().unwrap_or(0)
            };
            (h, m, s, nanos)
        }
    };
    (year, month, day, hour, minute, second, nanos)
}

/// Parses an `8-4-4-4-12` hex GUID into its 16-byte wire layout: the first
/// three groups little-endian, the last two groups network (big-endian)
/// order (spec §4.4).
fn parse_guid_bytes(text: &str) -> Option<[u8; 16]> {
    let hex: String = text.chars().filter(|c| *c != '-').collect();
    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = hex::decode(&hex).ok()?;
    let mut out = [0u8; 16];
    out[0..4].copy_from_slice(&bytes[0..4]);
    out[0..4].reverse();
    out[4..6].copy_from_slice(&bytes[4..6]);
    out[4..6].reverse();
    out[6..8].copy_from_slice(&bytes[6..8]);
    out[6..8].reverse();
    out[8..16].copy_from_slice(&bytes[8..16]);
    Some(out)
}

/// Converts one result-set cell into the caller's target C type and writes
/// it into their buffer, per spec §4.4. `cell` is `None` for a SQL NULL.
///
/// # Safety
/// Writes through `target_value_ptr` and `str_len_or_ind_ptr`, both raw
/// C pointers supplied by the driver manager.
pub unsafe fn get_data(
    cell: Option<&str>,
    target_type: CDataType,
    target_value_ptr: Pointer,
    buffer_length: Len,
    str_len_or_ind_ptr: *mut Len,
) -> SqlReturn {
    let Some(text) = cell else {
        ptr_safe_write(str_len_or_ind_ptr, NULL_DATA);
        return SqlReturn::SUCCESS;
    };

    match target_type {
        CDataType::SQL_C_CHAR | CDataType::SQL_C_DEFAULT => {
            write_text(text.as_bytes(), target_value_ptr, buffer_length, str_len_or_ind_ptr)
        }
        CDataType::SQL_C_WCHAR => write_wtext(text, target_value_ptr, buffer_length, str_len_or_ind_ptr),
        CDataType::SQL_C_BIT => {
            write_fixed(&parse_bit(text), target_value_ptr, str_len_or_ind_ptr)
        }
        CDataType::SQL_C_STINYINT | CDataType::SQL_C_TINYINT => {
            write_fixed(&(parse_i64(text) as i8), target_value_ptr, str_len_or_ind_ptr)
        }
        CDataType::SQL_C_UTINYINT => write_fixed(&(parse_u64(text) as u8), target_value_ptr, str_len_or_ind_ptr),
        CDataType::SQL_C_SSHORT | CDataType::SQL_C_SHORT => {
            write_fixed(&(parse_i64(text) as i16), target_value_ptr, str_len_or_ind_ptr)
        }
        CDataType::SQL_C_USHORT => write_fixed(&(parse_u64(text) as u16), target_value_ptr, str_len_or_ind_ptr),
        CDataType::SQL_C_SLONG | CDataType::SQL_C_LONG => {
            write_fixed(&(parse_i64(text) as i32), target_value_ptr, str_len_or_ind_ptr)
        }
        CDataType::SQL_C_ULONG => write_fixed(&(parse_u64(text) as u32), target_value_ptr, str_len_or_ind_ptr),
        CDataType::SQL_C_SBIGINT => write_fixed(&parse_i64(text), target_value_ptr, str_len_or_ind_ptr),
        CDataType::SQL_C_UBIGINT => write_fixed(&parse_u64(text), target_value_ptr, str_len_or_ind_ptr),
        CDataType::SQL_C_FLOAT => write_fixed(&(parse_f64(text) as f32), target_value_ptr, str_len_or_ind_ptr),
        CDataType::SQL_C_DOUBLE => write_fixed(&parse_f64(text), target_value_ptr, str_len_or_ind_ptr),
        CDataType::SQL_C_DATE | CDataType::SQL_C_TYPE_DATE => {
            let (year, month, day, ..) = parse_datetime_parts(text);
            let date = Date {
                year,
                month,
                day,
            };
            write_fixed(&date, target_value_ptr, str_len_or_ind_ptr)
        }
        CDataType::SQL_C_TIME | CDataType::SQL_C_TYPE_TIME => {
            let (.., hour, minute, second, _) = parse_datetime_parts(text);
            let time = Time {
                hour,
                minute,
                second,
            };
            write_fixed(&time, target_value_ptr, str_len_or_ind_ptr)
        }
        CDataType::SQL_C_TIMESTAMP | CDataType::SQL_C_TYPE_TIMESTAMP => {
            let (year, month, day, hour, minute, second, nanos) = parse_datetime_parts(text);
            let ts = Timestamp {
                year,
                month,
                day,
                hour,
                minute,
                second,
                fraction: nanos,
            };
            write_fixed(&ts, target_value_ptr, str_len_or_ind_ptr)
        }
        CDataType::SQL_C_GUID => match parse_guid_bytes(text) {
            Some(bytes) => write_binary(&bytes, target_value_ptr, buffer_length, str_len_or_ind_ptr),
            None => write_binary(&[0u8; 16], target_value_ptr, buffer_length, str_len_or_ind_ptr),
        },
        CDataType::SQL_C_BINARY => {
            let is_hex = !text.is_empty() && text.len() % 2 == 0 && text.chars().all(|c| c.is_ascii_hexdigit());
            match is_hex.then(|| hex::decode(text).ok()).flatten() {
                Some(bytes) => write_binary(&bytes, target_value_ptr, buffer_length, str_len_or_ind_ptr),
                None => write_binary(text.as_bytes(), target_value_ptr, buffer_length, str_len_or_ind_ptr),
            }
        }
        _ => write_text(text.as_bytes(), target_value_ptr, buffer_length, str_len_or_ind_ptr),
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    fn get_i32(cell: &str) -> i32 {
        let mut out: i32 = 0;
        let mut ind: Len = 0;
        unsafe {
            get_data(
                Some(cell),
                CDataType::SQL_C_SLONG,
                &mut out as *mut i32 as Pointer,
                size_of::<i32>() as Len,
                &mut ind,
            );
        }
        out
    }

    #[test]
    fn integer_round_trips() {
        assert_eq!(get_i32("42"), 42);
        assert_eq!(get_i32("-7"), -7);
    }

    #[test]
    fn unparseable_integer_yields_zero_silently() {
        assert_eq!(get_i32("not a number"), 0);
    }

    #[test]
    fn null_cell_writes_null_data_indicator() {
        let mut out: i32 = -1;
        let mut ind: Len = 0;
        unsafe {
            get_data(None, CDataType::SQL_C_SLONG, &mut out as *mut i32 as Pointer, 4, &mut ind);
        }
        assert_eq!(ind, NULL_DATA);
    }

    #[test]
    fn char_truncation_reports_untruncated_length_and_warning() {
        let mut buf = [0u8; 4];
        let mut ind: Len = 0;
        let ret = unsafe {
            write_text(b"hello world", buf.as_mut_ptr() as Pointer, buf.len() as Len, &mut ind)
        };
        assert_eq!(ret, SqlReturn::SUCCESS_WITH_INFO);
        assert_eq!(ind, 11);
        assert_eq!(&buf[..3], b"hel");
    }

    #[test]
    fn parse_guid_round_trips_byte_order() {
        let bytes = parse_guid_bytes("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        assert_eq!(&bytes[0..4], &[0x33, 0x22, 0x11, 0x00]);
        assert_eq!(&bytes[4..6], &[0x55, 0x44]);
        assert_eq!(&bytes[6..8], &[0x77, 0x66]);
        assert_eq!(&bytes[8..16], &[0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    }

    #[test]
    fn datetime_parses_fractional_seconds_as_nanoseconds() {
        let (y, mo, d, h, mi, s, ns) = parse_datetime_parts("2024-01-02 03:04:05.123");
        assert_eq!((y, mo, d, h, mi, s), (2024, 1, 2, 3, 4, 5));
        assert_eq!(ns, 123_000_000);
    }

    #[test]
    fn binary_cell_detected_as_hex_is_decoded() {
        let mut buf = [0u8; 2];
        let mut ind: Len = 0;
        unsafe {
            get_data(Some("ab01"), CDataType::SQL_C_BINARY, buf.as_mut_ptr() as Pointer, 2, &mut ind);
        }
        assert_eq!(buf, [0xab, 0x01]);
    }
}
