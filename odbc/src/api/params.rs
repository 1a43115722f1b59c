//! `SQLBindParameter` support (spec §4.3 Bind): renders a caller's C
//! buffer into the SQL literal text `core::stmt` substitutes into the
//! batch, or recognizes a data-at-exec binding so the caller is routed
//! into the `SQLParamData`/`SQLPutData` protocol instead.

use odbc_sys::{CDataType, Len, Pointer};

/// `SQL_NULL_DATA`.
pub const SQL_NULL_DATA: Len = -1;
/// `SQL_DATA_AT_EXEC`.
pub const SQL_DATA_AT_EXEC: Len = -2;

pub fn is_null_indicator(indicator: Len) -> bool {
    indicator == SQL_NULL_DATA
}

/// `SQL_DATA_AT_EXEC` or the `SQL_LEN_DATA_AT_EXEC(length)` macro's range,
/// which real drivers distinguish by `indicator <= SQL_DATA_AT_EXEC`.
pub fn is_data_at_exec_indicator(indicator: Len) -> bool {
    indicator <= SQL_DATA_AT_EXEC
}

unsafe fn read_fixed<T: Copy>(ptr: Pointer) -> T {
    *(ptr as *const T)
}

/// Reads `value_ptr` under `c_type` and renders it as SQL literal text.
/// Mirrors `api::data::get_data`'s type matrix in reverse.
///
/// # Safety
/// Reads from `value_ptr`, a raw C buffer supplied by the driver manager.
pub unsafe fn render_bound_literal(c_type: CDataType, value_ptr: Pointer, buffer_length: Len, indicator: Len) -> String {
    match c_type {
        CDataType::SQL_C_CHAR | CDataType::SQL_C_DEFAULT => quote_text(&read_narrow_text(value_ptr, indicator), false),
        CDataType::SQL_C_WCHAR => quote_text(&read_wide_text(value_ptr, indicator), true),
        CDataType::SQL_C_BIT => if read_fixed::<u8>(value_ptr) != 0 { "1" } else { "0" }.to_string(),
        CDataType::SQL_C_STINYINT | CDataType::SQL_C_TINYINT => read_fixed::<i8>(value_ptr).to_string(),
        CDataType::SQL_C_UTINYINT => read_fixed::<u8>(value_ptr).to_string(),
        CDataType::SQL_C_SSHORT | CDataType::SQL_C_SHORT => read_fixed::<i16>(value_ptr).to_string(),
        CDataType::SQL_C_USHORT => read_fixed::<u16>(value_ptr).to_string(),
        CDataType::SQL_C_SLONG | CDataType::SQL_C_LONG => read_fixed::<i32>(value_ptr).to_string(),
        CDataType::SQL_C_ULONG => read_fixed::<u32>(value_ptr).to_string(),
        CDataType::SQL_C_SBIGINT => read_fixed::<i64>(value_ptr).to_string(),
        CDataType::SQL_C_UBIGINT => read_fixed::<u64>(value_ptr).to_string(),
        CDataType::SQL_C_FLOAT => read_fixed::<f32>(value_ptr).to_string(),
        CDataType::SQL_C_DOUBLE => read_fixed::<f64>(value_ptr).to_string(),
        CDataType::SQL_C_BINARY => {
            let len = if indicator >= 0 { indicator as usize } else { buffer_length.max(0) as usize };
            let bytes = std::slice::from_raw_parts(value_ptr as *const u8, len);
            format!("0x{}", hex::encode(bytes))
        }
        _ => quote_text(&read_narrow_text(value_ptr, indicator), false),
    }
}

unsafe fn read_narrow_text(value_ptr: Pointer, indicator: Len) -> String {
    if indicator >= 0 {
        let bytes = std::slice::from_raw_parts(value_ptr as *const u8, indicator as usize);
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        std::ffi::CStr::from_ptr(value_ptr as *const i8).to_string_lossy().into_owned()
    }
}

unsafe fn read_wide_text(value_ptr: Pointer, indicator: Len) -> String {
    if indicator >= 0 {
        let units = std::slice::from_raw_parts(value_ptr as *const u16, (indicator as usize) / 2);
        String::from_utf16_lossy(units)
    } else {
        let mut dst = Vec::new();
        let mut p = value_ptr as *const u16;
        while *p != 0 {
            dst.push(*p);
            p = p.add(1);
        }
        String::from_utf16_lossy(&dst)
    }
}

fn quote_text(text: &str, wide: bool) -> String {
    let escaped = text.replace('\'', "''");
    if wide {
        format!("N'{escaped}'")
    } else {
        format!("'{escaped}'")
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn integer_renders_as_decimal_text() {
        let v: i32 = -42;
        let s = unsafe { render_bound_literal(CDataType::SQL_C_SLONG, &v as *const i32 as Pointer, 4, 4) };
        assert_eq!(s, "-42");
    }

    #[test]
    fn narrow_text_is_quoted_and_escaped() {
        let bytes = b"it's";
        let s = unsafe {
            render_bound_literal(CDataType::SQL_C_CHAR, bytes.as_ptr() as Pointer, bytes.len() as Len, bytes.len() as Len)
        };
        assert_eq!(s, "'it''s'");
    }

    #[test]
    fn binary_renders_as_hex_literal() {
        let bytes = [0xABu8, 0x01];
        let s = unsafe { render_bound_literal(CDataType::SQL_C_BINARY, bytes.as_ptr() as Pointer, 2, 2) };
        assert_eq!(s, "0xab01");
    }

    #[test]
    fn null_and_data_at_exec_indicators_are_distinct() {
        assert!(is_null_indicator(SQL_NULL_DATA));
        assert!(is_data_at_exec_indicator(SQL_DATA_AT_EXEC));
        assert!(!is_data_at_exec_indicator(5));
        assert!(!is_null_indicator(5));
    }
}
