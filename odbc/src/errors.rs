use constants::{
    DSN_NOT_FOUND, FUNCTION_SEQUENCE_ERROR, GENERAL_ERROR, INVALID_DESCRIPTOR_INDEX, NOT_IMPLEMENTED,
};
use furball_core::Error as CoreError;

/// Everything that can land in a diagnostic record list (spec §4.6).
/// Wraps `furball_core::Error` for TDS/statement failures and adds the
/// handful of error shapes that only make sense at the ABI boundary.
#[derive(Debug)]
pub enum ODBCError {
    Core(CoreError),
    InvalidAttrValue(&'static str),
    InvalidAttrIdentifier(&'static str),
    FunctionSequenceError,
    InvalidColumnIndex(u16),
    InvalidCursorOrientation,
    Unimplemented(&'static str),
    InvalidUriFormat(String),
    General(String),
}

impl std::fmt::Display for ODBCError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ODBCError::Core(e) => write!(f, "[{}][furball] {e}", constants::VENDOR_IDENTIFIER),
            ODBCError::InvalidAttrValue(a) => {
                write!(f, "[{}][furball] invalid attribute value: {a}", constants::VENDOR_IDENTIFIER)
            }
            ODBCError::InvalidAttrIdentifier(a) => write!(
                f,
                "[{}][furball] invalid attribute identifier: {a}",
                constants::VENDOR_IDENTIFIER
            ),
            ODBCError::FunctionSequenceError => write!(
                f,
                "[{}][furball] function sequence error",
                constants::VENDOR_IDENTIFIER
            ),
            ODBCError::InvalidColumnIndex(i) => write!(
                f,
                "[{}][furball] invalid column index: {i}",
                constants::VENDOR_IDENTIFIER
            ),
            ODBCError::InvalidCursorOrientation => write!(
                f,
                "[{}][furball] only SQL_FETCH_NEXT is supported",
                constants::VENDOR_IDENTIFIER
            ),
            ODBCError::Unimplemented(name) => write!(
                f,
                "[{}][furball] the feature {name} is not implemented",
                constants::VENDOR_IDENTIFIER
            ),
            ODBCError::InvalidUriFormat(msg) => {
                write!(f, "[{}][furball] invalid connection string: {msg}", constants::VENDOR_IDENTIFIER)
            }
            ODBCError::General(msg) => write!(f, "[{}][furball] {msg}", constants::VENDOR_IDENTIFIER),
        }
    }
}

impl ODBCError {
    pub fn sql_state(&self) -> &'static str {
        match self {
            ODBCError::Core(e) => e.sql_state(),
            ODBCError::InvalidAttrValue(_) => constants::INVALID_ATTR_VALUE,
            ODBCError::InvalidAttrIdentifier(_) => constants::INVALID_ATTR_IDENTIFIER,
            ODBCError::FunctionSequenceError => FUNCTION_SEQUENCE_ERROR,
            ODBCError::InvalidColumnIndex(_) => INVALID_DESCRIPTOR_INDEX,
            ODBCError::InvalidCursorOrientation => GENERAL_ERROR,
            ODBCError::Unimplemented(_) => NOT_IMPLEMENTED,
            ODBCError::InvalidUriFormat(_) => DSN_NOT_FOUND,
            ODBCError::General(_) => GENERAL_ERROR,
        }
    }

    pub fn native_err_code(&self) -> i32 {
        0
    }
}

impl From<CoreError> for ODBCError {
    fn from(e: CoreError) -> Self {
        ODBCError::Core(e)
    }
}
