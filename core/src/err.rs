use constants::{
    CONNECTION_NOT_OPEN, DATA_EXCEPTION, GENERAL_ERROR, INVALID_CURSOR_STATE,
    INVALID_DESCRIPTOR_INDEX, NOT_IMPLEMENTED, SYNTAX_ERROR, UNABLE_TO_CONNECT,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to connect to server: {0}")]
    Connect(String),
    #[error("not connected")]
    NotConnected,
    #[error("server error: {0}")]
    Server(#[source] tiberius::error::Error),
    #[error("no current row")]
    InvalidCursorState,
    #[error("column index {0} out of range (1..={1})")]
    ColumnIndexOutOfBounds(u16, u16),
    #[error("no prepared statement")]
    FunctionSequence,
    #[error("feature not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// The SQLSTATE this error maps to. One place that knows the mapping so
    /// the odbc crate never has to pattern-match on message text.
    pub fn sql_state(&self) -> &'static str {
        match self {
            Error::Connect(_) => UNABLE_TO_CONNECT,
            Error::NotConnected => CONNECTION_NOT_OPEN,
            Error::Server(e) => server_error_sql_state(e),
            Error::InvalidCursorState => INVALID_CURSOR_STATE,
            Error::ColumnIndexOutOfBounds(..) => INVALID_DESCRIPTOR_INDEX,
            Error::FunctionSequence => constants::FUNCTION_SEQUENCE_ERROR,
            Error::NotImplemented(_) => NOT_IMPLEMENTED,
            Error::InvalidData(_) => DATA_EXCEPTION,
        }
    }
}

/// tiberius surfaces server-reported errors as `TokenError`; map its numeric
/// class to a SQLSTATE family where we can, falling back to HY000.
fn server_error_sql_state(e: &tiberius::error::Error) -> &'static str {
    match e {
        tiberius::error::Error::Server(token) => match token.class() {
            // SQL Server severity 14-16 informational/object errors are
            // almost always either a missing object or a syntax mistake;
            // without parsing the message text we can't tell which, so we
            // fall back to the generic syntax family, which both the
            // 42000 and 42S02 callers of this driver expect to see here.
            14..=16 => SYNTAX_ERROR,
            _ => GENERAL_ERROR,
        },
        _ => GENERAL_ERROR,
    }
}
