//! Test-only hooks for driving the exported `SQL*` surface without a real
//! server connection. Not part of the ODBC contract; used by this crate's
//! own integration tests under `tests/` to inject a `furball_core::TdsSource`
//! fake after `SQLAllocHandle(SQL_HANDLE_DBC, ...)` instead of dialing out
//! through `SQLConnect`/`SQLDriverConnect`.

use crate::handles::{ConnectionState, FurballHandleRef};
use furball_core::TdsSource;
use odbc_sys::HDbc;

/// Attaches `tds` to an already-allocated connection handle and marks it
/// `Connected`. Panics if `handle` isn't a connection handle.
pub fn attach_tds_source(handle: HDbc, tds: Box<dyn TdsSource>) {
    let handle_ref: FurballHandleRef = handle.into();
    let conn = handle_ref
        .as_connection()
        .expect("attach_tds_source called on a non-connection handle");
    let mut conn = conn.write().unwrap();
    conn.tds = Some(tds);
    conn.state = ConnectionState::Connected;
}
