//! The exported `SQL*` C entry points (spec §4.3, §4.6, §4.7, §4.8, §6).
//! Every function here is a thin, panic-safe wrapper: pull the handle out
//! of the raw pointer the driver manager hands back to us, do the real
//! work in terms of `furball_core`/`crate::handles` types, and translate
//! the result into an `SqlReturn` plus whatever diagnostics it produced.
//!
//! Narrow and wide variants are both fully implemented (not one stubbed in
//! terms of the other) so a caller linking against either ODBC entry point
//! family gets identical behavior.

use crate::api::data::get_data;
use crate::api::diag::{get_diag_field, get_diag_rec, get_diag_recw, get_stmt_diag_field, truncate_text_narrow, truncate_text_wide};
use crate::api::info;
use crate::api::params::{is_data_at_exec_indicator, is_null_indicator, render_bound_literal};
use crate::api::util::{input_text_to_string, input_wtext_to_string, set_str_length, set_str_length_small};
use crate::definitions::DiagType;
use crate::dsn;
use crate::errors::ODBCError;
use crate::handles::{Connection, ConnectionState, Env, EnvState, FurballHandle, FurballHandleRef, Statement};
use crate::odbc_uri::ODBCUri;

use furball_core::{block_on, BoundParameter, CatalogQuery, ExecOutcome, ParamIndicator, TdsConnection, TdsSource};
use num_traits::FromPrimitive;
use odbc_sys::{
    CDataType, Char, CompletionType, ConnectionAttribute, DriverConnectOption, EnvironmentAttribute, FetchOrientation,
    Handle, HandleType, HDbc, HEnv, HStmt, HWnd, Integer, Len, Nullability, Pointer, RetCode, SmallInt, SqlDataType,
    SqlReturn, StatementAttribute, WChar,
};
use std::sync::RwLock;

/// `SQL_CLOSE` / `SQL_DROP` / `SQL_UNBIND` / `SQL_RESET_PARAMS` (SQLFreeStmt).
const SQL_CLOSE: SmallInt = 0;
const SQL_DROP: SmallInt = 1;
const SQL_UNBIND: SmallInt = 2;
const SQL_RESET_PARAMS: SmallInt = 3;

/// `SQL_AUTOCOMMIT_ON`.
const SQL_AUTOCOMMIT_ON: usize = 1;

macro_rules! panic_safe {
    ($body:expr) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(ret) => ret,
            Err(_) => {
                log::error!("panic caught at the ODBC FFI boundary; returning SQL_ERROR");
                SqlReturn::ERROR
            }
        }
    };
}

// Every one of these three macros clears the target handle's diagnostic
// list before doing anything else (spec §4.6/§7: diagnostics are cleared
// on the next operation that can populate them). `SQLGetDiagRec`/`Field`
// read handles through `FurballHandleRef` directly rather than through
// these macros, so reading diagnostics never wipes the records it's about
// to report.
macro_rules! get_env {
    ($handle:expr) => {{
        if $handle.is_null() {
            return SqlReturn::INVALID_HANDLE;
        }
        let handle_ref: FurballHandleRef = $handle.into();
        handle_ref.clear_diagnostics();
        match handle_ref.as_env() {
            Some(e) => e,
            None => return SqlReturn::INVALID_HANDLE,
        }
    }};
}

macro_rules! get_conn {
    ($handle:expr) => {{
        if $handle.is_null() {
            return SqlReturn::INVALID_HANDLE;
        }
        let handle_ref: FurballHandleRef = $handle.into();
        handle_ref.clear_diagnostics();
        match handle_ref.as_connection() {
            Some(c) => c,
            None => return SqlReturn::INVALID_HANDLE,
        }
    }};
}

macro_rules! get_stmt {
    ($handle:expr) => {{
        if $handle.is_null() {
            return SqlReturn::INVALID_HANDLE;
        }
        let handle_ref: FurballHandleRef = $handle.into();
        handle_ref.clear_diagnostics();
        match handle_ref.as_statement() {
            Some(s) => s,
            None => return SqlReturn::INVALID_HANDLE,
        }
    }};
}

// ---------------------------------------------------------------------
// Handle lifecycle (spec §3, §4.1)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLAllocHandle(handle_type: HandleType, input_handle: Handle, output_handle: *mut Handle) -> SqlReturn {
    panic_safe!(sql_alloc_handle(handle_type, input_handle, output_handle))
}

fn sql_alloc_handle(handle_type: HandleType, input_handle: Handle, output_handle: *mut Handle) -> SqlReturn {
    if output_handle.is_null() {
        return SqlReturn::ERROR;
    }
    match handle_type {
        HandleType::Env => {
            let env = FurballHandle::Env(RwLock::new(Env::with_state(EnvState::Allocated)));
            let ptr = Box::into_raw(Box::new(env));
            unsafe { *output_handle = ptr as Handle };
            SqlReturn::SUCCESS
        }
        HandleType::Dbc => {
            let env_lock = get_env!(input_handle as HEnv);
            let conn = FurballHandle::Connection(RwLock::new(Connection::with_state(
                input_handle as *mut FurballHandle,
                ConnectionState::Allocated,
            )));
            let ptr = Box::into_raw(Box::new(conn));
            {
                let mut e = env_lock.write().unwrap();
                e.connections.insert(ptr);
                e.state = EnvState::ConnectionAllocated;
            }
            unsafe { *output_handle = ptr as Handle };
            SqlReturn::SUCCESS
        }
        HandleType::Stmt => {
            let conn_lock = get_conn!(input_handle as HDbc);
            let stmt = FurballHandle::Statement(RwLock::new(Statement::with_connection(input_handle as *mut FurballHandle)));
            let ptr = Box::into_raw(Box::new(stmt));
            {
                let mut c = conn_lock.write().unwrap();
                c.statements.insert(ptr);
                c.state = ConnectionState::StatementAllocated;
            }
            unsafe { *output_handle = ptr as Handle };
            SqlReturn::SUCCESS
        }
        // No descriptor handles; this driver never exposes SQLSetDescField/Rec (spec §3).
        HandleType::Desc => SqlReturn::ERROR,
    }
}

#[no_mangle]
pub extern "C" fn SQLFreeHandle(handle_type: HandleType, handle: Handle) -> SqlReturn {
    panic_safe!({
        if handle.is_null() {
            return SqlReturn::INVALID_HANDLE;
        }
        let ptr = handle as *mut FurballHandle;
        match handle_type {
            HandleType::Env => free_env(ptr),
            HandleType::Dbc => free_connection(ptr),
            HandleType::Stmt => free_statement(ptr),
            HandleType::Desc => SqlReturn::ERROR,
        }
    })
}

fn free_statement(ptr: *mut FurballHandle) -> SqlReturn {
    let handle = unsafe { &*ptr };
    let Some(stmt_lock) = handle.as_statement() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let conn_ptr = stmt_lock.read().unwrap().connection;
    if !conn_ptr.is_null() {
        if let Some(conn_lock) = unsafe { &*conn_ptr }.as_connection() {
            conn_lock.write().unwrap().statements.remove(&ptr);
        }
    }
    drop(unsafe { Box::from_raw(ptr) });
    SqlReturn::SUCCESS
}

fn free_connection(ptr: *mut FurballHandle) -> SqlReturn {
    let handle = unsafe { &*ptr };
    let Some(conn_lock) = handle.as_connection() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let (env_ptr, child_stmts) = {
        let c = conn_lock.read().unwrap();
        (c.env, c.statements.iter().copied().collect::<Vec<_>>())
    };
    for stmt_ptr in child_stmts {
        free_statement(stmt_ptr);
    }
    if !env_ptr.is_null() {
        if let Some(env_lock) = unsafe { &*env_ptr }.as_env() {
            env_lock.write().unwrap().connections.remove(&ptr);
        }
    }
    drop(unsafe { Box::from_raw(ptr) });
    SqlReturn::SUCCESS
}

fn free_env(ptr: *mut FurballHandle) -> SqlReturn {
    let handle = unsafe { &*ptr };
    let Some(env_lock) = handle.as_env() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let child_conns = env_lock.read().unwrap().connections.iter().copied().collect::<Vec<_>>();
    for conn_ptr in child_conns {
        free_connection(conn_ptr);
    }
    drop(unsafe { Box::from_raw(ptr) });
    SqlReturn::SUCCESS
}

#[no_mangle]
pub extern "C" fn SQLFreeStmt(statement_handle: HStmt, option: SmallInt) -> SqlReturn {
    panic_safe!({
        if option == SQL_DROP {
            return free_statement(statement_handle as *mut FurballHandle);
        }
        let stmt_lock = get_stmt!(statement_handle);
        let mut s = stmt_lock.write().unwrap();
        match option {
            SQL_CLOSE | SQL_UNBIND => s.core.close(),
            SQL_RESET_PARAMS => s.core.reset_params(),
            _ => return SqlReturn::ERROR,
        }
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLCloseCursor(statement_handle: HStmt) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        stmt_lock.write().unwrap().core.close();
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLCancel(_statement_handle: HStmt) -> SqlReturn {
    // Every operation in this driver runs synchronously to completion
    // before returning, so there is nothing in flight to cancel.
    SqlReturn::SUCCESS
}

// ---------------------------------------------------------------------
// Environment attributes (spec §4.1)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLSetEnvAttr(environment_handle: HEnv, attribute: EnvironmentAttribute, value: Pointer, string_length: Integer) -> SqlReturn {
    panic_safe!(sql_set_env_attr(environment_handle, attribute, value, string_length))
}

fn sql_set_env_attr(environment_handle: HEnv, attribute: EnvironmentAttribute, value: Pointer, _string_length: Integer) -> SqlReturn {
    let env_lock = get_env!(environment_handle);
    match attribute {
        EnvironmentAttribute::OdbcVersion => {
            env_lock.write().unwrap().odbc_ver = value as i32;
            SqlReturn::SUCCESS
        }
        EnvironmentAttribute::ConnectionPooling | EnvironmentAttribute::CpMatch | EnvironmentAttribute::OutputNts => {
            // Connection pooling and output-NTS negotiation aren't
            // meaningful for this driver; accept and ignore (spec §4.1:
            // "pooling is out of scope").
            SqlReturn::SUCCESS
        }
    }
}

#[no_mangle]
pub extern "C" fn SQLGetEnvAttr(
    environment_handle: HEnv,
    attribute: EnvironmentAttribute,
    value_ptr: Pointer,
    _buffer_length: Integer,
    string_length_ptr: *mut Integer,
) -> SqlReturn {
    panic_safe!({
        let env_lock = get_env!(environment_handle);
        let value = match attribute {
            EnvironmentAttribute::OdbcVersion => env_lock.read().unwrap().odbc_ver,
            EnvironmentAttribute::ConnectionPooling => 0,
            EnvironmentAttribute::CpMatch => 0,
            EnvironmentAttribute::OutputNts => 1,
        };
        if !value_ptr.is_null() {
            unsafe { *(value_ptr as *mut Integer) = value };
        }
        set_str_length(string_length_ptr, std::mem::size_of::<Integer>() as Integer);
        SqlReturn::SUCCESS
    })
}

// ---------------------------------------------------------------------
// Connect / disconnect (spec §4.2, §6)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLConnect(
    connection_handle: HDbc,
    server_name: *const Char,
    name_length1: SmallInt,
    user_name: *const Char,
    name_length2: SmallInt,
    authentication: *const Char,
    name_length3: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let dsn_name = input_text_to_string(server_name as *const u8, name_length1 as Integer);
        let uid = (!user_name.is_null()).then(|| input_text_to_string(user_name as *const u8, name_length2 as Integer));
        let pwd = (!authentication.is_null()).then(|| input_text_to_string(authentication as *const u8, name_length3 as Integer));
        sql_connect_impl(connection_handle, &dsn_name, uid, pwd)
    })
}

#[no_mangle]
pub extern "C" fn SQLConnectW(
    connection_handle: HDbc,
    server_name: *const WChar,
    name_length1: SmallInt,
    user_name: *const WChar,
    name_length2: SmallInt,
    authentication: *const WChar,
    name_length3: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let dsn_name = input_wtext_to_string(server_name, name_length1 as Integer);
        let uid = (!user_name.is_null()).then(|| input_wtext_to_string(user_name, name_length2 as Integer));
        let pwd = (!authentication.is_null()).then(|| input_wtext_to_string(authentication, name_length3 as Integer));
        sql_connect_impl(connection_handle, &dsn_name, uid, pwd)
    })
}

/// `SQLConnect`'s real ODBC semantics: the first argument names a DSN, not
/// a raw connection string (spec §4.2/§6), so it always goes through DSN
/// lookup before being parsed as `Key=Value;` attributes.
fn sql_connect_impl(connection_handle: HDbc, dsn_name: &str, uid: Option<String>, pwd: Option<String>) -> SqlReturn {
    let conn_lock = get_conn!(connection_handle);
    let handle_ref: FurballHandleRef = connection_handle.into();

    let connection_string = match dsn::lookup(dsn_name) {
        Ok(s) => s,
        Err(e) => {
            handle_ref.add_diag_info(e);
            return SqlReturn::ERROR;
        }
    };
    match establish_connection(&conn_lock, &connection_string, uid, pwd) {
        Ok(()) => SqlReturn::SUCCESS,
        Err(e) => {
            handle_ref.add_diag_info(e);
            SqlReturn::ERROR
        }
    }
}

fn establish_connection(
    conn_lock: &RwLock<Connection>,
    connection_string: &str,
    uid: Option<String>,
    pwd: Option<String>,
) -> Result<(), ODBCError> {
    let options = ODBCUri::new(connection_string)?.into_connection_options(uid, pwd)?;
    let tds = block_on(TdsConnection::connect(&options))?;
    let mut c = conn_lock.write().unwrap();
    c.options = options;
    c.tds = Some(Box::new(tds));
    c.state = ConnectionState::Connected;
    Ok(())
}

#[no_mangle]
pub extern "C" fn SQLDriverConnect(
    connection_handle: HDbc,
    _window_handle: HWnd,
    in_connection_string: *const Char,
    string_length1: SmallInt,
    out_connection_string: *mut Char,
    buffer_length: SmallInt,
    string_length2_ptr: *mut SmallInt,
    driver_completion: DriverConnectOption,
) -> SqlReturn {
    panic_safe!({
        let input = input_text_to_string(in_connection_string as *const u8, string_length1 as Integer);
        sql_driver_connect_impl(connection_handle, &input, driver_completion, |s| {
            truncate_text_narrow(s, out_connection_string, buffer_length, string_length2_ptr)
        })
    })
}

#[no_mangle]
pub extern "C" fn SQLDriverConnectW(
    connection_handle: HDbc,
    _window_handle: HWnd,
    in_connection_string: *const WChar,
    string_length1: SmallInt,
    out_connection_string: *mut WChar,
    buffer_length: SmallInt,
    string_length2_ptr: *mut SmallInt,
    driver_completion: DriverConnectOption,
) -> SqlReturn {
    panic_safe!({
        let input = input_wtext_to_string(in_connection_string, string_length1 as Integer);
        sql_driver_connect_impl(connection_handle, &input, driver_completion, |s| {
            truncate_text_wide(s, out_connection_string, buffer_length, string_length2_ptr)
        })
    })
}

/// `SQLDriverConnect` parses its argument as a connection string directly,
/// unlike `SQLConnect`'s DSN-name argument (spec §4.2/§6). No prompting UI
/// exists in this driver, so any completion option other than `NoPrompt`
/// is accepted but behaves identically.
fn sql_driver_connect_impl(
    connection_handle: HDbc,
    input: &str,
    _driver_completion: DriverConnectOption,
    write_out: impl FnOnce(&str) -> SqlReturn,
) -> SqlReturn {
    let conn_lock = get_conn!(connection_handle);
    let handle_ref: FurballHandleRef = connection_handle.into();
    match establish_connection(&conn_lock, input, None, None) {
        Ok(()) => write_out(input),
        Err(e) => {
            handle_ref.add_diag_info(e);
            SqlReturn::ERROR
        }
    }
}

#[no_mangle]
pub extern "C" fn SQLDisconnect(connection_handle: HDbc) -> SqlReturn {
    panic_safe!({
        let conn_lock = get_conn!(connection_handle);
        let mut c = conn_lock.write().unwrap();
        c.tds = None;
        c.state = ConnectionState::Allocated;
        SqlReturn::SUCCESS
    })
}

// ---------------------------------------------------------------------
// Connection attributes (spec §4.2)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLSetConnectAttr(connection_handle: HDbc, attribute: ConnectionAttribute, value: Pointer, string_length: Integer) -> SqlReturn {
    panic_safe!(sql_set_connect_attr(connection_handle, attribute, value, string_length, false))
}

#[no_mangle]
pub extern "C" fn SQLSetConnectAttrW(connection_handle: HDbc, attribute: ConnectionAttribute, value: Pointer, string_length: Integer) -> SqlReturn {
    panic_safe!(sql_set_connect_attr(connection_handle, attribute, value, string_length, true))
}

fn sql_set_connect_attr(connection_handle: HDbc, attribute: ConnectionAttribute, value: Pointer, string_length: Integer, is_wide: bool) -> SqlReturn {
    let conn_lock = get_conn!(connection_handle);
    let handle_ref: FurballHandleRef = connection_handle.into();
    match attribute {
        ConnectionAttribute::AutoCommit => {
            let on = (value as usize) == SQL_AUTOCOMMIT_ON;
            let result = {
                let mut c = conn_lock.write().unwrap();
                let Some(tds) = c.tds.as_deref_mut() else {
                    return err_not_connected(handle_ref);
                };
                block_on(tds.set_autocommit(on))
            };
            match result {
                Ok(()) => SqlReturn::SUCCESS,
                Err(e) => {
                    handle_ref.add_diag_info(ODBCError::Core(e));
                    SqlReturn::ERROR
                }
            }
        }
        ConnectionAttribute::LoginTimeout => {
            conn_lock.write().unwrap().login_timeout = Some(value as usize as u32);
            SqlReturn::SUCCESS
        }
        ConnectionAttribute::ConnectionTimeout => {
            conn_lock.write().unwrap().connection_timeout = Some(value as usize as u32);
            SqlReturn::SUCCESS
        }
        ConnectionAttribute::CurrentCatalog => {
            let db = if is_wide {
                input_wtext_to_string(value as *const WChar, string_length)
            } else {
                input_text_to_string(value as *const u8, string_length)
            };
            conn_lock.write().unwrap().options.database = Some(db);
            SqlReturn::SUCCESS
        }
        _ => {
            handle_ref.add_diag_info(ODBCError::Unimplemented("this connection attribute"));
            SqlReturn::ERROR
        }
    }
}

fn err_not_connected(handle_ref: FurballHandleRef) -> SqlReturn {
    handle_ref.add_diag_info(ODBCError::Core(furball_core::Error::NotConnected));
    SqlReturn::ERROR
}

#[no_mangle]
pub extern "C" fn SQLGetConnectAttr(
    connection_handle: HDbc,
    attribute: ConnectionAttribute,
    value_ptr: Pointer,
    buffer_length: Integer,
    string_length_ptr: *mut Integer,
) -> SqlReturn {
    panic_safe!(sql_get_connect_attr(connection_handle, attribute, value_ptr, buffer_length, string_length_ptr, false))
}

#[no_mangle]
pub extern "C" fn SQLGetConnectAttrW(
    connection_handle: HDbc,
    attribute: ConnectionAttribute,
    value_ptr: Pointer,
    buffer_length: Integer,
    string_length_ptr: *mut Integer,
) -> SqlReturn {
    panic_safe!(sql_get_connect_attr(connection_handle, attribute, value_ptr, buffer_length, string_length_ptr, true))
}

/// `SQLGetConnectAttrW`'s wide answer for autocommit state is identical to
/// the narrow getter's: both report the same boolean, just through a
/// differently-typed output buffer where the attribute is textual.
fn sql_get_connect_attr(
    connection_handle: HDbc,
    attribute: ConnectionAttribute,
    value_ptr: Pointer,
    buffer_length: Integer,
    string_length_ptr: *mut Integer,
    is_wide: bool,
) -> SqlReturn {
    let conn_lock = get_conn!(connection_handle);
    let c = conn_lock.read().unwrap();
    match attribute {
        ConnectionAttribute::AutoCommit => {
            let on = c.tds.as_deref().map(|t| t.autocommit()).unwrap_or(true);
            if !value_ptr.is_null() {
                unsafe { *(value_ptr as *mut usize) = on as usize };
            }
            SqlReturn::SUCCESS
        }
        ConnectionAttribute::LoginTimeout => {
            if !value_ptr.is_null() {
                unsafe { *(value_ptr as *mut u32) = c.login_timeout.unwrap_or(0) };
            }
            SqlReturn::SUCCESS
        }
        ConnectionAttribute::ConnectionTimeout => {
            if !value_ptr.is_null() {
                unsafe { *(value_ptr as *mut u32) = c.connection_timeout.unwrap_or(0) };
            }
            SqlReturn::SUCCESS
        }
        ConnectionAttribute::CurrentCatalog => {
            let db = c.options.database.clone().unwrap_or_default();
            if is_wide {
                truncate_text_wide(&db, value_ptr as *mut WChar, buffer_length as SmallInt, string_length_ptr as *mut SmallInt)
            } else {
                truncate_text_narrow(&db, value_ptr as *mut Char, buffer_length as SmallInt, string_length_ptr as *mut SmallInt)
            }
        }
        _ => {
            drop(c);
            let handle_ref: FurballHandleRef = connection_handle.into();
            handle_ref.add_diag_info(ODBCError::Unimplemented("this connection attribute"));
            SqlReturn::ERROR
        }
    }
}

// ---------------------------------------------------------------------
// Transactions (spec §4.2)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLEndTran(handle_type: HandleType, handle: Handle, completion_type: CompletionType) -> SqlReturn {
    panic_safe!({
        let commit = completion_type == CompletionType::Commit;
        match handle_type {
            HandleType::Dbc => end_tran_one(handle as HDbc, commit),
            HandleType::Env => {
                let env_lock = get_env!(handle as HEnv);
                let conns = env_lock.read().unwrap().connections.iter().copied().collect::<Vec<_>>();
                let mut ret = SqlReturn::SUCCESS;
                for conn_ptr in conns {
                    if end_tran_one(conn_ptr as HDbc, commit) != SqlReturn::SUCCESS {
                        ret = SqlReturn::ERROR;
                    }
                }
                ret
            }
            _ => SqlReturn::ERROR,
        }
    })
}

fn end_tran_one(connection_handle: HDbc, commit: bool) -> SqlReturn {
    let conn_lock = get_conn!(connection_handle);
    let handle_ref: FurballHandleRef = connection_handle.into();
    let mut c = conn_lock.write().unwrap();
    let Some(tds) = c.tds.as_deref_mut() else {
        return SqlReturn::SUCCESS;
    };
    if !tds.in_transaction() {
        return SqlReturn::SUCCESS;
    }
    match block_on(tds.end_transaction(commit)) {
        Ok(()) => SqlReturn::SUCCESS,
        Err(e) => {
            handle_ref.add_diag_info(ODBCError::Core(e));
            SqlReturn::ERROR
        }
    }
}

// ---------------------------------------------------------------------
// Statement preparation and execution (spec §4.3)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLPrepare(statement_handle: HStmt, statement_text: *const Char, text_length: Integer) -> SqlReturn {
    panic_safe!({
        let sql = input_text_to_string(statement_text as *const u8, text_length);
        let stmt_lock = get_stmt!(statement_handle);
        stmt_lock.write().unwrap().core.prepare(&sql);
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLPrepareW(statement_handle: HStmt, statement_text: *const WChar, text_length: Integer) -> SqlReturn {
    panic_safe!({
        let sql = input_wtext_to_string(statement_text, text_length);
        let stmt_lock = get_stmt!(statement_handle);
        stmt_lock.write().unwrap().core.prepare(&sql);
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLExecDirect(statement_handle: HStmt, statement_text: *const Char, text_length: Integer) -> SqlReturn {
    panic_safe!({
        let sql = input_text_to_string(statement_text as *const u8, text_length);
        sql_exec_direct_impl(statement_handle, &sql)
    })
}

#[no_mangle]
pub extern "C" fn SQLExecDirectW(statement_handle: HStmt, statement_text: *const WChar, text_length: Integer) -> SqlReturn {
    panic_safe!({
        let sql = input_wtext_to_string(statement_text, text_length);
        sql_exec_direct_impl(statement_handle, &sql)
    })
}

fn sql_exec_direct_impl(statement_handle: HStmt, sql: &str) -> SqlReturn {
    let stmt_lock = get_stmt!(statement_handle);
    let conn_ptr = stmt_lock.read().unwrap().connection;
    let handle_ref: FurballHandleRef = statement_handle.into();
    let Some(conn_lock) = (unsafe { &*conn_ptr }).as_connection() else {
        return SqlReturn::INVALID_HANDLE;
    };
    let mut conn = conn_lock.write().unwrap();
    let Some(tds) = conn.tds.as_deref_mut() else {
        return err_not_connected(handle_ref);
    };
    let mut s = stmt_lock.write().unwrap();
    match block_on(s.core.execute_direct(tds, sql)) {
        Ok(outcome) => exec_outcome_to_sqlreturn(outcome),
        Err(e) => {
            drop(s);
            handle_ref.add_diag_info(ODBCError::Core(e));
            SqlReturn::ERROR
        }
    }
}

fn exec_outcome_to_sqlreturn(outcome: ExecOutcome) -> SqlReturn {
    match outcome {
        ExecOutcome::Executed { .. } => SqlReturn::SUCCESS,
        ExecOutcome::NeedData(_) => SqlReturn::NEED_DATA,
    }
}

#[no_mangle]
pub extern "C" fn SQLExecute(statement_handle: HStmt) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        let conn_ptr = stmt_lock.read().unwrap().connection;
        let handle_ref: FurballHandleRef = statement_handle.into();
        let Some(conn_lock) = (unsafe { &*conn_ptr }).as_connection() else {
            return SqlReturn::INVALID_HANDLE;
        };
        let mut conn = conn_lock.write().unwrap();
        let Some(tds) = conn.tds.as_deref_mut() else {
            return err_not_connected(handle_ref);
        };
        let mut s = stmt_lock.write().unwrap();
        match block_on(s.core.execute(tds)) {
            Ok(outcome) => exec_outcome_to_sqlreturn(outcome),
            Err(e) => {
                drop(s);
                handle_ref.add_diag_info(ODBCError::Core(e));
                SqlReturn::ERROR
            }
        }
    })
}

#[no_mangle]
pub extern "C" fn SQLNumParams(statement_handle: HStmt, param_count_ptr: *mut SmallInt) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        let n = stmt_lock.read().unwrap().core.num_params();
        set_str_length_small(param_count_ptr, n as SmallInt);
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLBindParameter(
    statement_handle: HStmt,
    parameter_number: SmallInt,
    _input_output_type: SmallInt,
    value_type: CDataType,
    _parameter_type: SqlDataType,
    _column_size: Len,
    _decimal_digits: SmallInt,
    parameter_value_ptr: Pointer,
    buffer_length: Len,
    str_len_or_ind_ptr: *mut Len,
) -> SqlReturn {
    panic_safe!({
        if parameter_number < 1 {
            return SqlReturn::ERROR;
        }
        let indicator = if str_len_or_ind_ptr.is_null() {
            0
        } else {
            unsafe { *str_len_or_ind_ptr }
        };
        let is_wide = matches!(value_type, CDataType::SQL_C_WCHAR);
        let is_binary = matches!(value_type, CDataType::SQL_C_BINARY);

        let indicator_value = if is_null_indicator(indicator) {
            ParamIndicator::Null
        } else if is_data_at_exec_indicator(indicator) {
            ParamIndicator::DataAtExec
        } else {
            ParamIndicator::Value(unsafe { render_bound_literal(value_type, parameter_value_ptr, buffer_length, indicator) })
        };

        let dae_token = matches!(indicator_value, ParamIndicator::DataAtExec).then_some(parameter_value_ptr as isize);

        let stmt_lock = get_stmt!(statement_handle);
        stmt_lock.write().unwrap().core.bind_parameter(BoundParameter {
            position: parameter_number as u16,
            indicator: indicator_value,
            dae_token,
            dae_is_binary: is_binary,
            dae_is_wide: is_wide,
        });
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLParamData(statement_handle: HStmt, value_ptr_ptr: *mut Pointer) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        let conn_ptr = stmt_lock.read().unwrap().connection;
        let handle_ref: FurballHandleRef = statement_handle.into();
        let Some(conn_lock) = (unsafe { &*conn_ptr }).as_connection() else {
            return SqlReturn::INVALID_HANDLE;
        };
        let mut conn = conn_lock.write().unwrap();
        let Some(tds) = conn.tds.as_deref_mut() else {
            return err_not_connected(handle_ref);
        };
        let mut s = stmt_lock.write().unwrap();
        match block_on(s.core.param_data(tds)) {
            Ok(ExecOutcome::NeedData(token)) => {
                if !value_ptr_ptr.is_null() {
                    unsafe { *value_ptr_ptr = token as Pointer };
                }
                SqlReturn::NEED_DATA
            }
            Ok(ExecOutcome::Executed { .. }) => SqlReturn::SUCCESS,
            Err(e) => {
                drop(s);
                handle_ref.add_diag_info(ODBCError::Core(e));
                SqlReturn::ERROR
            }
        }
    })
}

#[no_mangle]
pub extern "C" fn SQLPutData(statement_handle: HStmt, data_ptr: Pointer, str_len_or_ind_ptr: Len) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        let mut s = stmt_lock.write().unwrap();
        if is_null_indicator(str_len_or_ind_ptr) {
            return SqlReturn::SUCCESS;
        }
        let len = str_len_or_ind_ptr.max(0) as usize;
        let bytes = if data_ptr.is_null() || len == 0 {
            &[][..]
        } else {
            unsafe { std::slice::from_raw_parts(data_ptr as *const u8, len) }
        };
        match s.core.put_data(bytes) {
            Ok(()) => SqlReturn::SUCCESS,
            Err(e) => {
                drop(s);
                let handle_ref: FurballHandleRef = statement_handle.into();
                handle_ref.add_diag_info(ODBCError::Core(e));
                SqlReturn::ERROR
            }
        }
    })
}

// ---------------------------------------------------------------------
// Result-set navigation and retrieval (spec §4.4, §4.5)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLFetch(statement_handle: HStmt) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        let mut s = stmt_lock.write().unwrap();
        match s.core.fetch() {
            Ok(true) => SqlReturn::SUCCESS,
            Ok(false) => SqlReturn::NO_DATA,
            Err(e) => {
                drop(s);
                let handle_ref: FurballHandleRef = statement_handle.into();
                handle_ref.add_diag_info(ODBCError::Core(e));
                SqlReturn::ERROR
            }
        }
    })
}

#[no_mangle]
pub extern "C" fn SQLFetchScroll(statement_handle: HStmt, fetch_orientation: FetchOrientation, _fetch_offset: Len) -> SqlReturn {
    panic_safe!({
        if fetch_orientation != FetchOrientation::Next {
            let handle_ref: FurballHandleRef = statement_handle.into();
            handle_ref.add_diag_info(ODBCError::InvalidCursorOrientation);
            return SqlReturn::ERROR;
        }
        SQLFetch(statement_handle)
    })
}

#[no_mangle]
pub extern "C" fn SQLMoreResults(_statement_handle: HStmt) -> SqlReturn {
    // Only the first result set of a batch is ever materialized (spec §4.5
    // Non-goal: multiple concurrent result sets).
    SqlReturn::NO_DATA
}

#[no_mangle]
pub extern "C" fn SQLNumResultCols(statement_handle: HStmt, column_count_ptr: *mut SmallInt) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        let n = stmt_lock.read().unwrap().core.result.as_ref().map(|r| r.num_columns()).unwrap_or(0);
        set_str_length_small(column_count_ptr, n as SmallInt);
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLRowCount(statement_handle: HStmt, row_count_ptr: *mut Len) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        let count = stmt_lock.read().unwrap().core.row_count;
        if !row_count_ptr.is_null() {
            unsafe { *row_count_ptr = count as Len };
        }
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLDescribeCol(
    statement_handle: HStmt,
    column_number: SmallInt,
    column_name: *mut Char,
    buffer_length: SmallInt,
    name_length_ptr: *mut SmallInt,
    data_type_ptr: *mut SqlDataType,
    column_size_ptr: *mut Len,
    decimal_digits_ptr: *mut SmallInt,
    nullable_ptr: *mut Nullability,
) -> SqlReturn {
    panic_safe!(sql_describe_col_impl(
        statement_handle,
        column_number,
        data_type_ptr,
        column_size_ptr,
        decimal_digits_ptr,
        nullable_ptr,
        |name| truncate_text_narrow(name, column_name, buffer_length, name_length_ptr),
    ))
}

#[no_mangle]
pub extern "C" fn SQLDescribeColW(
    statement_handle: HStmt,
    column_number: SmallInt,
    column_name: *mut WChar,
    buffer_length: SmallInt,
    name_length_ptr: *mut SmallInt,
    data_type_ptr: *mut SqlDataType,
    column_size_ptr: *mut Len,
    decimal_digits_ptr: *mut SmallInt,
    nullable_ptr: *mut Nullability,
) -> SqlReturn {
    panic_safe!(sql_describe_col_impl(
        statement_handle,
        column_number,
        data_type_ptr,
        column_size_ptr,
        decimal_digits_ptr,
        nullable_ptr,
        |name| truncate_text_wide(name, column_name, buffer_length, name_length_ptr),
    ))
}

fn sql_describe_col_impl(
    statement_handle: HStmt,
    column_number: SmallInt,
    data_type_ptr: *mut SqlDataType,
    column_size_ptr: *mut Len,
    decimal_digits_ptr: *mut SmallInt,
    nullable_ptr: *mut Nullability,
    write_name: impl FnOnce(&str) -> SqlReturn,
) -> SqlReturn {
    let stmt_lock = get_stmt!(statement_handle);
    let s = stmt_lock.read().unwrap();
    let Some(store) = s.core.result.as_ref() else {
        return SqlReturn::ERROR;
    };
    let Some(col) = column_number.checked_sub(1).and_then(|i| store.columns().get(i as usize)) else {
        drop(s);
        let handle_ref: FurballHandleRef = statement_handle.into();
        handle_ref.add_diag_info(ODBCError::InvalidColumnIndex(column_number as u16));
        return SqlReturn::ERROR;
    };
    if !data_type_ptr.is_null() {
        unsafe { *data_type_ptr = col.sql_type };
    }
    if !column_size_ptr.is_null() {
        unsafe { *column_size_ptr = col.display_size.unwrap_or(0) as Len };
    }
    if !decimal_digits_ptr.is_null() {
        unsafe { *decimal_digits_ptr = col.scale.unwrap_or(0) };
    }
    if !nullable_ptr.is_null() {
        unsafe { *nullable_ptr = col.nullability };
    }
    write_name(&col.col_name)
}

/// `SQL_DESC_*` identifiers this driver answers for `SQLColAttribute`
/// (spec §4.4); the numeric codes are stable across every ODBC header.
const SQL_DESC_LABEL: Integer = 18;
const SQL_DESC_BASE_COLUMN_NAME: Integer = 22;
const SQL_DESC_TABLE_NAME: Integer = 23;
const SQL_DESC_TYPE_NAME: Integer = 14;
const SQL_DESC_UNSIGNED: Integer = 8;
const SQL_DESC_UPDATABLE: Integer = 10;
const SQL_DESC_SEARCHABLE: Integer = 13;
const SQL_DESC_TYPE: Integer = 2;
const SQL_DESC_LENGTH: Integer = 3;
const SQL_DESC_OCTET_LENGTH: Integer = 1999;
const SQL_DESC_PRECISION: Integer = 16;
const SQL_DESC_SCALE: Integer = 17;
const SQL_DESC_NULLABLE: Integer = 11;
const SQL_DESC_NAME: Integer = 1011;

#[no_mangle]
pub extern "C" fn SQLColAttribute(
    statement_handle: HStmt,
    column_number: SmallInt,
    field_identifier: Integer,
    character_attribute_ptr: Pointer,
    buffer_length: SmallInt,
    string_length_ptr: *mut SmallInt,
    numeric_attribute_ptr: *mut Len,
) -> SqlReturn {
    panic_safe!(sql_col_attribute_impl(
        statement_handle,
        column_number,
        field_identifier,
        numeric_attribute_ptr,
        |s| truncate_text_narrow(s, character_attribute_ptr as *mut Char, buffer_length, string_length_ptr),
    ))
}

#[no_mangle]
pub extern "C" fn SQLColAttributeW(
    statement_handle: HStmt,
    column_number: SmallInt,
    field_identifier: Integer,
    character_attribute_ptr: Pointer,
    buffer_length: SmallInt,
    string_length_ptr: *mut SmallInt,
    numeric_attribute_ptr: *mut Len,
) -> SqlReturn {
    panic_safe!(sql_col_attribute_impl(
        statement_handle,
        column_number,
        field_identifier,
        numeric_attribute_ptr,
        |s| truncate_text_wide(s, character_attribute_ptr as *mut WChar, buffer_length, string_length_ptr),
    ))
}

fn sql_col_attribute_impl(
    statement_handle: HStmt,
    column_number: SmallInt,
    field_identifier: Integer,
    numeric_attribute_ptr: *mut Len,
    write_text_field: impl FnOnce(&str) -> SqlReturn,
) -> SqlReturn {
    let stmt_lock = get_stmt!(statement_handle);
    let s = stmt_lock.read().unwrap();
    let Some(store) = s.core.result.as_ref() else {
        return SqlReturn::ERROR;
    };
    let Some(col) = column_number.checked_sub(1).and_then(|i| store.columns().get(i as usize)) else {
        drop(s);
        let handle_ref: FurballHandleRef = statement_handle.into();
        handle_ref.add_diag_info(ODBCError::InvalidColumnIndex(column_number as u16));
        return SqlReturn::ERROR;
    };
    match field_identifier {
        SQL_DESC_NAME | SQL_DESC_LABEL => write_text_field(&col.col_name),
        SQL_DESC_BASE_COLUMN_NAME => write_text_field(&col.base_col_name),
        SQL_DESC_TABLE_NAME => write_text_field(&col.table_name),
        SQL_DESC_TYPE_NAME => write_text_field(type_name_for(col.sql_type)),
        SQL_DESC_UNSIGNED => write_numeric(numeric_attribute_ptr, col.is_unsigned as Len),
        SQL_DESC_UPDATABLE => write_numeric(numeric_attribute_ptr, col.is_updatable as Len),
        SQL_DESC_SEARCHABLE => write_numeric(numeric_attribute_ptr, col.is_searchable as Len),
        SQL_DESC_TYPE => write_numeric(numeric_attribute_ptr, col.sql_type as Len),
        SQL_DESC_LENGTH | SQL_DESC_OCTET_LENGTH => write_numeric(numeric_attribute_ptr, col.octet_length.unwrap_or(0) as Len),
        SQL_DESC_PRECISION => write_numeric(numeric_attribute_ptr, col.precision.unwrap_or(0) as Len),
        SQL_DESC_SCALE => write_numeric(numeric_attribute_ptr, col.scale.unwrap_or(0) as Len),
        SQL_DESC_NULLABLE => write_numeric(numeric_attribute_ptr, col.nullability as Len),
        _ => SqlReturn::ERROR,
    }
}

fn write_numeric(ptr: *mut Len, value: Len) -> SqlReturn {
    if !ptr.is_null() {
        unsafe { *ptr = value };
    }
    SqlReturn::SUCCESS
}

fn type_name_for(sql_type: SqlDataType) -> &'static str {
    match sql_type {
        SqlDataType::EXT_W_VARCHAR => "nvarchar",
        SqlDataType::VARCHAR => "varchar",
        SqlDataType::CHAR => "char",
        SqlDataType::INTEGER => "int",
        SqlDataType::SMALLINT => "smallint",
        SqlDataType::TINYINT => "tinyint",
        SqlDataType::BIGINT => "bigint",
        SqlDataType::BIT => "bit",
        SqlDataType::REAL => "real",
        SqlDataType::FLOAT | SqlDataType::DOUBLE => "float",
        SqlDataType::DECIMAL => "decimal",
        SqlDataType::NUMERIC => "numeric",
        SqlDataType::DATE => "date",
        SqlDataType::TIME => "time",
        SqlDataType::TIMESTAMP => "datetime2",
        SqlDataType::EXT_BINARY => "binary",
        SqlDataType::EXT_VAR_BINARY => "varbinary",
        SqlDataType::EXT_LONG_VAR_BINARY => "varbinary(max)",
        SqlDataType::EXT_GUID => "uniqueidentifier",
        _ => "unknown",
    }
}

#[no_mangle]
pub extern "C" fn SQLGetData(
    statement_handle: HStmt,
    col_or_param_num: USmallIntAlias,
    target_type: CDataType,
    target_value_ptr: Pointer,
    buffer_length: Len,
    str_len_or_ind_ptr: *mut Len,
) -> SqlReturn {
    panic_safe!({
        let stmt_lock = get_stmt!(statement_handle);
        let s = stmt_lock.read().unwrap();
        let Some(store) = s.core.result.as_ref() else {
            return SqlReturn::ERROR;
        };
        match store.get_cell(col_or_param_num as u16) {
            Ok(cell) => unsafe { get_data(cell, target_type, target_value_ptr, buffer_length, str_len_or_ind_ptr) },
            Err(e) => {
                drop(s);
                let handle_ref: FurballHandleRef = statement_handle.into();
                handle_ref.add_diag_info(ODBCError::Core(e));
                SqlReturn::ERROR
            }
        }
    })
}

/// `odbc_sys::USmallInt`, aliased locally so `SQLGetData`'s column-index
/// parameter name matches the ODBC header without importing the type
/// under a name that collides with the `u16` casts used throughout.
type USmallIntAlias = odbc_sys::USmallInt;

// ---------------------------------------------------------------------
// Diagnostics (spec §4.6)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLGetDiagRec(
    handle_type: HandleType,
    handle: Handle,
    rec_number: SmallInt,
    state: *mut Char,
    native_error_ptr: *mut Integer,
    message_text: *mut Char,
    buffer_length: SmallInt,
    text_length_ptr: *mut SmallInt,
) -> SqlReturn {
    panic_safe!({
        if rec_number < 1 || buffer_length < 0 {
            return SqlReturn::ERROR;
        }
        with_errors(handle_type, handle, |errors| match errors.get((rec_number - 1) as usize) {
            Some(error) => unsafe { get_diag_rec(error, state, message_text, buffer_length, text_length_ptr, native_error_ptr) },
            None => SqlReturn::NO_DATA,
        })
    })
}

#[no_mangle]
pub extern "C" fn SQLGetDiagRecW(
    handle_type: HandleType,
    handle: Handle,
    rec_number: SmallInt,
    state: *mut WChar,
    native_error_ptr: *mut Integer,
    message_text: *mut WChar,
    buffer_length: SmallInt,
    text_length_ptr: *mut SmallInt,
) -> SqlReturn {
    panic_safe!({
        if rec_number < 1 || buffer_length < 0 {
            return SqlReturn::ERROR;
        }
        with_errors(handle_type, handle, |errors| match errors.get((rec_number - 1) as usize) {
            Some(error) => unsafe { get_diag_recw(error, state, message_text, buffer_length, text_length_ptr, native_error_ptr) },
            None => SqlReturn::NO_DATA,
        })
    })
}

fn with_errors(handle_type: HandleType, handle: Handle, f: impl FnOnce(&[ODBCError]) -> SqlReturn) -> SqlReturn {
    if handle.is_null() {
        return SqlReturn::INVALID_HANDLE;
    }
    let handle_ref: FurballHandleRef = handle.into();
    match handle_type {
        HandleType::Env => match handle_ref.as_env() {
            Some(e) => f(&e.read().unwrap().errors),
            None => SqlReturn::INVALID_HANDLE,
        },
        HandleType::Dbc => match handle_ref.as_connection() {
            Some(c) => f(&c.read().unwrap().errors),
            None => SqlReturn::INVALID_HANDLE,
        },
        HandleType::Stmt => match handle_ref.as_statement() {
            Some(s) => f(&s.read().unwrap().errors),
            None => SqlReturn::INVALID_HANDLE,
        },
        HandleType::Desc => SqlReturn::ERROR,
    }
}

#[no_mangle]
pub extern "C" fn SQLGetDiagField(
    handle_type: HandleType,
    handle: Handle,
    rec_number: SmallInt,
    diag_identifier: SmallInt,
    diag_info_ptr: Pointer,
    buffer_length: SmallInt,
    string_length_ptr: *mut SmallInt,
) -> SqlReturn {
    panic_safe!(sql_get_diag_field_impl(handle_type, handle, rec_number, diag_identifier, diag_info_ptr, buffer_length, string_length_ptr, false))
}

#[no_mangle]
pub extern "C" fn SQLGetDiagFieldW(
    handle_type: HandleType,
    handle: Handle,
    rec_number: SmallInt,
    diag_identifier: SmallInt,
    diag_info_ptr: Pointer,
    buffer_length: SmallInt,
    string_length_ptr: *mut SmallInt,
) -> SqlReturn {
    panic_safe!(sql_get_diag_field_impl(handle_type, handle, rec_number, diag_identifier, diag_info_ptr, buffer_length, string_length_ptr, true))
}

#[allow(clippy::too_many_arguments)]
fn sql_get_diag_field_impl(
    handle_type: HandleType,
    handle: Handle,
    rec_number: SmallInt,
    diag_identifier: SmallInt,
    diag_info_ptr: Pointer,
    buffer_length: SmallInt,
    string_length_ptr: *mut SmallInt,
    is_wstring: bool,
) -> SqlReturn {
    let Some(diag_type) = DiagType::from_i16(diag_identifier) else {
        return SqlReturn::ERROR;
    };
    if handle_type == HandleType::Stmt && matches!(diag_type, DiagType::SQL_DIAG_ROW_COUNT | DiagType::SQL_DIAG_ROW_NUMBER) {
        if handle.is_null() {
            return SqlReturn::INVALID_HANDLE;
        }
        let handle_ref: FurballHandleRef = handle.into();
        let Some(stmt_lock) = handle_ref.as_statement() else {
            return SqlReturn::INVALID_HANDLE;
        };
        let row_count = stmt_lock.read().unwrap().core.row_count;
        return unsafe { get_stmt_diag_field(diag_type, diag_info_ptr, row_count) };
    }
    with_errors(handle_type, handle, |errors| unsafe {
        get_diag_field(errors, diag_type, diag_info_ptr, rec_number, buffer_length as i16, string_length_ptr, is_wstring)
    })
}

// ---------------------------------------------------------------------
// Catalog functions (spec §4.7)
// ---------------------------------------------------------------------

fn run_catalog_query(
    statement_handle: HStmt,
    query: CatalogQuery,
    catalog: Option<&str>,
    schema: Option<&str>,
    table: Option<&str>,
    column: Option<&str>,
) -> SqlReturn {
    let sql = query.build_sql(catalog, schema, table, column);
    sql_exec_direct_impl(statement_handle, &sql)
}

#[no_mangle]
pub extern "C" fn SQLTables(
    statement_handle: HStmt,
    catalog_name: *const Char,
    name_length1: SmallInt,
    schema_name: *const Char,
    name_length2: SmallInt,
    table_name: *const Char,
    name_length3: SmallInt,
    table_type: *const Char,
    name_length4: SmallInt,
) -> SqlReturn {
    let _ = (table_type, name_length4);
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_text_to_string(catalog_name as *const u8, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_text_to_string(schema_name as *const u8, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_text_to_string(table_name as *const u8, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::Tables, catalog.as_deref(), schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLTablesW(
    statement_handle: HStmt,
    catalog_name: *const WChar,
    name_length1: SmallInt,
    schema_name: *const WChar,
    name_length2: SmallInt,
    table_name: *const WChar,
    name_length3: SmallInt,
    table_type: *const WChar,
    name_length4: SmallInt,
) -> SqlReturn {
    let _ = (table_type, name_length4);
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_wtext_to_string(catalog_name, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_wtext_to_string(schema_name, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_wtext_to_string(table_name, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::Tables, catalog.as_deref(), schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLColumns(
    statement_handle: HStmt,
    catalog_name: *const Char,
    name_length1: SmallInt,
    schema_name: *const Char,
    name_length2: SmallInt,
    table_name: *const Char,
    name_length3: SmallInt,
    column_name: *const Char,
    name_length4: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_text_to_string(catalog_name as *const u8, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_text_to_string(schema_name as *const u8, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_text_to_string(table_name as *const u8, name_length3 as Integer));
        let column = (!column_name.is_null()).then(|| input_text_to_string(column_name as *const u8, name_length4 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::Columns, catalog.as_deref(), schema.as_deref(), table.as_deref(), column.as_deref())
    })
}

#[no_mangle]
pub extern "C" fn SQLColumnsW(
    statement_handle: HStmt,
    catalog_name: *const WChar,
    name_length1: SmallInt,
    schema_name: *const WChar,
    name_length2: SmallInt,
    table_name: *const WChar,
    name_length3: SmallInt,
    column_name: *const WChar,
    name_length4: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_wtext_to_string(catalog_name, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_wtext_to_string(schema_name, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_wtext_to_string(table_name, name_length3 as Integer));
        let column = (!column_name.is_null()).then(|| input_wtext_to_string(column_name, name_length4 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::Columns, catalog.as_deref(), schema.as_deref(), table.as_deref(), column.as_deref())
    })
}

#[no_mangle]
pub extern "C" fn SQLPrimaryKeys(
    statement_handle: HStmt,
    catalog_name: *const Char,
    name_length1: SmallInt,
    schema_name: *const Char,
    name_length2: SmallInt,
    table_name: *const Char,
    name_length3: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_text_to_string(catalog_name as *const u8, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_text_to_string(schema_name as *const u8, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_text_to_string(table_name as *const u8, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::PrimaryKeys, catalog.as_deref(), schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLPrimaryKeysW(
    statement_handle: HStmt,
    catalog_name: *const WChar,
    name_length1: SmallInt,
    schema_name: *const WChar,
    name_length2: SmallInt,
    table_name: *const WChar,
    name_length3: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_wtext_to_string(catalog_name, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_wtext_to_string(schema_name, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_wtext_to_string(table_name, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::PrimaryKeys, catalog.as_deref(), schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLStatistics(
    statement_handle: HStmt,
    catalog_name: *const Char,
    name_length1: SmallInt,
    schema_name: *const Char,
    name_length2: SmallInt,
    table_name: *const Char,
    name_length3: SmallInt,
    _unique: SmallInt,
    _reserved: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_text_to_string(catalog_name as *const u8, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_text_to_string(schema_name as *const u8, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_text_to_string(table_name as *const u8, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::Statistics, catalog.as_deref(), schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLStatisticsW(
    statement_handle: HStmt,
    catalog_name: *const WChar,
    name_length1: SmallInt,
    schema_name: *const WChar,
    name_length2: SmallInt,
    table_name: *const WChar,
    name_length3: SmallInt,
    _unique: SmallInt,
    _reserved: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_wtext_to_string(catalog_name, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_wtext_to_string(schema_name, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_wtext_to_string(table_name, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::Statistics, catalog.as_deref(), schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLForeignKeys(
    statement_handle: HStmt,
    pk_catalog_name: *const Char,
    name_length1: SmallInt,
    pk_schema_name: *const Char,
    name_length2: SmallInt,
    pk_table_name: *const Char,
    name_length3: SmallInt,
    fk_catalog_name: *const Char,
    name_length4: SmallInt,
    fk_schema_name: *const Char,
    name_length5: SmallInt,
    fk_table_name: *const Char,
    name_length6: SmallInt,
) -> SqlReturn {
    let _ = (pk_catalog_name, name_length1, fk_catalog_name, name_length4);
    panic_safe!({
        let pk_schema = (!pk_schema_name.is_null()).then(|| input_text_to_string(pk_schema_name as *const u8, name_length2 as Integer));
        let pk_table = (!pk_table_name.is_null()).then(|| input_text_to_string(pk_table_name as *const u8, name_length3 as Integer));
        let fk_schema = (!fk_schema_name.is_null()).then(|| input_text_to_string(fk_schema_name as *const u8, name_length5 as Integer));
        let fk_table = (!fk_table_name.is_null()).then(|| input_text_to_string(fk_table_name as *const u8, name_length6 as Integer));
        // This driver's foreign-key catalog query reports both sides of the
        // relationship from one query (spec §4.7); the PK-side schema/table
        // filter the referenced table, the FK-side schema/table filter the
        // referencing table, so only one pair is usable as the `build_sql`
        // schema/table arguments. Prefer the FK side, since callers most
        // often ask "what references this table" from the PK side and "what
        // does this table reference" from the FK side, and the latter is
        // the more common ODBC catalog browsing pattern.
        let schema = fk_schema.or(pk_schema);
        let table = fk_table.or(pk_table);
        run_catalog_query(statement_handle, CatalogQuery::ForeignKeys, None, schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLForeignKeysW(
    statement_handle: HStmt,
    pk_catalog_name: *const WChar,
    name_length1: SmallInt,
    pk_schema_name: *const WChar,
    name_length2: SmallInt,
    pk_table_name: *const WChar,
    name_length3: SmallInt,
    fk_catalog_name: *const WChar,
    name_length4: SmallInt,
    fk_schema_name: *const WChar,
    name_length5: SmallInt,
    fk_table_name: *const WChar,
    name_length6: SmallInt,
) -> SqlReturn {
    let _ = (pk_catalog_name, name_length1, fk_catalog_name, name_length4);
    panic_safe!({
        let pk_schema = (!pk_schema_name.is_null()).then(|| input_wtext_to_string(pk_schema_name, name_length2 as Integer));
        let pk_table = (!pk_table_name.is_null()).then(|| input_wtext_to_string(pk_table_name, name_length3 as Integer));
        let fk_schema = (!fk_schema_name.is_null()).then(|| input_wtext_to_string(fk_schema_name, name_length5 as Integer));
        let fk_table = (!fk_table_name.is_null()).then(|| input_wtext_to_string(fk_table_name, name_length6 as Integer));
        let schema = fk_schema.or(pk_schema);
        let table = fk_table.or(pk_table);
        run_catalog_query(statement_handle, CatalogQuery::ForeignKeys, None, schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLSpecialColumns(
    statement_handle: HStmt,
    _identifier_type: SmallInt,
    catalog_name: *const Char,
    name_length1: SmallInt,
    schema_name: *const Char,
    name_length2: SmallInt,
    table_name: *const Char,
    name_length3: SmallInt,
    _scope: SmallInt,
    _nullable: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_text_to_string(catalog_name as *const u8, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_text_to_string(schema_name as *const u8, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_text_to_string(table_name as *const u8, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::SpecialColumns, catalog.as_deref(), schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLSpecialColumnsW(
    statement_handle: HStmt,
    _identifier_type: SmallInt,
    catalog_name: *const WChar,
    name_length1: SmallInt,
    schema_name: *const WChar,
    name_length2: SmallInt,
    table_name: *const WChar,
    name_length3: SmallInt,
    _scope: SmallInt,
    _nullable: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_wtext_to_string(catalog_name, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_wtext_to_string(schema_name, name_length2 as Integer));
        let table = (!table_name.is_null()).then(|| input_wtext_to_string(table_name, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::SpecialColumns, catalog.as_deref(), schema.as_deref(), table.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLProcedures(
    statement_handle: HStmt,
    catalog_name: *const Char,
    name_length1: SmallInt,
    schema_name: *const Char,
    name_length2: SmallInt,
    proc_name: *const Char,
    name_length3: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_text_to_string(catalog_name as *const u8, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_text_to_string(schema_name as *const u8, name_length2 as Integer));
        let proc = (!proc_name.is_null()).then(|| input_text_to_string(proc_name as *const u8, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::Procedures, catalog.as_deref(), schema.as_deref(), proc.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLProceduresW(
    statement_handle: HStmt,
    catalog_name: *const WChar,
    name_length1: SmallInt,
    schema_name: *const WChar,
    name_length2: SmallInt,
    proc_name: *const WChar,
    name_length3: SmallInt,
) -> SqlReturn {
    panic_safe!({
        let catalog = (!catalog_name.is_null()).then(|| input_wtext_to_string(catalog_name, name_length1 as Integer));
        let schema = (!schema_name.is_null()).then(|| input_wtext_to_string(schema_name, name_length2 as Integer));
        let proc = (!proc_name.is_null()).then(|| input_wtext_to_string(proc_name, name_length3 as Integer));
        run_catalog_query(statement_handle, CatalogQuery::Procedures, catalog.as_deref(), schema.as_deref(), proc.as_deref(), None)
    })
}

#[no_mangle]
pub extern "C" fn SQLGetTypeInfo(statement_handle: HStmt, _data_type: SqlDataType) -> SqlReturn {
    panic_safe!(run_catalog_query(statement_handle, CatalogQuery::TypeInfo, None, None, None, None))
}

#[no_mangle]
pub extern "C" fn SQLGetTypeInfoW(statement_handle: HStmt, _data_type: SqlDataType) -> SqlReturn {
    panic_safe!(run_catalog_query(statement_handle, CatalogQuery::TypeInfo, None, None, None, None))
}

// ---------------------------------------------------------------------
// Driver information (spec §4.8)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLGetInfo(connection_handle: HDbc, info_type: odbc_sys::InfoType, info_value_ptr: Pointer, buffer_length: SmallInt, string_length_ptr: *mut SmallInt) -> SqlReturn {
    panic_safe!(sql_get_info_impl(connection_handle, info_type, info_value_ptr, buffer_length, string_length_ptr, false))
}

#[no_mangle]
pub extern "C" fn SQLGetInfoW(connection_handle: HDbc, info_type: odbc_sys::InfoType, info_value_ptr: Pointer, buffer_length: SmallInt, string_length_ptr: *mut SmallInt) -> SqlReturn {
    panic_safe!(sql_get_info_impl(connection_handle, info_type, info_value_ptr, buffer_length, string_length_ptr, true))
}

fn sql_get_info_impl(
    connection_handle: HDbc,
    info_type: odbc_sys::InfoType,
    info_value_ptr: Pointer,
    buffer_length: SmallInt,
    string_length_ptr: *mut SmallInt,
    is_wide: bool,
) -> SqlReturn {
    let conn_lock = get_conn!(connection_handle);
    let c = conn_lock.read().unwrap();
    match info::get_info(info_type as u16, &c) {
        Some(info::InfoValue::Str(s)) => {
            if is_wide {
                truncate_text_wide(&s, info_value_ptr as *mut WChar, buffer_length, string_length_ptr)
            } else {
                truncate_text_narrow(&s, info_value_ptr as *mut Char, buffer_length, string_length_ptr)
            }
        }
        Some(info::InfoValue::U16(v)) => {
            if !info_value_ptr.is_null() {
                unsafe { *(info_value_ptr as *mut u16) = v };
            }
            SqlReturn::SUCCESS
        }
        Some(info::InfoValue::U32(v)) => {
            if !info_value_ptr.is_null() {
                unsafe { *(info_value_ptr as *mut u32) = v };
            }
            SqlReturn::SUCCESS
        }
        None => SqlReturn::ERROR,
    }
}

#[no_mangle]
pub extern "C" fn SQLGetFunctions(_connection_handle: HDbc, function_id: odbc_sys::FunctionId, supported_ptr: *mut odbc_sys::SqlBool) -> SqlReturn {
    panic_safe!({
        if !supported_ptr.is_null() {
            let supported = info::is_function_supported(function_id as u16);
            unsafe {
                *supported_ptr = if supported { odbc_sys::SqlBool::True } else { odbc_sys::SqlBool::False };
            }
        }
        SqlReturn::SUCCESS
    })
}

#[no_mangle]
pub extern "C" fn SQLNativeSql(
    _connection_handle: HDbc,
    in_statement_text: *const Char,
    text_length1: Integer,
    out_statement_text: *mut Char,
    buffer_length: Integer,
    text_length2_ptr: *mut Integer,
) -> SqlReturn {
    panic_safe!({
        // No SQL dialect translation happens in this driver (spec §4.8):
        // the native SQL is always identical to what the caller passed.
        let sql = input_text_to_string(in_statement_text as *const u8, text_length1);
        truncate_text_narrow(&sql, out_statement_text, buffer_length as SmallInt, text_length2_ptr.cast())
    })
}

#[no_mangle]
pub extern "C" fn SQLNativeSqlW(
    _connection_handle: HDbc,
    in_statement_text: *const WChar,
    text_length1: Integer,
    out_statement_text: *mut WChar,
    buffer_length: Integer,
    text_length2_ptr: *mut Integer,
) -> SqlReturn {
    panic_safe!({
        let sql = input_wtext_to_string(in_statement_text, text_length1);
        truncate_text_wide(&sql, out_statement_text, buffer_length as SmallInt, text_length2_ptr.cast())
    })
}

// ---------------------------------------------------------------------
// Statement attributes (spec §4.3)
// ---------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn SQLSetStmtAttr(statement_handle: HStmt, attribute: StatementAttribute, value: Pointer, _string_length: Integer) -> SqlReturn {
    panic_safe!(sql_set_stmt_attr(statement_handle, attribute, value))
}

#[no_mangle]
pub extern "C" fn SQLSetStmtAttrW(statement_handle: HStmt, attribute: StatementAttribute, value: Pointer, _string_length: Integer) -> SqlReturn {
    panic_safe!(sql_set_stmt_attr(statement_handle, attribute, value))
}

fn sql_set_stmt_attr(statement_handle: HStmt, attribute: StatementAttribute, value: Pointer) -> SqlReturn {
    let handle_ref: FurballHandleRef = statement_handle.into();
    match attribute {
        // A cursor and parameter array of size 1 is exactly this driver's
        // only supported shape (spec §4.3/§4.5 Non-goals: no bulk
        // operations, no multi-row fetch).
        StatementAttribute::RowArraySize | StatementAttribute::ParamsetSize => {
            if (value as usize) == 1 {
                SqlReturn::SUCCESS
            } else {
                handle_ref.add_diag_info(ODBCError::Unimplemented("array binding with more than one row"));
                SqlReturn::ERROR
            }
        }
        StatementAttribute::QueryTimeout | StatementAttribute::MaxRows | StatementAttribute::MaxLength | StatementAttribute::NoScan => SqlReturn::SUCCESS,
        _ => {
            handle_ref.add_diag_info(ODBCError::Unimplemented("this statement attribute"));
            SqlReturn::ERROR
        }
    }
}

#[no_mangle]
pub extern "C" fn SQLGetStmtAttr(statement_handle: HStmt, attribute: StatementAttribute, value_ptr: Pointer, _buffer_length: Integer, string_length_ptr: *mut Integer) -> SqlReturn {
    panic_safe!(sql_get_stmt_attr(statement_handle, attribute, value_ptr, string_length_ptr))
}

#[no_mangle]
pub extern "C" fn SQLGetStmtAttrW(statement_handle: HStmt, attribute: StatementAttribute, value_ptr: Pointer, _buffer_length: Integer, string_length_ptr: *mut Integer) -> SqlReturn {
    panic_safe!(sql_get_stmt_attr(statement_handle, attribute, value_ptr, string_length_ptr))
}

fn sql_get_stmt_attr(statement_handle: HStmt, attribute: StatementAttribute, value_ptr: Pointer, string_length_ptr: *mut Integer) -> SqlReturn {
    let _ = string_length_ptr;
    match attribute {
        StatementAttribute::RowArraySize | StatementAttribute::ParamsetSize => {
            if !value_ptr.is_null() {
                unsafe { *(value_ptr as *mut usize) = 1 };
            }
            SqlReturn::SUCCESS
        }
        StatementAttribute::QueryTimeout | StatementAttribute::MaxRows | StatementAttribute::MaxLength => {
            if !value_ptr.is_null() {
                unsafe { *(value_ptr as *mut usize) = 0 };
            }
            SqlReturn::SUCCESS
        }
        _ => {
            let handle_ref: FurballHandleRef = statement_handle.into();
            handle_ref.add_diag_info(ODBCError::Unimplemented("this statement attribute"));
            SqlReturn::ERROR
        }
    }
}

// ---------------------------------------------------------------------
// Out of scope: stubbed with a diagnostic rather than implemented. These
// ODBC features have no counterpart in this driver's design (bound
// column arrays, descriptor handles, bulk operations, scrollable
// positioned updates, data source enumeration, async notifications).
// ---------------------------------------------------------------------

fn unsupported(handle: Handle, name: &'static str) -> SqlReturn {
    if handle.is_null() {
        return SqlReturn::INVALID_HANDLE;
    }
    let handle_ref: FurballHandleRef = handle.into();
    handle_ref.clear_diagnostics();
    handle_ref.add_diag_info(ODBCError::Unimplemented(name));
    SqlReturn::ERROR
}

/// Descriptor handles never get allocated (`SQLAllocHandle` rejects
/// `HandleType::Desc`), so a descriptor-only entry point has no
/// `FurballHandle` behind its argument to attach a diagnostic to.
fn unsupported_no_handle() -> SqlReturn {
    log::error!("descriptor handle function invoked against a driver with no descriptor handles");
    SqlReturn::INVALID_HANDLE
}

#[no_mangle]
pub extern "C" fn SQLBindCol(statement_handle: HStmt, _col: USmallIntAlias, _c_type: CDataType, _ptr: Pointer, _len: Len, _ind: *mut Len) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLBindCol (column-bound array retrieval)")
}

#[no_mangle]
pub extern "C" fn SQLSetPos(statement_handle: HStmt, _row: USmallIntAlias, _operation: odbc_sys::CursorOperation, _lock_type: odbc_sys::LockType) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLSetPos (positioned update)")
}

#[no_mangle]
pub extern "C" fn SQLBulkOperations(statement_handle: HStmt, _operation: odbc_sys::BulkOperation) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLBulkOperations")
}

#[no_mangle]
pub extern "C" fn SQLBrowseConnect(connection_handle: HDbc, _in: *const Char, _inlen: SmallInt, _out: *mut Char, _outmax: SmallInt, _outlen: *mut SmallInt) -> SqlReturn {
    unsupported(connection_handle as Handle, "SQLBrowseConnect")
}

#[no_mangle]
pub extern "C" fn SQLBrowseConnectW(connection_handle: HDbc, _in: *const WChar, _inlen: SmallInt, _out: *mut WChar, _outmax: SmallInt, _outlen: *mut SmallInt) -> SqlReturn {
    unsupported(connection_handle as Handle, "SQLBrowseConnectW")
}

#[no_mangle]
pub extern "C" fn SQLColumnPrivileges(
    statement_handle: HStmt,
    _cat: *const Char,
    _catl: SmallInt,
    _sch: *const Char,
    _schl: SmallInt,
    _tab: *const Char,
    _tabl: SmallInt,
    _col: *const Char,
    _coll: SmallInt,
) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLColumnPrivileges")
}

#[no_mangle]
pub extern "C" fn SQLColumnPrivilegesW(
    statement_handle: HStmt,
    _cat: *const WChar,
    _catl: SmallInt,
    _sch: *const WChar,
    _schl: SmallInt,
    _tab: *const WChar,
    _tabl: SmallInt,
    _col: *const WChar,
    _coll: SmallInt,
) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLColumnPrivilegesW")
}

#[no_mangle]
pub extern "C" fn SQLTablePrivileges(
    statement_handle: HStmt,
    _cat: *const Char,
    _catl: SmallInt,
    _sch: *const Char,
    _schl: SmallInt,
    _tab: *const Char,
    _tabl: SmallInt,
) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLTablePrivileges")
}

#[no_mangle]
pub extern "C" fn SQLTablePrivilegesW(
    statement_handle: HStmt,
    _cat: *const WChar,
    _catl: SmallInt,
    _sch: *const WChar,
    _schl: SmallInt,
    _tab: *const WChar,
    _tabl: SmallInt,
) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLTablePrivilegesW")
}

#[no_mangle]
pub extern "C" fn SQLProcedureColumns(
    statement_handle: HStmt,
    _cat: *const Char,
    _catl: SmallInt,
    _sch: *const Char,
    _schl: SmallInt,
    _proc: *const Char,
    _procl: SmallInt,
    _col: *const Char,
    _coll: SmallInt,
) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLProcedureColumns")
}

#[no_mangle]
pub extern "C" fn SQLProcedureColumnsW(
    statement_handle: HStmt,
    _cat: *const WChar,
    _catl: SmallInt,
    _sch: *const WChar,
    _schl: SmallInt,
    _proc: *const WChar,
    _procl: SmallInt,
    _col: *const WChar,
    _coll: SmallInt,
) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLProcedureColumnsW")
}

#[no_mangle]
pub extern "C" fn SQLDataSources(_env: HEnv, _dir: odbc_sys::FetchOrientation, _srv: *mut Char, _srvmax: SmallInt, _srvlen: *mut SmallInt, _desc: *mut Char, _descmax: SmallInt, _desclen: *mut SmallInt) -> SqlReturn {
    unsupported(_env as Handle, "SQLDataSources")
}

#[no_mangle]
pub extern "C" fn SQLDataSourcesW(_env: HEnv, _dir: odbc_sys::FetchOrientation, _srv: *mut WChar, _srvmax: SmallInt, _srvlen: *mut SmallInt, _desc: *mut WChar, _descmax: SmallInt, _desclen: *mut SmallInt) -> SqlReturn {
    unsupported(_env as Handle, "SQLDataSourcesW")
}

#[no_mangle]
pub extern "C" fn SQLDrivers(_env: HEnv, _dir: odbc_sys::FetchOrientation, _driver: *mut Char, _drivermax: SmallInt, _driverlen: *mut SmallInt, _attr: *mut Char, _attrmax: SmallInt, _attrlen: *mut SmallInt) -> SqlReturn {
    unsupported(_env as Handle, "SQLDrivers")
}

#[no_mangle]
pub extern "C" fn SQLDriversW(_env: HEnv, _dir: odbc_sys::FetchOrientation, _driver: *mut WChar, _drivermax: SmallInt, _driverlen: *mut SmallInt, _attr: *mut WChar, _attrmax: SmallInt, _attrlen: *mut SmallInt) -> SqlReturn {
    unsupported(_env as Handle, "SQLDriversW")
}

#[no_mangle]
pub extern "C" fn SQLDescribeParam(statement_handle: HStmt, _param: USmallIntAlias, _type: *mut SqlDataType, _size: *mut Len, _digits: *mut SmallInt, _nullable: *mut Nullability) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLDescribeParam")
}

#[no_mangle]
pub extern "C" fn SQLGetDescField(_desc_handle: odbc_sys::HDesc, _rec: SmallInt, _field: SmallInt, _value: Pointer, _len: Integer, _strlen: *mut Integer) -> SqlReturn {
    unsupported_no_handle()
}

#[no_mangle]
pub extern "C" fn SQLGetDescFieldW(_desc_handle: odbc_sys::HDesc, _rec: SmallInt, _field: SmallInt, _value: Pointer, _len: Integer, _strlen: *mut Integer) -> SqlReturn {
    unsupported_no_handle()
}

#[no_mangle]
pub extern "C" fn SQLSetDescField(_desc_handle: odbc_sys::HDesc, _rec: SmallInt, _field: SmallInt, _value: Pointer, _len: Integer) -> SqlReturn {
    unsupported_no_handle()
}

#[no_mangle]
pub extern "C" fn SQLSetDescFieldW(_desc_handle: odbc_sys::HDesc, _rec: SmallInt, _field: SmallInt, _value: Pointer, _len: Integer) -> SqlReturn {
    unsupported_no_handle()
}

#[no_mangle]
pub extern "C" fn SQLGetDescRec(
    _desc_handle: odbc_sys::HDesc,
    _rec: SmallInt,
    _name: *mut Char,
    _namemax: SmallInt,
    _namelen: *mut SmallInt,
    _type: *mut SmallInt,
    _subtype: *mut SmallInt,
    _len: *mut Len,
    _precision: *mut SmallInt,
    _scale: *mut SmallInt,
    _nullable: *mut Nullability,
) -> SqlReturn {
    unsupported_no_handle()
}

#[no_mangle]
pub extern "C" fn SQLSetDescRec(
    _desc_handle: odbc_sys::HDesc,
    _rec: SmallInt,
    _type: SmallInt,
    _subtype: SmallInt,
    _len: Len,
    _precision: SmallInt,
    _scale: SmallInt,
    _data: Pointer,
    _str_len: *mut Len,
    _indicator: *mut Len,
) -> SqlReturn {
    unsupported_no_handle()
}

#[no_mangle]
pub extern "C" fn SQLCopyDesc(_source: odbc_sys::HDesc, _target: odbc_sys::HDesc) -> SqlReturn {
    unsupported_no_handle()
}

#[no_mangle]
pub extern "C" fn SQLCompleteAsync(_handle_type: HandleType, handle: Handle, _outcome: *mut RetCode) -> SqlReturn {
    unsupported(handle, "SQLCompleteAsync")
}

#[no_mangle]
pub extern "C" fn SQLCancelHandle(_handle_type: HandleType, handle: Handle) -> SqlReturn {
    unsupported(handle, "SQLCancelHandle")
}

#[no_mangle]
pub extern "C" fn SQLGetCursorName(statement_handle: HStmt, _name: *mut Char, _namemax: SmallInt, _namelen: *mut SmallInt) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLGetCursorName")
}

#[no_mangle]
pub extern "C" fn SQLGetCursorNameW(statement_handle: HStmt, _name: *mut WChar, _namemax: SmallInt, _namelen: *mut SmallInt) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLGetCursorNameW")
}

#[no_mangle]
pub extern "C" fn SQLSetCursorName(statement_handle: HStmt, _name: *const Char, _namelen: SmallInt) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLSetCursorName")
}

#[no_mangle]
pub extern "C" fn SQLSetCursorNameW(statement_handle: HStmt, _name: *const WChar, _namelen: SmallInt) -> SqlReturn {
    unsupported(statement_handle as Handle, "SQLSetCursorNameW")
}

#[cfg(test)]
mod unit {
    use super::*;

    fn new_env() -> Handle {
        let mut out: Handle = std::ptr::null_mut();
        assert_eq!(SQLAllocHandle(HandleType::Env, std::ptr::null_mut(), &mut out), SqlReturn::SUCCESS);
        out
    }

    fn new_conn(env: Handle) -> HDbc {
        let mut out: Handle = std::ptr::null_mut();
        assert_eq!(SQLAllocHandle(HandleType::Dbc, env, &mut out), SqlReturn::SUCCESS);
        out as HDbc
    }

    #[test]
    fn alloc_and_free_env_round_trips() {
        let env = new_env();
        assert_eq!(SQLFreeHandle(HandleType::Env, env), SqlReturn::SUCCESS);
    }

    #[test]
    fn alloc_connection_registers_it_under_the_environment() {
        let env = new_env();
        let conn = new_conn(env);
        assert!(!conn.is_null());
        assert_eq!(SQLFreeHandle(HandleType::Env, env), SqlReturn::SUCCESS);
    }

    #[test]
    fn alloc_statement_without_connection_is_invalid_handle() {
        let mut out: Handle = std::ptr::null_mut();
        assert_eq!(SQLAllocHandle(HandleType::Stmt, std::ptr::null_mut(), &mut out), SqlReturn::INVALID_HANDLE);
    }

    #[test]
    fn free_handle_on_null_is_invalid_handle() {
        assert_eq!(SQLFreeHandle(HandleType::Dbc, std::ptr::null_mut()), SqlReturn::INVALID_HANDLE);
    }

    #[test]
    fn connect_without_configured_dsn_reports_error() {
        let env = new_env();
        let conn = new_conn(env);
        let dsn = "definitely-not-a-configured-dsn";
        let ret = SQLConnect(
            conn,
            dsn.as_ptr(),
            dsn.len() as SmallInt,
            std::ptr::null(),
            0,
            std::ptr::null(),
            0,
        );
        assert_eq!(ret, SqlReturn::ERROR);
        SQLFreeHandle(HandleType::Env, env);
    }

    #[test]
    fn free_stmt_close_keeps_the_handle_alive() {
        let env = new_env();
        let conn = new_conn(env);
        let mut stmt_out: Handle = std::ptr::null_mut();
        assert_eq!(SQLAllocHandle(HandleType::Stmt, conn as Handle, &mut stmt_out), SqlReturn::SUCCESS);
        assert_eq!(SQLFreeStmt(stmt_out as HStmt, SQL_CLOSE), SqlReturn::SUCCESS);
        assert_eq!(SQLFreeHandle(HandleType::Env, env), SqlReturn::SUCCESS);
    }

    #[test]
    fn driver_connect_with_missing_server_key_reports_error() {
        let env = new_env();
        let conn = new_conn(env);
        let cs = "UID=sa;PWD=x";
        let ret = SQLDriverConnect(
            conn,
            std::ptr::null_mut(),
            cs.as_ptr(),
            cs.len() as SmallInt,
            std::ptr::null_mut(),
            0,
            std::ptr::null_mut(),
            DriverConnectOption::NoPrompt,
        );
        assert_eq!(ret, SqlReturn::ERROR);
        SQLFreeHandle(HandleType::Env, env);
    }

    #[test]
    fn unsupported_function_clears_and_reports_a_single_diagnostic() {
        let env = new_env();
        let conn = new_conn(env);
        let mut stmt_out: Handle = std::ptr::null_mut();
        SQLAllocHandle(HandleType::Stmt, conn as Handle, &mut stmt_out);
        let ret = SQLBindCol(stmt_out as HStmt, 1, CDataType::SQL_C_CHAR, std::ptr::null_mut(), 0, std::ptr::null_mut());
        assert_eq!(ret, SqlReturn::ERROR);
        SQLFreeHandle(HandleType::Env, env);
    }

    #[test]
    fn diagnostics_do_not_survive_past_the_next_operation_on_the_handle() {
        let env = new_env();
        let conn = new_conn(env);
        let mut stmt_out: Handle = std::ptr::null_mut();
        SQLAllocHandle(HandleType::Stmt, conn as Handle, &mut stmt_out);
        let stmt = stmt_out as HStmt;

        // SQLBindCol is unimplemented and posts one diagnostic record.
        assert_eq!(
            SQLBindCol(stmt, 1, CDataType::SQL_C_CHAR, std::ptr::null_mut(), 0, std::ptr::null_mut()),
            SqlReturn::ERROR
        );
        let mut state = [0u8; 6];
        assert_eq!(
            SQLGetDiagRec(HandleType::Stmt, stmt_out, 1, state.as_mut_ptr() as *mut Char, std::ptr::null_mut(), std::ptr::null_mut(), 0, std::ptr::null_mut()),
            SqlReturn::SUCCESS_WITH_INFO
        );

        // Any subsequent operation on the same handle -- including one that
        // succeeds -- must clear that prior record before it can post its own.
        assert_eq!(SQLFreeStmt(stmt, SQL_CLOSE), SqlReturn::SUCCESS);
        assert_eq!(
            SQLGetDiagRec(HandleType::Stmt, stmt_out, 1, std::ptr::null_mut(), std::ptr::null_mut(), std::ptr::null_mut(), 0, std::ptr::null_mut()),
            SqlReturn::NO_DATA
        );
        SQLFreeHandle(HandleType::Env, env);
    }
}
