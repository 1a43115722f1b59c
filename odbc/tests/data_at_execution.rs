//! End-to-end exercise of the `SQLExecute` / `SQLParamData` / `SQLPutData`
//! data-at-execution protocol (spec §4.3) against an in-process fake TDS
//! source: two data-at-exec parameters must be handed back by `SQLParamData`
//! in bind order, one token per call, with execution deferred until the
//! last parameter's bytes are supplied.

use furball::api::functions::*;
use furball::test_support::attach_tds_source;
use furball_core::FakeTdsSource;
use odbc_sys::{CDataType, Char, Handle, HandleType, HDbc, HStmt, Integer, Len, Pointer, SmallInt, SqlDataType, SqlReturn};

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

fn bind_dae_param(stmt: HStmt, position: SmallInt, token: isize) {
    let mut indicator: Len = -2; // SQL_DATA_AT_EXEC
    let ret = SQLBindParameter(
        stmt,
        position,
        0,
        CDataType::SQL_C_CHAR,
        SqlDataType::VARCHAR,
        0,
        0,
        token as Pointer,
        0,
        &mut indicator,
    );
    assert_eq!(ret, SqlReturn::SUCCESS);
}

#[test]
fn param_data_hands_back_one_token_per_dae_parameter_in_bind_order() {
    let env = new_env();
    let conn = new_conn(env);
    attach_tds_source(conn, Box::new(FakeTdsSource::new()));

    let mut stmt_out: Handle = std::ptr::null_mut();
    assert_eq!(SQLAllocHandle(HandleType::Stmt, conn as Handle, &mut stmt_out), SqlReturn::SUCCESS);
    let stmt = stmt_out as HStmt;

    let sql = "INSERT INTO t VALUES (?, ?)";
    assert_eq!(SQLPrepare(stmt, sql.as_ptr() as *const Char, sql.len() as Integer), SqlReturn::SUCCESS);

    bind_dae_param(stmt, 1, 111);
    bind_dae_param(stmt, 2, 222);

    assert_eq!(SQLExecute(stmt), SqlReturn::NEED_DATA);

    let mut token_ptr: Pointer = std::ptr::null_mut();
    assert_eq!(SQLParamData(stmt, &mut token_ptr), SqlReturn::NEED_DATA);
    assert_eq!(token_ptr as isize, 111);

    assert_eq!(SQLPutData(stmt, b"a".as_ptr() as Pointer, 1), SqlReturn::SUCCESS);

    let mut token_ptr: Pointer = std::ptr::null_mut();
    assert_eq!(SQLParamData(stmt, &mut token_ptr), SqlReturn::NEED_DATA);
    assert_eq!(token_ptr as isize, 222);

    assert_eq!(SQLPutData(stmt, b"b".as_ptr() as Pointer, 1), SqlReturn::SUCCESS);

    let mut token_ptr: Pointer = std::ptr::null_mut();
    assert_eq!(SQLParamData(stmt, &mut token_ptr), SqlReturn::SUCCESS);

    SQLFreeHandle(HandleType::Env, env);
}
