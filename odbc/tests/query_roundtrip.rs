//! End-to-end exercise of the exported `SQL*` surface against an in-process
//! fake TDS source: handle alloc, fake connect, prepare/execute, fetch, and
//! free, without dialing any real server.

use furball::api::functions::*;
use furball::test_support::attach_tds_source;
use furball_core::{ColumnMetadata, FakeBatch, FakeTdsSource, SqlType};
use odbc_sys::{CDataType, Char, Handle, HandleType, HDbc, HStmt, Integer, Len, Pointer, SqlReturn};

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

fn get_string(stmt: HStmt, col: u16) -> Option<String> {
    let mut buf = [0u8; 64];
    let mut ind: Len = 0;
    let ret = SQLGetData(
        stmt,
        col,
        CDataType::SQL_C_CHAR,
        buf.as_mut_ptr() as Pointer,
        buf.len() as Len,
        &mut ind,
    );
    assert_eq!(ret, SqlReturn::SUCCESS);
    if ind < 0 {
        return None;
    }
    Some(String::from_utf8_lossy(&buf[..ind as usize]).into_owned())
}

#[test]
fn select_against_a_fake_source_fetches_both_rows_then_runs_dry() {
    let env = new_env();
    let conn = new_conn(env);

    let sql = "SELECT name FROM users";
    let fake = FakeTdsSource::new().with_response(
        sql,
        FakeBatch {
            columns: vec![ColumnMetadata::new("name".to_string(), SqlType::VarChar, true)],
            rows: vec![vec![Some("alice".to_string())], vec![Some("bob".to_string())]],
            row_count: -1,
        },
    );
    attach_tds_source(conn, Box::new(fake));

    let mut stmt_out: Handle = std::ptr::null_mut();
    assert_eq!(SQLAllocHandle(HandleType::Stmt, conn as Handle, &mut stmt_out), SqlReturn::SUCCESS);
    let stmt = stmt_out as HStmt;

    let ret = SQLExecDirect(stmt, sql.as_ptr() as *const Char, sql.len() as Integer);
    assert_eq!(ret, SqlReturn::SUCCESS);

    assert_eq!(SQLFetch(stmt), SqlReturn::SUCCESS);
    assert_eq!(get_string(stmt, 1), Some("alice".to_string()));

    assert_eq!(SQLFetch(stmt), SqlReturn::SUCCESS);
    assert_eq!(get_string(stmt, 1), Some("bob".to_string()));

    assert_eq!(SQLFetch(stmt), SqlReturn::NO_DATA);

    SQLFreeHandle(HandleType::Env, env);
}
