//! The Environment/Connection/Statement handle tree (spec §3, §4.1).
//! Handles are boxed and leaked to the caller as opaque `*mut FurballHandle`
//! pointers; `FreeHandle` reclaims them. Every inbound `Handle` is trusted
//! to be one of ours (the driver manager is the only caller and never
//! forges pointers) but we still tag the enum variant so a wrong-kind
//! handle is a local match failure rather than undefined behavior.

use crate::errors::ODBCError;
use furball_core::{ConnectionOptions, Statement as CoreStatement, TdsSource};
use odbc_sys::{HDbc, HEnv, HStmt, Handle};
use std::borrow::BorrowMut;
use std::collections::HashSet;
use std::sync::RwLock;

pub enum FurballHandle {
    Env(RwLock<Env>),
    Connection(RwLock<Connection>),
    Statement(RwLock<Statement>),
}

impl FurballHandle {
    pub fn as_env(&self) -> Option<&RwLock<Env>> {
        match self {
            FurballHandle::Env(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_connection(&self) -> Option<&RwLock<Connection>> {
        match self {
            FurballHandle::Connection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_statement(&self) -> Option<&RwLock<Statement>> {
        match self {
            FurballHandle::Statement(s) => Some(s),
            _ => None,
        }
    }

    pub fn add_diag_info(&self, error: ODBCError) {
        match self {
            FurballHandle::Env(e) => e.write().unwrap().errors.push(error),
            FurballHandle::Connection(c) => c.write().unwrap().errors.push(error),
            FurballHandle::Statement(s) => s.write().unwrap().errors.push(error),
        }
    }

    pub fn clear_diagnostics(&self) {
        match self {
            FurballHandle::Env(e) => e.write().unwrap().errors.clear(),
            FurballHandle::Connection(c) => c.write().unwrap().errors.clear(),
            FurballHandle::Statement(s) => s.write().unwrap().errors.clear(),
        }
    }
}

pub type FurballHandleRef = &'static mut FurballHandle;

impl From<Handle> for FurballHandleRef {
    fn from(handle: Handle) -> Self {
        unsafe { (*(handle as *mut FurballHandle)).borrow_mut() }
    }
}

impl From<HEnv> for FurballHandleRef {
    fn from(handle: HEnv) -> Self {
        unsafe { (*(handle as *mut FurballHandle)).borrow_mut() }
    }
}

impl From<HDbc> for FurballHandleRef {
    fn from(handle: HDbc) -> Self {
        unsafe { (*(handle as *mut FurballHandle)).borrow_mut() }
    }
}

impl From<HStmt> for FurballHandleRef {
    fn from(handle: HStmt) -> Self {
        unsafe { (*(handle as *mut FurballHandle)).borrow_mut() }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum EnvState {
    Allocated,
    ConnectionAllocated,
}

pub struct Env {
    pub odbc_ver: i32,
    pub state: EnvState,
    pub connections: HashSet<*mut FurballHandle>,
    pub errors: Vec<ODBCError>,
}

impl Env {
    pub fn with_state(state: EnvState) -> Self {
        Self {
            odbc_ver: 3,
            state,
            connections: HashSet::new(),
            errors: vec![],
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Allocated,
    Connected,
    StatementAllocated,
}

pub struct Connection {
    pub env: *mut FurballHandle,
    pub state: ConnectionState,
    pub options: ConnectionOptions,
    pub tds: Option<Box<dyn TdsSource>>,
    pub login_timeout: Option<u32>,
    pub connection_timeout: Option<u32>,
    pub statements: HashSet<*mut FurballHandle>,
    pub errors: Vec<ODBCError>,
}

impl Connection {
    pub fn with_state(env: *mut FurballHandle, state: ConnectionState) -> Self {
        Self {
            env,
            state,
            options: ConnectionOptions::default(),
            tds: None,
            login_timeout: None,
            connection_timeout: None,
            statements: HashSet::new(),
            errors: vec![],
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum StatementAllocState {
    Allocated,
}

pub struct Statement {
    pub connection: *mut FurballHandle,
    pub alloc_state: StatementAllocState,
    pub core: CoreStatement,
    pub errors: Vec<ODBCError>,
}

impl Statement {
    pub fn with_connection(connection: *mut FurballHandle) -> Self {
        Self {
            connection,
            alloc_state: StatementAllocState::Allocated,
            core: CoreStatement::new(),
            errors: vec![],
        }
    }
}
