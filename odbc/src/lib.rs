//! `furball`: the ODBC driver surface. This crate holds the handle tree,
//! connection-string parsing, and the exported `SQL*` C entry points; the
//! TDS wire protocol and statement/result-set machinery live in
//! `furball_core`, which this crate drives but never re-implements.
#![allow(dead_code)]

pub mod api;
pub(crate) mod definitions;
pub(crate) mod dsn;
pub(crate) mod errors;
pub(crate) mod handles;
pub(crate) mod odbc_uri;
pub mod test_support;
