//! The statement state machine (spec §4.3): Idle / Prepared / NeedData /
//! Executed / Fetching, including the `SQL_NEED_DATA` data-at-execution
//! sub-protocol. This module holds no raw C pointers or buffer lengths —
//! those are an odbc-crate concern; a `BoundParameter` here already carries
//! a resolved `ParamValue`.

use crate::conn::TdsSource;
use crate::err::{Error, Result};
use crate::row_store::RowStore;
use crate::substitution::{count_params, substitute_params};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Idle,
    Prepared,
    NeedData,
    Executed,
    Fetching,
}

/// The indicator slot accompanying a bound parameter: either a value is
/// present, the value is NULL, or it will arrive later via `PutData`.
#[derive(Debug, Clone)]
pub enum ParamIndicator {
    Value(String),
    Null,
    DataAtExec,
}

/// A caller-chosen token handed back by `ParamData` for a data-at-exec
/// parameter; opaque to this crate (spec §3: "the data buffer pointer is
/// reinterpreted as an application-chosen opaque token").
pub type DaeToken = isize;

#[derive(Debug, Clone)]
pub struct BoundParameter {
    pub position: u16,
    pub indicator: ParamIndicator,
    /// Only meaningful when `indicator` is `DataAtExec`: the token the
    /// application will receive back from `ParamData`, and whether the
    /// eventual bytes should render as an `N'...'` (wide) or `'...'`
    /// (narrow) string literal, or as a `0x...` binary literal.
    pub dae_token: Option<DaeToken>,
    pub dae_is_binary: bool,
    pub dae_is_wide: bool,
}

pub enum ExecOutcome {
    Executed { row_count: i64 },
    NeedData(DaeToken),
}

#[derive(Debug)]
pub struct Statement {
    pub state: StatementState,
    prepared_sql: Option<String>,
    params: BTreeMap<u16, BoundParameter>,
    dae_order: Vec<u16>,
    dae_cursor: usize,
    /// Whether `dae_order[dae_cursor]`'s token has already been handed back
    /// by `run`/`param_data`. The first `ParamData` call after entering
    /// `NeedData` must return the cursor's token without advancing past it;
    /// only the *next* call, once that parameter's bytes are in, moves on.
    dae_handed_out: bool,
    dae_buffers: BTreeMap<u16, Vec<u8>>,
    pub result: Option<RowStore>,
    pub row_count: i64,
}

impl Default for Statement {
    fn default() -> Self {
        Self::new()
    }
}

impl Statement {
    pub fn new() -> Statement {
        Statement {
            state: StatementState::Idle,
            prepared_sql: None,
            params: BTreeMap::new(),
            dae_order: Vec::new(),
            dae_cursor: 0,
            dae_handed_out: false,
            dae_buffers: BTreeMap::new(),
            result: None,
            row_count: -1,
        }
    }

    pub fn prepare(&mut self, sql: &str) {
        self.prepared_sql = Some(sql.to_string());
        self.state = StatementState::Prepared;
    }

    pub fn num_params(&self) -> u16 {
        self.prepared_sql
            .as_deref()
            .map(count_params)
            .unwrap_or(0)
    }

    pub fn bind_parameter(&mut self, param: BoundParameter) {
        self.params.insert(param.position, param);
    }

    pub fn reset_params(&mut self) {
        self.params.clear();
        self.dae_order.clear();
        self.dae_cursor = 0;
        self.dae_handed_out = false;
        self.dae_buffers.clear();
    }

    pub fn close(&mut self) {
        self.result = None;
        self.row_count = -1;
        self.state = StatementState::Idle;
    }

    /// Runs `sql` directly, bypassing prepare/bind (spec §4.3 exec-direct).
    pub async fn execute_direct(
        &mut self,
        conn: &mut dyn TdsSource,
        sql: &str,
    ) -> Result<ExecOutcome> {
        self.prepared_sql = Some(sql.to_string());
        self.params.clear();
        self.run(conn).await
    }

    /// Runs the prepared statement with its currently bound parameters.
    /// Returns `NeedData` if any bound parameter is data-at-exec and
    /// hasn't been supplied yet.
    pub async fn execute(&mut self, conn: &mut dyn TdsSource) -> Result<ExecOutcome> {
        self.run(conn).await
    }

    async fn run(&mut self, conn: &mut dyn TdsSource) -> Result<ExecOutcome> {
        self.dae_order = self
            .params
            .values()
            .filter(|p| matches!(p.indicator, ParamIndicator::DataAtExec))
            .map(|p| p.position)
            .collect();
        self.dae_cursor = 0;
        self.dae_handed_out = false;

        if let Some(&first) = self.dae_order.first() {
            self.state = StatementState::NeedData;
            let token = self.params[&first]
                .dae_token
                .expect("data-at-exec parameter bound without a token");
            // `execute`/`execute_direct` can't surface this token: neither
            // SQLExecute nor SQLExecDirect has an out-param for it. The
            // cursor is left unadvanced and un-handed-out so the first
            // `ParamData` call returns this same token.
            return Ok(ExecOutcome::NeedData(token));
        }

        self.execute_with_resolved_params(conn).await
    }

    /// Called by the odbc crate's `SQLParamData`: returns the token for the
    /// data-at-exec parameter currently awaiting `PutData`, advances to the
    /// next one once the current slot has already been handed out, or
    /// finalizes and executes once all of them have been supplied.
    pub async fn param_data(&mut self, conn: &mut dyn TdsSource) -> Result<ExecOutcome> {
        if self.state != StatementState::NeedData {
            return Err(Error::FunctionSequence);
        }
        if self.dae_handed_out {
            self.dae_cursor += 1;
        }
        if let Some(&cur) = self.dae_order.get(self.dae_cursor) {
            self.dae_handed_out = true;
            let token = self.params[&cur]
                .dae_token
                .expect("data-at-exec parameter bound without a token");
            return Ok(ExecOutcome::NeedData(token));
        }
        self.execute_with_resolved_params(conn).await
    }

    /// Appends bytes into the current data-at-exec parameter's buffer. A
    /// zero-length call is valid and preserved as the empty value.
    pub fn put_data(&mut self, bytes: &[u8]) -> Result<()> {
        if self.state != StatementState::NeedData {
            return Err(Error::FunctionSequence);
        }
        let position = *self
            .dae_order
            .get(self.dae_cursor)
            .ok_or(Error::FunctionSequence)?;
        self.dae_buffers.entry(position).or_default().extend_from_slice(bytes);
        Ok(())
    }

    async fn execute_with_resolved_params(&mut self, conn: &mut dyn TdsSource) -> Result<ExecOutcome> {
        for &position in &self.dae_order {
            let bytes = self.dae_buffers.remove(&position).unwrap_or_default();
            let param = self.params.get_mut(&position).expect("dae position tracked without a bound parameter");
            param.indicator = ParamIndicator::Value(render_dae_literal(&bytes, param.dae_is_binary, param.dae_is_wide));
        }

        let sql = self.prepared_sql.as_deref().ok_or(Error::FunctionSequence)?;
        let literals: Vec<String> = self
            .params
            .values()
            .map(|p| match &p.indicator {
                ParamIndicator::Value(text) => text.clone(),
                ParamIndicator::Null => "NULL".to_string(),
                ParamIndicator::DataAtExec => {
                    unreachable!("data-at-exec parameters are resolved before substitution")
                }
            })
            .collect();
        let batch = substitute_params(sql, &literals)?;

        conn.begin_transaction_if_needed().await?;
        let (store, row_count_from_batch) = conn.execute_batch(&batch).await?;
        let has_columns = store.num_columns() > 0;
        self.row_count = if has_columns { -1 } else { row_count_from_batch };
        self.result = Some(store);
        self.state = StatementState::Executed;
        Ok(ExecOutcome::Executed {
            row_count: self.row_count,
        })
    }

    /// Forward-only fetch (spec §4.3 Fetch). Returns `false` at end of the
    /// result set.
    pub fn fetch(&mut self) -> Result<bool> {
        let store = self.result.as_mut().ok_or(Error::FunctionSequence)?;
        self.state = StatementState::Fetching;
        Ok(store.fetch_next())
    }
}

/// Renders an accumulated data-at-exec byte buffer as a SQL literal, per
/// spec §4.3's substitution rules: binary becomes `0x<hex>`, text becomes
/// a quote-escaped string, prefixed with `N` when the C type was wide.
fn render_dae_literal(bytes: &[u8], is_binary: bool, is_wide: bool) -> String {
    if is_binary {
        format!("0x{}", hex::encode(bytes))
    } else {
        let text = String::from_utf8_lossy(bytes);
        let escaped = text.replace('\'', "''");
        if is_wide {
            format!("N'{escaped}'")
        } else {
            format!("'{escaped}'")
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn num_params_counts_placeholders_outside_literals() {
        let mut s = Statement::new();
        s.prepare("SELECT * FROM t WHERE a = ? AND b = 'lit?'");
        assert_eq!(s.num_params(), 1);
    }

    #[test]
    fn fetch_without_result_is_function_sequence_error() {
        let mut s = Statement::new();
        assert!(matches!(s.fetch(), Err(Error::FunctionSequence)));
    }

    #[test]
    fn put_data_outside_need_data_state_is_rejected() {
        let mut s = Statement::new();
        assert!(matches!(s.put_data(b"x"), Err(Error::FunctionSequence)));
    }

    #[test]
    fn render_dae_literal_escapes_and_prefixes_wide_text() {
        assert_eq!(render_dae_literal(b"it's", false, true), "N'it''s'");
        assert_eq!(render_dae_literal(b"it's", false, false), "'it''s'");
    }

    #[test]
    fn render_dae_literal_zero_length_is_empty_string_not_null() {
        assert_eq!(render_dae_literal(b"", false, true), "N''");
    }

    #[test]
    fn render_dae_literal_binary_is_hex_with_prefix() {
        assert_eq!(render_dae_literal(&[0xAB, 0x01], true, false), "0xab01");
    }

    #[test]
    fn close_clears_result_and_resets_state_to_idle() {
        let mut s = Statement::new();
        s.prepare("SELECT 1");
        s.close();
        assert_eq!(s.state, StatementState::Idle);
        assert!(s.result.is_none());
        assert_eq!(s.row_count, -1);
    }

    fn dae_param(position: u16, token: DaeToken) -> BoundParameter {
        BoundParameter {
            position,
            indicator: ParamIndicator::DataAtExec,
            dae_token: Some(token),
            dae_is_binary: false,
            dae_is_wide: false,
        }
    }

    #[test]
    fn execute_with_a_single_dae_param_returns_its_token_without_advancing() {
        let mut s = Statement::new();
        s.prepare("INSERT INTO t VALUES (?)");
        s.bind_parameter(dae_param(1, 42));
        let mut fake = crate::fake::FakeTdsSource::new();

        let outcome = crate::executor::block_on(s.execute(&mut fake)).unwrap();
        assert!(matches!(outcome, ExecOutcome::NeedData(42)));
        assert_eq!(s.state, StatementState::NeedData);

        // A second ParamData call before any PutData must return the same
        // token again, not advance past it.
        let outcome = crate::executor::block_on(s.param_data(&mut fake)).unwrap();
        assert!(matches!(outcome, ExecOutcome::NeedData(42)));
    }

    #[test]
    fn param_data_sequences_through_multiple_dae_params_in_order() {
        let mut s = Statement::new();
        s.prepare("INSERT INTO t VALUES (?, ?)");
        s.bind_parameter(dae_param(1, 10));
        s.bind_parameter(dae_param(2, 20));
        let mut fake = crate::fake::FakeTdsSource::new();

        let first = crate::executor::block_on(s.execute(&mut fake)).unwrap();
        assert!(matches!(first, ExecOutcome::NeedData(10)));

        s.put_data(b"a").unwrap();
        let second = crate::executor::block_on(s.param_data(&mut fake)).unwrap();
        assert!(matches!(second, ExecOutcome::NeedData(20)));

        s.put_data(b"b").unwrap();
        let third = crate::executor::block_on(s.param_data(&mut fake)).unwrap();
        assert!(matches!(third, ExecOutcome::Executed { .. }));
        assert_eq!(s.state, StatementState::Executed);
    }
}
