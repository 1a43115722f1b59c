use crate::err::{Error, Result};
use crate::row_store::RowStore;
use crate::row_writer::drain_first_result_set;
use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// Everything `odbc::odbc_uri`/`odbc::dsn` can extract from a connection
/// string or DSN file (spec §4.2, §6).
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    pub host: String,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub trust_server_certificate: bool,
}

/// Everything a `Statement` needs from a server session: run a batch,
/// manage the autocommit/transaction policy (spec §4.2/§4.3). Kept as a
/// trait, rather than a concrete `TdsConnection`, so the odbc crate's
/// integration tests can drive the exported `SQL*` surface end-to-end
/// against an in-process fake instead of a live server (single-threaded
/// executor only, hence `?Send`; nothing here ever crosses a thread).
#[async_trait(?Send)]
pub trait TdsSource {
    /// Runs one batch, capturing the first result set and the
    /// affected-row total (spec §4.3 Execute, §4.5).
    async fn execute_batch(&mut self, sql: &str) -> Result<(RowStore, i64)>;

    /// Begins a transaction implicitly before the first statement after
    /// autocommit is turned off, and commits/rolls back explicitly
    /// thereafter.
    async fn begin_transaction_if_needed(&mut self) -> Result<()>;

    async fn end_transaction(&mut self, commit: bool) -> Result<()>;

    /// OFF->ON while in a transaction commits (spec §4.2 Autocommit policy).
    async fn set_autocommit(&mut self, on: bool) -> Result<()>;

    fn autocommit(&self) -> bool;

    fn in_transaction(&self) -> bool;

    fn database(&self) -> Option<&str>;
}

/// One logical session to the server (spec §3's Connection entity, minus
/// the handle-layer bookkeeping which lives in the odbc crate).
pub struct TdsConnection {
    client: Client<Compat<TcpStream>>,
    database: Option<String>,
    autocommit: bool,
    in_transaction: bool,
}

impl TdsConnection {
    pub async fn connect(opts: &ConnectionOptions) -> Result<TdsConnection> {
        let mut config = Config::new();
        config.host(&opts.host);
        config.port(opts.port.unwrap_or(1433));
        match (&opts.user, &opts.password) {
            (Some(user), Some(pass)) => {
                config.authentication(AuthMethod::sql_server(user, pass));
            }
            _ => config.authentication(AuthMethod::Integrated),
        }
        if let Some(db) = &opts.database {
            config.database(db);
        }
        if opts.trust_server_certificate {
            config.trust_cert();
        }

        let port = opts.port.unwrap_or(1433);
        let tcp = TcpStream::connect((opts.host.as_str(), port))
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;

        Ok(TdsConnection {
            client,
            database: opts.database.clone(),
            autocommit: true,
            in_transaction: false,
        })
    }
}

#[async_trait(?Send)]
impl TdsSource for TdsConnection {
    async fn execute_batch(&mut self, sql: &str) -> Result<(RowStore, i64)> {
        log::debug!("executing batch: {}", truncate_for_log(sql));
        let stream = self.client.simple_query(sql).await.map_err(Error::Server)?;
        drain_first_result_set(stream).await
    }

    async fn begin_transaction_if_needed(&mut self) -> Result<()> {
        if !self.autocommit && !self.in_transaction {
            self.client
                .simple_query("BEGIN TRANSACTION")
                .await
                .map_err(Error::Server)?
                .into_results()
                .await
                .map_err(Error::Server)?;
            self.in_transaction = true;
        }
        Ok(())
    }

    async fn end_transaction(&mut self, commit: bool) -> Result<()> {
        let sql = if commit { "COMMIT TRANSACTION" } else { "ROLLBACK TRANSACTION" };
        self.client
            .simple_query(sql)
            .await
            .map_err(Error::Server)?
            .into_results()
            .await
            .map_err(Error::Server)?;
        self.in_transaction = false;
        Ok(())
    }

    async fn set_autocommit(&mut self, on: bool) -> Result<()> {
        if on && !self.autocommit && self.in_transaction {
            self.end_transaction(true).await?;
        }
        self.autocommit = on;
        Ok(())
    }

    fn autocommit(&self) -> bool {
        self.autocommit
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }
}

fn truncate_for_log(sql: &str) -> &str {
    const MAX: usize = 200;
    if sql.len() <= MAX {
        sql
    } else {
        &sql[..MAX]
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn truncate_for_log_leaves_short_sql_untouched() {
        assert_eq!(truncate_for_log("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn connection_options_default_has_no_credentials() {
        let opts = ConnectionOptions::default();
        assert!(opts.user.is_none());
        assert!(!opts.trust_server_certificate);
    }
}
