#![forbid(unsafe_code)]

//! The SQL boundary.
//!
//! Queries come from the configuration and use `:name` placeholders. The
//! dashboard fills in parameter values, formats each one with its
//! configured template, and hands the map to a [`Repository`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::DatabaseConfig;

/// Rows returned by a query, every value rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryResults {
    headers: Vec<String>,
    rows: Vec<BTreeMap<String, String>>,
}

impl QueryResults {
    pub fn new(headers: Vec<String>, rows: Vec<BTreeMap<String, String>>) -> Self {
        Self { headers, rows }
    }

    /// Column names in result order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// One map per row, keyed by column name.
    pub fn rows(&self) -> &[BTreeMap<String, String>] {
        &self.rows
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("cannot connect to database {name}: {reason}")]
    Connect { name: String, reason: String },
    #[error("query failed: {0}")]
    Query(String),
    #[error("no database named {0}")]
    UnknownDatabase(String),
    #[error("databases are configured but this build has no mysql support")]
    Unsupported,
}

/// Something that runs named-parameter queries.
pub trait Repository {
    fn query(&mut self, sql: &str, params: &HashMap<String, String>) -> Result<QueryResults, DatabaseError>;
}

/// Connected repositories keyed by configured database name.
pub type Repositories = HashMap<String, Box<dyn Repository>>;

/// A query made against a [`StaticRepository`].
pub type RecordedQuery = (String, HashMap<String, String>);

/// Answers every query with the same results and records what was asked.
#[derive(Debug, Clone, Default)]
pub struct StaticRepository {
    results: QueryResults,
    queries: Arc<Mutex<Vec<RecordedQuery>>>,
}

impl StaticRepository {
    pub fn new(results: QueryResults) -> Self {
        Self {
            results,
            queries: Arc::default(),
        }
    }

    /// Queries received so far, shared between clones.
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Repository for StaticRepository {
    fn query(&mut self, sql: &str, params: &HashMap<String, String>) -> Result<QueryResults, DatabaseError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((sql.to_string(), params.clone()));
        Ok(self.results.clone())
    }
}

/// Apply a printf-style `format` to `value`.
///
/// `%s` and `%v` insert the value and `%%` is a literal percent sign. Any
/// other sequence is kept as written. An empty format inserts the value
/// unchanged.
pub fn format_param(format: &str, value: &str) -> String {
    if format.is_empty() {
        return value.to_string();
    }

    let mut out = String::with_capacity(format.len() + value.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s' | 'v') => {
                chars.next();
                out.push_str(value);
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}

/// Connect to every configured database.
///
/// Any failure is fatal for startup, so the first error is returned.
pub fn connect_all(databases: &[DatabaseConfig]) -> Result<Repositories, DatabaseError> {
    let mut repositories = Repositories::new();
    for database in databases {
        let repository = connect(database)?;
        tracing::info!(database = %database.name, host = %database.host, "database connected");
        repositories.insert(database.name.clone(), repository);
    }
    Ok(repositories)
}

#[cfg(feature = "mysql")]
fn connect(database: &DatabaseConfig) -> Result<Box<dyn Repository>, DatabaseError> {
    Ok(Box::new(mysql_client::MySqlRepository::connect(database)?))
}

#[cfg(not(feature = "mysql"))]
fn connect(_database: &DatabaseConfig) -> Result<Box<dyn Repository>, DatabaseError> {
    Err(DatabaseError::Unsupported)
}

#[cfg(feature = "mysql")]
mod mysql_client {
    use std::collections::{BTreeMap, HashMap};

    use mysql::prelude::Queryable;
    use mysql::{Opts, OptsBuilder, Params, Pool, PooledConn, Value};

    use super::{DatabaseError, QueryResults, Repository};
    use crate::config::DatabaseConfig;

    pub struct MySqlRepository {
        conn: PooledConn,
    }

    impl MySqlRepository {
        pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
            let connect_err = |reason: String| DatabaseError::Connect {
                name: config.name.clone(),
                reason,
            };
            let opts = connect_options(config).map_err(connect_err)?;
            let pool = Pool::new(opts).map_err(|err| connect_err(err.to_string()))?;
            let conn = pool.get_conn().map_err(|err| connect_err(err.to_string()))?;
            Ok(Self { conn })
        }
    }

    /// Connection options taken field by field, so credentials need no
    /// URL escaping.
    pub(super) fn connect_options(config: &DatabaseConfig) -> Result<Opts, String> {
        let port = config
            .port
            .parse::<u16>()
            .map_err(|err| format!("invalid port {:?}: {err}", config.port))?;
        let builder = OptsBuilder::new()
            .ip_or_hostname(Some(config.host.as_str()))
            .tcp_port(port)
            .user(Some(config.user.as_str()))
            .pass(Some(config.password.as_str()))
            .db_name(Some(config.schema.as_str()));
        Ok(Opts::from(builder))
    }

    impl Repository for MySqlRepository {
        fn query(&mut self, sql: &str, params: &HashMap<String, String>) -> Result<QueryResults, DatabaseError> {
            let named: HashMap<Vec<u8>, Value> = params
                .iter()
                .map(|(name, value)| (name.clone().into_bytes(), Value::from(value.as_str())))
                .collect();
            tracing::info!(query = sql, ?params, "executing query");

            let query_err = |err: mysql::Error| DatabaseError::Query(err.to_string());
            let mut result = self
                .conn
                .exec_iter(sql, Params::Named(named))
                .map_err(query_err)?;
            let headers: Vec<String> = result
                .columns()
                .as_ref()
                .iter()
                .map(|column| column.name_str().into_owned())
                .collect();

            let mut rows = Vec::new();
            for row in result.by_ref() {
                let row = row.map_err(query_err)?;
                let mut parsed = BTreeMap::new();
                for (idx, header) in headers.iter().enumerate() {
                    let text = row.as_ref(idx).map(value_text).unwrap_or_default();
                    parsed.insert(header.clone(), text);
                }
                rows.push(parsed);
            }
            Ok(QueryResults::new(headers, rows))
        }
    }

    fn value_text(value: &Value) -> String {
        match value {
            Value::NULL => "NULL".to_string(),
            Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Value::Int(n) => n.to_string(),
            Value::UInt(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Double(n) => n.to_string(),
            Value::Date(y, mo, d, h, mi, s, _) => {
                format!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}")
            }
            Value::Time(neg, days, h, mi, s, _) => {
                let sign = if *neg { "-" } else { "" };
                format!("{sign}{}:{mi:02}:{s:02}", u32::from(*h) + days * 24)
            }
        }
    }
}
