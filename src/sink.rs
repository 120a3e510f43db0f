//! Storage sinks: where drained insert jobs are executed.
//!
//! The core never talks to a database driver directly; it renders a
//! statement plus positional parameters and hands both to a [`StorageSink`].
//! Implementing the trait for a connection type is all a custom backend
//! needs. Transactions, retries, and timeouts are sink concerns: the first
//! failed job aborts the drain and previously executed jobs stay committed.

use crate::value::Value;

/// Error type returned by storage sinks.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Executes rendered statements against a backing store.
pub trait StorageSink: Send + Sync {
	/// Executes `statement` with positional `params`, returning the number
	/// of affected rows.
	fn execute(&self, statement: &str, params: &[Value]) -> Result<u64, SinkError>;
}

#[cfg(feature = "sqlite")]
mod sqlite {
	use parking_lot::Mutex;
	use rusqlite::Connection;
	use rusqlite::types::{ToSql, ToSqlOutput, Value as SqliteValue};

	use super::{SinkError, StorageSink};
	use crate::value::Value;

	/// A [`StorageSink`] over a bundled synchronous SQLite connection.
	///
	/// The connection sits behind a mutex so the sink can be shared between
	/// factories; statements execute serially.
	pub struct SqliteSink {
		conn: Mutex<Connection>,
	}

	impl SqliteSink {
		/// Wraps an existing connection.
		pub fn new(conn: Connection) -> Self {
			Self {
				conn: Mutex::new(conn),
			}
		}

		/// Opens an in-memory database.
		pub fn open_in_memory() -> rusqlite::Result<Self> {
			Connection::open_in_memory().map(Self::new)
		}

		/// Runs `f` with the underlying connection, for schema setup and
		/// verification queries.
		pub fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> R) -> R {
			let conn = self.conn.lock();
			f(&conn)
		}
	}

	impl StorageSink for SqliteSink {
		fn execute(&self, statement: &str, params: &[Value]) -> Result<u64, SinkError> {
			let conn = self.conn.lock();
			let affected = conn.execute(statement, rusqlite::params_from_iter(params.iter()))?;
			Ok(affected as u64)
		}
	}

	impl ToSql for Value {
		fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
			let value = match self {
				Value::Null => SqliteValue::Null,
				Value::Int(v) => SqliteValue::Integer(*v),
				Value::Uint(v) => {
					let signed = i64::try_from(*v)
						.map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
					SqliteValue::Integer(signed)
				}
				Value::Float(v) => SqliteValue::Real(*v),
				Value::Str(v) => SqliteValue::Text(v.clone()),
				Value::Bytes(v) => SqliteValue::Blob(v.clone()),
				Value::Bool(v) => SqliteValue::Integer(i64::from(*v)),
				Value::Time(v) => SqliteValue::Text(v.to_rfc3339()),
			};
			Ok(ToSqlOutput::Owned(value))
		}
	}

}

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSink;
