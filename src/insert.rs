//! Deferred insert jobs and SQL statement rendering.
//!
//! A build that inserts does not touch the store directly; it accumulates
//! [`InsertJob`]s in the factory's queue. Draining the queue executes each
//! job in enqueue order, which by construction yields parent-before-child
//! insertion under foreign-key constraints. The default write path renders a
//! parameterized `INSERT` and rewrites its placeholders for the configured
//! driver dialect; an [`InsertJob::data_as`] hook point supports ORM-style
//! write functions that receive the whole built object instead.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::FactoryError;
use crate::sink::StorageSink;
use crate::value::Value;

/// A pluggable per-job write function.
///
/// Receives the job (table, column values, and the type-erased built object)
/// and performs the write itself, bypassing the default SQL path.
pub type WriteFn = dyn Fn(&InsertJob) -> Result<(), FactoryError> + Send + Sync;

/// Placeholder syntax for a SQL driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
	/// `?` placeholders (MySQL, SQLite; also the pass-through default).
	#[default]
	Question,
	/// `$1`, `$2`, … (PostgreSQL family).
	Dollar,
	/// `:arg1`, `:arg2`, … (Oracle family).
	Named,
	/// `@p1`, `@p2`, … (SQL Server).
	At,
}

impl SqlDialect {
	/// Maps a driver name to its placeholder dialect.
	///
	/// Unrecognized names fall back to `?` placeholders, which pass through
	/// unchanged.
	pub fn from_driver(driver: &str) -> Self {
		match driver.to_ascii_lowercase().as_str() {
			"postgres" | "postgresql" | "pgx" | "pq-timeouts" | "cloudsqlpostgres" | "ql" | "pg" => {
				Self::Dollar
			}
			"mysql" => Self::Question,
			"sqlite3" | "sqlite" => Self::Question,
			"oci8" | "ora" | "goracle" | "godror" | "oracle" => Self::Named,
			"sqlserver" | "mssql" => Self::At,
			_ => Self::Question,
		}
	}

	/// Rewrites `?` placeholders in `statement` to this dialect's syntax.
	pub fn rebind(self, statement: &str) -> String {
		let prefix = match self {
			Self::Question => return statement.to_string(),
			Self::Dollar => "$",
			Self::Named => ":arg",
			Self::At => "@p",
		};

		let mut rebound = String::with_capacity(statement.len() + 8);
		let mut n = 0usize;
		for ch in statement.chars() {
			if ch == '?' {
				n += 1;
				rebound.push_str(prefix);
				rebound.push_str(&n.to_string());
			} else {
				rebound.push(ch);
			}
		}
		rebound
	}
}

/// Renders a parameterized `INSERT` statement with `?` placeholders.
pub fn render_insert<'a>(table: &str, columns: impl IntoIterator<Item = &'a str>) -> String {
	let columns: Vec<&str> = columns.into_iter().collect();
	let placeholders = vec!["?"; columns.len()].join(", ");
	format!(
		"INSERT INTO {table} ({}) VALUES ({})",
		columns.join(", "),
		placeholders
	)
}

/// A deferred storage write: table, column values, and write behavior.
#[derive(Clone)]
pub struct InsertJob {
	table: String,
	column_values: IndexMap<String, Value>,
	data: Option<Arc<dyn Any + Send + Sync>>,
	write_fn: Option<Arc<WriteFn>>,
	fixed: bool,
}

impl InsertJob {
	/// Creates a job for `table` carrying `column_values`.
	pub fn new(table: impl Into<String>, column_values: IndexMap<String, Value>) -> Self {
		Self {
			table: table.into(),
			column_values,
			data: None,
			write_fn: None,
			fixed: false,
		}
	}

	/// Attaches a type-erased snapshot of the built object.
	pub(crate) fn with_data(mut self, data: Arc<dyn Any + Send + Sync>) -> Self {
		self.data = Some(data);
		self
	}

	/// Attaches a custom write function.
	pub(crate) fn with_write_fn(mut self, write_fn: Option<Arc<WriteFn>>) -> Self {
		self.write_fn = write_fn;
		self
	}

	/// Flags whether this job survives queue clearing.
	pub fn with_fixed(mut self, fixed: bool) -> Self {
		self.fixed = fixed;
		self
	}

	pub(crate) fn set_fixed(&mut self, fixed: bool) {
		self.fixed = fixed;
	}

	/// The target table.
	pub fn table(&self) -> &str {
		&self.table
	}

	/// The column values, in insertion order.
	pub fn column_values(&self) -> &IndexMap<String, Value> {
		&self.column_values
	}

	/// Whether this job survives queue clearing.
	pub fn is_fixed(&self) -> bool {
		self.fixed
	}

	/// The built object this job will write, downcast to `T`.
	///
	/// Available to custom write functions that hand the whole object to an
	/// ORM instead of rendering SQL. Join-table jobs carry no object.
	pub fn data_as<T: 'static>(&self) -> Option<&T> {
		self.data.as_ref()?.downcast_ref::<T>()
	}

	/// The rendered statement for this job under `dialect`.
	pub fn statement(&self, dialect: SqlDialect) -> String {
		let statement = render_insert(&self.table, self.column_values.keys().map(String::as_str));
		dialect.rebind(&statement)
	}

	/// The positional parameters matching [`InsertJob::statement`].
	pub fn params(&self) -> Vec<Value> {
		self.column_values.values().cloned().collect()
	}

	/// Executes this job: the custom write function when set, else the
	/// default dialect-bound `INSERT` against `sink`.
	pub(crate) fn execute(
		&self,
		sink: Option<&Arc<dyn StorageSink>>,
		dialect: SqlDialect,
	) -> Result<(), FactoryError> {
		if let Some(write_fn) = &self.write_fn {
			return write_fn(self);
		}

		let sink = sink.ok_or(FactoryError::MissingDatabase)?;
		if self.table.is_empty() {
			return Err(FactoryError::MissingTable);
		}
		if self.column_values.is_empty() {
			return Err(FactoryError::EmptyColumns {
				table: self.table.clone(),
			});
		}

		let statement = self.statement(dialect);
		let params = self.params();
		debug!(table = %self.table, statement = %statement, "executing insert job");
		sink.execute(&statement, &params)
			.map_err(|source| FactoryError::WriteFailure {
				table: self.table.clone(),
				statement,
				source,
			})?;
		Ok(())
	}
}

impl fmt::Debug for InsertJob {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InsertJob")
			.field("table", &self.table)
			.field("column_values", &self.column_values)
			.field("fixed", &self.fixed)
			.field("has_write_fn", &self.write_fn.is_some())
			.finish_non_exhaustive()
	}
}
