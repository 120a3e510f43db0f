//! Global factory configuration.
//!
//! Mirrors the per-factory settings for the common case of one database per
//! test suite: a process-wide storage sink, driver dialect, default write
//! function, and column-naming strategy. Factories consult a snapshot of
//! these options at build time; per-factory overrides
//! ([`Factory::database`](crate::Factory::database),
//! [`Factory::write_fn`](crate::Factory::write_fn)) win over the globals.
//!
//! [`reset`] restores the defaults, for test isolation.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::FactoryError;
use crate::insert::{InsertJob, SqlDialect, WriteFn};
use crate::sink::StorageSink;

/// How an attribute without an explicit column resolves its storage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnNaming {
	/// Only declared columns: the attribute's own column, else the record's
	/// `#[record(column = "…")]` mapping, else no column.
	#[default]
	Declared,
	/// Fall back to the attribute's field name as the column name.
	FieldName,
}

/// The global option set.
#[derive(Clone, Default)]
pub(crate) struct Options {
	pub(crate) sink: Option<Arc<dyn StorageSink>>,
	pub(crate) dialect: SqlDialect,
	pub(crate) write_fn: Option<Arc<WriteFn>>,
	pub(crate) column_naming: ColumnNaming,
}

static OPTIONS: Lazy<RwLock<Options>> = Lazy::new(|| RwLock::new(Options::default()));

/// Configures the global storage sink and driver dialect.
pub fn set_database(sink: Arc<dyn StorageSink>, driver: &str) {
	let mut options = OPTIONS.write();
	options.sink = Some(sink);
	options.dialect = SqlDialect::from_driver(driver);
}

/// Configures a global default write function applied to jobs from factories
/// without their own.
pub fn set_write_fn(
	write_fn: impl Fn(&InsertJob) -> Result<(), FactoryError> + Send + Sync + 'static,
) {
	OPTIONS.write().write_fn = Some(Arc::new(write_fn));
}

/// Configures the global column-naming strategy.
pub fn set_column_naming(naming: ColumnNaming) {
	OPTIONS.write().column_naming = naming;
}

/// Restores all global options to their defaults.
pub fn reset() {
	*OPTIONS.write() = Options::default();
}

/// A point-in-time copy of the global options.
pub(crate) fn snapshot() -> Options {
	OPTIONS.read().clone()
}
