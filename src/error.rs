//! Error types for factory building and insertion.
//!
//! Every failure surfaces as a [`FactoryError`]; nothing is retried or
//! swallowed internally. Test-data generation is expected to fail fast and
//! loudly, so the `must_*` factory operations convert these errors into
//! panics for use in test setup code.

use thiserror::Error;

use crate::value::Value;

/// Errors that can occur while building or inserting objects.
#[derive(Debug, Error)]
pub enum FactoryError {
	/// An attribute or association named a field absent on the record type.
	#[error("field `{field}` not found on {record}")]
	FieldNotFound {
		/// Record type the lookup ran against.
		record: &'static str,
		/// The missing field name.
		field: String,
	},

	/// The named field exists but cannot be written through this accessor.
	#[error("field `{field}` is not settable: {reason}")]
	FieldUnsettable {
		/// The rejected field name.
		field: String,
		/// Why the write was rejected.
		reason: String,
	},

	/// A generated value could not be coerced into the target field.
	#[error("type mismatch on field `{field}`: cannot assign {value} to {expected}")]
	TypeMismatch {
		/// Field the assignment targeted; empty until attached by the setter.
		field: String,
		/// The field's expected type.
		expected: &'static str,
		/// Rendered form of the rejected value.
		value: String,
	},

	/// `insert` was called with no storage sink and no write hook configured.
	#[error("no database configured: set a global sink with `config::set_database` or a factory write hook")]
	MissingDatabase,

	/// An insert job reached the default write path with no table name.
	#[error("insert job has no table name: configure the factory with `table` or `#[record(table = \"…\")]`")]
	MissingTable,

	/// An insert job reached the default write path with no mapped columns.
	#[error("insert into `{table}`: no mapped storage columns")]
	EmptyColumns {
		/// Target table of the job.
		table: String,
	},

	/// An association is missing configuration its relationship kind requires.
	#[error("association `{field}`: missing {missing}")]
	IncompleteAssociationConfig {
		/// Owner-side relation field.
		field: String,
		/// The missing piece of configuration.
		missing: &'static str,
	},

	/// A batch or cardinality count of zero was requested.
	#[error("count must be at least 1")]
	InvalidCount,

	/// An attribute's generator itself failed.
	#[error("attribute `{attribute}` generation failed: {message}")]
	GenerationFailure {
		/// Name of the failing attribute.
		attribute: String,
		/// Generator-provided detail.
		message: String,
	},

	/// The storage sink rejected an executed statement.
	#[error("insert into `{table}` failed: {source} (statement: `{statement}`)")]
	WriteFailure {
		/// Target table of the failed job.
		table: String,
		/// The rendered statement that was executed.
		statement: String,
		/// Underlying sink error.
		#[source]
		source: Box<dyn std::error::Error + Send + Sync>,
	},
}

impl FactoryError {
	/// A `FieldNotFound` error for a lookup against record type `T`.
	pub fn field_not_found<T>(field: impl Into<String>) -> Self {
		Self::FieldNotFound {
			record: std::any::type_name::<T>(),
			field: field.into(),
		}
	}

	/// A `FieldUnsettable` error.
	pub fn unsettable(field: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::FieldUnsettable {
			field: field.into(),
			reason: reason.into(),
		}
	}

	/// A `TypeMismatch` for coercing `value` into a field of type `expected`.
	///
	/// The field name is attached later by the setter that knows it, via
	/// [`FactoryError::for_field`].
	pub fn type_mismatch(expected: &'static str, value: &Value) -> Self {
		Self::TypeMismatch {
			field: String::new(),
			expected,
			value: value.to_string(),
		}
	}

	/// A `TypeMismatch` for a related object that failed to downcast to `T`.
	pub fn related_mismatch<T>(field: impl Into<String>) -> Self {
		Self::TypeMismatch {
			field: field.into(),
			expected: std::any::type_name::<T>(),
			value: "related object".to_string(),
		}
	}

	/// A `GenerationFailure` for the named attribute.
	pub fn generation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
		Self::GenerationFailure {
			attribute: attribute.into(),
			message: message.into(),
		}
	}

	/// Attaches a field name to a `TypeMismatch` or `FieldUnsettable` error.
	///
	/// Other variants pass through unchanged. Used by generated `Record`
	/// implementations, which know the field a coercion failed on.
	pub fn for_field(self, name: &str) -> Self {
		match self {
			Self::TypeMismatch { expected, value, .. } => Self::TypeMismatch {
				field: name.to_string(),
				expected,
				value,
			},
			Self::FieldUnsettable { reason, .. } => Self::FieldUnsettable {
				field: name.to_string(),
				reason,
			},
			other => other,
		}
	}
}

/// Result type alias for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;
