//! The record contract: name-based field access over model structs.
//!
//! A [`Record`] is a model struct a factory can stamp out. The trait carries
//! everything the build engine needs to work generically without runtime
//! reflection: template stamping via `Clone`, scalar field reads/writes by
//! name (with kind-guided coercion through [`FromValue`](crate::FromValue)),
//! relation field assignment for association resolution, and the declared
//! field-to-column mapping.
//!
//! Implementations are normally generated with `#[derive(Record)]`; the
//! derive macro is the compile-time replacement for reflective field lookup,
//! building one accessor arm per registered field. Hand-written
//! implementations are supported and follow the same rules.

use std::any::Any;

use crate::error::FactoryError;
use crate::value::Value;

/// A model struct that factories can build and insert.
///
/// `Clone` is the template-stamping mechanism: each build starts from a fresh
/// copy of the template value, so prototype field values carry over without
/// aliasing.
pub trait Record: Clone + Send + Sync + Sized + 'static {
	/// The storage table declared for this record, if any.
	fn table() -> Option<&'static str> {
		None
	}

	/// Declared `(field, column)` pairs.
	///
	/// Only fields with an explicitly declared column appear here; see
	/// [`ColumnNaming`](crate::config::ColumnNaming) for the fallback
	/// strategies.
	fn columns() -> &'static [(&'static str, &'static str)] {
		&[]
	}

	/// Reads the named scalar field as a [`Value`].
	fn field(&self, name: &str) -> Result<Value, FactoryError>;

	/// Writes the named scalar field, coercing `value` to the field's type.
	///
	/// Unknown names fail with `FieldNotFound`; relation fields fail with
	/// `FieldUnsettable`; an uncoercible value fails with `TypeMismatch`.
	fn set_field(&mut self, name: &str, value: Value) -> Result<(), FactoryError>;

	/// Assigns a built related object to the named relation field.
	///
	/// The boxed value must downcast to the relation's object type. On a
	/// collection relation field the single object is appended.
	fn set_related(&mut self, name: &str, related: Box<dyn Any>) -> Result<(), FactoryError> {
		let _ = related;
		Err(FactoryError::field_not_found::<Self>(name))
	}

	/// Appends a built related object to the named collection relation field.
	fn push_related(&mut self, name: &str, related: Box<dyn Any>) -> Result<(), FactoryError> {
		let _ = related;
		Err(FactoryError::field_not_found::<Self>(name))
	}

	/// The declared column for `name`, if any.
	fn column_of(name: &str) -> Option<&'static str> {
		Self::columns()
			.iter()
			.find(|(field, _)| *field == name)
			.map(|(_, column)| *column)
	}
}
