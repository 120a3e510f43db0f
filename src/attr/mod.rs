//! Attributes: named value generators bound to record fields.
//!
//! An [`Attribute`] pairs a field name (and optional storage column) with a
//! generator closure. Generator state (sequence counters, cycling indexes)
//! lives behind a shared handle, so cloning an attribute (or the factory
//! holding it) never forks the sequence: every clone observes one monotonic
//! stream of values. That sharing is what keeps `build_n` counting `1..=n`
//! even though each iteration builds against an independent factory clone.
//!
//! The constructors come in three families: [`fixed`] values, [`sequence`]
//! generators, and [`random`] generators (including fake-data helpers for
//! names, usernames, and emails).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::FactoryError;
use crate::value::{AttrKind, Value};

pub mod fixed;
pub mod random;
pub mod sequence;

pub use fixed::*;
pub use random::*;
pub use sequence::*;

type GenFn = dyn FnMut(&dyn Any) -> Result<Value, FactoryError> + Send;

/// A named, typed value generator bound to a target field and optional
/// storage column.
#[derive(Clone)]
pub struct Attribute {
	name: String,
	column: Option<String>,
	kind: AttrKind,
	generator: Arc<Mutex<GenFn>>,
}

impl Attribute {
	/// Creates an attribute from a fallible generator closure.
	pub fn new(
		name: impl Into<String>,
		kind: AttrKind,
		mut generator: impl FnMut() -> Result<Value, FactoryError> + Send + 'static,
	) -> Self {
		Self::with_context(name, kind, move |_| generator())
	}

	/// Creates an attribute whose generator receives the partially built
	/// object as context.
	///
	/// The context is the object under construction with all earlier
	/// attributes already applied; downcast it to the record type to derive
	/// values from sibling fields.
	pub fn with_context(
		name: impl Into<String>,
		kind: AttrKind,
		generator: impl FnMut(&dyn Any) -> Result<Value, FactoryError> + Send + 'static,
	) -> Self {
		Self {
			name: name.into(),
			column: None,
			kind,
			generator: Arc::new(Mutex::new(generator)),
		}
	}

	/// Binds the attribute to a storage column.
	pub fn with_column(mut self, column: impl Into<String>) -> Self {
		self.column = Some(column.into());
		self
	}

	/// The target field name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The bound storage column, if any.
	pub fn column(&self) -> Option<&str> {
		self.column.as_deref()
	}

	/// The kind tag guiding coercion of generated values.
	pub fn kind(&self) -> AttrKind {
		self.kind
	}

	/// Runs the generator, advancing any internal state exactly once.
	pub fn generate(&self, context: &dyn Any) -> Result<Value, FactoryError> {
		let mut generator = self.generator.lock();
		(&mut *generator)(context)
	}
}

impl fmt::Debug for Attribute {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Attribute")
			.field("name", &self.name)
			.field("column", &self.column)
			.field("kind", &self.kind)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn clones_share_generator_state() {
		let attribute = seq("id", 1);
		let clone = attribute.clone();
		assert_eq!(attribute.generate(&()).unwrap(), Value::Int(1));
		assert_eq!(clone.generate(&()).unwrap(), Value::Int(2));
		assert_eq!(attribute.generate(&()).unwrap(), Value::Int(3));
	}

	#[rstest]
	fn with_column_binds_a_storage_column() {
		let attribute = fix_int("age", 30).with_column("age");
		assert_eq!(attribute.column(), Some("age"));
		assert_eq!(attribute.name(), "age");
		assert_eq!(attribute.kind(), AttrKind::Int);
	}

	#[rstest]
	fn context_generators_see_the_object_under_construction() {
		let attribute = Attribute::with_context("label", AttrKind::Str, |context| {
			let seed = context
				.downcast_ref::<i64>()
				.ok_or_else(|| FactoryError::generation("label", "unexpected context"))?;
			Ok(Value::Str(format!("object-{seed}")))
		});
		assert_eq!(
			attribute.generate(&7_i64).unwrap(),
			Value::Str("object-7".into())
		);
	}

	#[rstest]
	fn generator_failures_propagate() {
		let attribute = Attribute::new("broken", AttrKind::Unknown, || {
			Err(FactoryError::generation("broken", "no value"))
		});
		assert!(matches!(
			attribute.generate(&()).unwrap_err(),
			FactoryError::GenerationFailure { .. }
		));
	}
}
