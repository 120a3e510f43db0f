//! Relationship edges between factories and their resolution.
//!
//! An [`Association`] describes one edge: which factory builds the related
//! side, which fields carry the reference values, and (for many-to-many)
//! the join table synthesized per pair. The same association value is cheap
//! to clone and is commonly reused as a template across sibling edges (one
//! "home belongs to location" association serving both a `has_one` and a
//! `has_many` registration), so it holds configuration only; per-build state
//! lives in the owning factory's queue.
//!
//! Resolution ordering is the heart of the insert sequencing contract:
//! belongs-to edges build (and enqueue) before the owner's own job because
//! the owner's row needs their keys; has-one/has-many/many-to-many edges
//! build after, carrying the owner's key down.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::attr::Attribute;
use crate::error::FactoryError;
use crate::queue::InsertJobQueue;
use crate::record::Record;
use crate::value::Value;

/// The relationship kinds an association can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationKind {
	/// Owner holds a foreign key pointing at the related object.
	BelongsTo,
	/// One related object holds a foreign key pointing back at the owner.
	HasOne,
	/// Several related objects hold foreign keys pointing back at the owner.
	HasMany,
	/// Both sides independent, linked through synthesized join-table rows.
	ManyToMany,
}

/// The related-factory operations association resolution needs, with the
/// related record type erased.
pub(crate) trait AssociatedFactory: Send + Sync {
	/// Builds one related object, splicing any insert jobs it produces onto
	/// `queue`. `preset` is applied to the object after its attributes and
	/// merged into its job's columns. `fixed` flags the produced jobs as
	/// surviving queue clears.
	fn build_related(
		&self,
		insert: bool,
		preset: Option<Preset>,
		queue: &mut InsertJobQueue,
		fixed: bool,
	) -> Result<Box<dyn Any>, FactoryError>;

	/// Reads `field` from a built related object.
	fn read_field(&self, object: &dyn Any, field: &str) -> Result<Value, FactoryError>;

	/// Appends `related` to `field` on a built related object (the
	/// many-to-many back-reference).
	fn push_related_on(
		&self,
		object: &mut dyn Any,
		field: &str,
		related: Box<dyn Any>,
	) -> Result<(), FactoryError>;
}

/// A foreign-key value injected into a related object during its build, so
/// its insert job carries the key immediately.
#[derive(Debug, Clone)]
pub(crate) struct Preset {
	pub(crate) field: String,
	pub(crate) column: Option<String>,
	pub(crate) value: Value,
}

/// One relationship edge between an owning factory and a related factory.
///
/// Created with [`Factory::to_association`](crate::Factory::to_association)
/// and configured through the builder methods before registration.
#[derive(Clone)]
pub struct Association {
	pub(crate) factory: Arc<dyn AssociatedFactory>,
	pub(crate) refer_field: Option<String>,
	pub(crate) refer_column: Option<String>,
	pub(crate) foreign_field: Option<String>,
	pub(crate) foreign_key: Option<String>,
	pub(crate) associated_field: Option<String>,
	pub(crate) join_table: Option<String>,
	pub(crate) join_attributes: Vec<Attribute>,
	pub(crate) num: u32,
	pub(crate) fix: bool,
}

impl Association {
	pub(crate) fn new(factory: Arc<dyn AssociatedFactory>) -> Self {
		Self {
			factory,
			refer_field: None,
			refer_column: None,
			foreign_field: None,
			foreign_key: None,
			associated_field: None,
			join_table: None,
			join_attributes: Vec::new(),
			num: 1,
			fix: false,
		}
	}

	/// Names the reference field whose value is copied across the edge.
	///
	/// For belongs-to this is on the related object; for has-one/has-many
	/// and many-to-many it is on the owner.
	pub fn refer_field(mut self, field: impl Into<String>) -> Self {
		self.refer_field = Some(field.into());
		self
	}

	/// Names the join-table column carrying the owner's reference value
	/// (many-to-many only).
	pub fn refer_column(mut self, column: impl Into<String>) -> Self {
		self.refer_column = Some(column.into());
		self
	}

	/// Names the field receiving the copied reference value.
	///
	/// For belongs-to this is on the owner; for has-one/has-many it is on
	/// the related object; for many-to-many it names the related object's
	/// reference field.
	pub fn foreign_field(mut self, field: impl Into<String>) -> Self {
		self.foreign_field = Some(field.into());
		self
	}

	/// Names the storage column for the copied reference value: the owner's
	/// foreign-key column (belongs-to), the related row's foreign-key column
	/// (has-one/has-many), or the join-table column for the related side
	/// (many-to-many).
	pub fn foreign_key(mut self, column: impl Into<String>) -> Self {
		self.foreign_key = Some(column.into());
		self
	}

	/// Names the related object's back-reference collection field
	/// (many-to-many only).
	pub fn associated_field(mut self, field: impl Into<String>) -> Self {
		self.associated_field = Some(field.into());
		self
	}

	/// Configures the join table and its extra attributes (many-to-many
	/// only). Attributes with a bound column contribute values to each
	/// synthesized join row.
	pub fn join_table(
		mut self,
		table: impl Into<String>,
		attributes: impl IntoIterator<Item = Attribute>,
	) -> Self {
		self.join_table = Some(table.into());
		self.join_attributes = attributes.into_iter().collect();
		self
	}

	/// Sets the cardinality. Overridden by the `num` argument of
	/// `has_many`/`many_to_many` registration.
	pub fn num(mut self, num: u32) -> Self {
		self.num = num;
		self
	}

	/// Flags jobs produced through this association as surviving queue
	/// clears.
	pub fn fix(mut self) -> Self {
		self.fix = true;
		self
	}
}

impl fmt::Debug for Association {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Association")
			.field("refer_field", &self.refer_field)
			.field("refer_column", &self.refer_column)
			.field("foreign_field", &self.foreign_field)
			.field("foreign_key", &self.foreign_key)
			.field("associated_field", &self.associated_field)
			.field("join_table", &self.join_table)
			.field("num", &self.num)
			.field("fix", &self.fix)
			.finish_non_exhaustive()
	}
}

/// An association registered on a factory under a relation field and kind.
#[derive(Clone, Debug)]
pub(crate) struct BoundAssociation {
	pub(crate) field: String,
	pub(crate) kind: AssociationKind,
	pub(crate) assoc: Association,
}

/// A factory's registered association set, grouped by resolution phase.
#[derive(Clone, Debug, Default)]
pub(crate) struct Associations {
	belongs_to: Vec<BoundAssociation>,
	has_one_or_many: Vec<BoundAssociation>,
	many_to_many: Vec<BoundAssociation>,
}

impl Associations {
	pub(crate) fn add(&mut self, kind: AssociationKind, field: String, assoc: Association) {
		let bound = BoundAssociation { field, kind, assoc };
		match kind {
			AssociationKind::BelongsTo => self.belongs_to.push(bound),
			AssociationKind::HasOne | AssociationKind::HasMany => {
				self.has_one_or_many.push(bound);
			}
			AssociationKind::ManyToMany => self.many_to_many.push(bound),
		}
	}

	/// Resolves belongs-to edges. Related objects build (and enqueue) before
	/// the owner's own job; returns the foreign-key column values the
	/// owner's job must carry.
	pub(crate) fn build_belongs_to<T: Record>(
		&self,
		owner: &mut T,
		insert: bool,
		queue: &mut InsertJobQueue,
	) -> Result<IndexMap<String, Value>, FactoryError> {
		let mut columns = IndexMap::new();

		for bound in &self.belongs_to {
			let assoc = &bound.assoc;
			trace!(field = %bound.field, kind = ?bound.kind, "resolving association");
			if assoc.num == 0 {
				return Err(FactoryError::InvalidCount);
			}

			let mut objects = Vec::with_capacity(assoc.num as usize);
			for _ in 0..assoc.num {
				objects.push(assoc.factory.build_related(insert, None, queue, assoc.fix)?);
			}

			// The owner's foreign key comes from the first related object.
			let refer_field = assoc.refer_field.as_deref();
			if insert && refer_field.is_none() {
				return Err(FactoryError::IncompleteAssociationConfig {
					field: bound.field.clone(),
					missing: "refer_field",
				});
			}
			if let Some(refer_field) = refer_field {
				let value = assoc.factory.read_field(objects[0].as_ref(), refer_field)?;
				if let Some(foreign_field) = assoc.foreign_field.as_deref() {
					owner.set_field(foreign_field, value.clone())?;
				}
				if insert {
					let foreign_key = assoc.foreign_key.as_deref().ok_or_else(|| {
						FactoryError::IncompleteAssociationConfig {
							field: bound.field.clone(),
							missing: "foreign_key",
						}
					})?;
					columns.insert(foreign_key.to_string(), value);
				}
			}

			assign_related(owner, &bound.field, objects)?;
		}

		Ok(columns)
	}

	/// Resolves has-one and has-many edges after the owner's own job is
	/// queued, passing the owner's reference value down as a preset.
	pub(crate) fn build_has_one_or_many<T: Record>(
		&self,
		owner: &mut T,
		insert: bool,
		queue: &mut InsertJobQueue,
	) -> Result<(), FactoryError> {
		for bound in &self.has_one_or_many {
			let assoc = &bound.assoc;
			trace!(field = %bound.field, kind = ?bound.kind, "resolving association");
			if assoc.num == 0 {
				return Err(FactoryError::InvalidCount);
			}

			let preset = match assoc.refer_field.as_deref() {
				Some(refer_field) => {
					let value = owner.field(refer_field)?;
					let field = assoc.foreign_field.clone().ok_or_else(|| {
						FactoryError::IncompleteAssociationConfig {
							field: bound.field.clone(),
							missing: "foreign_field",
						}
					})?;
					Some(Preset {
						field,
						column: assoc.foreign_key.clone(),
						value,
					})
				}
				None => None,
			};

			let mut objects = Vec::with_capacity(assoc.num as usize);
			for _ in 0..assoc.num {
				objects.push(assoc.factory.build_related(
					insert,
					preset.clone(),
					queue,
					assoc.fix,
				)?);
			}

			assign_related(owner, &bound.field, objects)?;
		}

		Ok(())
	}

	/// Resolves many-to-many edges: builds the related objects, wires the
	/// bidirectional fields, and synthesizes one join-table job per pair.
	pub(crate) fn build_many_to_many<T: Record>(
		&self,
		owner: &mut T,
		insert: bool,
		queue: &mut InsertJobQueue,
	) -> Result<(), FactoryError> {
		for bound in &self.many_to_many {
			let assoc = &bound.assoc;
			trace!(field = %bound.field, kind = ?bound.kind, "resolving association");
			if assoc.num == 0 {
				return Err(FactoryError::InvalidCount);
			}

			let incomplete = |missing: &'static str| FactoryError::IncompleteAssociationConfig {
				field: bound.field.clone(),
				missing,
			};
			let refer_field = assoc.refer_field.as_deref().ok_or_else(|| incomplete("refer_field"))?;
			let foreign_field = assoc
				.foreign_field
				.as_deref()
				.ok_or_else(|| incomplete("foreign_field"))?;
			let join_table = assoc.join_table.as_deref().ok_or_else(|| incomplete("join_table"))?;

			let owner_ref = owner.field(refer_field)?;

			let mut objects = Vec::with_capacity(assoc.num as usize);
			for _ in 0..assoc.num {
				let mut related = assoc.factory.build_related(insert, None, queue, assoc.fix)?;
				let related_ref = assoc.factory.read_field(related.as_ref(), foreign_field)?;

				// Back-reference sees the owner as built so far; its own
				// many-to-many collection is still being filled.
				if let Some(back_field) = assoc.associated_field.as_deref() {
					assoc
						.factory
						.push_related_on(related.as_mut(), back_field, Box::new(owner.clone()))?;
				}

				if insert {
					let refer_column = assoc
						.refer_column
						.as_deref()
						.ok_or_else(|| incomplete("refer_column"))?;
					let foreign_key = assoc
						.foreign_key
						.as_deref()
						.ok_or_else(|| incomplete("foreign_key"))?;

					let mut columns = IndexMap::new();
					for attribute in &assoc.join_attributes {
						let value = attribute.generate(&*owner)?;
						if let Some(column) = attribute.column() {
							columns.insert(column.to_string(), value);
						}
					}
					columns.insert(refer_column.to_string(), owner_ref.clone());
					columns.insert(foreign_key.to_string(), related_ref.clone());

					queue.enqueue(
						crate::insert::InsertJob::new(join_table, columns).with_fixed(assoc.fix),
					);
				}

				objects.push(related);
			}

			assign_related(owner, &bound.field, objects)?;
		}

		Ok(())
	}
}

/// Scalar vs. collection assignment, chosen by the number of built objects.
fn assign_related<T: Record>(
	owner: &mut T,
	field: &str,
	mut objects: Vec<Box<dyn Any>>,
) -> Result<(), FactoryError> {
	if objects.len() == 1 {
		if let Some(object) = objects.pop() {
			return owner.set_related(field, object);
		}
	}
	for object in objects {
		owner.push_related(field, object)?;
	}
	Ok(())
}
