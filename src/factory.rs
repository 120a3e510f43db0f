//! The factory: builds one fully-populated object graph per invocation,
//! optionally persisting it and all associated objects.
//!
//! Factories are logically immutable from the caller's perspective: every
//! configuring operation returns a modified clone, so a base factory serves
//! as a template for many derived factories without interference. Building
//! also works on a clone, which keeps the insertion queue transient per
//! build and makes read-only reuse of one factory safe from many callers.
//!
//! The build sequence is the ordering contract:
//!
//! 1. stamp a fresh instance from the template
//! 2. apply attributes (respecting `omit`/`only`)
//! 3. resolve belongs-to edges: related rows queue **before** the owner's,
//!    contributing its foreign-key columns
//! 4. queue the owner's own insert job
//! 5. resolve has-one/has-many edges: related rows queue after the owner's,
//!    carrying its reference value
//! 6. resolve many-to-many edges, synthesizing join-table rows
//!
//! Draining the queue in FIFO order then satisfies foreign-key constraints
//! for acyclic relationship graphs.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::association::{AssociatedFactory, Association, AssociationKind, Associations, Preset};
use crate::attr::Attribute;
use crate::config::{self, ColumnNaming, Options};
use crate::error::FactoryError;
use crate::insert::{InsertJob, SqlDialect, WriteFn};
use crate::queue::InsertJobQueue;
use crate::record::Record;
use crate::sink::StorageSink;
use crate::value::Value;

/// A test-data factory for record type `T`.
#[derive(Clone)]
pub struct Factory<T: Record> {
	template: T,
	table: Option<String>,
	attributes: Vec<Attribute>,
	omitted: HashSet<String>,
	allowed: Option<HashSet<String>>,
	associations: Associations,
	write_fn: Option<Arc<WriteFn>>,
	sink: Option<Arc<dyn StorageSink>>,
	dialect: Option<SqlDialect>,
	queue: InsertJobQueue,
}

impl<T: Record> Factory<T> {
	/// Creates a factory from a template value and its attributes.
	///
	/// Each build stamps a fresh clone of the template, so prototype field
	/// values carry over. Duplicate attribute names keep the later entry, in
	/// the earlier entry's position.
	pub fn new(template: T, attributes: impl IntoIterator<Item = Attribute>) -> Self {
		let mut factory = Self {
			template,
			table: None,
			attributes: Vec::new(),
			omitted: HashSet::new(),
			allowed: None,
			associations: Associations::default(),
			write_fn: None,
			sink: None,
			dialect: None,
			queue: InsertJobQueue::new(),
		};
		for attribute in attributes {
			factory.upsert_attribute(attribute);
		}
		factory
	}

	/// Returns a clone targeting the given storage table.
	///
	/// Without this, the record's `#[record(table = "…")]` declaration is
	/// used.
	pub fn table(&self, name: impl Into<String>) -> Self {
		let mut factory = self.clone();
		factory.table = Some(name.into());
		factory
	}

	/// Returns a clone with the given attributes replacing same-named ones
	/// (position preserved) or appended.
	pub fn attrs(&self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
		let mut factory = self.clone();
		for attribute in attributes {
			factory.upsert_attribute(attribute);
		}
		factory
	}

	/// Returns a clone that skips the named attributes (deny-list).
	pub fn omit<I, S>(&self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut factory = self.clone();
		factory.omitted.extend(fields.into_iter().map(Into::into));
		factory
	}

	/// Returns a clone applying only the named attributes (allow-list).
	///
	/// Repeated calls extend the allow-list. The allow-list is evaluated
	/// first; a field also named in `omit` is still skipped.
	pub fn only<I, S>(&self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut factory = self.clone();
		factory
			.allowed
			.get_or_insert_with(HashSet::new)
			.extend(fields.into_iter().map(Into::into));
		factory
	}

	/// Returns a clone with a belongs-to edge registered on `field`.
	///
	/// The related object builds (and inserts) before this factory's own
	/// row, since that row carries the foreign key.
	pub fn belongs_to(&self, field: impl Into<String>, association: Association) -> Self {
		self.register(AssociationKind::BelongsTo, field.into(), association, 1)
	}

	/// Returns a clone with a has-one edge registered on `field`.
	pub fn has_one(&self, field: impl Into<String>, association: Association) -> Self {
		self.register(AssociationKind::HasOne, field.into(), association, 1)
	}

	/// Returns a clone with a has-many edge of cardinality `num` registered
	/// on `field`.
	pub fn has_many(&self, field: impl Into<String>, association: Association, num: u32) -> Self {
		self.register(AssociationKind::HasMany, field.into(), association, num)
	}

	/// Returns a clone with a many-to-many edge of cardinality `num`
	/// registered on `field`.
	pub fn many_to_many(
		&self,
		field: impl Into<String>,
		association: Association,
		num: u32,
	) -> Self {
		self.register(AssociationKind::ManyToMany, field.into(), association, num)
	}

	/// Returns a clone with a custom write function replacing the default
	/// SQL path for this factory's own jobs.
	pub fn write_fn(
		&self,
		write_fn: impl Fn(&InsertJob) -> Result<(), FactoryError> + Send + Sync + 'static,
	) -> Self {
		let mut factory = self.clone();
		factory.write_fn = Some(Arc::new(write_fn));
		factory
	}

	/// Returns a clone bound to its own storage sink and driver dialect,
	/// overriding the global configuration.
	pub fn database(&self, sink: Arc<dyn StorageSink>, driver: &str) -> Self {
		let mut factory = self.clone();
		factory.sink = Some(sink);
		factory.dialect = Some(SqlDialect::from_driver(driver));
		factory
	}

	/// Snapshots this factory as the related side of a new association edge.
	pub fn to_association(&self) -> Association {
		Association::new(Arc::new(self.clone()))
	}

	/// Builds one object without touching storage.
	pub fn build(&self) -> Result<T, FactoryError> {
		let mut worker = self.clone();
		worker.queue.clear();
		worker.produce(false, None)
	}

	/// Builds one object and drains the accumulated insert jobs against the
	/// storage sink in FIFO order.
	///
	/// The first failed job aborts the drain; jobs already executed stay
	/// committed (transactions are a sink concern).
	pub fn insert(&self) -> Result<T, FactoryError> {
		let options = config::snapshot();
		if self.sink.is_none()
			&& options.sink.is_none()
			&& self.write_fn.is_none()
			&& options.write_fn.is_none()
		{
			return Err(FactoryError::MissingDatabase);
		}

		let mut worker = self.clone();
		worker.queue.clear();
		let object = match worker.produce(true, None) {
			Ok(object) => object,
			Err(err) => {
				// Clear-on-error: discard this attempt's queued jobs.
				worker.queue.clear();
				return Err(err);
			}
		};
		worker.drain(&options)?;
		Ok(object)
	}

	/// Builds `n` objects, each against an independent clone of this
	/// factory.
	///
	/// Sequence-based attributes share their state across clones, so the
	/// values keep advancing with no gaps or repeats.
	pub fn build_n(&self, n: usize) -> Result<Vec<T>, FactoryError> {
		if n == 0 {
			return Err(FactoryError::InvalidCount);
		}
		let mut objects = Vec::with_capacity(n);
		for _ in 0..n {
			objects.push(self.build()?);
		}
		Ok(objects)
	}

	/// Inserts `n` objects, each against an independent clone of this
	/// factory.
	pub fn insert_n(&self, n: usize) -> Result<Vec<T>, FactoryError> {
		if n == 0 {
			return Err(FactoryError::InvalidCount);
		}
		let mut objects = Vec::with_capacity(n);
		for _ in 0..n {
			objects.push(self.insert()?);
		}
		Ok(objects)
	}

	/// [`build`](Self::build), panicking on error. Test-setup sugar.
	pub fn must_build(&self) -> T {
		match self.build() {
			Ok(object) => object,
			Err(err) => panic!("must_build failed: {err}"),
		}
	}

	/// [`insert`](Self::insert), panicking on error. Test-setup sugar.
	pub fn must_insert(&self) -> T {
		match self.insert() {
			Ok(object) => object,
			Err(err) => panic!("must_insert failed: {err}"),
		}
	}

	/// [`build_n`](Self::build_n), panicking on error. Test-setup sugar.
	pub fn must_build_n(&self, n: usize) -> Vec<T> {
		match self.build_n(n) {
			Ok(objects) => objects,
			Err(err) => panic!("must_build_n failed: {err}"),
		}
	}

	/// [`insert_n`](Self::insert_n), panicking on error. Test-setup sugar.
	pub fn must_insert_n(&self, n: usize) -> Vec<T> {
		match self.insert_n(n) {
			Ok(objects) => objects,
			Err(err) => panic!("must_insert_n failed: {err}"),
		}
	}

	fn register(
		&self,
		kind: AssociationKind,
		field: String,
		mut association: Association,
		num: u32,
	) -> Self {
		let mut factory = self.clone();
		association.num = num;
		factory.associations.add(kind, field, association);
		factory
	}

	fn upsert_attribute(&mut self, attribute: Attribute) {
		if let Some(existing) = self
			.attributes
			.iter_mut()
			.find(|existing| existing.name() == attribute.name())
		{
			*existing = attribute;
		} else {
			self.attributes.push(attribute);
		}
	}

	fn applies(&self, name: &str) -> bool {
		self.allowed
			.as_ref()
			.map_or(true, |allowed| allowed.contains(name))
			&& !self.omitted.contains(name)
	}

	fn effective_table(&self) -> Option<String> {
		self.table
			.clone()
			.or_else(|| T::table().map(str::to_string))
	}

	fn column_for(attribute: &Attribute, naming: ColumnNaming) -> Option<String> {
		if let Some(column) = attribute.column() {
			return Some(column.to_string());
		}
		if let Some(column) = T::column_of(attribute.name()) {
			return Some(column.to_string());
		}
		match naming {
			ColumnNaming::FieldName => Some(attribute.name().to_string()),
			ColumnNaming::Declared => None,
		}
	}

	/// The single-object build algorithm. Enqueues into this factory's own
	/// queue; callers run it on a clone.
	fn produce(&mut self, insert: bool, preset: Option<Preset>) -> Result<T, FactoryError> {
		debug!(record = std::any::type_name::<T>(), insert, "building object");
		let options = config::snapshot();

		let mut object = self.template.clone();
		let mut columns: IndexMap<String, Value> = IndexMap::new();

		for attribute in &self.attributes {
			if !self.applies(attribute.name()) {
				continue;
			}
			let value = attribute.generate(&object)?;
			object.set_field(attribute.name(), value.clone())?;
			if let Some(column) = Self::column_for(attribute, options.column_naming) {
				columns.insert(column, value);
			}
		}

		if let Some(preset) = &preset {
			object.set_field(&preset.field, preset.value.clone())?;
			if insert {
				if let Some(column) = &preset.column {
					columns.insert(column.clone(), preset.value.clone());
				}
			}
		}

		let foreign_keys = self
			.associations
			.build_belongs_to(&mut object, insert, &mut self.queue)?;
		columns.extend(foreign_keys);

		if insert {
			let table = self.effective_table().unwrap_or_default();
			let write_fn = self.write_fn.clone().or_else(|| options.write_fn.clone());
			let job = InsertJob::new(table, columns)
				.with_data(Arc::new(object.clone()))
				.with_write_fn(write_fn);
			self.queue.enqueue(job);
		}

		self.associations
			.build_has_one_or_many(&mut object, insert, &mut self.queue)?;
		self.associations
			.build_many_to_many(&mut object, insert, &mut self.queue)?;

		Ok(object)
	}

	fn drain(&mut self, options: &Options) -> Result<(), FactoryError> {
		let sink = self.sink.clone().or_else(|| options.sink.clone());
		let dialect = self.dialect.unwrap_or(options.dialect);
		while let Some(job) = self.queue.dequeue() {
			job.execute(sink.as_ref(), dialect)?;
		}
		Ok(())
	}
}

impl<T: Record> AssociatedFactory for Factory<T> {
	fn build_related(
		&self,
		insert: bool,
		preset: Option<Preset>,
		queue: &mut InsertJobQueue,
		fixed: bool,
	) -> Result<Box<dyn Any>, FactoryError> {
		let mut worker = self.clone();
		worker.queue.clear();
		let object = worker.produce(insert, preset)?;
		if fixed {
			worker.queue.mark_fixed();
		}
		// Transfer this build's jobs into the owner's queue, leaving none
		// behind to double-insert on factory reuse.
		worker.queue.drain_into(queue);
		Ok(Box::new(object))
	}

	fn read_field(&self, object: &dyn Any, field: &str) -> Result<Value, FactoryError> {
		let object = object
			.downcast_ref::<T>()
			.ok_or_else(|| FactoryError::related_mismatch::<T>(field))?;
		object.field(field)
	}

	fn push_related_on(
		&self,
		object: &mut dyn Any,
		field: &str,
		related: Box<dyn Any>,
	) -> Result<(), FactoryError> {
		let object = object
			.downcast_mut::<T>()
			.ok_or_else(|| FactoryError::related_mismatch::<T>(field))?;
		object.push_related(field, related)
	}
}

#[cfg(test)]
mod tests {
	use parking_lot::Mutex;
	use rstest::rstest;

	use super::*;
	use crate::attr;
	use crate::sink::SinkError;
	use crate::value::FromValue;

	#[derive(Clone, Debug, Default, PartialEq)]
	struct Customer {
		id: i64,
	}

	impl Record for Customer {
		fn table() -> Option<&'static str> {
			Some("customers")
		}

		fn columns() -> &'static [(&'static str, &'static str)] {
			&[("id", "id")]
		}

		fn field(&self, name: &str) -> Result<Value, FactoryError> {
			match name {
				"id" => Ok(Value::from(self.id)),
				_ => Err(FactoryError::field_not_found::<Self>(name)),
			}
		}

		fn set_field(&mut self, name: &str, value: Value) -> Result<(), FactoryError> {
			match name {
				"id" => {
					self.id = FromValue::from_value(value).map_err(|err| err.for_field(name))?;
					Ok(())
				}
				_ => Err(FactoryError::field_not_found::<Self>(name)),
			}
		}
	}

	#[derive(Clone, Debug, Default)]
	struct Ticket {
		id: i64,
		label: String,
		owner_id: i64,
		owner: Option<Customer>,
	}

	impl Record for Ticket {
		fn table() -> Option<&'static str> {
			Some("tickets")
		}

		fn columns() -> &'static [(&'static str, &'static str)] {
			&[("id", "id"), ("label", "label"), ("owner_id", "owner_id")]
		}

		fn field(&self, name: &str) -> Result<Value, FactoryError> {
			match name {
				"id" => Ok(Value::from(self.id)),
				"label" => Ok(Value::from(self.label.clone())),
				"owner_id" => Ok(Value::from(self.owner_id)),
				_ => Err(FactoryError::field_not_found::<Self>(name)),
			}
		}

		fn set_field(&mut self, name: &str, value: Value) -> Result<(), FactoryError> {
			match name {
				"id" => self.id = FromValue::from_value(value).map_err(|err| err.for_field(name))?,
				"label" => {
					self.label = FromValue::from_value(value).map_err(|err| err.for_field(name))?;
				}
				"owner_id" => {
					self.owner_id =
						FromValue::from_value(value).map_err(|err| err.for_field(name))?;
				}
				"owner" => return Err(FactoryError::unsettable(name, "relation field")),
				_ => return Err(FactoryError::field_not_found::<Self>(name)),
			}
			Ok(())
		}

		fn set_related(
			&mut self,
			name: &str,
			related: Box<dyn std::any::Any>,
		) -> Result<(), FactoryError> {
			match name {
				"owner" => {
					let owner = related
						.downcast::<Customer>()
						.map_err(|_| FactoryError::related_mismatch::<Customer>(name))?;
					self.owner = Some(*owner);
					Ok(())
				}
				_ => Err(FactoryError::field_not_found::<Self>(name)),
			}
		}
	}

	#[derive(Default)]
	struct RecordingSink {
		writes: Mutex<Vec<(String, Vec<Value>)>>,
	}

	impl RecordingSink {
		fn tables(&self) -> Vec<String> {
			self.writes
				.lock()
				.iter()
				.map(|(statement, _)| {
					statement
						.split_whitespace()
						.nth(2)
						.unwrap_or_default()
						.to_string()
				})
				.collect()
		}
	}

	impl StorageSink for RecordingSink {
		fn execute(&self, statement: &str, params: &[Value]) -> Result<u64, SinkError> {
			self.writes
				.lock()
				.push((statement.to_string(), params.to_vec()));
			Ok(1)
		}
	}

	fn customer_factory() -> Factory<Customer> {
		Factory::new(Customer::default(), [attr::seq("id", 1).with_column("id")])
	}

	fn ticket_factory() -> Factory<Ticket> {
		Factory::new(
			Ticket::default(),
			[
				attr::seq("id", 1).with_column("id"),
				attr::fix_str("label", "triage").with_column("label"),
			],
		)
	}

	#[rstest]
	fn omit_clone_leaves_the_base_factory_intact() {
		let base = ticket_factory();
		let trimmed = base.omit(["label"]);

		let bare = trimmed.build().unwrap();
		assert!(bare.label.is_empty());

		let full = base.build().unwrap();
		assert_eq!(full.label, "triage");
	}

	#[rstest]
	fn only_then_omit_skips_the_field_named_by_both() {
		let factory = ticket_factory().only(["id", "label"]).omit(["label"]);
		let ticket = factory.build().unwrap();
		assert!(ticket.label.is_empty());
		assert_ne!(ticket.id, 0);
	}

	#[rstest]
	fn attrs_replaces_by_name_without_touching_the_base() {
		let base = ticket_factory();
		let relabeled = base.attrs([attr::fix_str("label", "urgent").with_column("label")]);

		assert_eq!(relabeled.build().unwrap().label, "urgent");
		assert_eq!(base.build().unwrap().label, "triage");
	}

	#[rstest]
	fn belongs_to_copies_the_reference_onto_the_owner() {
		let owner_assoc = customer_factory()
			.to_association()
			.refer_field("id")
			.foreign_field("owner_id")
			.foreign_key("owner_id");
		let factory = ticket_factory().belongs_to("owner", owner_assoc);

		let ticket = factory.build().unwrap();
		let owner = ticket.owner.expect("owner should be built");
		assert_ne!(owner.id, 0);
		assert_eq!(ticket.owner_id, owner.id);
	}

	#[rstest]
	fn insert_queues_belongs_to_rows_first() {
		let sink = Arc::new(RecordingSink::default());
		let owner_assoc = customer_factory()
			.to_association()
			.refer_field("id")
			.foreign_field("owner_id")
			.foreign_key("owner_id");
		let factory = ticket_factory()
			.belongs_to("owner", owner_assoc)
			.database(sink.clone(), "sqlite3");

		factory.insert().unwrap();
		assert_eq!(sink.tables(), vec!["customers", "tickets"]);
	}

	#[rstest]
	fn insert_without_any_sink_is_missing_database() {
		assert!(matches!(
			ticket_factory().insert().unwrap_err(),
			FactoryError::MissingDatabase
		));
	}

	#[rstest]
	fn unknown_attribute_field_fails_the_build() {
		let factory = ticket_factory().attrs([attr::fix_int("priority", 1)]);
		assert!(matches!(
			factory.build().unwrap_err(),
			FactoryError::FieldNotFound { .. }
		));
	}

	#[rstest]
	fn build_n_zero_is_invalid_count() {
		assert!(matches!(
			ticket_factory().build_n(0).unwrap_err(),
			FactoryError::InvalidCount
		));
	}

	#[rstest]
	fn failed_insert_leaves_the_base_factory_usable() {
		let sink = Arc::new(RecordingSink::default());
		let base = ticket_factory().database(sink.clone(), "sqlite3");
		let broken = base.attrs([attr::fix_int("priority", 1)]);

		assert!(broken.insert().is_err());
		assert!(sink.writes.lock().is_empty());

		base.insert().unwrap();
		assert_eq!(sink.tables(), vec!["tickets"]);
	}
}
