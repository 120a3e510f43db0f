//! Shared models, factories, and a recording sink for integration tests.

// Each test binary uses its own slice of this module.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use seedling::prelude::*;
use seedling::SinkError;

#[derive(Clone, Debug, Default, Record)]
#[record(table = "locations")]
pub struct Location {
	#[record(column = "id")]
	pub id: i64,
	#[record(column = "address")]
	pub address: String,
}

#[derive(Clone, Debug, Default, Record)]
#[record(table = "homes")]
pub struct Home {
	#[record(column = "id")]
	pub id: i64,
	#[record(column = "host_id")]
	pub host_id: i64,
	#[record(column = "location_id")]
	pub location_id: i64,
	#[record(relation)]
	pub location: Option<Location>,
}

#[derive(Clone, Debug, Default, Record)]
#[record(table = "users")]
pub struct User {
	#[record(column = "id")]
	pub id: i64,
	#[record(column = "username")]
	pub username: String,
	#[record(column = "age")]
	pub age: Option<i32>,
	#[record(column = "location_id")]
	pub location_id: i64,
	#[record(column = "created_at")]
	pub created_at: Option<DateTime<Utc>>,
	pub phone: String,
	pub host: bool,
	#[record(relation)]
	pub location: Option<Location>,
	#[record(relation)]
	pub home: Option<Home>,
	#[record(relation)]
	pub rented: Vec<Home>,
}

#[derive(Clone, Debug, Default, Record)]
#[record(table = "employees")]
pub struct Employee {
	#[record(column = "id")]
	pub id: i64,
	#[record(column = "name")]
	pub name: String,
	#[record(relation)]
	pub projects: Vec<Project>,
}

#[derive(Clone, Debug, Default, Record)]
#[record(table = "projects")]
pub struct Project {
	#[record(column = "id")]
	pub id: i64,
	#[record(column = "name")]
	pub name: String,
	#[record(relation)]
	pub employees: Vec<Employee>,
}

/// A model with no declared storage columns.
#[derive(Clone, Debug, Default, Record)]
pub struct Note {
	pub body: String,
}

pub fn location_factory() -> Factory<Location> {
	Factory::new(
		Location::default(),
		[attr::seq("id", 1), attr::rand_alpha("address", 12)],
	)
}

pub fn home_factory() -> Factory<Home> {
	Factory::new(Home::default(), [attr::seq("id", 1)])
}

pub fn user_factory() -> Factory<User> {
	Factory::new(
		User::default(),
		[
			attr::seq("id", 1),
			attr::username("username"),
			attr::rand_int("age", 18, 60),
		],
	)
}

pub fn employee_factory() -> Factory<Employee> {
	Factory::new(
		Employee::default(),
		[attr::seq("id", 1), attr::full_name("name")],
	)
}

pub fn project_factory() -> Factory<Project> {
	Factory::new(
		Project::default(),
		[attr::seq("id", 1), attr::rand_uuid("name")],
	)
}

/// One executed statement, as seen by the sink.
#[derive(Clone, Debug)]
pub struct Write {
	pub table: String,
	pub statement: String,
	pub params: Vec<Value>,
}

/// A sink that records every executed statement instead of touching a
/// database.
#[derive(Default)]
pub struct RecordingSink {
	writes: Mutex<Vec<Write>>,
}

impl RecordingSink {
	pub fn shared() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn writes(&self) -> Vec<Write> {
		self.writes.lock().clone()
	}

	pub fn tables(&self) -> Vec<String> {
		self.writes.lock().iter().map(|w| w.table.clone()).collect()
	}
}

impl StorageSink for RecordingSink {
	fn execute(&self, statement: &str, params: &[Value]) -> Result<u64, SinkError> {
		let table = statement
			.split_whitespace()
			.nth(2)
			.unwrap_or_default()
			.to_string();
		self.writes.lock().push(Write {
			table,
			statement: statement.to_string(),
			params: params.to_vec(),
		});
		Ok(1)
	}
}
