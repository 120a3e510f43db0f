//! Test-data factories for Rust: populated object graphs, relational
//! associations, and dependency-ordered inserts.
//!
//! A [`Factory`] stamps out instances of a model struct from a template,
//! fills their fields from named attribute generators, resolves
//! relationships to other factories, and, when asked to, persists the
//! whole graph through a pluggable storage sink with parent rows inserted
//! before the children that reference them.
//!
//! # Quick start
//!
//! ```
//! use seedling::prelude::*;
//!
//! #[derive(Clone, Record)]
//! #[record(table = "users")]
//! struct User {
//! 	#[record(column = "id")]
//! 	id: i64,
//! 	#[record(column = "username")]
//! 	username: String,
//! }
//!
//! let users = Factory::new(
//! 	User { id: 0, username: String::new() },
//! 	[attr::seq("id", 1), attr::username("username")],
//! );
//!
//! let user = users.must_build();
//! assert_eq!(user.id, 1);
//! assert!(!user.username.is_empty());
//!
//! // The base factory is a reusable template; clones derive from it.
//! let anonymous = users.omit(["username"]).must_build();
//! assert!(anonymous.username.is_empty());
//! assert_eq!(anonymous.id, 2);
//! ```
//!
//! # Associations
//!
//! Factories connect through four relationship kinds. Belongs-to edges
//! build and insert their related object *before* the owner, because the
//! owner's row carries the foreign key; has-one, has-many, and many-to-many
//! edges build *after*, carrying the owner's reference value down:
//!
//! ```ignore
//! let homes = Factory::new(Home::default(), [attr::seq("id", 1).with_column("id")]);
//!
//! let users = users
//! 	.has_many(
//! 		"rented",
//! 		homes.to_association()
//! 			.refer_field("id")
//! 			.foreign_field("host_id")
//! 			.foreign_key("host_id"),
//! 		3,
//! 	);
//!
//! // Drains: users row, then 3 homes rows carrying the user's id.
//! let user = users.insert()?;
//! ```
//!
//! # Persistence
//!
//! [`Factory::insert`] queues one [`InsertJob`] per object and drains the
//! queue in FIFO order against a [`StorageSink`], configured globally via
//! [`config::set_database`], or per factory via [`Factory::database`]. The
//! default write path renders a parameterized `INSERT` with
//! [dialect-specific placeholders](SqlDialect); a custom
//! [`Factory::write_fn`] receives the job (and the built object through
//! [`InsertJob::data_as`]) for ORM-style writes. No transactions and no
//! retries: the first failed job aborts the drain, and test-data generation
//! fails fast.
//!
//! # Feature flags
//!
//! - `derive` *(default)*: the `#[derive(Record)]` macro.
//! - `sqlite` *(default)*: [`SqliteSink`], a bundled synchronous SQLite
//!   sink.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod association;
pub mod attr;
pub mod config;
pub mod error;
pub mod factory;
pub mod insert;
pub mod prelude;
pub mod queue;
pub mod record;
pub mod sink;
pub mod value;

pub use association::{Association, AssociationKind};
pub use attr::Attribute;
pub use config::ColumnNaming;
pub use error::{FactoryError, FactoryResult};
pub use factory::Factory;
pub use insert::{InsertJob, SqlDialect, WriteFn};
pub use queue::InsertJobQueue;
pub use record::Record;
#[cfg(feature = "sqlite")]
pub use sink::SqliteSink;
pub use sink::{SinkError, StorageSink};
pub use value::{AttrKind, FromValue, Value};

// Derive macro; same name as the trait, in the macro namespace.
#[cfg(feature = "derive")]
pub use seedling_macros::Record;
