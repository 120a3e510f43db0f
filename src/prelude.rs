//! Convenient glob import for the common factory surface.
//!
//! ```
//! use seedling::prelude::*;
//! ```

pub use crate::association::{Association, AssociationKind};
pub use crate::attr;
pub use crate::attr::Attribute;
pub use crate::config::{self, ColumnNaming};
pub use crate::error::{FactoryError, FactoryResult};
pub use crate::factory::Factory;
pub use crate::insert::{InsertJob, SqlDialect};
pub use crate::record::Record;
#[cfg(feature = "sqlite")]
pub use crate::sink::SqliteSink;
pub use crate::sink::StorageSink;
pub use crate::value::{AttrKind, FromValue, Value};

#[cfg(feature = "derive")]
pub use seedling_macros::Record;
