//! Procedural macros for seedling.
//!
//! This crate provides the `#[derive(Record)]` macro that generates the
//! name-based field accessors a factory needs to populate a model struct.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record_derive;

/// Derives a `Record` implementation for a struct with named fields.
///
/// The generated implementation maps field names to typed accessors at
/// compile time, as the load-bearing replacement for reflective field lookup.
///
/// # Attributes
///
/// ## Struct-level
///
/// - `#[record(table = "users")]`: declares the storage table.
///
/// ## Field-level
///
/// - `#[record(column = "id")]`: declares the field's storage column.
/// - `#[record(relation)]`: marks a relation field (`R`, `Option<R>`, or
///   `Vec<R>`) populated through associations rather than attributes.
/// - `#[record(skip)]`: excludes the field from name-based access.
///
/// # Example
///
/// ```ignore
/// use seedling::Record;
///
/// #[derive(Clone, Record)]
/// #[record(table = "users")]
/// pub struct User {
///     #[record(column = "id")]
///     pub id: i64,
///
///     pub username: String,
///
///     #[record(relation)]
///     pub home: Option<Home>,
///
///     #[record(relation)]
///     pub rented: Vec<Home>,
/// }
/// ```
///
/// Scalar fields are read as `Value`s and written back through the
/// `FromValue` coercions; relation fields reject scalar writes with
/// `FieldUnsettable` and are assigned via `set_related`/`push_related`
/// during association resolution.
///
/// The struct must be `Clone` (templates are stamped by cloning) and every
/// non-skipped scalar field type must convert to and from `Value`.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	record_derive::derive_record_impl(input)
		.unwrap_or_else(|err| err.to_compile_error())
		.into()
}
