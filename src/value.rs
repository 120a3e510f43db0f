//! The closed value representation carried from generators into fields and
//! storage columns.
//!
//! Attributes produce a [`Value`]; record setters pull it back out through
//! [`FromValue`], which performs the kind-guided coercions (checked numeric
//! narrowing, `Option` nullability, RFC 3339 string parsing for time fields).

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::FactoryError;

/// Closed tag describing what an attribute generates.
///
/// Guides how a generated value is coerced into the target field's
/// representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
	/// Signed integer family.
	Int,
	/// Unsigned integer family.
	Uint,
	/// Floating point family.
	Float,
	/// Strings.
	Str,
	/// Raw byte blobs.
	Bytes,
	/// Booleans.
	Bool,
	/// Timestamps.
	Time,
	/// Anything else; assigned without kind-specific coercion.
	Unknown,
}

/// A generated field or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Absent value; maps to SQL `NULL` and `Option::None` fields.
	Null,
	/// Signed integer.
	Int(i64),
	/// Unsigned integer.
	Uint(u64),
	/// Floating point number.
	Float(f64),
	/// String.
	Str(String),
	/// Byte blob.
	Bytes(Vec<u8>),
	/// Boolean.
	Bool(bool),
	/// UTC timestamp.
	Time(DateTime<Utc>),
}

impl Value {
	/// The kind tag of this value.
	pub fn kind(&self) -> AttrKind {
		match self {
			Self::Null => AttrKind::Unknown,
			Self::Int(_) => AttrKind::Int,
			Self::Uint(_) => AttrKind::Uint,
			Self::Float(_) => AttrKind::Float,
			Self::Str(_) => AttrKind::Str,
			Self::Bytes(_) => AttrKind::Bytes,
			Self::Bool(_) => AttrKind::Bool,
			Self::Time(_) => AttrKind::Time,
		}
	}

	/// Whether this value is `Null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => write!(f, "null"),
			Self::Int(v) => write!(f, "{v}"),
			Self::Uint(v) => write!(f, "{v}"),
			Self::Float(v) => write!(f, "{v}"),
			Self::Str(v) => write!(f, "\"{v}\""),
			Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
			Self::Bool(v) => write!(f, "{v}"),
			Self::Time(v) => write!(f, "{}", v.to_rfc3339()),
		}
	}
}

macro_rules! value_from_int {
	($($ty:ty),*) => {
		$(impl From<$ty> for Value {
			fn from(v: $ty) -> Self {
				Self::Int(i64::from(v))
			}
		})*
	};
}

macro_rules! value_from_uint {
	($($ty:ty),*) => {
		$(impl From<$ty> for Value {
			fn from(v: $ty) -> Self {
				Self::Uint(u64::from(v))
			}
		})*
	};
}

value_from_int!(i8, i16, i32, i64);
value_from_uint!(u8, u16, u32, u64);

impl From<f32> for Value {
	fn from(v: f32) -> Self {
		Self::Float(f64::from(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Self::Float(v)
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Self::Bool(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::Str(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::Str(v.to_string())
	}
}

impl From<Vec<u8>> for Value {
	fn from(v: Vec<u8>) -> Self {
		Self::Bytes(v)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(v: DateTime<Utc>) -> Self {
		Self::Time(v)
	}
}

impl From<Uuid> for Value {
	fn from(v: Uuid) -> Self {
		Self::Str(v.to_string())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		match v {
			Some(inner) => inner.into(),
			None => Self::Null,
		}
	}
}

/// The value-scan contract: decodes a [`Value`] into a concrete field type.
///
/// This is the hand-off point between generated values and record fields.
/// Implementations perform checked numeric narrowing and the documented
/// bridges (string → time via RFC 3339, string → [`Uuid`]); anything else is
/// a [`FactoryError::TypeMismatch`].
pub trait FromValue: Sized {
	/// Decodes `value`, or fails with a `TypeMismatch` carrying no field
	/// name (the caller attaches it).
	fn from_value(value: Value) -> Result<Self, FactoryError>;
}

macro_rules! from_value_int {
	($($ty:ty),*) => {
		$(impl FromValue for $ty {
			fn from_value(value: Value) -> Result<Self, FactoryError> {
				match value {
					Value::Int(v) => <$ty>::try_from(v)
						.map_err(|_| FactoryError::type_mismatch(stringify!($ty), &Value::Int(v))),
					Value::Uint(v) => <$ty>::try_from(v)
						.map_err(|_| FactoryError::type_mismatch(stringify!($ty), &Value::Uint(v))),
					other => Err(FactoryError::type_mismatch(stringify!($ty), &other)),
				}
			}
		})*
	};
}

from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for f64 {
	fn from_value(value: Value) -> Result<Self, FactoryError> {
		match value {
			Value::Float(v) => Ok(v),
			Value::Int(v) => Ok(v as f64),
			Value::Uint(v) => Ok(v as f64),
			other => Err(FactoryError::type_mismatch("f64", &other)),
		}
	}
}

impl FromValue for f32 {
	fn from_value(value: Value) -> Result<Self, FactoryError> {
		f64::from_value(value).map(|v| v as f32)
	}
}

impl FromValue for bool {
	fn from_value(value: Value) -> Result<Self, FactoryError> {
		match value {
			Value::Bool(v) => Ok(v),
			other => Err(FactoryError::type_mismatch("bool", &other)),
		}
	}
}

impl FromValue for String {
	fn from_value(value: Value) -> Result<Self, FactoryError> {
		match value {
			Value::Str(v) => Ok(v),
			other => Err(FactoryError::type_mismatch("String", &other)),
		}
	}
}

impl FromValue for Vec<u8> {
	fn from_value(value: Value) -> Result<Self, FactoryError> {
		match value {
			Value::Bytes(v) => Ok(v),
			other => Err(FactoryError::type_mismatch("Vec<u8>", &other)),
		}
	}
}

impl FromValue for DateTime<Utc> {
	fn from_value(value: Value) -> Result<Self, FactoryError> {
		match value {
			Value::Time(v) => Ok(v),
			Value::Str(v) => DateTime::parse_from_rfc3339(&v)
				.map(|parsed| parsed.with_timezone(&Utc))
				.map_err(|_| FactoryError::type_mismatch("DateTime<Utc>", &Value::Str(v))),
			other => Err(FactoryError::type_mismatch("DateTime<Utc>", &other)),
		}
	}
}

impl FromValue for Uuid {
	fn from_value(value: Value) -> Result<Self, FactoryError> {
		match value {
			Value::Str(v) => Uuid::parse_str(&v)
				.map_err(|_| FactoryError::type_mismatch("Uuid", &Value::Str(v))),
			other => Err(FactoryError::type_mismatch("Uuid", &other)),
		}
	}
}

impl<T: FromValue> FromValue for Option<T> {
	fn from_value(value: Value) -> Result<Self, FactoryError> {
		match value {
			Value::Null => Ok(None),
			other => T::from_value(other).map(Some),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Value::Int(7), AttrKind::Int)]
	#[case(Value::Uint(7), AttrKind::Uint)]
	#[case(Value::Str("x".into()), AttrKind::Str)]
	#[case(Value::Null, AttrKind::Unknown)]
	fn kind_tags(#[case] value: Value, #[case] kind: AttrKind) {
		assert_eq!(value.kind(), kind);
	}

	#[rstest]
	fn narrowing_checks_range() {
		assert_eq!(i32::from_value(Value::Int(41)).unwrap(), 41);
		assert!(i8::from_value(Value::Int(1000)).is_err());
		assert!(u32::from_value(Value::Int(-1)).is_err());
		assert_eq!(u64::from_value(Value::Int(9)).unwrap(), 9);
	}

	#[rstest]
	fn floats_widen_from_integers() {
		assert_eq!(f64::from_value(Value::Int(2)).unwrap(), 2.0);
		assert_eq!(f32::from_value(Value::Float(1.5)).unwrap(), 1.5);
	}

	#[rstest]
	fn cross_kind_assignment_is_a_mismatch() {
		assert!(String::from_value(Value::Int(1)).is_err());
		assert!(bool::from_value(Value::Str("true".into())).is_err());
		assert!(i64::from_value(Value::Float(1.0)).is_err());
	}

	#[rstest]
	fn option_maps_null_to_none() {
		assert_eq!(Option::<i32>::from_value(Value::Null).unwrap(), None);
		assert_eq!(Option::<i32>::from_value(Value::Int(3)).unwrap(), Some(3));
	}

	#[rstest]
	fn time_parses_rfc3339_strings() {
		let parsed = DateTime::<Utc>::from_value(Value::Str("2024-01-02T03:04:05Z".into())).unwrap();
		assert_eq!(parsed.timestamp(), 1_704_164_645);
		assert!(DateTime::<Utc>::from_value(Value::Str("yesterday".into())).is_err());
	}

	#[rstest]
	fn uuid_parses_from_strings() {
		let id = Uuid::new_v4();
		assert_eq!(Uuid::from_value(Value::from(id)).unwrap(), id);
	}

	#[rstest]
	fn option_source_values_flatten() {
		assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
		assert_eq!(Value::from(Option::<i64>::None), Value::Null);
	}
}
