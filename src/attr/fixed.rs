//! Fixed-value attribute constructors.

use chrono::{DateTime, Utc};

use super::Attribute;
use crate::value::{AttrKind, Value};

/// An attribute that always yields `value`.
pub fn fix_int(name: impl Into<String>, value: i64) -> Attribute {
	Attribute::new(name, AttrKind::Int, move || Ok(Value::Int(value)))
}

/// An attribute that always yields `value`.
pub fn fix_uint(name: impl Into<String>, value: u64) -> Attribute {
	Attribute::new(name, AttrKind::Uint, move || Ok(Value::Uint(value)))
}

/// An attribute that always yields `value`.
pub fn fix_float(name: impl Into<String>, value: f64) -> Attribute {
	Attribute::new(name, AttrKind::Float, move || Ok(Value::Float(value)))
}

/// An attribute that always yields `value`.
pub fn fix_str(name: impl Into<String>, value: impl Into<String>) -> Attribute {
	let value = value.into();
	Attribute::new(name, AttrKind::Str, move || Ok(Value::Str(value.clone())))
}

/// An attribute that always yields `value`.
pub fn fix_bool(name: impl Into<String>, value: bool) -> Attribute {
	Attribute::new(name, AttrKind::Bool, move || Ok(Value::Bool(value)))
}

/// An attribute that always yields `value`.
pub fn fix_bytes(name: impl Into<String>, value: Vec<u8>) -> Attribute {
	Attribute::new(name, AttrKind::Bytes, move || Ok(Value::Bytes(value.clone())))
}

/// An attribute that always yields `value`.
pub fn fix_time(name: impl Into<String>, value: DateTime<Utc>) -> Attribute {
	Attribute::new(name, AttrKind::Time, move || Ok(Value::Time(value)))
}

/// An attribute that yields the current time on every build.
pub fn now(name: impl Into<String>) -> Attribute {
	Attribute::new(name, AttrKind::Time, || Ok(Value::Time(Utc::now())))
}

/// An attribute that always yields the given [`Value`], tagged by its kind.
pub fn value(name: impl Into<String>, value: Value) -> Attribute {
	let kind = value.kind();
	Attribute::new(name, kind, move || Ok(value.clone()))
}
