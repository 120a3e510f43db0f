//! Sequential attribute constructors.
//!
//! Sequence state advances exactly once per generation and is never reset
//! automatically; see the module docs on sharing across clones.

use chrono::{DateTime, Duration, Utc};

use super::Attribute;
use crate::error::FactoryError;
use crate::value::{AttrKind, Value};

/// A monotonic integer sequence starting at `start`, stepping by 1.
pub fn seq(name: impl Into<String>, start: i64) -> Attribute {
	seq_step(name, start, 1)
}

/// A monotonic integer sequence starting at `start`, stepping by `step`.
pub fn seq_step(name: impl Into<String>, start: i64, step: i64) -> Attribute {
	let mut next = start;
	Attribute::new(name, AttrKind::Int, move || {
		let current = next;
		next = next.wrapping_add(step);
		Ok(Value::Int(current))
	})
}

/// A monotonic unsigned sequence.
pub fn seq_uint(name: impl Into<String>, start: u64, step: u64) -> Attribute {
	let mut next = start;
	Attribute::new(name, AttrKind::Uint, move || {
		let current = next;
		next = next.wrapping_add(step);
		Ok(Value::Uint(current))
	})
}

/// A float sequence starting at `start`, stepping by `step`.
pub fn seq_float(name: impl Into<String>, start: f64, step: f64) -> Attribute {
	let mut next = start;
	Attribute::new(name, AttrKind::Float, move || {
		let current = next;
		next += step;
		Ok(Value::Float(current))
	})
}

/// A timestamp sequence starting at `start`, advancing by `step` per build.
pub fn seq_time(name: impl Into<String>, start: DateTime<Utc>, step: Duration) -> Attribute {
	let mut next = start;
	Attribute::new(name, AttrKind::Time, move || {
		let current = next;
		next = next + step;
		Ok(Value::Time(current))
	})
}

/// Cycles through `set` in order, wrapping back to the first entry.
pub fn int_cycle(name: impl Into<String>, set: impl Into<Vec<i64>>) -> Attribute {
	let name = name.into();
	let label = name.clone();
	let set = set.into();
	let mut index = 0usize;
	Attribute::new(name, AttrKind::Int, move || {
		if set.is_empty() {
			return Err(FactoryError::generation(&label, "cycle set is empty"));
		}
		let current = set[index];
		index = (index + 1) % set.len();
		Ok(Value::Int(current))
	})
}

/// Cycles through `set` in order, wrapping back to the first entry.
pub fn str_cycle<I, S>(name: impl Into<String>, set: I) -> Attribute
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let name = name.into();
	let label = name.clone();
	let set: Vec<String> = set.into_iter().map(Into::into).collect();
	let mut index = 0usize;
	Attribute::new(name, AttrKind::Str, move || {
		if set.is_empty() {
			return Err(FactoryError::generation(&label, "cycle set is empty"));
		}
		let current = set[index].clone();
		index = (index + 1) % set.len();
		Ok(Value::Str(current))
	})
}
