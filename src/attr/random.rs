//! Random attribute constructors.
//!
//! Numeric ranges are inclusive on both ends. The name, username, and email
//! helpers delegate to the `fake` crate's English locale fakers.

use chrono::{DateTime, Utc};
use fake::Fake;
use fake::faker::internet::en::{FreeEmail, Username};
use fake::faker::name::en::{FirstName, LastName, Name};
use rand::Rng;
use rand::distributions::Alphanumeric;
use uuid::Uuid;

use super::Attribute;
use crate::error::FactoryError;
use crate::value::{AttrKind, Value};

/// A random integer in `min..=max`.
pub fn rand_int(name: impl Into<String>, min: i64, max: i64) -> Attribute {
	let (low, high) = ordered(min, max);
	Attribute::new(name, AttrKind::Int, move || {
		Ok(Value::Int(rand::thread_rng().gen_range(low..=high)))
	})
}

/// A random unsigned integer in `min..=max`.
pub fn rand_uint(name: impl Into<String>, min: u64, max: u64) -> Attribute {
	let (low, high) = ordered(min, max);
	Attribute::new(name, AttrKind::Uint, move || {
		Ok(Value::Uint(rand::thread_rng().gen_range(low..=high)))
	})
}

/// A random float in `min..=max`.
pub fn rand_float(name: impl Into<String>, min: f64, max: f64) -> Attribute {
	let (low, high) = if min <= max { (min, max) } else { (max, min) };
	Attribute::new(name, AttrKind::Float, move || {
		Ok(Value::Float(rand::thread_rng().gen_range(low..=high)))
	})
}

/// A random boolean, true with probability `ratio` (clamped to `0.0..=1.0`).
pub fn rand_bool(name: impl Into<String>, ratio: f64) -> Attribute {
	let ratio = ratio.clamp(0.0, 1.0);
	Attribute::new(name, AttrKind::Bool, move || {
		Ok(Value::Bool(rand::thread_rng().gen_bool(ratio)))
	})
}

/// A random timestamp between `min` and `max` (second precision).
pub fn rand_time(name: impl Into<String>, min: DateTime<Utc>, max: DateTime<Utc>) -> Attribute {
	let (low, high) = ordered(min.timestamp(), max.timestamp());
	Attribute::new(name, AttrKind::Time, move || {
		let seconds = rand::thread_rng().gen_range(low..=high);
		let time = DateTime::<Utc>::from_timestamp(seconds, 0)
			.ok_or_else(|| FactoryError::generation("rand_time", "timestamp out of range"))?;
		Ok(Value::Time(time))
	})
}

/// A random pick from `set`.
pub fn rand_str_set<I, S>(name: impl Into<String>, set: I) -> Attribute
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let name = name.into();
	let label = name.clone();
	let set: Vec<String> = set.into_iter().map(Into::into).collect();
	Attribute::new(name, AttrKind::Str, move || {
		if set.is_empty() {
			return Err(FactoryError::generation(&label, "pick set is empty"));
		}
		let index = rand::thread_rng().gen_range(0..set.len());
		Ok(Value::Str(set[index].clone()))
	})
}

/// A random pick from `set`.
pub fn rand_int_set(name: impl Into<String>, set: impl Into<Vec<i64>>) -> Attribute {
	let name = name.into();
	let label = name.clone();
	let set = set.into();
	Attribute::new(name, AttrKind::Int, move || {
		if set.is_empty() {
			return Err(FactoryError::generation(&label, "pick set is empty"));
		}
		let index = rand::thread_rng().gen_range(0..set.len());
		Ok(Value::Int(set[index]))
	})
}

/// A random alphanumeric string of `len` characters.
pub fn rand_alpha(name: impl Into<String>, len: usize) -> Attribute {
	Attribute::new(name, AttrKind::Str, move || {
		let generated: String = rand::thread_rng()
			.sample_iter(&Alphanumeric)
			.take(len)
			.map(char::from)
			.collect();
		Ok(Value::Str(generated))
	})
}

/// A fresh v4 UUID per build, rendered as a string.
pub fn rand_uuid(name: impl Into<String>) -> Attribute {
	Attribute::new(name, AttrKind::Str, || {
		Ok(Value::Str(Uuid::new_v4().to_string()))
	})
}

/// A fake first name.
pub fn first_name(name: impl Into<String>) -> Attribute {
	Attribute::new(name, AttrKind::Str, || {
		Ok(Value::Str(FirstName().fake::<String>()))
	})
}

/// A fake last name.
pub fn last_name(name: impl Into<String>) -> Attribute {
	Attribute::new(name, AttrKind::Str, || {
		Ok(Value::Str(LastName().fake::<String>()))
	})
}

/// A fake full name.
pub fn full_name(name: impl Into<String>) -> Attribute {
	Attribute::new(name, AttrKind::Str, || Ok(Value::Str(Name().fake::<String>())))
}

/// A fake username.
pub fn username(name: impl Into<String>) -> Attribute {
	Attribute::new(name, AttrKind::Str, || {
		Ok(Value::Str(Username().fake::<String>()))
	})
}

/// A fake email address.
pub fn email(name: impl Into<String>) -> Attribute {
	Attribute::new(name, AttrKind::Str, || {
		Ok(Value::Str(FreeEmail().fake::<String>()))
	})
}

fn ordered<T: PartialOrd>(a: T, b: T) -> (T, T) {
	if a <= b { (a, b) } else { (b, a) }
}
