use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{json_kind, GradeError};

/// A number read from model output.
///
/// Integers stay integers through arithmetic with other integers so that
/// diagnostics echo `83` rather than `83.0`; anything touching a float is
/// computed in `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
	Int(i64),
	Float(f64),
}

impl Measure {
	pub const ZERO: Measure = Measure::Int(0);

	pub fn as_f64(self) -> f64 {
		match self {
			Measure::Int(n) => n as f64,
			Measure::Float(x) => x,
		}
	}

	pub fn abs(self) -> Measure {
		match self {
			Measure::Int(n) => n.checked_abs().map(Measure::Int).unwrap_or(Measure::Float((n as f64).abs())),
			Measure::Float(x) => Measure::Float(x.abs()),
		}
	}

	/// `|self - reference|`
	pub fn abs_diff(self, reference: Measure) -> Measure {
		(self - reference).abs()
	}

	fn from_json(field: &'static str, value: &Value) -> Result<Self, GradeError> {
		let Value::Number(n) = value else {
			return Err(GradeError::InvalidField {
				field,
				reason: format!("must be a number, found {}", json_kind(value)),
			});
		};
		if let Some(i) = n.as_i64() {
			return Ok(Measure::Int(i));
		}
		n.as_f64().map(Measure::Float).ok_or_else(|| GradeError::InvalidField {
			field,
			reason: format!("is not representable as a number: {}", n),
		})
	}
}

fn int_or_float(checked: Option<i64>, fallback: f64) -> Measure {
	checked.map(Measure::Int).unwrap_or(Measure::Float(fallback))
}

impl Add for Measure {
	type Output = Measure;

	fn add(self, rhs: Measure) -> Measure {
		match (self, rhs) {
			(Measure::Int(a), Measure::Int(b)) => int_or_float(a.checked_add(b), a as f64 + b as f64),
			_ => Measure::Float(self.as_f64() + rhs.as_f64()),
		}
	}
}

impl Sub for Measure {
	type Output = Measure;

	fn sub(self, rhs: Measure) -> Measure {
		match (self, rhs) {
			(Measure::Int(a), Measure::Int(b)) => int_or_float(a.checked_sub(b), a as f64 - b as f64),
			_ => Measure::Float(self.as_f64() - rhs.as_f64()),
		}
	}
}

impl Mul for Measure {
	type Output = Measure;

	fn mul(self, rhs: Measure) -> Measure {
		match (self, rhs) {
			(Measure::Int(a), Measure::Int(b)) => int_or_float(a.checked_mul(b), a as f64 * b as f64),
			_ => Measure::Float(self.as_f64() * rhs.as_f64()),
		}
	}
}

impl From<i64> for Measure {
	fn from(n: i64) -> Self {
		Measure::Int(n)
	}
}

impl From<f64> for Measure {
	fn from(x: f64) -> Self {
		Measure::Float(x)
	}
}

impl fmt::Display for Measure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Measure::Int(n) => write!(f, "{}", n),
			Measure::Float(x) => write!(f, "{:?}", x),
		}
	}
}

impl Serialize for Measure {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Measure::Int(n) => serializer.serialize_i64(*n),
			Measure::Float(x) => serializer.serialize_f64(*x),
		}
	}
}

pub(crate) fn required(obj: &Map<String, Value>, field: &'static str) -> Result<Measure, GradeError> {
	let value = obj.get(field).ok_or(GradeError::MissingField { field })?;
	Measure::from_json(field, value)
}

/// Absent fields read as zero.
pub(crate) fn optional(obj: &Map<String, Value>, field: &'static str) -> Result<Measure, GradeError> {
	match obj.get(field) {
		Some(value) => Measure::from_json(field, value),
		None => Ok(Measure::ZERO),
	}
}

/// A field that is only echoed back in diagnostics, kept as the model wrote it.
pub(crate) fn echoed(obj: &Map<String, Value>, field: &'static str) -> Result<Value, GradeError> {
	obj.get(field).cloned().ok_or(GradeError::MissingField { field })
}

/// Like [`echoed`], but absent fields read as zero.
pub(crate) fn echoed_or_zero(obj: &Map<String, Value>, field: &'static str) -> Value {
	obj.get(field).cloned().unwrap_or_else(|| Value::from(0))
}

/// An `[x, y, ...]` point. Only `y` takes part in grading.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Point {
	pub measured: Vec<Value>,
	pub x: Value,
	pub y: Measure,
}

pub(crate) fn point(obj: &Map<String, Value>, field: &'static str) -> Result<Point, GradeError> {
	let value = obj.get(field).ok_or(GradeError::MissingField { field })?;
	match value {
		Value::Array(items) if items.len() >= 2 => Ok(Point {
			measured: items.clone(),
			x: items[0].clone(),
			y: Measure::from_json(field, &items[1])?,
		}),
		Value::Array(items) => Err(GradeError::InvalidField {
			field,
			reason: format!("must hold at least 2 coordinates, found {}", items.len()),
		}),
		other => Err(GradeError::InvalidField {
			field,
			reason: format!("must be an [x, y] array, found {}", json_kind(other)),
		}),
	}
}
