//! Value converters bound to schema attributes.
//!
//! A [`Type`] owns both directions of a conversion between the document
//! representation and the canonical deserialized form, plus the validator
//! hook. Scalars reject `null` outright; opting into nullability is
//! explicit through [`Nullable`].

pub mod amount;
pub mod datetime;
pub mod enum_type;
pub mod list;
pub mod nullable;
pub mod scalar;

pub use amount::Amount;
pub use datetime::{IsoUtcDate, IsoUtcDateTime};
pub use enum_type::Enum;
pub use list::List;
pub use nullable::Nullable;
pub use scalar::{Boolean, Int, Str};

use crate::context::Context;
use crate::error::ValidationError;
use crate::schema::Schema;
use crate::validators::Validator;
use serde_json::Value;
use std::sync::Arc;

/// Result of one type conversion.
pub type TypeResult = Result<Value, ValidationError>;

/// A polymorphic value converter.
///
/// `deserialize` validates as well as converts; implementations run their
/// validators on the converted value and collect every failure, not just
/// the first. Types are immutable once constructed and shareable across
/// threads.
pub trait Type: Send + Sync {
	fn serialize(&self, value: &Value, ctx: &Context) -> TypeResult;

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult;

	/// The schema backing this type, if any. `List` and `Nullable`
	/// delegate to their item type so embedded declarations can be
	/// checked through wrappers.
	fn as_schema(&self) -> Option<&Schema> {
		None
	}
}

impl<T: Type + ?Sized> Type for Arc<T> {
	fn serialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		(**self).serialize(value, ctx)
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		(**self).deserialize(value, ctx)
	}

	fn as_schema(&self) -> Option<&Schema> {
		(**self).as_schema()
	}
}

/// Pass-through type: serializes and deserializes the value unchanged,
/// running any attached validators on deserialization.
///
/// # Examples
///
/// ```
/// use hal_schema::{Any, Context, Type};
/// use serde_json::json;
///
/// let any = Any::new();
/// assert_eq!(any.deserialize(&json!({"free": "form"}), &Context::new()).unwrap(), json!({"free": "form"}));
/// ```
#[derive(Clone, Default)]
pub struct Any {
	validators: Vec<Arc<dyn Validator>>,
}

impl Any {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}
}

impl Type for Any {
	fn serialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		Ok(value.clone())
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		run_validators(&self.validators, value, ctx)?;
		Ok(value.clone())
	}
}

/// Render a value for an error message: strings bare, everything else as
/// its JSON text.
pub(crate) fn raw(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// The rejection every scalar type gives `null` input.
pub(crate) fn reject_null() -> ValidationError {
	ValidationError::type_error("null is not allowed; wrap the type in Nullable")
}

/// Run every validator, collecting all failures into one error.
pub(crate) fn run_validators(
	validators: &[Arc<dyn Validator>],
	value: &Value,
	ctx: &Context,
) -> Result<(), ValidationError> {
	let mut errors = Vec::new();
	for validator in validators {
		if let Err(error) = validator.validate(value, ctx) {
			errors.push(error);
		}
	}
	match errors.len() {
		0 => Ok(()),
		1 => Err(errors.pop().expect("one error present")),
		_ => Err(ValidationError::aggregate(errors)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::validators::{Length, Range};
	use serde_json::json;

	#[test]
	fn test_any_passthrough() {
		let any = Any::new();
		let value = json!([1, "two", null]);

		assert_eq!(any.serialize(&value, &Context::new()).unwrap(), value);
		assert_eq!(any.deserialize(&value, &Context::new()).unwrap(), value);
	}

	#[test]
	fn test_any_runs_validators() {
		let any = Any::new().with_validator(Range::new().with_min(0.0));

		assert!(any.deserialize(&json!(1), &Context::new()).is_ok());
		assert!(any.deserialize(&json!(-1), &Context::new()).is_err());
	}

	#[test]
	fn test_all_validator_failures_collected() {
		// A value violating two validators yields one error with two leaves.
		let any = Any::new()
			.with_validator(Range::new().with_min(0.0))
			.with_validator(Length::new().with_min(1));

		let err = any.deserialize(&json!(-5), &Context::new()).unwrap_err();

		assert_eq!(err.leaf_count(), 2);
	}

	#[test]
	fn test_single_failure_not_wrapped() {
		let any = Any::new().with_validator(Range::new().with_min(0.0));

		let err = any.deserialize(&json!(-5), &Context::new()).unwrap_err();

		assert_eq!(err.leaf_count(), 1);
		assert!(err.to_string().contains("less than minimum"));
	}

	#[test]
	fn test_raw_rendering() {
		assert_eq!(raw(&json!("abc")), "abc");
		assert_eq!(raw(&json!(5)), "5");
		assert_eq!(raw(&json!([1, 2])), "[1,2]");
		assert_eq!(raw(&json!(null)), "null");
	}
}
