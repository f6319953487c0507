//! Scalar types: strings, integers, booleans.
//!
//! All three reject `null` on both serialize and deserialize; callers opt
//! into nullability with [`crate::Nullable`]. This keeps null-to-default
//! coercion bugs out of schemas that never meant to accept null.

use crate::context::Context;
use crate::error::ValidationError;
use crate::types::{Type, TypeResult, raw, reject_null, run_validators};
use crate::validators::Validator;
use serde_json::{Value, json};
use std::sync::Arc;

/// String type. Coerces scalar JSON values (numbers, booleans) to their
/// text form; arrays and objects are an error.
///
/// # Examples
///
/// ```
/// use hal_schema::{Context, Str, Type};
/// use serde_json::json;
///
/// let string = Str::new();
/// assert_eq!(string.deserialize(&json!("hello"), &Context::new()).unwrap(), json!("hello"));
/// assert_eq!(string.deserialize(&json!(42), &Context::new()).unwrap(), json!("42"));
/// assert!(string.deserialize(&json!(null), &Context::new()).is_err());
/// ```
#[derive(Clone, Default)]
pub struct Str {
	validators: Vec<Arc<dyn Validator>>,
}

impl Str {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}

	fn convert(&self, value: &Value) -> TypeResult {
		match value {
			Value::Null => Err(reject_null()),
			Value::String(s) => Ok(json!(s)),
			Value::Number(n) => Ok(json!(n.to_string())),
			Value::Bool(b) => Ok(json!(b.to_string())),
			other => Err(ValidationError::type_error(format!(
				"'{}' cannot be coerced to a string",
				raw(other)
			))),
		}
	}
}

impl Type for Str {
	fn serialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		self.convert(value)
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		let converted = self.convert(value)?;
		run_validators(&self.validators, &converted, ctx)?;
		Ok(converted)
	}
}

/// Integer type. Accepts integral JSON numbers and integer-parseable
/// strings.
#[derive(Clone, Default)]
pub struct Int {
	validators: Vec<Arc<dyn Validator>>,
}

impl Int {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}

	fn convert(&self, value: &Value) -> TypeResult {
		let not_an_integer = || ValidationError::value_error(format!("'{}' is not an integer", raw(value)));
		match value {
			Value::Null => Err(reject_null()),
			Value::Number(n) => n.as_i64().map(|i| json!(i)).ok_or_else(not_an_integer),
			Value::String(s) => s
				.trim()
				.parse::<i64>()
				.map(|i| json!(i))
				.map_err(|_| not_an_integer()),
			_ => Err(not_an_integer()),
		}
	}
}

impl Type for Int {
	fn serialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		self.convert(value)
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		let converted = self.convert(value)?;
		run_validators(&self.validators, &converted, ctx)?;
		Ok(converted)
	}
}

/// Boolean type. Accepts booleans, the numbers 0 and 1, and the strings
/// "true", "false", "1" and "0" (case-insensitive).
#[derive(Clone, Default)]
pub struct Boolean;

impl Boolean {
	pub fn new() -> Self {
		Self
	}

	fn convert(&self, value: &Value) -> TypeResult {
		let invalid = || {
			ValidationError::value_error(format!(
				"'{}' is not one of 1, 0, true or false",
				raw(value)
			))
		};
		match value {
			Value::Null => Err(reject_null()),
			Value::Bool(b) => Ok(json!(b)),
			Value::Number(n) => match n.as_i64() {
				Some(0) => Ok(json!(false)),
				Some(1) => Ok(json!(true)),
				_ => Err(invalid()),
			},
			Value::String(s) => match s.to_lowercase().as_str() {
				"true" | "1" => Ok(json!(true)),
				"false" | "0" => Ok(json!(false)),
				_ => Err(invalid()),
			},
			_ => Err(invalid()),
		}
	}
}

impl Type for Boolean {
	fn serialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		self.convert(value)
	}

	fn deserialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		self.convert(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::validators::{Length, Range};
	use rstest::rstest;

	#[rstest]
	#[case(json!("text"), json!("text"))]
	#[case(json!(5), json!("5"))]
	#[case(json!(2.5), json!("2.5"))]
	#[case(json!(true), json!("true"))]
	fn test_str_coercion(#[case] input: Value, #[case] expected: Value) {
		let string = Str::new();

		assert_eq!(string.deserialize(&input, &Context::new()).unwrap(), expected);
		assert_eq!(string.serialize(&input, &Context::new()).unwrap(), expected);
	}

	#[rstest]
	#[case(json!([1]))]
	#[case(json!({"a": 1}))]
	fn test_str_rejects_composites(#[case] input: Value) {
		let string = Str::new();

		assert!(string.deserialize(&input, &Context::new()).is_err());
	}

	#[test]
	fn test_str_null_rejected_both_directions() {
		let string = Str::new();

		let ser = string.serialize(&json!(null), &Context::new()).unwrap_err();
		let de = string.deserialize(&json!(null), &Context::new()).unwrap_err();

		assert!(ser.to_string().contains("Nullable"));
		assert!(de.to_string().contains("Nullable"));
	}

	#[test]
	fn test_str_validators() {
		let string = Str::new().with_validator(Length::new().with_max(3));

		assert!(string.deserialize(&json!("abc"), &Context::new()).is_ok());
		assert!(string.deserialize(&json!("abcd"), &Context::new()).is_err());
	}

	#[rstest]
	#[case(json!(5), json!(5))]
	#[case(json!(-12), json!(-12))]
	#[case(json!("42"), json!(42))]
	#[case(json!(" 7 "), json!(7))]
	fn test_int_conversion(#[case] input: Value, #[case] expected: Value) {
		let int = Int::new();

		assert_eq!(int.deserialize(&input, &Context::new()).unwrap(), expected);
	}

	#[rstest]
	#[case(json!("abc"), "'abc' is not an integer")]
	#[case(json!(2.5), "'2.5' is not an integer")]
	#[case(json!("1.5"), "'1.5' is not an integer")]
	#[case(json!(true), "'true' is not an integer")]
	fn test_int_invalid_message(#[case] input: Value, #[case] expected: &str) {
		// Arrange
		let int = Int::new();

		// Act
		let err = int.deserialize(&input, &Context::new()).unwrap_err();

		// Assert
		let rendered = err.to_value();
		assert_eq!(rendered["errors"][0]["error"], json!(expected));
	}

	#[test]
	fn test_int_null_rejected() {
		let int = Int::new();

		assert!(int.serialize(&json!(null), &Context::new()).is_err());
		assert!(int.deserialize(&json!(null), &Context::new()).is_err());
	}

	#[test]
	fn test_int_validators_run_on_converted_value() {
		// The string "200" converts to 200 before the range check.
		let int = Int::new().with_validator(Range::new().with_max(100.0));

		assert!(int.deserialize(&json!("50"), &Context::new()).is_ok());
		assert!(int.deserialize(&json!("200"), &Context::new()).is_err());
	}

	#[rstest]
	#[case(json!(true), json!(true))]
	#[case(json!(false), json!(false))]
	#[case(json!(1), json!(true))]
	#[case(json!(0), json!(false))]
	#[case(json!("true"), json!(true))]
	#[case(json!("False"), json!(false))]
	#[case(json!("1"), json!(true))]
	#[case(json!("0"), json!(false))]
	fn test_boolean_accepted_forms(#[case] input: Value, #[case] expected: Value) {
		let boolean = Boolean::new();

		assert_eq!(boolean.deserialize(&input, &Context::new()).unwrap(), expected);
	}

	#[rstest]
	#[case(json!(2))]
	#[case(json!("yes"))]
	#[case(json!(null))]
	#[case(json!([true]))]
	fn test_boolean_rejected_forms(#[case] input: Value) {
		let boolean = Boolean::new();

		assert!(boolean.deserialize(&input, &Context::new()).is_err());
	}
}
