use crate::context::Context;
use crate::error::ValidationError;
use crate::types::{Type, TypeResult, raw};
use serde_json::Value;

/// Enumerated type over a fixed set of `(name, value)` variants.
///
/// The canonical deserialized form is the variant name. With `use_values`
/// the document carries the variant value instead of the name, in both
/// directions. Unlike scalars, enums are implicitly nullable: `null`
/// passes through unchanged.
///
/// # Examples
///
/// ```
/// use hal_schema::{Context, Enum, Type};
/// use serde_json::json;
///
/// let status = Enum::new([("open", json!(1)), ("closed", json!(2))]);
/// assert_eq!(status.deserialize(&json!("open"), &Context::new()).unwrap(), json!("open"));
/// assert!(status.deserialize(&json!("pending"), &Context::new()).is_err());
///
/// let by_value = Enum::new([("open", json!(1)), ("closed", json!(2))]).use_values(true);
/// assert_eq!(by_value.deserialize(&json!(2), &Context::new()).unwrap(), json!("closed"));
/// assert_eq!(by_value.serialize(&json!("closed"), &Context::new()).unwrap(), json!(2));
/// ```
#[derive(Clone)]
pub struct Enum {
	variants: Vec<(String, Value)>,
	use_values: bool,
}

impl Enum {
	pub fn new<N: Into<String>>(variants: impl IntoIterator<Item = (N, Value)>) -> Self {
		Self {
			variants: variants
				.into_iter()
				.map(|(name, value)| (name.into(), value))
				.collect(),
			use_values: false,
		}
	}

	/// Carry variant values instead of names in documents.
	pub fn use_values(mut self, use_values: bool) -> Self {
		self.use_values = use_values;
		self
	}

	fn name_for_value(&self, value: &Value) -> Option<&str> {
		self.variants
			.iter()
			.find(|(_, v)| v == value)
			.map(|(name, _)| name.as_str())
	}

	fn value_for_name(&self, name: &str) -> Option<&Value> {
		self.variants
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v)
	}
}

impl Type for Enum {
	fn serialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		if value.is_null() {
			return Ok(Value::Null);
		}
		let name = value.as_str().and_then(|name| {
			self.value_for_name(name).map(|variant_value| (name, variant_value))
		});
		match name {
			Some((name, variant_value)) => {
				if self.use_values {
					Ok(variant_value.clone())
				} else {
					Ok(Value::String(name.to_string()))
				}
			}
			None => Err(ValidationError::value_error(format!(
				"Unknown enum name '{}'.",
				raw(value)
			))),
		}
	}

	fn deserialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		if value.is_null() {
			return Ok(Value::Null);
		}
		if self.use_values {
			match self.name_for_value(value) {
				Some(name) => Ok(Value::String(name.to_string())),
				None => Err(ValidationError::value_error(format!(
					"Unknown enum value '{}'.",
					raw(value)
				))),
			}
		} else {
			match value.as_str() {
				Some(name) if self.value_for_name(name).is_some() => {
					Ok(Value::String(name.to_string()))
				}
				_ => Err(ValidationError::value_error(format!(
					"Unknown enum name '{}'.",
					raw(value)
				))),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn color() -> Enum {
		Enum::new([("red", json!("#f00")), ("green", json!("#0f0"))])
	}

	#[rstest]
	#[case(json!("red"), json!("red"))]
	#[case(json!("green"), json!("green"))]
	#[case(json!(null), json!(null))]
	fn test_deserialize_by_name(#[case] input: Value, #[case] expected: Value) {
		assert_eq!(color().deserialize(&input, &Context::new()).unwrap(), expected);
	}

	#[test]
	fn test_deserialize_unknown_name() {
		let err = color().deserialize(&json!("blue"), &Context::new()).unwrap_err();

		assert!(err.to_string().contains("Unknown enum name 'blue'."));
	}

	#[test]
	fn test_deserialize_by_value() {
		let by_value = color().use_values(true);

		assert_eq!(
			by_value.deserialize(&json!("#f00"), &Context::new()).unwrap(),
			json!("red")
		);
		assert!(by_value.deserialize(&json!("#00f"), &Context::new()).is_err());
	}

	#[test]
	fn test_serialize_name_and_value_modes() {
		assert_eq!(
			color().serialize(&json!("red"), &Context::new()).unwrap(),
			json!("red")
		);
		assert_eq!(
			color().use_values(true).serialize(&json!("red"), &Context::new()).unwrap(),
			json!("#f00")
		);
	}

	#[test]
	fn test_serialize_unknown_name() {
		assert!(color().serialize(&json!("blue"), &Context::new()).is_err());
	}

	#[test]
	fn test_null_passes_through() {
		assert_eq!(
			color().serialize(&json!(null), &Context::new()).unwrap(),
			json!(null)
		);
	}
}
