use crate::context::Context;
use crate::error::ValidationError;
use crate::schema::Schema;
use crate::types::{Type, TypeResult, raw, run_validators};
use crate::validators::Validator;
use serde_json::Value;
use std::sync::Arc;

/// List type: converts every element through the item type.
///
/// Deserialization never stops at the first bad element; every failure is
/// recorded with its list position and all of them are reported in one
/// aggregate error.
///
/// # Examples
///
/// ```
/// use hal_schema::{Context, Int, List, Type};
/// use serde_json::json;
///
/// let list = List::new(Int::new());
/// assert_eq!(
/// 	list.deserialize(&json!(["1", 2]), &Context::new()).unwrap(),
/// 	json!([1, 2])
/// );
///
/// // Both bad elements are reported together.
/// let err = list.deserialize(&json!(["a", 1, "b"]), &Context::new()).unwrap_err();
/// assert_eq!(err.leaf_count(), 2);
/// ```
#[derive(Clone)]
pub struct List {
	item_type: Arc<dyn Type>,
	allow_scalar: bool,
	validators: Vec<Arc<dyn Validator>>,
}

impl List {
	pub fn new(item_type: impl Type + 'static) -> Self {
		Self {
			item_type: Arc::new(item_type),
			allow_scalar: false,
			validators: Vec::new(),
		}
	}

	/// Permit a bare scalar on input, wrapping it into a one-element list.
	pub fn allow_scalar(mut self, allow: bool) -> Self {
		self.allow_scalar = allow;
		self
	}

	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}
}

impl Type for List {
	fn serialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		let Value::Array(items) = value else {
			return Err(ValidationError::type_error(format!(
				"'{}' is not a list",
				raw(value)
			)));
		};
		let mut result = Vec::with_capacity(items.len());
		for item in items {
			result.push(self.item_type.serialize(item, ctx)?);
		}
		Ok(Value::Array(result))
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		let items: Vec<Value> = match value {
			Value::Array(items) => items.clone(),
			scalar if self.allow_scalar => vec![scalar.clone()],
			other => {
				return Err(ValidationError::type_error(format!(
					"'{}' is not a list",
					raw(other)
				)));
			}
		};

		let mut errors = Vec::new();
		let list_value = Value::Array(items.clone());
		if let Err(error) = run_validators(&self.validators, &list_value, ctx) {
			errors.push(error);
		}

		let mut result = Vec::with_capacity(items.len());
		for (index, item) in items.iter().enumerate() {
			match self.item_type.deserialize(item, ctx) {
				Ok(converted) => result.push(converted),
				Err(error) => errors.push(error.with_index(index)),
			}
		}

		if errors.is_empty() {
			Ok(Value::Array(result))
		} else {
			Err(ValidationError::aggregate(errors))
		}
	}

	fn as_schema(&self) -> Option<&Schema> {
		self.item_type.as_schema()
	}
}
