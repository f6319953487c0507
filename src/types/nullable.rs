use crate::context::Context;
use crate::schema::Schema;
use crate::types::{Type, TypeResult};
use serde_json::Value;
use std::sync::Arc;

/// Nullable wrapper: `null` bypasses the nested type entirely in both
/// directions. This is the only way a scalar attribute accepts `null`.
///
/// # Examples
///
/// ```
/// use hal_schema::{Context, Int, Nullable, Type};
/// use serde_json::json;
///
/// let nullable = Nullable::new(Int::new());
/// assert_eq!(nullable.deserialize(&json!(null), &Context::new()).unwrap(), json!(null));
/// assert_eq!(nullable.deserialize(&json!(5), &Context::new()).unwrap(), json!(5));
/// assert!(nullable.deserialize(&json!("x"), &Context::new()).is_err());
/// ```
#[derive(Clone)]
pub struct Nullable {
	nested_type: Arc<dyn Type>,
}

impl Nullable {
	pub fn new(nested_type: impl Type + 'static) -> Self {
		Self { nested_type: Arc::new(nested_type) }
	}
}

impl Type for Nullable {
	fn serialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		if value.is_null() {
			return Ok(Value::Null);
		}
		self.nested_type.serialize(value, ctx)
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		if value.is_null() {
			return Ok(Value::Null);
		}
		self.nested_type.deserialize(value, ctx)
	}

	fn as_schema(&self) -> Option<&Schema> {
		self.nested_type.as_schema()
	}
}
