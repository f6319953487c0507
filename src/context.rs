use std::collections::HashMap;

/// Serialization context passed to accessors, types and validators.
///
/// A `Context` carries request-scoped values (the current user, a base URL,
/// a deadline) down through a schema traversal. Callees read only the keys
/// they care about; unknown keys are simply never looked at, so passing a
/// wider context than a callee needs can never fail.
///
/// # Examples
///
/// ```
/// use hal_schema::Context;
/// use serde_json::json;
///
/// let ctx = Context::new().with("base_url", json!("https://api.example.com"));
/// assert_eq!(ctx.get("base_url"), Some(&json!("https://api.example.com")));
/// assert_eq!(ctx.get("unknown"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
	values: HashMap<String, serde_json::Value>,
}

impl Context {
	/// Create an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a value, builder style.
	///
	/// # Examples
	///
	/// ```
	/// use hal_schema::Context;
	/// use serde_json::json;
	///
	/// let ctx = Context::new().with("deadline", json!("2026-01-01")).with("page", json!(2));
	/// assert_eq!(ctx.get("page"), Some(&json!(2)));
	/// ```
	pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}

	/// Insert a value.
	pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
		self.values.insert(key.into(), value);
	}

	/// Look up a value by key.
	pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
		self.values.get(key)
	}

	/// Whether the context holds the given key.
	pub fn contains(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	/// Whether the context is empty.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_context_insert_and_get() {
		let mut ctx = Context::new();
		ctx.insert("user", json!({"id": 7}));

		assert!(ctx.contains("user"));
		assert_eq!(ctx.get("user"), Some(&json!({"id": 7})));
	}

	#[test]
	fn test_context_unknown_key_is_none() {
		let ctx = Context::new().with("a", json!(1));

		assert_eq!(ctx.get("b"), None);
		assert!(!ctx.contains("b"));
	}

	#[test]
	fn test_context_empty() {
		assert!(Context::new().is_empty());
		assert!(!Context::new().with("a", json!(1)).is_empty());
	}
}
