//! Accessors resolve values on JSON-shaped carriers.
//!
//! An [`Accessor`] is a getter/setter pair describing how to reach a value
//! on a document, not the value itself. Each side is either a dot-separated
//! path interpreted over JSON objects, or a function. Domain structs enter
//! the JSON object model through `serde` (see `Schema::serialize_obj`), so
//! one accessor serves both plain documents and converted domain objects.

use crate::context::Context;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Function getter: receives the carrier and the call context, returns the
/// resolved value or `None` when the value is missing.
pub type GetterFn = Arc<dyn Fn(&Value, &Context) -> Option<Value> + Send + Sync>;

/// Function setter: writes a deserialized value into the output carrier.
pub type SetterFn = Arc<dyn Fn(&mut Value, Value) + Send + Sync>;

#[derive(Clone)]
enum Getter {
	Path(Vec<String>),
	Func(GetterFn),
}

#[derive(Clone)]
enum Setter {
	Path(Vec<String>),
	Func(SetterFn),
}

/// Getter/setter pair for one schema attribute.
///
/// # Examples
///
/// ```
/// use hal_schema::{Accessor, Context};
/// use serde_json::json;
///
/// let accessor = Accessor::path("stats.total");
/// let source = json!({"stats": {"total": 42}});
/// assert_eq!(accessor.get(&source, &Context::new()), Some(json!(42)));
///
/// let mut target = json!({});
/// accessor.set(&mut target, json!(42));
/// assert_eq!(target, json!({"stats": {"total": 42}}));
/// ```
#[derive(Clone, Default)]
pub struct Accessor {
	getter: Option<Getter>,
	setter: Option<Setter>,
}

fn split(path: &str) -> Vec<String> {
	path.split('.').map(str::to_string).collect()
}

impl Accessor {
	/// An accessor with no getter and no setter. Using it is a programming
	/// error until one side is configured.
	pub fn new() -> Self {
		Self::default()
	}

	/// Path accessor reading and writing the same dot-separated location.
	pub fn path(path: &str) -> Self {
		let segments = split(path);
		Self {
			getter: Some(Getter::Path(segments.clone())),
			setter: Some(Setter::Path(segments)),
		}
	}

	/// Read-only path accessor.
	pub fn getter_path(path: &str) -> Self {
		Self { getter: Some(Getter::Path(split(path))), setter: None }
	}

	/// Function getter, builder style.
	///
	/// The function receives the source carrier and the call [`Context`]
	/// and reads only the context keys it needs; returning `None` marks
	/// the value as missing so the attribute default/required policy
	/// applies.
	pub fn with_getter_fn(
		mut self,
		getter: impl Fn(&Value, &Context) -> Option<Value> + Send + Sync + 'static,
	) -> Self {
		self.getter = Some(Getter::Func(Arc::new(getter)));
		self
	}

	/// Function setter, builder style.
	pub fn with_setter_fn(
		mut self,
		setter: impl Fn(&mut Value, Value) + Send + Sync + 'static,
	) -> Self {
		self.setter = Some(Setter::Func(Arc::new(setter)));
		self
	}

	/// Setter path, builder style.
	pub fn with_setter_path(mut self, path: &str) -> Self {
		self.setter = Some(Setter::Path(split(path)));
		self
	}

	pub fn has_getter(&self) -> bool {
		self.getter.is_some()
	}

	pub fn has_setter(&self) -> bool {
		self.setter.is_some()
	}

	/// Resolve a value from `source`. `None` means the value is missing
	/// (absent key or non-object intermediate), which the attribute layer
	/// recovers from via its default/required policy.
	///
	/// # Panics
	///
	/// Panics when no getter is configured; that is a schema authored
	/// incorrectly, not a data error.
	pub fn get(&self, source: &Value, ctx: &Context) -> Option<Value> {
		let getter = self
			.getter
			.as_ref()
			.expect("getter accessor is not specified");
		match getter {
			Getter::Func(f) => f(source, ctx),
			Getter::Path(segments) => {
				let mut current = source;
				for segment in segments {
					current = current.as_object()?.get(segment)?;
				}
				Some(current.clone())
			}
		}
	}

	/// Write a value into `target`. Path setters auto-create intermediate
	/// objects; an intermediate that exists but is not an object is
	/// replaced by one.
	///
	/// # Panics
	///
	/// Panics when no setter is configured.
	pub fn set(&self, target: &mut Value, value: Value) {
		let setter = self
			.setter
			.as_ref()
			.expect("setter accessor is not specified");
		match setter {
			Setter::Func(f) => f(target, value),
			Setter::Path(segments) => {
				let mut current = target;
				let (last, intermediate) =
					segments.split_last().expect("setter path must not be empty");
				for segment in intermediate {
					if !current.is_object() {
						*current = Value::Object(Map::new());
					}
					current = current
						.as_object_mut()
						.expect("just coerced to an object")
						.entry(segment.clone())
						.or_insert_with(|| Value::Object(Map::new()));
				}
				if !current.is_object() {
					*current = Value::Object(Map::new());
				}
				current
					.as_object_mut()
					.expect("just coerced to an object")
					.insert(last.clone(), value);
			}
		}
	}
}

impl std::fmt::Debug for Accessor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let describe_getter = match &self.getter {
			None => "-".to_string(),
			Some(Getter::Path(p)) => p.join("."),
			Some(Getter::Func(_)) => "<fn>".to_string(),
		};
		let describe_setter = match &self.setter {
			None => "-".to_string(),
			Some(Setter::Path(p)) => p.join("."),
			Some(Setter::Func(_)) => "<fn>".to_string(),
		};
		write!(f, "Accessor(getter={describe_getter}, setter={describe_setter})")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[test]
	fn test_single_segment_get() {
		let accessor = Accessor::path("name");
		let source = json!({"name": "warehouse"});

		assert_eq!(accessor.get(&source, &Context::new()), Some(json!("warehouse")));
	}

	#[rstest]
	#[case(json!({"a": {"b": {"c": 1}}}), Some(json!(1)))]
	#[case(json!({"a": {"b": {}}}), None)]
	#[case(json!({"a": 5}), None)]
	#[case(json!([1, 2, 3]), None)]
	fn test_nested_path_get(#[case] source: Value, #[case] expected: Option<Value>) {
		// Arrange
		let accessor = Accessor::path("a.b.c");

		// Act
		let result = accessor.get(&source, &Context::new());

		// Assert
		assert_eq!(result, expected);
	}

	#[test]
	fn test_getter_fn_reads_context() {
		let accessor = Accessor::new().with_getter_fn(|value, ctx| {
			let base = ctx.get("base_url")?.as_str()?;
			let id = value.get("id")?.as_i64()?;
			Some(json!(format!("{base}/items/{id}")))
		});
		let ctx = Context::new()
			.with("base_url", json!("/api"))
			.with("irrelevant", json!(true));

		let result = accessor.get(&json!({"id": 3}), &ctx);

		assert_eq!(result, Some(json!("/api/items/3")));
	}

	#[test]
	fn test_getter_fn_missing() {
		let accessor = Accessor::new().with_getter_fn(|_, _| None);

		assert_eq!(accessor.get(&json!({}), &Context::new()), None);
	}

	#[test]
	fn test_set_creates_intermediates() {
		let accessor = Accessor::path("a.b.c");
		let mut target = json!({});

		accessor.set(&mut target, json!("deep"));

		assert_eq!(target, json!({"a": {"b": {"c": "deep"}}}));
	}

	#[test]
	fn test_set_preserves_siblings() {
		let accessor = Accessor::path("a.b");
		let mut target = json!({"a": {"x": 1}});

		accessor.set(&mut target, json!(2));

		assert_eq!(target, json!({"a": {"x": 1, "b": 2}}));
	}

	#[test]
	fn test_set_replaces_non_object_intermediate() {
		let accessor = Accessor::path("a.b");
		let mut target = json!({"a": 7});

		accessor.set(&mut target, json!(1));

		assert_eq!(target, json!({"a": {"b": 1}}));
	}

	#[test]
	fn test_setter_fn() {
		let accessor = Accessor::new().with_setter_fn(|target, value| {
			target["total"] = value;
		});
		let mut target = json!({});

		accessor.set(&mut target, json!(9));

		assert_eq!(target, json!({"total": 9}));
	}

	#[test]
	#[should_panic(expected = "getter accessor is not specified")]
	fn test_get_without_getter_panics() {
		Accessor::new().get(&json!({}), &Context::new());
	}

	#[test]
	#[should_panic(expected = "setter accessor is not specified")]
	fn test_set_without_setter_panics() {
		Accessor::getter_path("a").set(&mut json!({}), json!(1));
	}
}
