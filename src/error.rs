//! Structured validation errors and schema configuration errors.
//!
//! Deserialization never fails fast: every attribute and every list element
//! is visited, and all failures are gathered into one [`ValidationError`]
//! tree whose shape mirrors the schema nesting. Each node is addressed
//! either by the attribute name (`attr`) or by a list position (`index`);
//! leaves carry an error kind and a human-readable message.

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Marker used in rendered errors for the unattributed root node.
pub const ROOT_ATTR: &str = "<root>";

/// Kind tag carried by leaf errors, rendered into the `"type"` slot of
/// [`ValidationError::to_value`]. Consumers mapping errors to HTTP
/// responses key off these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// A value failed conversion (malformed input).
	Value,
	/// A value has the wrong shape entirely (object where a list was
	/// expected, null where a scalar was expected).
	Type,
	/// A converted value failed a validator check.
	Validation,
	/// A required attribute is absent from the input.
	MissingAttribute,
	/// The operation is not supported for this attribute (links do not
	/// deserialize).
	NotImplemented,
}

impl ErrorKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorKind::Value => "value_error",
			ErrorKind::Type => "type_error",
			ErrorKind::Validation => "validation_error",
			ErrorKind::MissingAttribute => "missing_attribute",
			ErrorKind::NotImplemented => "not_implemented",
		}
	}
}

/// One entry in a [`ValidationError`] node: either a terminal failure or a
/// nested error subtree (a nested schema or a list element).
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorNode {
	Leaf { kind: ErrorKind, message: String },
	Nested(ValidationError),
}

impl ErrorNode {
	fn to_value(&self) -> Value {
		match self {
			ErrorNode::Leaf { kind, message } => json!({
				"type": kind.as_str(),
				"error": message,
			}),
			ErrorNode::Nested(err) => err.to_value(),
		}
	}
}

/// Aggregate validation error for one serialize/deserialize call.
///
/// # Examples
///
/// ```
/// use hal_schema::ValidationError;
/// use serde_json::json;
///
/// let err = ValidationError::value_error("'abc' is not an integer").with_attr("year");
/// assert_eq!(
/// 	err.to_value(),
/// 	json!({
/// 		"errors": [{"type": "value_error", "error": "'abc' is not an integer"}],
/// 		"attr": "year",
/// 	})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
	/// Attribute name this node refers to, if any.
	pub attr: Option<String>,
	/// List position this node refers to, if any. Takes precedence over
	/// `attr` when rendering.
	pub index: Option<usize>,
	/// Child failures: leaves and nested subtrees.
	pub errors: Vec<ErrorNode>,
}

impl ValidationError {
	/// A node holding a single leaf failure.
	pub fn leaf(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self {
			attr: None,
			index: None,
			errors: vec![ErrorNode::Leaf { kind, message: message.into() }],
		}
	}

	pub fn value_error(message: impl Into<String>) -> Self {
		Self::leaf(ErrorKind::Value, message)
	}

	pub fn type_error(message: impl Into<String>) -> Self {
		Self::leaf(ErrorKind::Type, message)
	}

	pub fn validation(message: impl Into<String>) -> Self {
		Self::leaf(ErrorKind::Validation, message)
	}

	pub fn missing_attribute() -> Self {
		Self::leaf(ErrorKind::MissingAttribute, "Missing attribute.")
	}

	pub fn not_implemented(message: impl Into<String>) -> Self {
		Self::leaf(ErrorKind::NotImplemented, message)
	}

	/// A node aggregating several child errors, each kept as its own
	/// subtree so attribute and index attribution survive.
	pub fn aggregate(errors: Vec<ValidationError>) -> Self {
		Self {
			attr: None,
			index: None,
			errors: errors.into_iter().map(ErrorNode::Nested).collect(),
		}
	}

	/// Attribute this node to a named schema slot.
	pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
		self.attr = Some(attr.into());
		self
	}

	/// Attribute this node to a list position.
	pub fn with_index(mut self, index: usize) -> Self {
		self.index = Some(index);
		self
	}

	/// Whether this node is the "links do not deserialize" signal, which
	/// schema-level deserialization swallows.
	pub fn is_not_implemented(&self) -> bool {
		matches!(
			self.errors.as_slice(),
			[ErrorNode::Leaf { kind: ErrorKind::NotImplemented, .. }]
		)
	}

	/// Whether every leaf in this tree is a missing-attribute failure, so
	/// the whole error means "no data here" rather than "bad data".
	/// Optional attributes swallow these during serialization; a nested
	/// schema serialized over an absent carrier reports one such node per
	/// attribute.
	pub fn is_missing(&self) -> bool {
		!self.errors.is_empty()
			&& self.errors.iter().all(|node| match node {
				ErrorNode::Leaf { kind, .. } => *kind == ErrorKind::MissingAttribute,
				ErrorNode::Nested(err) => err.is_missing(),
			})
	}

	/// Total number of terminal failures in the tree.
	pub fn leaf_count(&self) -> usize {
		self.errors
			.iter()
			.map(|node| match node {
				ErrorNode::Leaf { .. } => 1,
				ErrorNode::Nested(err) => err.leaf_count(),
			})
			.sum()
	}

	/// Render the error tree as a JSON value.
	///
	/// Every node renders `{"errors": [...]}` plus `"index"` when it
	/// addresses a list position, else `"attr"` (`"<root>"` when the node
	/// is unattributed). Leaves render `{"type": ..., "error": ...}`.
	pub fn to_value(&self) -> Value {
		let mut result = Map::new();
		result.insert(
			"errors".to_string(),
			Value::Array(self.errors.iter().map(ErrorNode::to_value).collect()),
		);
		if let Some(index) = self.index {
			result.insert("index".to_string(), json!(index));
		} else {
			result.insert(
				"attr".to_string(),
				json!(self.attr.as_deref().unwrap_or(ROOT_ATTR)),
			);
		}
		Value::Object(result)
	}
}

impl std::fmt::Display for ValidationError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.to_value())
	}
}

impl std::error::Error for ValidationError {}

/// Schema definition error, detected when a schema is built. Fatal: a
/// schema that fails to build is a programming mistake, not bad input.
#[derive(Debug, Error)]
pub enum SchemaError {
	#[error("embedded attribute '{0}' must be backed by a schema")]
	EmbeddedNotSchema(String),
	#[error("schema '{schema}' embedded at '{attr}' does not declare a 'self' link")]
	MissingSelfLink { attr: String, schema: String },
}
