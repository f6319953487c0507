//! Schema attributes: the binding between a named document slot and a
//! [`Type`], with placement, default/required policy and link metadata.
//!
//! An attribute lives in exactly one schema and one compartment: the plain
//! body, `_links` for link attributes, or `_embedded` for embedded
//! resources. Link and embedded keys may carry a curie prefix
//! (`"acme:warehouse"`).

use crate::accessor::Accessor;
use crate::context::Context;
use crate::error::ValidationError;
use crate::types::{Any, Type, raw};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Named sub-section of a HAL document an attribute is placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compartment {
	Links,
	Embedded,
}

impl Compartment {
	pub fn key(&self) -> &'static str {
		match self {
			Compartment::Links => "_links",
			Compartment::Embedded => "_embedded",
		}
	}
}

/// A compact URI namespace shared by several links or embedded resources.
/// Curies referenced anywhere in a schema are collected once into the
/// synthesized `curies` link list. Deduplicated by name.
///
/// # Examples
///
/// ```
/// use hal_schema::Curie;
///
/// let acme = Curie::new("acme", "https://docs.example.com/rels/{rel}").templated(true);
/// assert_eq!(acme.name(), "acme");
/// ```
#[derive(Debug, Clone)]
pub struct Curie {
	name: String,
	href: String,
	templated: Option<bool>,
	media_type: Option<String>,
}

impl Curie {
	pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			href: href.into(),
			templated: None,
			media_type: None,
		}
	}

	pub fn templated(mut self, templated: bool) -> Self {
		self.templated = Some(templated);
		self
	}

	pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
		self.media_type = Some(media_type.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn to_link_value(&self) -> Value {
		let mut link = Map::new();
		link.insert("name".to_string(), json!(self.name));
		link.insert("href".to_string(), json!(self.href));
		if let Some(templated) = self.templated {
			link.insert("templated".to_string(), json!(templated));
		}
		if let Some(media_type) = &self.media_type {
			link.insert("type".to_string(), json!(media_type));
		}
		Value::Object(link)
	}
}

/// Fallback used when an attribute's value is missing: a constant or a
/// producer evaluated at (de)serialization time.
#[derive(Clone)]
pub enum DefaultValue {
	Value(Value),
	Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
	pub fn resolve(&self) -> Value {
		match self {
			DefaultValue::Value(v) => v.clone(),
			DefaultValue::Producer(f) => f(),
		}
	}
}

impl std::fmt::Debug for DefaultValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
			DefaultValue::Producer(_) => f.write_str("Producer(..)"),
		}
	}
}

#[derive(Clone)]
enum AttrType {
	Typed(Arc<dyn Type>),
	Constant(Value),
}

/// One schema slot: a name bound to a type (or constant), an accessor, and
/// placement/requiredness policy.
///
/// Attributes are declared with the constructors ([`Attr::new`],
/// [`Attr::constant`], [`Attr::link`], [`Attr::link_list`],
/// [`Attr::embedded`]) and configured builder style; the schema builder
/// freezes them when the schema is finished.
///
/// # Examples
///
/// ```
/// use hal_schema::{Attr, Int, Schema, Str};
///
/// let schema = Schema::build("Book")
/// 	.attr(Attr::new("title", Str::new()))
/// 	.attr(Attr::new("year", Int::new()).required(false))
/// 	.attr(Attr::new("total", Int::new()).path("stats.total"))
/// 	.finish()
/// 	.unwrap();
/// assert_eq!(schema.attrs().len(), 3);
/// ```
#[derive(Clone)]
pub struct Attr {
	name: String,
	key_override: Option<String>,
	key: String,
	attr_type: AttrType,
	accessor: Accessor,
	custom_accessor: bool,
	required: bool,
	default: Option<DefaultValue>,
	exclude: Vec<Value>,
	compartment: Option<Compartment>,
	curie: Option<Curie>,
	wrap_href: bool,
	list_of_links: bool,
	templated: Option<bool>,
	media_type: Option<String>,
	deprecation: Option<String>,
}

impl Attr {
	fn base(name: &str, attr_type: AttrType) -> Self {
		Self {
			name: name.to_string(),
			key_override: None,
			key: name.to_string(),
			attr_type,
			accessor: Accessor::new(),
			custom_accessor: false,
			required: true,
			default: None,
			exclude: Vec::new(),
			compartment: None,
			curie: None,
			wrap_href: false,
			list_of_links: false,
			templated: None,
			media_type: None,
			deprecation: None,
		}
	}

	/// Plain body attribute converting through the given type.
	pub fn new(name: &str, attr_type: impl Type + 'static) -> Self {
		Self::base(name, AttrType::Typed(Arc::new(attr_type)))
	}

	/// Attribute that always serializes to a fixed value.
	pub fn constant(name: &str, value: Value) -> Self {
		Self::base(name, AttrType::Constant(value))
	}

	/// Link attribute (`_links`): the resolved value becomes the `href` of
	/// a link object, together with any configured metadata.
	pub fn link(name: &str) -> Self {
		let mut attr = Self::base(name, AttrType::Typed(Arc::new(Any::new())));
		attr.compartment = Some(Compartment::Links);
		attr.wrap_href = true;
		attr
	}

	/// Link attribute rendering through a full schema instead of the
	/// default href wrapping.
	pub fn link_schema(name: &str, schema: impl Type + 'static) -> Self {
		let mut attr = Self::base(name, AttrType::Typed(Arc::new(schema)));
		attr.compartment = Some(Compartment::Links);
		attr
	}

	/// Link list attribute (`_links`): the resolved value must be a list;
	/// every element gets the href wrapping.
	pub fn link_list(name: &str) -> Self {
		let mut attr = Self::base(name, AttrType::Typed(Arc::new(Any::new())));
		attr.compartment = Some(Compartment::Links);
		attr.list_of_links = true;
		attr
	}

	/// Embedded resource attribute (`_embedded`). The type must be a
	/// schema (or a list of schemas) declaring a `self` link; the schema
	/// builder enforces that when the owning schema is finished.
	pub fn embedded(name: &str, schema: impl Type + 'static) -> Self {
		let mut attr = Self::base(name, AttrType::Typed(Arc::new(schema)));
		attr.compartment = Some(Compartment::Embedded);
		attr
	}

	/// Resolve the value from a dot-separated path instead of the
	/// attribute name.
	pub fn path(mut self, path: &str) -> Self {
		self.accessor = Accessor::path(path);
		self.custom_accessor = true;
		self
	}

	/// Resolve the value with a function (computed attribute). Returning
	/// `None` marks the value missing so the default/required policy
	/// applies.
	pub fn getter(
		mut self,
		getter: impl Fn(&Value, &Context) -> Option<Value> + Send + Sync + 'static,
	) -> Self {
		self.accessor = Accessor::new().with_getter_fn(getter);
		self.custom_accessor = true;
		self
	}

	/// Use a fully custom accessor.
	pub fn accessor(mut self, accessor: Accessor) -> Self {
		self.accessor = accessor;
		self.custom_accessor = true;
		self
	}

	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	/// Fallback value used when the attribute is missing from the source.
	pub fn default_value(mut self, value: Value) -> Self {
		self.default = Some(DefaultValue::Value(value));
		self
	}

	/// Fallback producer evaluated each time the attribute is missing.
	pub fn default_with(mut self, producer: impl Fn() -> Value + Send + Sync + 'static) -> Self {
		self.default = Some(DefaultValue::Producer(Arc::new(producer)));
		self
	}

	/// Values that are omitted from output entirely (commonly `[null]` to
	/// suppress explicit nulls).
	pub fn exclude(mut self, values: impl IntoIterator<Item = Value>) -> Self {
		self.exclude = values.into_iter().collect();
		self
	}

	/// Override the document key (defaults to the attribute name).
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.key_override = Some(key.into());
		self
	}

	/// Namespace this link/embedded key with a curie prefix.
	pub fn curie(mut self, curie: Curie) -> Self {
		self.curie = Some(curie);
		self
	}

	/// Mark the link href as a URI template.
	pub fn templated(mut self, templated: bool) -> Self {
		self.templated = Some(templated);
		self
	}

	/// Media type hint for the link target.
	pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
		self.media_type = Some(media_type.into());
		self
	}

	/// Deprecation URL rendered on the link object.
	pub fn deprecation(mut self, deprecation: impl Into<String>) -> Self {
		self.deprecation = Some(deprecation.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// The key this attribute occupies within its compartment, including
	/// any curie prefix. Final once the owning schema is built.
	pub fn document_key(&self) -> &str {
		&self.key
	}

	pub fn compartment(&self) -> Option<Compartment> {
		self.compartment
	}

	pub fn is_required(&self) -> bool {
		self.required
	}

	pub(crate) fn is_link(&self) -> bool {
		self.compartment == Some(Compartment::Links)
	}

	pub(crate) fn is_embedded(&self) -> bool {
		self.compartment == Some(Compartment::Embedded)
	}

	pub(crate) fn curie_ref(&self) -> Option<&Curie> {
		self.curie.as_ref()
	}

	pub(crate) fn backing_schema(&self) -> Option<&crate::schema::Schema> {
		match &self.attr_type {
			AttrType::Typed(t) => t.as_schema(),
			AttrType::Constant(_) => None,
		}
	}

	pub(crate) fn accessor_ref(&self) -> &Accessor {
		&self.accessor
	}

	/// Called by the schema builder: defaults the accessor to the
	/// attribute name and computes the final document key.
	pub(crate) fn freeze(&mut self) {
		if !self.custom_accessor {
			self.accessor = Accessor::path(&self.name);
		}
		let base = self.key_override.clone().unwrap_or_else(|| self.name.clone());
		self.key = match &self.curie {
			Some(curie) => format!("{}:{}", curie.name, base),
			None => base,
		};
	}

	/// Serialize this attribute from `source`. `Ok(None)` means the field
	/// is omitted (missing-and-optional, or excluded value).
	pub fn serialize(
		&self,
		source: &Value,
		ctx: &Context,
	) -> Result<Option<Value>, ValidationError> {
		let attr_type = match &self.attr_type {
			AttrType::Constant(v) => return Ok(Some(v.clone())),
			AttrType::Typed(t) => t,
		};

		let resolved = match self.accessor.get(source, ctx) {
			Some(v) => v,
			None => match &self.default {
				Some(default) => default.resolve(),
				None if self.required => return Err(ValidationError::missing_attribute()),
				None => return Ok(None),
			},
		};

		// An explicit null on an optional embedded resource means nothing
		// is embedded; the field is dropped rather than converted.
		if resolved.is_null() && !self.required && self.default.is_none() && self.is_embedded() {
			return Ok(None);
		}

		let converted = match attr_type.serialize(&resolved, ctx) {
			Ok(v) => v,
			// Data missing deeper inside an optional attribute (a nested
			// schema over an absent or empty carrier) omits the field.
			Err(e) if !self.required && e.is_missing() => return Ok(None),
			Err(e) => return Err(e),
		};

		if self.exclude.contains(&converted) {
			return Ok(None);
		}

		Ok(Some(self.wrap_for_links(converted)?))
	}

	/// Deserialize this attribute from the document. `Ok(None)` means the
	/// attribute contributes nothing (missing and optional). Link
	/// attributes return the not-implemented signal, which schema-level
	/// deserialization swallows.
	pub fn deserialize(
		&self,
		document: &Value,
		ctx: &Context,
	) -> Result<Option<Value>, ValidationError> {
		if self.is_link() {
			return Err(ValidationError::not_implemented(
				"links do not support deserialization",
			));
		}

		if let AttrType::Constant(v) = &self.attr_type {
			return Ok(Some(v.clone()));
		}

		// Embedded attributes read their compartment when the input carries
		// one (a document this library produced), falling back to the plain
		// key for flat inputs such as parsed request bodies.
		let looked_up = match self.compartment {
			None => self.lookup(document, ctx),
			Some(compartment) => document
				.get(compartment.key())
				.and_then(|scope| self.lookup(scope, ctx))
				.or_else(|| self.lookup(document, ctx)),
		};
		let value = match looked_up {
			Some(v) => v,
			None => {
				return match &self.default {
					Some(default) => Ok(Some(default.resolve())),
					None if self.required => Err(ValidationError::missing_attribute()),
					None => Ok(None),
				};
			}
		};

		match &self.attr_type {
			AttrType::Typed(t) => t.deserialize(&value, ctx).map(Some),
			AttrType::Constant(_) => unreachable!("constants handled above"),
		}
	}

	fn lookup(&self, scope: &Value, ctx: &Context) -> Option<Value> {
		if self.custom_accessor {
			self.accessor.get(scope, ctx)
		} else {
			scope.get(self.key.as_str()).cloned()
		}
	}

	fn wrap_for_links(&self, converted: Value) -> Result<Value, ValidationError> {
		if self.list_of_links {
			let Value::Array(items) = converted else {
				return Err(ValidationError::type_error(format!(
					"'{}' is not a list",
					raw(&converted)
				)));
			};
			return Ok(Value::Array(
				items.into_iter().map(|item| self.href_object(item)).collect(),
			));
		}
		if self.wrap_href {
			return Ok(self.href_object(converted));
		}
		Ok(converted)
	}

	fn href_object(&self, href: Value) -> Value {
		let mut link = Map::new();
		link.insert("href".to_string(), href);
		if let Some(templated) = self.templated {
			link.insert("templated".to_string(), json!(templated));
		}
		if let Some(media_type) = &self.media_type {
			link.insert("type".to_string(), json!(media_type));
		}
		if let Some(deprecation) = &self.deprecation {
			link.insert("deprecation".to_string(), json!(deprecation));
		}
		Value::Object(link)
	}
}

impl std::fmt::Debug for Attr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Attr")
			.field("name", &self.name)
			.field("key", &self.key)
			.field("compartment", &self.compartment)
			.field("required", &self.required)
			.finish_non_exhaustive()
	}
}
