//! Schema definition and the serialize/deserialize pipelines.
//!
//! A [`Schema`] is an immutable, ordered collection of attributes produced
//! by [`SchemaBuilder`]. Building validates the definition (embedded
//! attributes must be backed by schemas declaring a `self` link) and
//! synthesizes the curie registry; conversion after that never mutates the
//! schema, so one schema instance serves any number of threads.

use crate::attr::{Attr, Compartment, Curie};
use crate::context::Context;
use crate::error::{SchemaError, ValidationError};
use crate::types::{Type, TypeResult};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Declarative serializer for one resource representation.
///
/// Attributes are applied in declaration order; link attributes render into
/// `_links`, embedded ones into `_embedded`, and any curies referenced by
/// either are emitted once as the `curies` link list.
///
/// # Examples
///
/// ```
/// use hal_schema::{Attr, Int, Schema, Str};
/// use serde_json::json;
///
/// let book = Schema::build("Book")
/// 	.attr(Attr::link("self").path("uri"))
/// 	.attr(Attr::new("title", Str::new()))
/// 	.attr(Attr::new("year", Int::new()))
/// 	.finish()
/// 	.unwrap();
///
/// let doc = book
/// 	.serialize(&json!({"uri": "/books/1", "title": "Dune", "year": 1965}))
/// 	.unwrap();
/// assert_eq!(
/// 	doc,
/// 	json!({
/// 		"_links": {"self": {"href": "/books/1"}},
/// 		"title": "Dune",
/// 		"year": 1965,
/// 	})
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
	name: String,
	attrs: Vec<Attr>,
	curies: Vec<Curie>,
}

impl Schema {
	/// Start building a schema with the given name. The name appears in
	/// definition errors and trace events, not in documents.
	pub fn build(name: impl Into<String>) -> SchemaBuilder {
		SchemaBuilder { name: name.into(), attrs: Vec::new() }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn attrs(&self) -> &[Attr] {
		&self.attrs
	}

	pub(crate) fn has_self_link(&self) -> bool {
		self.attrs
			.iter()
			.any(|attr| attr.is_link() && attr.document_key() == "self")
	}

	/// Serialize with an empty context.
	pub fn serialize(&self, source: &Value) -> Result<Value, ValidationError> {
		self.serialize_with(source, &Context::new())
	}

	/// Serialize `source` into a HAL document.
	///
	/// Every attribute is attempted; failures are attributed to their
	/// attribute name and gathered into one error tree.
	pub fn serialize_with(&self, source: &Value, ctx: &Context) -> Result<Value, ValidationError> {
		let mut links = Map::new();
		let mut body = Map::new();
		let mut embedded = Map::new();
		let mut errors = Vec::new();

		if !self.curies.is_empty() {
			links.insert(
				"curies".to_string(),
				Value::Array(self.curies.iter().map(Curie::to_link_value).collect()),
			);
		}

		for attr in &self.attrs {
			match attr.serialize(source, ctx) {
				Ok(None) => {}
				Ok(Some(value)) => {
					let target = match attr.compartment() {
						Some(Compartment::Links) => &mut links,
						Some(Compartment::Embedded) => &mut embedded,
						None => &mut body,
					};
					target.insert(attr.document_key().to_string(), value);
				}
				Err(error) => errors.push(error.with_attr(attr.name())),
			}
		}

		if !errors.is_empty() {
			debug!(schema = %self.name, errors = errors.len(), "serialization failed");
			return Err(ValidationError::aggregate(errors));
		}

		let mut document = Map::new();
		if !links.is_empty() {
			document.insert("_links".to_string(), Value::Object(links));
		}
		document.extend(body);
		if !embedded.is_empty() {
			document.insert("_embedded".to_string(), Value::Object(embedded));
		}
		Ok(Value::Object(document))
	}

	/// Serialize any `serde`-serializable value: the object is converted to
	/// JSON first, then run through the schema.
	pub fn serialize_obj<T: Serialize>(&self, obj: &T, ctx: &Context) -> Result<Value, ValidationError> {
		let source = serde_json::to_value(obj).map_err(|e| {
			ValidationError::type_error(format!("source is not representable as JSON: {e}"))
		})?;
		self.serialize_with(&source, ctx)
	}

	/// Deserialize with an empty context.
	pub fn deserialize(&self, document: &Value) -> Result<Value, ValidationError> {
		self.deserialize_with(document, &Context::new())
	}

	/// Deserialize and validate a HAL document into the canonical form: an
	/// object keyed by attribute name.
	///
	/// Never fails fast. Every attribute is visited and every failure is
	/// collected into one error tree mirroring the schema nesting; link
	/// attributes are skipped (links carry no deserializable state).
	pub fn deserialize_with(&self, document: &Value, ctx: &Context) -> Result<Value, ValidationError> {
		let mut output = Map::new();
		let mut errors = Vec::new();

		for attr in &self.attrs {
			match attr.deserialize(document, ctx) {
				Ok(None) => {}
				Ok(Some(value)) => {
					output.insert(attr.name().to_string(), value);
				}
				Err(error) if error.is_not_implemented() => {}
				Err(error) => errors.push(error.with_attr(attr.name())),
			}
		}

		if !errors.is_empty() {
			debug!(schema = %self.name, errors = errors.len(), "deserialization failed");
			return Err(ValidationError::aggregate(errors));
		}
		Ok(Value::Object(output))
	}

	/// Deserialize a document and write each attribute into `output`
	/// through its accessor, so dotted paths land at their nested spot.
	///
	/// # Panics
	///
	/// Panics if an attribute carries a getter-only accessor; writing such
	/// an attribute is a definition mistake, not bad input.
	pub fn deserialize_into(
		&self,
		document: &Value,
		output: &mut Value,
		ctx: &Context,
	) -> Result<(), ValidationError> {
		let mut writes = Vec::new();
		let mut errors = Vec::new();

		for attr in &self.attrs {
			match attr.deserialize(document, ctx) {
				Ok(None) => {}
				Ok(Some(value)) => writes.push((attr, value)),
				Err(error) if error.is_not_implemented() => {}
				Err(error) => errors.push(error.with_attr(attr.name())),
			}
		}

		if !errors.is_empty() {
			debug!(schema = %self.name, errors = errors.len(), "deserialization failed");
			return Err(ValidationError::aggregate(errors));
		}
		// Nothing is written until the whole document validated.
		for (attr, value) in writes {
			attr.accessor_ref().set(output, value);
		}
		Ok(())
	}
}

impl Type for Schema {
	fn serialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		self.serialize_with(value, ctx)
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		self.deserialize_with(value, ctx)
	}

	fn as_schema(&self) -> Option<&Schema> {
		Some(self)
	}
}

/// Accumulates attribute declarations and finishes them into a [`Schema`].
///
/// Re-declaring an attribute name replaces the earlier declaration and
/// moves the attribute to the new position, so schemas composed with
/// [`SchemaBuilder::extend`] can override inherited attributes.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
	name: String,
	attrs: Vec<Attr>,
}

impl SchemaBuilder {
	/// Declare an attribute. A previously declared attribute with the same
	/// name is dropped; the new declaration takes this position.
	pub fn attr(mut self, attr: Attr) -> Self {
		self.attrs.retain(|existing| existing.name() != attr.name());
		self.attrs.push(attr);
		self
	}

	/// Inherit every attribute of `parent`, in the parent's order, before
	/// any attribute declared on this builder so far. Later [`Self::attr`]
	/// calls can still override them.
	pub fn extend(mut self, parent: &Schema) -> Self {
		let own = std::mem::take(&mut self.attrs);
		self.attrs = parent.attrs.to_vec();
		for attr in own {
			self = self.attr(attr);
		}
		self
	}

	/// Validate the definition and produce the schema.
	///
	/// Freezes accessors and document keys, collects the curies referenced
	/// by link and embedded attributes (deduplicated by name, first use
	/// wins), and checks that every embedded attribute is backed by a
	/// schema declaring a `self` link.
	pub fn finish(mut self) -> Result<Schema, SchemaError> {
		for attr in &mut self.attrs {
			attr.freeze();
		}

		let mut curies: Vec<Curie> = Vec::new();
		for attr in &self.attrs {
			if let Some(curie) = attr.curie_ref()
				&& !curies.iter().any(|known| known.name() == curie.name())
			{
				curies.push(curie.clone());
			}
		}

		for attr in &self.attrs {
			if !attr.is_embedded() {
				continue;
			}
			let Some(schema) = attr.backing_schema() else {
				return Err(SchemaError::EmbeddedNotSchema(attr.name().to_string()));
			};
			if !schema.has_self_link() {
				return Err(SchemaError::MissingSelfLink {
					attr: attr.name().to_string(),
					schema: schema.name().to_string(),
				});
			}
		}

		debug!(schema = %self.name, attrs = self.attrs.len(), curies = curies.len(), "schema built");
		Ok(Schema { name: self.name, attrs: self.attrs, curies })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::scalar::{Int, Str};
	use crate::types::{List, Nullable};
	use serde_json::json;

	fn book_schema() -> Schema {
		Schema::build("Book")
			.attr(Attr::link("self").path("uri"))
			.attr(Attr::new("title", Str::new()))
			.attr(Attr::new("year", Int::new()))
			.finish()
			.unwrap()
	}

	#[test]
	fn test_serialize_basic_document() {
		let doc = book_schema()
			.serialize(&json!({"uri": "/books/1", "title": "Dune", "year": 1965}))
			.unwrap();

		assert_eq!(
			doc,
			json!({
				"_links": {"self": {"href": "/books/1"}},
				"title": "Dune",
				"year": 1965,
			})
		);
	}

	#[test]
	fn test_serialize_collects_all_failures() {
		let err = book_schema()
			.serialize(&json!({"title": "Dune"}))
			.unwrap_err();

		// self href and year are both missing.
		assert_eq!(err.leaf_count(), 2);
	}

	#[test]
	fn test_deserialize_keys_by_attribute_name() {
		let schema = Schema::build("Stats")
			.attr(Attr::new("total", Int::new()).key("grand_total"))
			.finish()
			.unwrap();

		let result = schema.deserialize(&json!({"grand_total": 7})).unwrap();

		assert_eq!(result, json!({"total": 7}));
	}

	#[test]
	fn test_deserialize_skips_links() {
		let result = book_schema()
			.deserialize(&json!({
				"_links": {"self": {"href": "/books/1"}},
				"title": "Dune",
				"year": 1965,
			}))
			.unwrap();

		assert_eq!(result, json!({"title": "Dune", "year": 1965}));
	}

	#[test]
	fn test_deserialize_root_aggregation() {
		let err = book_schema()
			.deserialize(&json!({"year": "abc"}))
			.unwrap_err();
		let rendered = err.to_value();

		assert_eq!(err.leaf_count(), 2);
		assert_eq!(rendered.get("attr"), Some(&json!("<root>")));
	}

	#[test]
	fn test_deserialize_into_writes_through_accessors() {
		let schema = Schema::build("Stats")
			.attr(Attr::new("total", Int::new()).path("stats.total"))
			.finish()
			.unwrap();
		let mut output = json!({});

		schema
			.deserialize_into(&json!({"total": "4"}), &mut output, &Context::new())
			.unwrap();

		assert_eq!(output, json!({"stats": {"total": 4}}));
	}

	#[test]
	fn test_deserialize_into_writes_nothing_on_failure() {
		let schema = Schema::build("Stats")
			.attr(Attr::new("total", Int::new()))
			.attr(Attr::new("label", Str::new()))
			.finish()
			.unwrap();
		let mut output = json!({});

		let result = schema.deserialize_into(
			&json!({"total": 4, "label": [1]}),
			&mut output,
			&Context::new(),
		);

		assert!(result.is_err());
		assert_eq!(output, json!({}));
	}

	#[test]
	fn test_serialize_obj() {
		#[derive(serde::Serialize)]
		struct Book {
			uri: String,
			title: String,
			year: i64,
		}

		let doc = book_schema()
			.serialize_obj(
				&Book { uri: "/books/1".into(), title: "Dune".into(), year: 1965 },
				&Context::new(),
			)
			.unwrap();

		assert_eq!(doc.get("title"), Some(&json!("Dune")));
	}

	#[test]
	fn test_builder_redeclaration_takes_new_position() {
		let schema = Schema::build("Person")
			.attr(Attr::new("name", Str::new()))
			.attr(Attr::new("age", Int::new()))
			.attr(Attr::new("name", Str::new()).required(false))
			.finish()
			.unwrap();

		let names: Vec<&str> = schema.attrs().iter().map(Attr::name).collect();
		assert_eq!(names, ["age", "name"]);
		assert!(!schema.attrs()[1].is_required());
	}

	#[test]
	fn test_extend_inherits_parent_order() {
		let parent = Schema::build("Base")
			.attr(Attr::new("id", Int::new()))
			.attr(Attr::new("name", Str::new()))
			.finish()
			.unwrap();
		let child = Schema::build("Child")
			.extend(&parent)
			.attr(Attr::new("extra", Str::new()))
			.attr(Attr::new("id", Str::new()))
			.finish()
			.unwrap();

		let names: Vec<&str> = child.attrs().iter().map(Attr::name).collect();
		assert_eq!(names, ["name", "extra", "id"]);
	}

	#[test]
	fn test_embedded_requires_schema_type() {
		let result = Schema::build("Order")
			.attr(Attr::embedded("items", Str::new()))
			.finish();

		assert!(matches!(result, Err(SchemaError::EmbeddedNotSchema(attr)) if attr == "items"));
	}

	#[test]
	fn test_embedded_requires_self_link() {
		let item = Schema::build("Item")
			.attr(Attr::new("sku", Str::new()))
			.finish()
			.unwrap();

		let result = Schema::build("Order")
			.attr(Attr::link("self").path("uri"))
			.attr(Attr::embedded("items", item))
			.finish();

		assert!(matches!(
			result,
			Err(SchemaError::MissingSelfLink { attr, schema }) if attr == "items" && schema == "Item"
		));
	}

	#[test]
	fn test_embedded_through_list_wrapper() {
		let item = Schema::build("Item")
			.attr(Attr::link("self").path("uri"))
			.attr(Attr::new("sku", Str::new()))
			.finish()
			.unwrap();
		let order = Schema::build("Order")
			.attr(Attr::link("self").path("uri"))
			.attr(Attr::embedded("items", List::new(item)))
			.finish()
			.unwrap();

		let doc = order
			.serialize(&json!({
				"uri": "/orders/1",
				"items": [{"uri": "/items/9", "sku": "A-9"}],
			}))
			.unwrap();

		assert_eq!(
			doc["_embedded"]["items"],
			json!([{"_links": {"self": {"href": "/items/9"}}, "sku": "A-9"}])
		);
	}

	#[test]
	fn test_missing_optional_embedded_omits_compartment() {
		let item = Schema::build("Item")
			.attr(Attr::link("self").path("uri"))
			.finish()
			.unwrap();
		let order = Schema::build("Order")
			.attr(Attr::link("self").path("uri"))
			.attr(Attr::embedded("items", item).required(false))
			.finish()
			.unwrap();

		let doc = order.serialize(&json!({"uri": "/orders/1"})).unwrap();

		assert_eq!(doc.get("_embedded"), None);
	}

	#[test]
	fn test_curies_deduplicated_and_emitted_first() {
		let acme = Curie::new("acme", "/docs/{rel}").templated(true);
		let schema = Schema::build("Warehouse")
			.attr(Attr::link("self").path("uri"))
			.attr(Attr::link("warehouse").path("warehouse_uri").curie(acme.clone()))
			.attr(Attr::link("partner").path("partner_uri").curie(acme))
			.finish()
			.unwrap();

		let doc = schema
			.serialize(&json!({
				"uri": "/w/1",
				"warehouse_uri": "/w/1/stock",
				"partner_uri": "/p/2",
			}))
			.unwrap();
		let links = doc["_links"].as_object().unwrap();

		assert_eq!(
			links["curies"],
			json!([{"name": "acme", "href": "/docs/{rel}", "templated": true}])
		);
		assert!(links.contains_key("acme:warehouse"));
		assert!(links.contains_key("acme:partner"));
		assert_eq!(links.keys().next().map(String::as_str), Some("curies"));
	}

	#[test]
	fn test_schema_as_nullable_embedded() {
		let item = Schema::build("Item")
			.attr(Attr::link("self").path("uri"))
			.finish()
			.unwrap();

		let result = Schema::build("Order")
			.attr(Attr::embedded("item", Nullable::new(item)))
			.finish();

		assert!(result.is_ok());
	}

	#[test]
	fn test_context_reaches_getters() {
		let schema = Schema::build("Profile")
			.attr(Attr::new("locale", Str::new()).getter(|_, ctx| ctx.get("locale").cloned()))
			.finish()
			.unwrap();
		let ctx = Context::new().with("locale", json!("en"));

		assert_eq!(
			schema.serialize_with(&json!({}), &ctx).unwrap(),
			json!({"locale": "en"})
		);
	}
}
