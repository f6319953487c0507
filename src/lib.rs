//! # hal-schema
//!
//! Declarative serialization and validation of HAL (Hypertext Application
//! Language) documents.
//!
//! A [`Schema`] declares, once, how a resource representation is shaped:
//! which attributes it carries, how each is typed and validated, where each
//! value lives on the carrier object, and which attributes render into the
//! HAL `_links` and `_embedded` compartments. The same schema then drives
//! both directions:
//!
//! - **serialize**: domain data (a [`serde_json::Value`] or anything
//!   `serde`-serializable) into a HAL document,
//! - **deserialize**: an untrusted HAL document back into a validated
//!   canonical form, collecting *every* failure into one structured
//!   [`ValidationError`] tree instead of stopping at the first.
//!
//! ## Example
//!
//! ```
//! use hal_schema::{Attr, Int, Schema, Str};
//! use serde_json::json;
//!
//! let book = Schema::build("Book")
//! 	.attr(Attr::link("self").path("uri"))
//! 	.attr(Attr::new("title", Str::new()))
//! 	.attr(Attr::new("year", Int::new()).required(false))
//! 	.finish()?;
//!
//! let doc = book.serialize(&json!({"uri": "/books/1", "title": "Dune", "year": 1965}))?;
//! assert_eq!(
//! 	doc,
//! 	json!({
//! 		"_links": {"self": {"href": "/books/1"}},
//! 		"title": "Dune",
//! 		"year": 1965,
//! 	})
//! );
//!
//! let parsed = book.deserialize(&doc)?;
//! assert_eq!(parsed, json!({"title": "Dune", "year": 1965}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error reporting
//!
//! Deserialization visits every attribute and every list element before
//! reporting, so one round trip surfaces the complete set of problems.
//! [`ValidationError::to_value`] renders the tree as JSON ready to put on a
//! 4xx response body.

pub mod accessor;
pub mod attr;
pub mod context;
pub mod error;
pub mod schema;
pub mod types;
pub mod validators;

pub use accessor::{Accessor, GetterFn, SetterFn};
pub use attr::{Attr, Compartment, Curie, DefaultValue};
pub use context::Context;
pub use error::{ErrorKind, ErrorNode, ROOT_ATTR, SchemaError, ValidationError};
pub use schema::{Schema, SchemaBuilder};
pub use types::{
	Amount, Any, Boolean, Enum, Int, IsoUtcDate, IsoUtcDateTime, List, Nullable, Str, Type,
	TypeResult,
};
pub use validators::{Bound, GreatThanEqual, Length, LessThanEqual, Range, Validator};
