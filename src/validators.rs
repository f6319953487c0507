//! Value-level validators for schema types.
//!
//! Validators run during deserialization, after conversion. They are
//! side-effect free and composable: a type may carry several, and every
//! failure is collected rather than only the first. Bounds may be lazy so
//! limits can depend on validation time (a deadline, "now").

use crate::context::Context;
use crate::error::ValidationError;
use serde_json::Value;
use std::sync::Arc;

/// A value-level check. Returns `Ok(())` on success.
pub trait Validator: Send + Sync {
	fn validate(&self, value: &Value, ctx: &Context) -> Result<(), ValidationError>;
}

/// A comparison bound: a constant, or a producer evaluated each time the
/// bound is needed.
///
/// # Examples
///
/// ```
/// use hal_schema::Bound;
///
/// let fixed: Bound<f64> = 10.0.into();
/// assert_eq!(fixed.resolve(), 10.0);
///
/// let lazy = Bound::lazy(|| 2.0 + 3.0);
/// assert_eq!(lazy.resolve(), 5.0);
/// ```
#[derive(Clone)]
pub enum Bound<T> {
	Value(T),
	Lazy(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Copy> Bound<T> {
	pub fn lazy(producer: impl Fn() -> T + Send + Sync + 'static) -> Self {
		Bound::Lazy(Arc::new(producer))
	}

	pub fn resolve(&self) -> T {
		match self {
			Bound::Value(v) => *v,
			Bound::Lazy(f) => f(),
		}
	}
}

impl<T> From<T> for Bound<T> {
	fn from(value: T) -> Self {
		Bound::Value(value)
	}
}

impl<T: std::fmt::Debug + Copy> std::fmt::Debug for Bound<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Bound::Value(v) => write!(f, "{v:?}"),
			Bound::Lazy(_) => write!(f, "<lazy>"),
		}
	}
}

fn as_number(value: &Value) -> Result<f64, ValidationError> {
	value
		.as_f64()
		.ok_or_else(|| ValidationError::type_error(format!("'{}' is not a number", crate::types::raw(value))))
}

/// Validates that a numeric value falls within an optional `[min, max]`
/// range. Missing bounds are unbounded on that side.
///
/// # Examples
///
/// ```
/// use hal_schema::{Context, Range, Validator};
/// use serde_json::json;
///
/// let range = Range::new().with_min(18.0).with_max(120.0);
/// assert!(range.validate(&json!(30), &Context::new()).is_ok());
/// assert!(range.validate(&json!(7), &Context::new()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Range {
	min: Option<Bound<f64>>,
	max: Option<Bound<f64>>,
	min_err: Option<String>,
	max_err: Option<String>,
}

impl Range {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_min(mut self, min: impl Into<Bound<f64>>) -> Self {
		self.min = Some(min.into());
		self
	}

	pub fn with_max(mut self, max: impl Into<Bound<f64>>) -> Self {
		self.max = Some(max.into());
		self
	}

	/// Custom message used verbatim when the value is below the minimum.
	pub fn with_min_message(mut self, message: impl Into<String>) -> Self {
		self.min_err = Some(message.into());
		self
	}

	/// Custom message used verbatim when the value is above the maximum.
	pub fn with_max_message(mut self, message: impl Into<String>) -> Self {
		self.max_err = Some(message.into());
		self
	}
}

impl Validator for Range {
	fn validate(&self, value: &Value, _ctx: &Context) -> Result<(), ValidationError> {
		let number = as_number(value)?;

		if let Some(min) = &self.min {
			let min = min.resolve();
			if number < min {
				let message = self.min_err.clone().unwrap_or_else(|| {
					format!("{} is less than minimum value {min}", crate::types::raw(value))
				});
				return Err(ValidationError::validation(message));
			}
		}

		if let Some(max) = &self.max {
			let max = max.resolve();
			if number > max {
				let message = self.max_err.clone().unwrap_or_else(|| {
					format!("{} is greater than maximum value {max}", crate::types::raw(value))
				});
				return Err(ValidationError::validation(message));
			}
		}

		Ok(())
	}
}

/// Validates that a numeric value is less than or equal to a bound.
#[derive(Debug, Clone)]
pub struct LessThanEqual {
	value: Bound<f64>,
	message: Option<String>,
}

impl LessThanEqual {
	pub fn new(value: impl Into<Bound<f64>>) -> Self {
		Self { value: value.into(), message: None }
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}
}

impl Validator for LessThanEqual {
	fn validate(&self, value: &Value, _ctx: &Context) -> Result<(), ValidationError> {
		let number = as_number(value)?;
		let bound = self.value.resolve();
		if number > bound {
			let message = self
				.message
				.clone()
				.unwrap_or_else(|| format!("{} is bigger than {bound}", crate::types::raw(value)));
			return Err(ValidationError::validation(message));
		}
		Ok(())
	}
}

/// Validates that a numeric value is greater than or equal to a bound.
#[derive(Debug, Clone)]
pub struct GreatThanEqual {
	value: Bound<f64>,
	message: Option<String>,
}

impl GreatThanEqual {
	pub fn new(value: impl Into<Bound<f64>>) -> Self {
		Self { value: value.into(), message: None }
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}
}

impl Validator for GreatThanEqual {
	fn validate(&self, value: &Value, _ctx: &Context) -> Result<(), ValidationError> {
		let number = as_number(value)?;
		let bound = self.value.resolve();
		if number < bound {
			let message = self
				.message
				.clone()
				.unwrap_or_else(|| format!("{} is smaller than {bound}", crate::types::raw(value)));
			return Err(ValidationError::validation(message));
		}
		Ok(())
	}
}

/// Validates the length of an array or string against optional bounds.
///
/// Values without a length (numbers, booleans, objects, null) are an
/// error: the historical behavior of treating them as length 0 hid type
/// mistakes.
///
/// # Examples
///
/// ```
/// use hal_schema::{Context, Length, Validator};
/// use serde_json::json;
///
/// let length = Length::new().with_min(1).with_max(3);
/// assert!(length.validate(&json!([1, 2]), &Context::new()).is_ok());
/// assert!(length.validate(&json!([]), &Context::new()).is_err());
/// assert!(length.validate(&json!("abcd"), &Context::new()).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Length {
	min_length: Option<Bound<usize>>,
	max_length: Option<Bound<usize>>,
	min_err: Option<String>,
	max_err: Option<String>,
}

impl Length {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_min(mut self, min: impl Into<Bound<usize>>) -> Self {
		self.min_length = Some(min.into());
		self
	}

	pub fn with_max(mut self, max: impl Into<Bound<usize>>) -> Self {
		self.max_length = Some(max.into());
		self
	}

	pub fn with_min_message(mut self, message: impl Into<String>) -> Self {
		self.min_err = Some(message.into());
		self
	}

	pub fn with_max_message(mut self, message: impl Into<String>) -> Self {
		self.max_err = Some(message.into());
		self
	}
}

impl Validator for Length {
	fn validate(&self, value: &Value, _ctx: &Context) -> Result<(), ValidationError> {
		let length = match value {
			Value::Array(items) => items.len(),
			Value::String(s) => s.chars().count(),
			_ => {
				return Err(ValidationError::type_error(format!(
					"'{}' has no length",
					crate::types::raw(value)
				)));
			}
		};

		if let Some(min) = &self.min_length {
			let min = min.resolve();
			if length < min {
				let message = self
					.min_err
					.clone()
					.unwrap_or_else(|| format!("Length is less than {min}"));
				return Err(ValidationError::validation(message));
			}
		}

		if let Some(max) = &self.max_length {
			let max = max.resolve();
			if length > max {
				let message = self
					.max_err
					.clone()
					.unwrap_or_else(|| format!("Length is greater than {max}"));
				return Err(ValidationError::validation(message));
			}
		}

		Ok(())
	}
}
