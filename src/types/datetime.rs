//! ISO-8601 date and date-time types, canonicalized to UTC.

use crate::context::Context;
use crate::error::ValidationError;
use crate::types::{Type, TypeResult, raw, reject_null, run_validators};
use crate::validators::Validator;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

const CANONICAL_DATETIME: &str = "%Y-%m-%dT%H:%M:%SZ";
const CANONICAL_DATE: &str = "%Y-%m-%d";

fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
	if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
		return Some(dt.with_timezone(&Utc));
	}
	for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
		if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
			return Some(naive.and_utc());
		}
	}
	if let Ok(date) = NaiveDate::parse_from_str(input, CANONICAL_DATE) {
		return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
	}
	None
}

/// ISO-8601 date-time, normalized to UTC with whole-second precision and a
/// `Z` suffix. Offsets are converted, fractional seconds dropped.
///
/// # Examples
///
/// ```
/// use hal_schema::{Context, IsoUtcDateTime, Type};
/// use serde_json::json;
///
/// let datetime = IsoUtcDateTime::new();
/// assert_eq!(
/// 	datetime.serialize(&json!("2015-03-26T08:00:00+02:00"), &Context::new()).unwrap(),
/// 	json!("2015-03-26T06:00:00Z")
/// );
/// assert!(datetime.deserialize(&json!("yesterday"), &Context::new()).is_err());
/// ```
#[derive(Clone, Default)]
pub struct IsoUtcDateTime {
	validators: Vec<Arc<dyn Validator>>,
}

impl IsoUtcDateTime {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}

	fn convert(&self, value: &Value) -> TypeResult {
		if value.is_null() {
			return Err(reject_null());
		}
		let parsed = value.as_str().and_then(parse_datetime).ok_or_else(|| {
			ValidationError::value_error(format!(
				"'{}' is not a valid ISO-8601 datetime",
				raw(value)
			))
		})?;
		Ok(json!(parsed.format(CANONICAL_DATETIME).to_string()))
	}
}

impl Type for IsoUtcDateTime {
	fn serialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		self.convert(value)
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		let converted = self.convert(value)?;
		run_validators(&self.validators, &converted, ctx)?;
		Ok(converted)
	}
}

/// ISO-8601 calendar date (`YYYY-MM-DD`).
#[derive(Clone, Default)]
pub struct IsoUtcDate {
	validators: Vec<Arc<dyn Validator>>,
}

impl IsoUtcDate {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}

	fn convert(&self, value: &Value) -> TypeResult {
		if value.is_null() {
			return Err(reject_null());
		}
		let parsed = value
			.as_str()
			.and_then(|s| NaiveDate::parse_from_str(s, CANONICAL_DATE).ok())
			.ok_or_else(|| {
				ValidationError::value_error(format!(
					"'{}' is not a valid ISO-8601 date",
					raw(value)
				))
			})?;
		Ok(json!(parsed.format(CANONICAL_DATE).to_string()))
	}
}

impl Type for IsoUtcDate {
	fn serialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		self.convert(value)
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		let converted = self.convert(value)?;
		run_validators(&self.validators, &converted, ctx)?;
		Ok(converted)
	}
}
