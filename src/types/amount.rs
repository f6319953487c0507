use crate::context::Context;
use crate::error::ValidationError;
use crate::types::{Type, TypeResult, raw, reject_null, run_validators};
use crate::validators::Validator;
use rust_decimal::Decimal;
use serde_json::{Map, Value, json};
use std::str::FromStr;
use std::sync::Arc;

/// Money type: a currency code from an allowed set plus a decimal amount
/// with at most two fractional digits.
///
/// Deserializes either the combined form `"EUR35.50"` or the object form
/// `{"currency": "EUR", "amount": "35.50"}`; the canonical result is the
/// object form with the amount normalized (trailing zeros dropped).
/// Serialization takes the object form and quantizes the amount to two
/// decimal places. Amounts are handled with [`rust_decimal::Decimal`], not
/// floats.
///
/// # Examples
///
/// ```
/// use hal_schema::{Amount, Context, Type};
/// use serde_json::json;
///
/// let amount = Amount::new(["EUR", "USD"]);
/// assert_eq!(
/// 	amount.deserialize(&json!("EUR35.50"), &Context::new()).unwrap(),
/// 	json!({"amount": "35.5", "currency": "EUR"})
/// );
/// assert_eq!(
/// 	amount.serialize(&json!({"currency": "USD", "amount": "1"}), &Context::new()).unwrap(),
/// 	json!({"amount": "1.00", "currency": "USD"})
/// );
/// ```
#[derive(Clone)]
pub struct Amount {
	currencies: Vec<String>,
	validators: Vec<Arc<dyn Validator>>,
}

impl Amount {
	pub fn new<C: Into<String>>(currencies: impl IntoIterator<Item = C>) -> Self {
		Self {
			currencies: currencies.into_iter().map(Into::into).collect(),
			validators: Vec::new(),
		}
	}

	pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
		self.validators.push(Arc::new(validator));
		self
	}

	fn check_currency(&self, currency: &str) -> Result<(), ValidationError> {
		if self.currencies.iter().any(|c| c == currency) {
			Ok(())
		} else {
			Err(ValidationError::value_error(format!(
				"'{currency}' is not a valid currency."
			)))
		}
	}

	fn split_object(value: &Map<String, Value>) -> Result<(String, String), ValidationError> {
		if value.len() != 2 || !value.contains_key("currency") || !value.contains_key("amount") {
			return Err(ValidationError::value_error(
				"Amount object has to have currency and amount fields.",
			));
		}
		let currency = raw(&value["currency"]);
		let amount = raw(&value["amount"]);
		Ok((currency, amount))
	}

	fn parse_decimal(amount: &str) -> Result<Decimal, ValidationError> {
		Decimal::from_str(amount)
			.map(|d| d.normalize())
			.map_err(|_| {
				ValidationError::value_error(format!("'{amount}' cannot be parsed to decimal."))
			})
	}
}

impl Type for Amount {
	fn serialize(&self, value: &Value, _ctx: &Context) -> TypeResult {
		let Value::Object(fields) = value else {
			if value.is_null() {
				return Err(reject_null());
			}
			return Err(ValidationError::value_error(
				"Value cannot be parsed to Amount.",
			));
		};
		let (currency, amount) = Self::split_object(fields)?;
		self.check_currency(&currency)?;
		let amount = Self::parse_decimal(&amount)?.round_dp(2);
		Ok(json!({
			"amount": format!("{amount:.2}"),
			"currency": currency,
		}))
	}

	fn deserialize(&self, value: &Value, ctx: &Context) -> TypeResult {
		let (currency, amount) = match value {
			Value::Null => return Err(reject_null()),
			Value::String(combined) => {
				let Some((currency, amount)) = combined.split_at_checked(3) else {
					return Err(ValidationError::value_error(format!(
						"'{combined}' is not a valid currency."
					)));
				};
				(currency.to_string(), amount.to_string())
			}
			Value::Object(fields) => Self::split_object(fields)?,
			_ => {
				return Err(ValidationError::value_error(
					"Value cannot be parsed to Amount.",
				));
			}
		};

		self.check_currency(&currency)?;

		let amount = Self::parse_decimal(&amount)?;
		if amount.scale() > 2 {
			return Err(ValidationError::value_error(format!(
				"'{amount}' has more than 2 decimal places."
			)));
		}

		let converted = json!({
			"amount": amount.to_string(),
			"currency": currency,
		});
		run_validators(&self.validators, &converted, ctx)?;
		Ok(converted)
	}
}
