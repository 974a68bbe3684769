//! The outcome type: `Ok` carrying a `value`, `Error` carrying an `error`.
pub mod attempt;

use serde_json::Value;

use crate::discriminant::Discriminant;
use crate::error::{MatchError, SchemaError};
use crate::matcher::Matcher;
use crate::predicate::is_with;
use crate::schema::{Field, FieldTy, VariantSchema};
use crate::value::EnumValue;

pub use attempt::{attempt, attempt_async, capture, Attempted};

pub const OK: &str = "Ok";
pub const ERROR: &str = "Error";
pub const VALUE_FIELD: &str = "value";
pub const ERROR_FIELD: &str = "error";

/// `{Ok: {value?: any}, Error: {error?: any}}`
pub fn outcome_schema() -> VariantSchema {
    VariantSchema::new()
        .data(OK, [(VALUE_FIELD, Field::optional(FieldTy::Any))])
        .data(ERROR, [(ERROR_FIELD, Field::optional(FieldTy::Any))])
}

/// Outcome with required, typed payloads.
pub fn outcome_schema_of(value: FieldTy, error: FieldTy) -> VariantSchema {
    VariantSchema::new()
        .data(OK, [(VALUE_FIELD, Field::required(value))])
        .data(ERROR, [(ERROR_FIELD, Field::required(error))])
}

/// Outcome helpers bound to one discriminant.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    discriminant: Discriminant,
}

impl Outcome {
    pub fn new(discriminant: impl Into<Discriminant>) -> Result<Self, SchemaError> {
        let discriminant = discriminant.into();
        outcome_schema().validate(&discriminant)?;
        Ok(Self { discriminant })
    }

    pub fn discriminant(&self) -> &Discriminant {
        &self.discriminant
    }

    pub fn ok(&self, value: impl Into<Option<Value>>) -> EnumValue {
        self.variant(OK, VALUE_FIELD, value.into())
    }

    pub fn error(&self, error: impl Into<Option<Value>>) -> EnumValue {
        self.variant(ERROR, ERROR_FIELD, error.into())
    }

    pub fn is_ok(&self, value: &EnumValue) -> bool {
        is_with(value, OK, &self.discriminant)
    }

    pub fn is_error(&self, value: &EnumValue) -> bool {
        is_with(value, ERROR, &self.discriminant)
    }

    /// Back to a std `Result`, payloads left as JSON.
    pub fn split(&self, value: &EnumValue) -> Result<Result<Option<Value>, Option<Value>>, MatchError> {
        Matcher::with_discriminant(self.discriminant.clone())
            .on_fn(OK, |v| Ok(v.get(VALUE_FIELD).cloned()))
            .on_fn(ERROR, |v| Err(v.get(ERROR_FIELD).cloned()))
            .run(value)
    }

    fn variant(&self, name: &str, field: &str, payload: Option<Value>) -> EnumValue {
        let out = EnumValue::unit(&self.discriminant, name);
        match payload {
            Some(payload) => out.with_field(field, payload),
            None => out,
        }
    }
}

pub fn ok(value: impl Into<Option<Value>>) -> EnumValue {
    Outcome::default().ok(value)
}

pub fn error(error: impl Into<Option<Value>>) -> EnumValue {
    Outcome::default().error(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::is;
    use serde_json::json;

    #[test]
    fn constructors_omit_absent_payloads() {
        assert_eq!(ok(json!(42)).into_json(), json!({"_type": "Ok", "value": 42}));
        assert_eq!(ok(None).into_json(), json!({"_type": "Ok"}));
        assert_eq!(error(json!("boom")).into_json(), json!({"_type": "Error", "error": "boom"}));
        assert_eq!(error(None).into_json(), json!({"_type": "Error"}));
    }

    #[test]
    fn values_conform_to_the_schema() {
        let d = Discriminant::default();
        let s = outcome_schema();
        assert!(ok(json!(1)).conforms(&s, &d).is_ok());
        assert!(error(None).conforms(&s, &d).is_ok());
        let typed = outcome_schema_of(FieldTy::Integer, FieldTy::String);
        assert!(ok(json!(1)).conforms(&typed, &d).is_ok());
        assert!(ok(None).conforms(&typed, &d).is_err());
        assert!(error(json!(1)).conforms(&typed, &d).is_err());
    }

    #[test]
    fn predicates_and_split() {
        let o = Outcome::default();
        let v = o.ok(json!("foo"));
        assert!(o.is_ok(&v) && !o.is_error(&v) && is(&v, OK));
        assert_eq!(o.split(&v), Ok(Ok(Some(json!("foo")))));
        assert_eq!(o.split(&o.error(None)), Ok(Err(None)));
        let stranger = EnumValue::unit(o.discriminant(), "Pending");
        assert!(o.split(&stranger).is_err());
    }

    #[test]
    fn custom_discriminant() {
        let o = Outcome::new("is").unwrap();
        assert_eq!(o.ok(json!(1)).into_json(), json!({"is": "Ok", "value": 1}));
        assert!(Outcome::new("value").is_err());
    }
}
