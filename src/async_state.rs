//! `Pending` added on top of a schema of settled variants.
//!
//! Purely a shape: nothing here polls or schedules. Callers produce
//! `Pending` while work is outstanding and a settled variant afterwards.
use std::task::Poll;
use serde_json::Value;

use crate::discriminant::Discriminant;
use crate::error::SchemaError;
use crate::predicate::is_with;
use crate::schema::{Field, FieldTy, VariantSchema};
use crate::value::EnumValue;

pub const PENDING: &str = "Pending";
pub const READY: &str = "Ready";
pub const VALUE_FIELD: &str = "value";

/// `{Pending: unit, Ready: {value?: any}}`
pub fn async_schema() -> VariantSchema {
    VariantSchema::new()
        .unit(PENDING)
        .data(READY, [(VALUE_FIELD, Field::optional(FieldTy::Any))])
}

/// `extend(schema, {Pending: unit})`
pub fn async_schema_over(schema: &VariantSchema) -> Result<VariantSchema, SchemaError> {
    schema.extend(&VariantSchema::new().unit(PENDING))
}

#[derive(Debug, Clone, Default)]
pub struct AsyncState {
    discriminant: Discriminant,
}

impl AsyncState {
    pub fn new(discriminant: impl Into<Discriminant>) -> Result<Self, SchemaError> {
        let discriminant = discriminant.into();
        async_schema().validate(&discriminant)?;
        Ok(Self { discriminant })
    }

    pub fn discriminant(&self) -> &Discriminant {
        &self.discriminant
    }

    pub fn pending(&self) -> EnumValue {
        EnumValue::unit(&self.discriminant, PENDING)
    }

    pub fn ready(&self, value: impl Into<Option<Value>>) -> EnumValue {
        let out = EnumValue::unit(&self.discriminant, READY);
        match value.into() {
            Some(value) => out.with_field(VALUE_FIELD, value),
            None => out,
        }
    }

    /// `Poll::Pending` becomes `Pending`; a settled value is passed through.
    pub fn from_poll(&self, poll: Poll<EnumValue>) -> EnumValue {
        match poll {
            Poll::Pending => self.pending(),
            Poll::Ready(settled) => settled,
        }
    }

    /// Anything carrying a variant other than `Pending`.
    pub fn is_settled(&self, value: &EnumValue) -> bool {
        value.variant(&self.discriminant).is_some() && !is_with(value, PENDING, &self.discriminant)
    }
}

pub fn pending() -> EnumValue {
    AsyncState::default().pending()
}

pub fn ready(value: impl Into<Option<Value>>) -> EnumValue {
    AsyncState::default().ready(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{self, outcome_schema};
    use crate::predicate::is;
    use serde_json::json;

    #[test]
    fn ready_and_pending_round_trip() {
        let d = Discriminant::default();
        let r = ready(json!(5));
        assert!(is(&r, READY) && !is(&r, PENDING));
        assert_eq!(r.clone().into_json(), json!({"_type": "Ready", "value": 5}));
        assert!(r.conforms(&async_schema(), &d).is_ok());
        assert_eq!(ready(None).into_json(), json!({"_type": "Ready"}));
        assert_eq!(pending().into_json(), json!({"_type": "Pending"}));
    }

    #[test]
    fn over_outcome_keeps_settled_variants() {
        let s = async_schema_over(&outcome_schema()).unwrap();
        assert_eq!(s.names().collect::<Vec<_>>(), ["Ok", "Error", "Pending"]);
        assert_eq!(s.get("Ok"), outcome_schema().get("Ok"));

        let d = Discriminant::default();
        let ok = outcome::ok(json!(1));
        assert!(is(&ok, "Ok") && ok.conforms(&s, &d).is_ok());
        assert!(is(&pending(), PENDING) && pending().conforms(&s, &d).is_ok());
        assert!(outcome::error(None).conforms(&s, &d).is_ok());
    }

    #[test]
    fn poll_bridge() {
        let a = AsyncState::default();
        assert_eq!(a.from_poll(Poll::Pending), pending());
        let ok = outcome::ok(json!("done"));
        assert_eq!(a.from_poll(Poll::Ready(ok.clone())), ok);
        assert!(a.is_settled(&ok));
        assert!(!a.is_settled(&pending()));
    }

    #[test]
    fn custom_discriminant() {
        let a = AsyncState::new("state").unwrap();
        assert_eq!(a.pending().into_json(), json!({"state": "Pending"}));
        assert!(a.is_settled(&a.ready(json!(0))));
        assert!(!a.is_settled(&pending()));
        assert!(AsyncState::new("value").is_err());
    }
}
