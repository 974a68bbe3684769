//! Runtime enum values: a JSON record holding the discriminant plus the
//! variant's own fields at the top level.
use std::fmt;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::discriminant::Discriminant;
use crate::error::ValueError;
use crate::schema::{Fields, VariantDescriptor, VariantSchema};

/// Always carries a string discriminant: values are only built through
/// `unit`, `literal`, `from_json` or `TryFrom<Value>`. There is no
/// `Deserialize`; parse into a `Value` and go through `from_json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnumValue(Map<String, Value>);

impl EnumValue {
    pub fn unit(discriminant: &Discriminant, variant: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(discriminant.to_string(), Value::String(variant.into()));
        Self(map)
    }

    /// Direct literal construction, bypassing any builder.
    pub fn literal(
        discriminant: &Discriminant,
        variant: impl Into<String>,
        data: Map<String, Value>,
    ) -> Result<Self, ValueError> {
        let variant = variant.into();
        if data.contains_key(discriminant.as_str()) {
            return Err(ValueError::DiscriminantInData {
                variant,
                discriminant: discriminant.to_string(),
            });
        }
        let mut out = Self::unit(discriminant, variant);
        out.0.extend(data);
        Ok(out)
    }

    /// Accepts any JSON object carrying a string discriminant.
    pub fn from_json(value: Value, discriminant: &Discriminant) -> Result<Self, ValueError> {
        let Value::Object(map) = value else {
            return Err(ValueError::NotAnObject { found: json_kind(&value) });
        };
        if !map.get(discriminant.as_str()).is_some_and(Value::is_string) {
            return Err(ValueError::MissingDiscriminant {
                discriminant: discriminant.to_string(),
            });
        }
        Ok(Self(map))
    }

    /// The variant name, if the discriminant field holds a string.
    pub fn variant(&self, discriminant: &Discriminant) -> Option<&str> {
        self.0.get(discriminant.as_str()).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Data fields, i.e. everything except the discriminant.
    pub fn data<'a>(
        &'a self,
        discriminant: &'a Discriminant,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        self.0.iter().filter(move |(k, _)| k.as_str() != discriminant.as_str())
    }

    pub(crate) fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }

    /// Checks this value against `schema`: known variant, only that variant's
    /// fields, required fields present and well typed.
    pub fn conforms(
        &self,
        schema: &VariantSchema,
        discriminant: &Discriminant,
    ) -> Result<(), ValueError> {
        let variant = self.variant(discriminant).ok_or_else(|| ValueError::MissingDiscriminant {
            discriminant: discriminant.to_string(),
        })?;
        let descriptor = schema.get(variant).ok_or_else(|| ValueError::UnknownVariant {
            variant: variant.to_string(),
        })?;
        check_data(variant, descriptor, &self.0, discriminant)
    }
}

pub(crate) fn check_data(
    variant: &str,
    descriptor: &VariantDescriptor,
    record: &Map<String, Value>,
    discriminant: &Discriminant,
) -> Result<(), ValueError> {
    let empty = Fields::new();
    let fields = descriptor.fields().unwrap_or(&empty);
    for (key, value) in record {
        if key == discriminant.as_str() {
            continue;
        }
        let Some(field) = fields.get(key) else {
            return Err(ValueError::StrayField {
                variant: variant.to_string(),
                field: key.clone(),
            });
        };
        if !field.ty.accepts(value) {
            return Err(ValueError::FieldType {
                variant: variant.to_string(),
                field: key.clone(),
                expected: field.ty.clone(),
            });
        }
    }
    for (name, field) in fields {
        if !field.optional && !record.contains_key(name) {
            return Err(ValueError::MissingField {
                variant: variant.to_string(),
                field: name.clone(),
            });
        }
    }
    Ok(())
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

/// `from_json` under the default discriminant.
impl TryFrom<Value> for EnumValue {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, ValueError> {
        Self::from_json(value, &Discriminant::default())
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        v.into_json()
    }
}

pub(crate) fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, FieldTy};
    use serde_json::json;

    fn click() -> VariantSchema {
        VariantSchema::new()
            .unit("PageLoad")
            .data("Click", [
                ("x", Field::required(FieldTy::Integer)),
                ("y", Field::required(FieldTy::Integer)),
            ])
    }

    #[test]
    fn literal_matches_unit_and_data_shapes() {
        let d = Discriminant::default();
        let v = EnumValue::literal(&d, "Click", json!({"x": 4, "y": 20}).as_object().unwrap().clone()).unwrap();
        assert_eq!(v.into_json(), json!({"_type": "Click", "x": 4, "y": 20}));
        assert_eq!(EnumValue::unit(&d, "PageLoad").into_json(), json!({"_type": "PageLoad"}));
        let clash = json!({"_type": "Other"}).as_object().unwrap().clone();
        assert!(matches!(
            EnumValue::literal(&d, "Click", clash),
            Err(ValueError::DiscriminantInData { .. })
        ));
    }

    #[test]
    fn from_json_requires_string_discriminant() {
        let d = Discriminant::default();
        assert_eq!(
            EnumValue::from_json(json!([1]), &d),
            Err(ValueError::NotAnObject { found: "array" })
        );
        assert!(EnumValue::from_json(json!({"_type": 3}), &d).is_err());
        let v = EnumValue::from_json(json!({"kind": "A"}), &Discriminant::new("kind")).unwrap();
        assert_eq!(v.variant(&Discriminant::new("kind")), Some("A"));
        assert_eq!(v.variant(&d), None);
    }

    #[test]
    fn conforms_rejects_stray_missing_and_mistyped_fields() {
        let d = Discriminant::default();
        let s = click();
        let ok = EnumValue::from_json(json!({"_type": "Click", "x": 1, "y": 2}), &d).unwrap();
        assert!(ok.conforms(&s, &d).is_ok());

        let stray = EnumValue::from_json(json!({"_type": "PageLoad", "x": 1}), &d).unwrap();
        assert!(matches!(stray.conforms(&s, &d), Err(ValueError::StrayField { .. })));

        let missing = EnumValue::from_json(json!({"_type": "Click", "x": 1}), &d).unwrap();
        assert!(matches!(missing.conforms(&s, &d), Err(ValueError::MissingField { .. })));

        let mistyped = EnumValue::from_json(json!({"_type": "Click", "x": 1, "y": "2"}), &d).unwrap();
        assert!(matches!(mistyped.conforms(&s, &d), Err(ValueError::FieldType { .. })));

        let unknown = EnumValue::from_json(json!({"_type": "Paste"}), &d).unwrap();
        assert!(matches!(unknown.conforms(&s, &d), Err(ValueError::UnknownVariant { .. })));
    }

    #[test]
    fn json_conversion_keeps_the_discriminant_invariant() {
        assert_eq!(
            EnumValue::try_from(json!({"x": 1})),
            Err(ValueError::MissingDiscriminant { discriminant: "_type".into() })
        );
        let v = EnumValue::try_from(json!({"_type": "A", "x": 1})).unwrap();
        assert_eq!(v.variant(&Discriminant::default()), Some("A"));
        assert_eq!(Value::from(v), json!({"_type": "A", "x": 1}));
    }

    #[test]
    fn data_skips_discriminant() {
        let d = Discriminant::default();
        let v = EnumValue::from_json(json!({"_type": "Click", "x": 1, "y": 2}), &d).unwrap();
        let keys: Vec<_> = v.data(&d).map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["x", "y"]);
        assert_eq!(v.to_string(), r#"{"_type":"Click","x":1,"y":2}"#);
    }
}
