//! JSON Schema rendering of a variant schema.
use serde_json::{json, Map, Value};

use crate::discriminant::Discriminant;
use crate::schema::{FieldTy, Fields, VariantSchema};

/// `{"oneOf": [...]}` with one closed object schema per variant.
pub fn emit_json_schema(schema: &VariantSchema, discriminant: &Discriminant) -> Value {
    let arms = schema
        .iter()
        .map(|(name, descriptor)| {
            let mut props = Map::new();
            props.insert(discriminant.to_string(), json!({ "const": name }));
            let mut required = vec![Value::from(discriminant.as_str())];
            if let Some(fields) = descriptor.fields() {
                for (k, f) in fields {
                    props.insert(k.clone(), schema_from_ty(&f.ty));
                    if !f.optional {
                        required.push(Value::from(k.as_str()));
                    }
                }
            }
            json!({
                "type": "object",
                "properties": props,
                "required": required,
                "additionalProperties": false,
            })
        })
        .collect::<Vec<_>>();
    json!({ "oneOf": arms })
}

pub fn schema_from_ty(ty: &FieldTy) -> Value {
    match ty {
        FieldTy::Never => json!({ "not": {} }),
        FieldTy::Any => json!({}),
        FieldTy::Null => json!({ "type": "null" }),
        FieldTy::Bool => json!({ "type": "boolean" }),
        FieldTy::Integer => json!({ "type": "integer" }),
        FieldTy::Number => json!({ "type": "number" }),
        FieldTy::String => json!({ "type": "string" }),
        FieldTy::Array { items } => json!({
            "type": "array",
            "items": schema_from_ty(items),
        }),
        FieldTy::Object { properties } => object_of(properties),
        FieldTy::Nullable { inner } => json!({ "oneOf": [schema_from_ty(inner), { "type": "null" }] }),
    }
}

fn object_of(properties: &Fields) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), Value::from("object"));
    let mut props_map = Map::new();
    let mut required = Vec::new();
    for (k, f) in properties {
        props_map.insert(k.clone(), schema_from_ty(&f.ty));
        if !f.optional {
            required.push(Value::from(k.as_str()));
        }
    }
    map.insert("properties".into(), Value::Object(props_map));
    if !required.is_empty() {
        map.insert("required".into(), Value::Array(required));
    }
    // closed at every depth, as `FieldTy::accepts` is
    map.insert("additionalProperties".into(), Value::Bool(false));
    Value::Object(map)
}
