//! Runtime type descriptors for variant data fields.
//!
//! `FieldTy::join` is the least upper bound used by both schema merging
//! (where `None` means the two descriptors conflict) and inference (where a
//! conflict widens to `any`).
use std::fmt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldTy {
    /// Uninhabited; only ever seen as the item type of always-empty arrays.
    Never,
    Any,
    Null,
    #[serde(rename = "boolean")]
    Bool,
    Integer,
    Number,
    String,
    Array { items: Box<FieldTy> },
    Object { properties: IndexMap<String, Field> },
    Nullable { inner: Box<FieldTy> },
}

/// A named slot of a data variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(flatten)]
    pub ty: FieldTy,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl Field {
    pub fn required(ty: FieldTy) -> Self {
        Self { ty, optional: false }
    }
    pub fn optional(ty: FieldTy) -> Self {
        Self { ty, optional: true }
    }
}

impl FieldTy {
    pub fn array(items: FieldTy) -> Self {
        Self::Array { items: Box::new(items) }
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Field)>,
        K: Into<String>,
    {
        Self::Object {
            properties: properties.into_iter().map(|(k, f)| (k.into(), f)).collect(),
        }
    }

    /// `T ∪ null`, collapsing the cases that are already nullable.
    pub fn nullable(inner: FieldTy) -> Self {
        match inner {
            Self::Never | Self::Null => Self::Null,
            Self::Any => Self::Any,
            Self::Nullable { .. } => inner,
            other => Self::Nullable { inner: Box::new(other) },
        }
    }

    /// Observe a single JSON value.
    pub fn of(v: &Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(xs) => {
                let mut item = Self::Never;
                for x in xs {
                    item = Self::join(&item, &Self::of(x)).unwrap_or(Self::Any);
                }
                Self::array(item)
            }
            Value::Object(m) => Self::Object {
                properties: m
                    .iter()
                    .map(|(k, v)| (k.clone(), Field::required(Self::of(v))))
                    .collect(),
            },
        }
    }

    pub fn accepts(&self, v: &Value) -> bool {
        match self {
            Self::Never => false,
            Self::Any => true,
            Self::Null => v.is_null(),
            Self::Bool => v.is_boolean(),
            Self::Integer => v.is_i64() || v.is_u64(),
            Self::Number => v.is_number(),
            Self::String => v.is_string(),
            Self::Array { items } => v
                .as_array()
                .is_some_and(|xs| xs.iter().all(|x| items.accepts(x))),
            Self::Object { properties } => v
                .as_object()
                .is_some_and(|m| record_accepts(properties, m)),
            Self::Nullable { inner } => v.is_null() || inner.accepts(v),
        }
    }

    /// Least upper bound. `None` when no descriptor short of `any` covers both.
    pub fn join(a: &Self, b: &Self) -> Option<Self> {
        let out = match (a, b) {
            _ if a == b => a.clone(),
            (Self::Never, x) | (x, Self::Never) => x.clone(),
            (Self::Any, _) | (_, Self::Any) => Self::Any,
            (Self::Integer, Self::Number) | (Self::Number, Self::Integer) => Self::Number,
            (Self::Null, x) | (x, Self::Null) => Self::nullable(x.clone()),
            (Self::Nullable { inner: x }, Self::Nullable { inner: y }) => {
                Self::nullable(Self::join(x, y)?)
            }
            (Self::Nullable { inner: x }, y) | (y, Self::Nullable { inner: x }) => {
                Self::nullable(Self::join(x, y)?)
            }
            (Self::Array { items: x }, Self::Array { items: y }) => Self::array(Self::join(x, y)?),
            (Self::Object { properties: x }, Self::Object { properties: y }) => Self::Object {
                properties: join_properties(x, y)?,
            },
            _ => return None,
        };
        Some(out)
    }
}

fn record_accepts(properties: &IndexMap<String, Field>, m: &Map<String, Value>) -> bool {
    m.keys().all(|k| properties.contains_key(k))
        && properties.iter().all(|(k, f)| match m.get(k) {
            None => f.optional,
            Some(x) => f.ty.accepts(x),
        })
}

// a key missing on one side can be absent in the joined record
fn join_properties(
    a: &IndexMap<String, Field>,
    b: &IndexMap<String, Field>,
) -> Option<IndexMap<String, Field>> {
    let mut out = IndexMap::new();
    for (k, fa) in a {
        let field = match b.get(k) {
            None => Field::optional(fa.ty.clone()),
            Some(fb) => Field {
                ty: FieldTy::join(&fa.ty, &fb.ty)?,
                optional: fa.optional || fb.optional,
            },
        };
        out.insert(k.clone(), field);
    }
    for (k, fb) in b {
        if !out.contains_key(k) {
            out.insert(k.clone(), Field::optional(fb.ty.clone()));
        }
    }
    Some(out)
}

impl fmt::Display for FieldTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("never"),
            Self::Any => f.write_str("any"),
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Array { items } => write!(f, "array<{items}>"),
            Self::Nullable { inner } => write!(f, "nullable<{inner}>"),
            Self::Object { properties } => {
                f.write_str("object{")?;
                for (i, (k, field)) in properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    let q = if field.optional { "?" } else { "" };
                    write!(f, "{k}{q}: {}", field.ty)?;
                }
                f.write_str("}")
            }
        }
    }
}
