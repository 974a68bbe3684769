//! Variant schemas: which variants exist and what data each carries.
//!
//! On the wire a schema is a JSON object mapping each variant name to `true`
//! (unit) or to an object of field descriptors:
//!
//! ```json
//! { "Open": true, "Data": { "value": { "type": "any" } }, "Close": true }
//! ```
pub mod ty;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::discriminant::Discriminant;
use crate::error::SchemaError;

pub use ty::{Field, FieldTy};

pub type Fields = IndexMap<String, Field>;

#[derive(Debug, Clone, PartialEq)]
pub enum VariantDescriptor {
    Unit,
    Data(Fields),
}

impl VariantDescriptor {
    /// Data descriptor; an empty record is the same thing as a unit variant.
    pub fn data(fields: Fields) -> Self {
        if fields.is_empty() { Self::Unit } else { Self::Data(fields) }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Self::Unit => None,
            Self::Data(fields) => Some(fields),
        }
    }

    /// True when the variant may be constructed without any data.
    pub fn all_optional(&self) -> bool {
        self.fields().is_none_or(|fields| fields.values().all(|f| f.optional))
    }
}

impl Serialize for VariantDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unit => serializer.serialize_bool(true),
            Self::Data(fields) => fields.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for VariantDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Fields(Fields),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Ok(Self::Unit),
            Repr::Flag(false) => Err(serde::de::Error::custom(
                "unit variants are written as `true`",
            )),
            Repr::Fields(fields) => Ok(Self::data(fields)),
        }
    }
}

/// Ordered mapping from variant name to descriptor. Zero variants is the
/// uninhabited type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantSchema {
    variants: IndexMap<String, VariantDescriptor>,
}

impl VariantSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(mut self, name: impl Into<String>) -> Self {
        self.insert(name, VariantDescriptor::Unit);
        self
    }

    pub fn data<I, K>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Field)>,
        K: Into<String>,
    {
        let fields = fields.into_iter().map(|(k, f)| (k.into(), f)).collect();
        self.insert(name, VariantDescriptor::data(fields));
        self
    }

    /// Adds or replaces a variant.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: VariantDescriptor) {
        self.variants.insert(name.into(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&VariantDescriptor> {
        self.variants.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variants.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantDescriptor)> {
        self.variants.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    /// Rejects schemas where a data field shadows the discriminant.
    pub fn validate(&self, discriminant: &Discriminant) -> Result<(), SchemaError> {
        for (name, descriptor) in &self.variants {
            let Some(fields) = descriptor.fields() else { continue };
            if fields.contains_key(discriminant.as_str()) {
                return Err(SchemaError::DiscriminantCollision {
                    variant: name.clone(),
                    field: discriminant.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, VariantDescriptor)> for VariantSchema {
    fn from_iter<I: IntoIterator<Item = (String, VariantDescriptor)>>(iter: I) -> Self {
        Self { variants: iter.into_iter().collect() }
    }
}

impl IntoIterator for VariantSchema {
    type Item = (String, VariantDescriptor);
    type IntoIter = indexmap::map::IntoIter<String, VariantDescriptor>;
    fn into_iter(self) -> Self::IntoIter {
        self.variants.into_iter()
    }
}
