//! Per-variant constructors built eagerly from a schema.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::discriminant::Discriminant;
use crate::error::{SchemaError, ValueError};
use crate::schema::{VariantDescriptor, VariantSchema};
use crate::value::{check_data, json_kind, EnumValue};

/// Turns constructor arguments into a variant's data record.
pub type Mapper = Arc<dyn Fn(&[Value]) -> Map<String, Value> + Send + Sync>;

pub struct Builder<'s> {
    schema: &'s VariantSchema,
    discriminant: Discriminant,
    mappers: HashMap<String, Mapper>,
}

impl<'s> Builder<'s> {
    pub fn new(schema: &'s VariantSchema) -> Self {
        Self {
            schema,
            discriminant: Discriminant::default(),
            mappers: HashMap::new(),
        }
    }

    pub fn discriminant(mut self, discriminant: impl Into<Discriminant>) -> Self {
        self.discriminant = discriminant.into();
        self
    }

    /// Registers a data mapper for `variant`: every argument given to that
    /// variant's constructor is forwarded to `f`.
    pub fn map<F>(mut self, variant: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.mappers.insert(variant.into(), Arc::new(f));
        self
    }

    pub fn build(mut self) -> Result<Constructors, SchemaError> {
        self.schema.validate(&self.discriminant)?;
        if let Some(variant) = self.mappers.keys().find(|k| !self.schema.contains(k)) {
            return Err(SchemaError::UnknownMapper { variant: variant.clone() });
        }
        let table = self
            .schema
            .iter()
            .map(|(name, descriptor)| {
                let ctor = Constructor {
                    discriminant: self.discriminant.clone(),
                    variant: name.to_string(),
                    descriptor: descriptor.clone(),
                    mapper: self.mappers.remove(name),
                };
                (name.to_string(), ctor)
            })
            .collect();
        Ok(Constructors { discriminant: self.discriminant, table })
    }
}

/// `Builder::new(schema).build()`.
pub fn build(schema: &VariantSchema) -> Result<Constructors, SchemaError> {
    Builder::new(schema).build()
}

/// One constructor per variant of the schema it was built from.
#[derive(Clone)]
pub struct Constructors {
    discriminant: Discriminant,
    table: IndexMap<String, Constructor>,
}

impl Constructors {
    pub fn discriminant(&self) -> &Discriminant {
        &self.discriminant
    }

    pub fn get(&self, variant: &str) -> Option<&Constructor> {
        self.table.get(variant)
    }

    pub fn variant(&self, variant: &str) -> Result<&Constructor, SchemaError> {
        self.get(variant).ok_or_else(|| SchemaError::UnknownVariant {
            variant: variant.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constructor> {
        self.table.values()
    }
}

#[derive(Clone)]
pub struct Constructor {
    discriminant: Discriminant,
    variant: String,
    descriptor: VariantDescriptor,
    mapper: Option<Mapper>,
}

impl Constructor {
    pub fn name(&self) -> &str {
        &self.variant
    }

    pub fn descriptor(&self) -> &VariantDescriptor {
        &self.descriptor
    }

    /// Builds a value. Without a mapper, `args` is empty or a single data
    /// record; with one, `args` go to the mapper untouched.
    pub fn call(&self, args: &[Value]) -> Result<EnumValue, ValueError> {
        let data = match &self.mapper {
            Some(f) => f(args),
            None => match args {
                [] => Map::new(),
                [Value::Object(data)] => data.clone(),
                [other] => {
                    return Err(ValueError::DataNotAnObject {
                        variant: self.variant.clone(),
                        found: json_kind(other),
                    });
                }
                _ => {
                    return Err(ValueError::Arity {
                        variant: self.variant.clone(),
                        count: args.len(),
                    });
                }
            },
        };
        let value = EnumValue::literal(&self.discriminant, self.variant.as_str(), data)?;
        check_data(&self.variant, &self.descriptor, value.as_map(), &self.discriminant)?;
        Ok(value)
    }

    /// No-argument call: unit variants and variants whose fields are all optional.
    pub fn unit(&self) -> Result<EnumValue, ValueError> {
        self.call(&[])
    }

    /// Single data record call.
    pub fn with(&self, data: Value) -> Result<EnumValue, ValueError> {
        self.call(std::slice::from_ref(&data))
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("variant", &self.variant)
            .field("mapped", &self.mapper.is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Constructors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructors")
            .field("discriminant", &self.discriminant)
            .field("variants", &self.table.keys().collect::<Vec<_>>())
            .finish()
    }
}
