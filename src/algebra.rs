//! Schema combinators: `keys`, `pick`, `omit`, `merge`, `extend`.
//!
//! All of them are pure and work on schemas only, never on values.
//!
//! Policies:
//! - `pick`/`omit` with a name the schema does not define is an error.
//! - `merge` joins same-named fields with `FieldTy::join`; descriptors with
//!   no common upper bound are a `SchemaError::FieldConflict`. A merged field
//!   is optional only if every contributing schema has it optional.
//! - The two depths differ. A variant's own fields are declarations: a field
//!   named by only one schema is kept as declared (usually required). Inside
//!   an `object` field type the join is a union of records: a key present on
//!   one side only becomes optional, and a key optional on either side stays
//!   optional.
use indexmap::{IndexMap, IndexSet};

use crate::error::SchemaError;
use crate::schema::{Field, FieldTy, Fields, VariantDescriptor, VariantSchema};

pub fn keys(schema: &VariantSchema) -> IndexSet<String> {
    schema.names().map(str::to_string).collect()
}

/// Keep only the named variants (in schema order).
pub fn pick<I, S>(schema: &VariantSchema, names: I) -> Result<VariantSchema, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names = known_names(schema, names)?;
    Ok(select(schema, |name| names.contains(name)))
}

/// Drop the named variants.
pub fn omit<I, S>(schema: &VariantSchema, names: I) -> Result<VariantSchema, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names = known_names(schema, names)?;
    Ok(select(schema, |name| !names.contains(name)))
}

/// Union of the variants of every input; same-named variants have their data
/// fields combined. Variant order is first appearance.
pub fn merge<'a, I>(schemas: I) -> Result<VariantSchema, SchemaError>
where
    I: IntoIterator<Item = &'a VariantSchema>,
{
    let mut out: IndexMap<String, VariantDescriptor> = IndexMap::new();
    for schema in schemas {
        for (name, descriptor) in schema.iter() {
            let merged = match out.get(name) {
                None => descriptor.clone(),
                Some(prev) => merge_descriptor(name, prev, descriptor)?,
            };
            out.insert(name.to_string(), merged);
        }
    }
    tracing::debug!(variants = out.len(), "merged schemas");
    Ok(out.into_iter().collect())
}

/// `merge([schema, new_variants])`.
pub fn extend(
    schema: &VariantSchema,
    new_variants: &VariantSchema,
) -> Result<VariantSchema, SchemaError> {
    merge([schema, new_variants])
}

impl VariantSchema {
    pub fn keys(&self) -> IndexSet<String> {
        keys(self)
    }
    pub fn pick<I, S>(&self, names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pick(self, names)
    }
    pub fn omit<I, S>(&self, names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        omit(self, names)
    }
    pub fn extend(&self, new_variants: &Self) -> Result<Self, SchemaError> {
        extend(self, new_variants)
    }
}

fn known_names<I, S>(schema: &VariantSchema, names: I) -> Result<IndexSet<String>, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = IndexSet::new();
    for name in names {
        let name = name.as_ref();
        if !schema.contains(name) {
            return Err(SchemaError::UnknownVariant { variant: name.to_string() });
        }
        out.insert(name.to_string());
    }
    Ok(out)
}

fn select(schema: &VariantSchema, keep: impl Fn(&str) -> bool) -> VariantSchema {
    schema
        .iter()
        .filter(|(name, _)| keep(*name))
        .map(|(name, d)| (name.to_string(), d.clone()))
        .collect()
}

fn merge_descriptor(
    variant: &str,
    a: &VariantDescriptor,
    b: &VariantDescriptor,
) -> Result<VariantDescriptor, SchemaError> {
    let (fa, fb) = match (a.fields(), b.fields()) {
        (None, None) => return Ok(VariantDescriptor::Unit),
        (Some(f), None) | (None, Some(f)) => return Ok(VariantDescriptor::Data(f.clone())),
        (Some(fa), Some(fb)) => (fa, fb),
    };
    let mut out: Fields = fa.clone();
    for (name, field) in fb {
        let combined = match out.get(name) {
            None => field.clone(),
            Some(prev) => Field {
                ty: FieldTy::join(&prev.ty, &field.ty).ok_or_else(|| {
                    SchemaError::FieldConflict {
                        variant: variant.to_string(),
                        field: name.clone(),
                        left: prev.ty.clone(),
                        right: field.ty.clone(),
                    }
                })?,
                optional: prev.optional && field.optional,
            },
        };
        out.insert(name.clone(), combined);
    }
    Ok(VariantDescriptor::data(out))
}
