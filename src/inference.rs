//! Variant schema inference from sample values.
//!
//! Samples are reduced to sufficient statistics: per variant the number of
//! observations, per field its joined type and the number of observations it
//! was present in. The join on evidence is associative and commutative, and
//! idempotent on the solved schema, so sample order never matters.
//!
//! Field types join with `FieldTy::join`; samples with no common upper bound
//! widen to `any` instead of failing.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::discriminant::Discriminant;
use crate::error::ValueError;
use crate::schema::{Field, FieldTy, Fields, VariantDescriptor, VariantSchema};
use crate::value::json_kind;

// ------------------------------- Evidence --------------------------------- //

#[derive(Clone, Debug, Default)]
pub struct Evidence {
    pub variants: IndexMap<String, VariantC>,
}

#[derive(Clone, Debug, Default)]
pub struct VariantC {
    pub seen: u64,
    pub fields: IndexMap<String, FieldC>,
}

#[derive(Clone, Debug)]
pub struct FieldC {
    pub ty: FieldTy,
    pub present_in: u64,
}

impl Evidence {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn observations(&self) -> u64 {
        self.variants.values().map(|v| v.seen).sum()
    }
}

// ------------------------------- Observe ---------------------------------- //

/// Evidence for a single value: one observation of its variant.
pub fn observe_value(v: &Value, discriminant: &Discriminant) -> Result<Evidence, ValueError> {
    let Value::Object(record) = v else {
        return Err(ValueError::NotAnObject { found: json_kind(v) });
    };
    let Some(variant) = record.get(discriminant.as_str()).and_then(Value::as_str) else {
        return Err(ValueError::MissingDiscriminant {
            discriminant: discriminant.to_string(),
        });
    };
    let mut out = Evidence::empty();
    out.variants.insert(variant.to_string(), observe_record(record, discriminant));
    Ok(out)
}

fn observe_record(record: &Map<String, Value>, discriminant: &Discriminant) -> VariantC {
    let fields = record
        .iter()
        .filter(|(k, _)| k.as_str() != discriminant.as_str())
        .map(|(k, v)| (k.clone(), FieldC { ty: FieldTy::of(v), present_in: 1 }))
        .collect();
    VariantC { seen: 1, fields }
}

// --------------------------------- Join ----------------------------------- //

pub fn join(a: &Evidence, b: &Evidence) -> Evidence {
    let mut out = a.clone();
    for (name, vb) in &b.variants {
        let joined = match out.variants.get(name) {
            None => vb.clone(),
            Some(va) => VariantC::join(va, vb),
        };
        out.variants.insert(name.clone(), joined);
    }
    out
}

impl VariantC {
    fn join(a: &Self, b: &Self) -> Self {
        let mut out = Self { seen: a.seen + b.seen, fields: a.fields.clone() };
        for (k, fb) in &b.fields {
            let joined = match out.fields.get(k) {
                None => fb.clone(),
                Some(fa) => FieldC {
                    ty: widen(&fa.ty, &fb.ty),
                    present_in: fa.present_in + fb.present_in,
                },
            };
            out.fields.insert(k.clone(), joined);
        }
        out
    }
}

fn widen(a: &FieldTy, b: &FieldTy) -> FieldTy {
    FieldTy::join(a, b).unwrap_or(FieldTy::Any)
}

// -------------------------------- Solve ----------------------------------- //

pub fn solve(evidence: &Evidence) -> VariantSchema {
    evidence
        .variants
        .iter()
        .map(|(name, v)| {
            let fields: Fields = v
                .fields
                .iter()
                .map(|(k, f)| {
                    let field = if f.present_in == v.seen {
                        Field::required(f.ty.clone())
                    } else {
                        Field::optional(f.ty.clone())
                    };
                    (k.clone(), field)
                })
                .collect();
            (name.clone(), VariantDescriptor::data(fields))
        })
        .collect()
}

// ------------------------------- Front API -------------------------------- //

pub struct Inference {
    discriminant: Discriminant,
    state: Evidence,
    rejected: u64,
}

impl Inference {
    pub fn new(discriminant: impl Into<Discriminant>) -> Self {
        Self {
            discriminant: discriminant.into(),
            state: Evidence::empty(),
            rejected: 0,
        }
    }

    /// Records one sample. Rejected samples leave the evidence untouched and
    /// are counted.
    pub fn observe_value(&mut self, v: &Value) -> Result<(), ValueError> {
        match observe_value(v, &self.discriminant) {
            Ok(obs) => {
                self.state = join(&self.state, &obs);
                Ok(())
            }
            Err(err) => {
                self.rejected += 1;
                tracing::debug!(%err, "sample rejected");
                Err(err)
            }
        }
    }

    /// Folds in evidence gathered elsewhere, e.g. by another worker.
    pub fn absorb(&mut self, other: &Evidence) {
        self.state = join(&self.state, other);
    }

    pub fn evidence(&self) -> &Evidence {
        &self.state
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn solve(&self) -> VariantSchema {
        solve(&self.state)
    }
}

impl Default for Inference {
    fn default() -> Self {
        Self::new(Discriminant::default())
    }
}

/// Infers a schema from the values that are enum values under
/// `discriminant`; the others are skipped.
pub fn infer_from_values<'a, I>(values: I, discriminant: &Discriminant) -> VariantSchema
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut st = Evidence::empty();
    for v in values {
        if let Ok(obs) = observe_value(v, discriminant) {
            st = join(&st, &obs);
        }
    }
    solve(&st)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ev(v: Value) -> Evidence {
        observe_value(&v, &Discriminant::default()).unwrap()
    }

    #[test]
    fn unit_and_data_variants() {
        let samples = [
            json!({"_type": "Open"}),
            json!({"_type": "Data", "value": 1}),
            json!({"_type": "Data", "value": 2.5}),
            json!({"_type": "Close"}),
        ];
        let s = infer_from_values(&samples, &Discriminant::default());
        let expected = VariantSchema::new()
            .unit("Open")
            .data("Data", [("value", Field::required(FieldTy::Number))])
            .unit("Close");
        assert_eq!(s, expected);
    }

    #[test]
    fn requiredness_follows_presence() {
        let samples = [
            json!({"_type": "Note", "text": "a", "tag": null}),
            json!({"_type": "Note", "text": "b"}),
        ];
        let s = infer_from_values(&samples, &Discriminant::default());
        let fields = s.get("Note").unwrap().fields().unwrap();
        assert_eq!(fields["text"], Field::required(FieldTy::String));
        assert_eq!(fields["tag"], Field::optional(FieldTy::Null));
    }

    #[test]
    fn incompatible_samples_widen_to_any() {
        let samples = [
            json!({"_type": "Data", "value": 1, "id": "a"}),
            json!({"_type": "Data", "value": "x", "id": null}),
        ];
        let s = infer_from_values(&samples, &Discriminant::default());
        let fields = s.get("Data").unwrap().fields().unwrap();
        assert_eq!(fields["value"].ty, FieldTy::Any);
        assert_eq!(fields["id"].ty, FieldTy::nullable(FieldTy::String));
    }

    #[test]
    fn rejected_samples_are_counted() {
        let mut inf = Inference::new("kind");
        assert!(inf.observe_value(&json!({"kind": "A", "n": 1})).is_ok());
        assert!(matches!(inf.observe_value(&json!([1])), Err(ValueError::NotAnObject { .. })));
        assert!(matches!(
            inf.observe_value(&json!({"_type": "A"})),
            Err(ValueError::MissingDiscriminant { .. })
        ));
        assert_eq!(inf.rejected(), 2);
        assert_eq!(inf.evidence().observations(), 1);
        assert_eq!(
            inf.solve(),
            VariantSchema::new().data("A", [("n", Field::required(FieldTy::Integer))])
        );
    }

    #[test]
    fn join_laws_idempotent_commutative_associative() {
        let a = ev(json!({"_type": "A", "x": 1}));
        let b = ev(json!({"_type": "A", "x": null, "y": "s"}));
        let c = ev(json!({"_type": "B", "z": [1, 2]}));

        // idempotent
        assert_eq!(solve(&join(&a, &a)), solve(&a));
        // commutative
        assert_eq!(solve(&join(&a, &b)), solve(&join(&b, &a)));
        // associative
        assert_eq!(
            solve(&join(&join(&a, &b), &c)),
            solve(&join(&a, &join(&b, &c)))
        );
    }

    #[test]
    fn absorbing_partial_evidence_matches_sequential() {
        let samples = [
            json!({"_type": "A", "x": 1}),
            json!({"_type": "B"}),
            json!({"_type": "A"}),
        ];
        let mut whole = Inference::default();
        for v in &samples {
            whole.observe_value(v).unwrap();
        }
        let mut left = Inference::default();
        left.observe_value(&samples[0]).unwrap();
        let mut right = Inference::default();
        right.observe_value(&samples[1]).unwrap();
        right.observe_value(&samples[2]).unwrap();
        left.absorb(right.evidence());
        assert_eq!(left.solve(), whole.solve());
    }

    #[test]
    fn inferred_schema_accepts_its_samples() {
        let d = Discriminant::default();
        let samples = [
            json!({"_type": "Click", "x": 4, "y": 20, "meta": {"a": 1}}),
            json!({"_type": "Click", "x": 1, "y": 2, "meta": {"b": true}}),
            json!({"_type": "Key", "code": "Enter"}),
        ];
        let s = infer_from_values(&samples, &d);
        for v in samples {
            let v = crate::value::EnumValue::from_json(v, &d).unwrap();
            assert!(v.conforms(&s, &d).is_ok(), "{v}");
        }
    }
}
