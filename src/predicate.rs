//! `is`: does a value belong to one of the given variants?
use std::collections::{BTreeSet, HashSet};
use indexmap::IndexSet;

use crate::discriminant::Discriminant;
use crate::value::EnumValue;

/// A single variant name or a set of them.
pub trait VariantNames {
    fn contains_variant(&self, name: &str) -> bool;
}

impl VariantNames for str {
    fn contains_variant(&self, name: &str) -> bool {
        self == name
    }
}

impl VariantNames for String {
    fn contains_variant(&self, name: &str) -> bool {
        self == name
    }
}

impl<S: AsRef<str>> VariantNames for [S] {
    fn contains_variant(&self, name: &str) -> bool {
        self.iter().any(|s| s.as_ref() == name)
    }
}

impl<S: AsRef<str>, const N: usize> VariantNames for [S; N] {
    fn contains_variant(&self, name: &str) -> bool {
        self.as_slice().contains_variant(name)
    }
}

impl<S: AsRef<str>> VariantNames for Vec<S> {
    fn contains_variant(&self, name: &str) -> bool {
        self.as_slice().contains_variant(name)
    }
}

impl VariantNames for IndexSet<String> {
    fn contains_variant(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl VariantNames for BTreeSet<String> {
    fn contains_variant(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl VariantNames for HashSet<String> {
    fn contains_variant(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// `is_with` under the default discriminant.
pub fn is<N: VariantNames + ?Sized>(value: &EnumValue, names: &N) -> bool {
    is_with(value, names, &Discriminant::default())
}

/// True iff the value's variant is among `names`. A value without a string
/// discriminant matches nothing.
pub fn is_with<N: VariantNames + ?Sized>(
    value: &EnumValue,
    names: &N,
    discriminant: &Discriminant,
) -> bool {
    value
        .variant(discriminant)
        .is_some_and(|variant| names.contains_variant(variant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open() -> EnumValue {
        EnumValue::from_json(json!({"_type": "Open"}), &Discriminant::default()).unwrap()
    }

    #[test]
    fn single_names() {
        assert!(is(&open(), "Open"));
        assert!(!is(&open(), "Data"));
        assert!(is(&open(), &String::from("Open")));
    }

    #[test]
    fn name_sets() {
        assert!(is(&open(), &["Open", "Close"]));
        assert!(!is(&open(), &["Data", "Close"]));
        assert!(is(&open(), &vec!["Open".to_string()]));
        let set: BTreeSet<String> = ["Close".to_string()].into();
        assert!(!is(&open(), &set));
        let empty: [&str; 0] = [];
        assert!(!is(&open(), &empty));
    }

    #[test]
    fn custom_discriminant() {
        let d = Discriminant::new("custom");
        let v = EnumValue::unit(&d, "Open");
        assert!(is_with(&v, "Open", &d));
        assert!(is_with(&v, &["Open", "Close"], &d));
        assert!(!is(&v, "Open"));
    }
}
