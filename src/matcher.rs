//! Dispatch on the discriminant of an enum value.
//!
//! Three shapes:
//! - exhaustive: no fallback, every variant needs an arm (`check` verifies
//!   this eagerly against a schema);
//! - partial: a fallback arm catches every variant without its own arm;
//! - strict-partial: `otherwise_nothing` yields a [`PartialMatcher`] whose
//!   `run` returns `None` instead of failing.
use indexmap::IndexMap;

use crate::discriminant::Discriminant;
use crate::error::MatchError;
use crate::schema::VariantSchema;
use crate::value::EnumValue;

/// Arm name reserved for the fallback.
pub const FALLBACK_ARM: &str = "_";

pub enum Handler<'h, R> {
    /// Returned as-is (cloned) without inspecting the value.
    Value(R),
    /// Invoked with the matched value.
    Call(Box<dyn Fn(&EnumValue) -> R + Send + Sync + 'h>),
}

impl<R: Clone> Handler<'_, R> {
    fn apply(&self, value: &EnumValue) -> R {
        match self {
            Self::Value(r) => r.clone(),
            Self::Call(f) => f(value),
        }
    }
}

pub struct Matcher<'h, R> {
    discriminant: Discriminant,
    arms: IndexMap<String, Handler<'h, R>>,
    fallback: Option<Handler<'h, R>>,
}

impl<'h, R> Default for Matcher<'h, R> {
    fn default() -> Self {
        Self::with_discriminant(Discriminant::default())
    }
}

impl<'h, R> Matcher<'h, R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discriminant(discriminant: impl Into<Discriminant>) -> Self {
        Self {
            discriminant: discriminant.into(),
            arms: IndexMap::new(),
            fallback: None,
        }
    }

    pub fn arm(mut self, variant: impl Into<String>, handler: Handler<'h, R>) -> Self {
        let variant = variant.into();
        if variant == FALLBACK_ARM {
            self.fallback = Some(handler);
        } else {
            self.arms.insert(variant, handler);
        }
        self
    }

    pub fn on(self, variant: impl Into<String>, value: R) -> Self {
        self.arm(variant, Handler::Value(value))
    }

    pub fn on_fn<F>(self, variant: impl Into<String>, f: F) -> Self
    where
        F: Fn(&EnumValue) -> R + Send + Sync + 'h,
    {
        self.arm(variant, Handler::Call(Box::new(f)))
    }

    pub fn otherwise(self, value: R) -> Self {
        self.arm(FALLBACK_ARM, Handler::Value(value))
    }

    pub fn otherwise_fn<F>(self, f: F) -> Self
    where
        F: Fn(&EnumValue) -> R + Send + Sync + 'h,
    {
        self.arm(FALLBACK_ARM, Handler::Call(Box::new(f)))
    }

    /// No fallback, but unmatched values produce `None` rather than an error.
    /// Any fallback set before is discarded.
    pub fn otherwise_nothing(self) -> PartialMatcher<'h, R> {
        PartialMatcher {
            discriminant: self.discriminant,
            arms: self.arms,
        }
    }

    pub fn is_exhaustive_form(&self) -> bool {
        self.fallback.is_none()
    }

    /// Verifies the arms against `schema`: every arm names a variant, and
    /// without a fallback every variant has an arm.
    pub fn check(&self, schema: &VariantSchema) -> Result<(), MatchError> {
        check_arms(self.arms.keys(), schema)?;
        if self.fallback.is_some() {
            return Ok(());
        }
        let missing: Vec<String> = schema
            .names()
            .filter(|name| !self.arms.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(MatchError::NonExhaustive { missing });
        }
        Ok(())
    }

    /// `check` as a builder step.
    pub fn checked(self, schema: &VariantSchema) -> Result<Self, MatchError> {
        self.check(schema)?;
        Ok(self)
    }
}

impl<R: Clone> Matcher<'_, R> {
    pub fn run(&self, value: &EnumValue) -> Result<R, MatchError> {
        let arm = value
            .variant(&self.discriminant)
            .and_then(|variant| self.arms.get(variant));
        if let Some(handler) = arm {
            return Ok(handler.apply(value));
        }
        match &self.fallback {
            Some(handler) => {
                tracing::trace!(%value, "match fell back to `_`");
                Ok(handler.apply(value))
            }
            None => Err(MatchError::Unhandled { value: value.clone() }),
        }
    }
}

/// Matcher that returns `None` when no arm applies.
pub struct PartialMatcher<'h, R> {
    discriminant: Discriminant,
    arms: IndexMap<String, Handler<'h, R>>,
}

impl<R> PartialMatcher<'_, R> {
    /// Only rejects arms that name no variant of `schema`.
    pub fn check(&self, schema: &VariantSchema) -> Result<(), MatchError> {
        check_arms(self.arms.keys(), schema)
    }
}

impl<R: Clone> PartialMatcher<'_, R> {
    pub fn run(&self, value: &EnumValue) -> Option<R> {
        let variant = value.variant(&self.discriminant)?;
        self.arms.get(variant).map(|handler| handler.apply(value))
    }
}

fn check_arms<'a>(
    arms: impl Iterator<Item = &'a String>,
    schema: &VariantSchema,
) -> Result<(), MatchError> {
    for name in arms {
        if !schema.contains(name) {
            return Err(MatchError::UnknownArm { name: name.clone() });
        }
    }
    Ok(())
}
