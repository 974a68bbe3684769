//! Error types of the library surface.
use crate::schema::FieldTy;
use crate::value::EnumValue;

/// Raised while defining or combining schemas, never while building values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown variant `{variant}`")]
    UnknownVariant { variant: String },
    #[error("variant `{variant}`: field `{field}` is `{left}` in one schema and `{right}` in another")]
    FieldConflict {
        variant: String,
        field: String,
        left: FieldTy,
        right: FieldTy,
    },
    #[error("variant `{variant}`: field `{field}` collides with the discriminant")]
    DiscriminantCollision { variant: String, field: String },
    #[error("mapper registered for unknown variant `{variant}`")]
    UnknownMapper { variant: String },
}

/// A record that is not a well-formed enum value, or not one of a given schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("enum value must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("enum value has no string `{discriminant}` field")]
    MissingDiscriminant { discriminant: String },
    #[error("unknown variant `{variant}`")]
    UnknownVariant { variant: String },
    #[error("variant `{variant}` takes at most one data argument, got {count}")]
    Arity { variant: String, count: usize },
    #[error("variant `{variant}`: data must be a JSON object, got {found}")]
    DataNotAnObject { variant: String, found: &'static str },
    #[error("variant `{variant}`: data contains the discriminant field `{discriminant}`")]
    DiscriminantInData { variant: String, discriminant: String },
    #[error("variant `{variant}`: unexpected field `{field}`")]
    StrayField { variant: String, field: String },
    #[error("variant `{variant}`: missing required field `{field}`")]
    MissingField { variant: String, field: String },
    /// A callback result that has no JSON representation; the callback
    /// itself did not fail.
    #[error("payload has no JSON representation: {message}")]
    Payload { message: String },
    #[error("variant `{variant}`: field `{field}` is not a valid `{expected}`")]
    FieldType {
        variant: String,
        field: String,
        expected: FieldTy,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// No arm and no fallback applied. Carries the offending value.
    #[error("unhandled enum variant: {value}")]
    Unhandled { value: EnumValue },
    #[error("non-exhaustive match, missing arms for: {}", .missing.join(", "))]
    NonExhaustive { missing: Vec<String> },
    #[error("match arm `{name}` names no variant of the schema")]
    UnknownArm { name: String },
}
