//! Tagged unions at runtime: enum values as JSON records with a string
//! discriminant, variant schemas with a small algebra (`pick`, `omit`,
//! `merge`, `extend`), constructors, predicates and matchers over them, plus
//! two derived schemas, the outcome (`Ok`/`Error`) and the async state
//! (`Pending` over any schema).
pub mod algebra;
pub mod async_state;
pub mod constructor;
pub mod discriminant;
pub mod emit;
pub mod error;
pub mod inference;
pub mod jq_exec;
pub mod matcher;
pub mod outcome;
pub mod path_de;
pub mod predicate;
pub mod schema;
pub mod value;

pub use algebra::{extend, keys, merge, omit, pick};
pub use constructor::{build, Builder, Constructor, Constructors};
pub use discriminant::{Discriminant, DEFAULT_DISCRIMINANT};
pub use error::{MatchError, SchemaError, ValueError};
pub use matcher::{Handler, Matcher, PartialMatcher};
pub use outcome::{attempt, attempt_async, capture, Outcome};
pub use predicate::{is, is_with};
pub use schema::{Field, FieldTy, VariantDescriptor, VariantSchema};
pub use value::EnumValue;
