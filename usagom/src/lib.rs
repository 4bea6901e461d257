//! usagom core library.
//!
//! Resolves the usage of declarative model fields and derives the
//! constraints their values must satisfy.
//!
//! ```
//! use serde_json::json;
//! use usagom::{Field, FieldDescriptor};
//!
//! let descriptor = FieldDescriptor::try_from(json!({ "type": "string" })).unwrap();
//! let field = Field::new(descriptor);
//! assert_eq!(field.usage_string(), Some("text/plain:255"));
//!
//! let constraints = field.constraints().unwrap();
//! assert!(constraints.get("invalid_type").unwrap().check(&json!("hello")));
//! assert!(!constraints.get("invalid_type").unwrap().check(&json!(42)));
//! ```

pub mod alias;
pub mod constraint;
pub mod descriptor;
pub mod errors;
pub mod field;
pub mod registry;
pub mod schema;
pub mod usage;
pub mod validators;
pub mod value;

pub use alias::PseudoType;
pub use constraint::{Constraint, ConstraintSet, INVALID_TYPE};
pub use descriptor::{FieldDescriptor, normalize};
pub use errors::*;
pub use field::{Field, resolve_usage_string};
pub use registry::*;
pub use schema::ModelSchema;
pub use usage::{DefaultUsageFactory, UntypedUsage, Usage, UsageFactory, UsageString};
pub use value::ValueKind;
