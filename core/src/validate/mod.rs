//! validate
//! Checks applied to the recovered payload and the report they fill in.

pub mod result;
pub mod schema;
pub mod structure;

pub use result::{Issue, IssueKind, ValidationResult};
pub use schema::{SchemaValidator, XsdDeclarationValidator};
pub use structure::check_structure;
