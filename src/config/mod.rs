pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::{
    apply_edits, apply_plan, apply_to_document, plan_edits, ApplicationError, EditOutcome, EditReport,
    FilePlan, Plan,
};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    Constraints, EditDefinition, EditScript, Metadata, Operation, ValidationError,
    ValidationIssue,
};
