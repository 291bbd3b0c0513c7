//! Deterministic, pure transformation of a planned-change document into a
//! Normalized Resource Graph.

pub mod handlers;
pub mod interpreter;
pub mod model;

pub use handlers::ApiDoc;
pub use interpreter::interpret_plan_document;
pub use model::{ChildModule, ModuleValues, PlanDocument, PlannedResource, PlannedValues, ResourceChange};
