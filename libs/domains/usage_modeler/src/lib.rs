//! Usage modeler (spec component C7): loads named usage profiles from YAML,
//! applies resource/service/global overrides, and annotates an enriched
//! resource graph with `(min, expected, max)` usage scenarios.

pub mod error;
pub mod handlers;
pub mod modeler;
pub mod overrides;
pub mod profile;

pub use error::{ModelerError, ModelerResult};
pub use handlers::{ApiDoc, ApplyRequest};
pub use modeler::UsageModeler;
pub use profile::{ProfileStore, ScenarioSpec, UsageProfile};
