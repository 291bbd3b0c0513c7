use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// The subset of an IaC planned-change document the interpreter consumes.
/// Modeled loosely (extra fields ignored) rather than as a full schema,
/// since the interpreter only needs the planned-values tree and the
/// resource-changes section.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlanDocument {
    pub planned_values: PlannedValues,
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlannedValues {
    pub root_module: ModuleValues,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ModuleValues {
    #[serde(default)]
    pub resources: Vec<PlannedResource>,
    #[serde(default)]
    pub child_modules: Vec<ChildModule>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChildModule {
    pub address: String,
    #[serde(default)]
    pub resources: Vec<PlannedResource>,
    #[serde(default)]
    #[schema(no_recursion)]
    pub child_modules: Vec<ChildModule>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlannedResource {
    pub address: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub provider_name: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub index: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub values: Map<String, Value>,
    /// Attribute names whose planned value is not known until apply,
    /// per the provider's `after_unknown` convention: `true` for a fully
    /// unknown scalar, a nested object/array for partially-known
    /// structures. We only need the top-level attribute names.
    #[serde(default)]
    pub unknown_attributes: Vec<String>,
    /// Explicit dependency addresses, already resolved to the
    /// provider's base-address form (no index) when the source plan
    /// doesn't disambiguate further.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ResourceChange {
    pub address: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}
