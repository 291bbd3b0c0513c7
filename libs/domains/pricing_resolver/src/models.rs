use std::collections::BTreeMap;

use domain_cost_model::Confidence;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LookupRequest {
    pub service: String,
    pub region: String,
    pub resource_type: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// One matched catalog price dimension, carrying everything `domain_cost_engine`
/// needs to build a `CostDimension` without a second catalog round-trip.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NormalizedPrice {
    pub sku: String,
    pub unit: String,
    #[schema(value_type = f64)]
    pub unit_price: Decimal,
    pub currency: domain_cost_model::Currency,
    pub usage_type: Option<String>,
    pub effective_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LookupResponse {
    pub prices: Vec<NormalizedPrice>,
    pub confidence: Confidence,
    pub metadata: LookupMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LookupMetadata {
    pub normalized_region: String,
    pub candidates_considered: usize,
    pub cache_hit: bool,
}
