use domain_cost_model::{Confidence, Currency, ErgNode, Fcm, UsageAnnotation};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One matched pricing record for a resource, the engine's input shape for
/// the pricing side of a cost computation. Produced upstream by the pricing
/// resolver's `POST /lookup`, flattened to the single SKU the orchestrator
/// selected for this resource (the original's one-dimension-per-resource
/// simplification, see `engine::compute`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceRecordInput {
    pub resource_id: String,
    pub dimension: String,
    pub unit: String,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    pub sku: String,
    pub currency: Currency,
    pub confidence: Confidence,
}

/// Request body for `POST /aggregate` (spec §6, C8's internal contract).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AggregateRequest {
    pub resources: Vec<ErgNode>,
    pub pricing_records: Vec<PriceRecordInput>,
    pub usage_records: Vec<UsageAnnotation>,
    #[serde(default = "default_currency")]
    pub currency: Currency,
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_currency() -> Currency {
    Currency::Usd
}

fn default_precision() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AggregateResponse {
    pub fcm: Fcm,
}
