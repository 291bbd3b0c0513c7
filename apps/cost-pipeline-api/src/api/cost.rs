use axum::Router;
use domain_cost_engine::CostEngine;

pub fn router() -> Router {
    domain_cost_engine::handlers::router(CostEngine::new())
}
