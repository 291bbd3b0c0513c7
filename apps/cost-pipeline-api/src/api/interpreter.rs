use axum::Router;

pub fn router() -> Router {
    domain_plan_interpreter::handlers::router()
}
