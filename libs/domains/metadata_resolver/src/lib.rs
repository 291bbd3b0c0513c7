pub mod adapter;
pub mod common;
pub mod compute;
pub mod database;
pub mod describe;
pub mod handlers;
pub mod load_balancer;
pub mod resolver;

pub use adapter::{AdapterOutcome, ServiceAdapter};
pub use common::{cached_attribute_lookup, implicit_resource_id};
pub use compute::ComputeAdapter;
pub use database::DatabaseAdapter;
pub use describe::DescribeClient;
pub use handlers::{ApiDoc, EnrichmentState};
pub use load_balancer::LoadBalancerAdapter;
pub use resolver::MetadataResolver;
