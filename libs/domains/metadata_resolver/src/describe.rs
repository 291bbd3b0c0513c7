use async_trait::async_trait;
use domain_cost_model::{AttributeMap, PipelineError};

/// Typed read-only provider describe-* queries. A thin seam so adapters
/// stay pure with respect to the network: production wires this to the
/// provider's describe endpoints, tests wire a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DescribeClient: Send + Sync {
    async fn describe_region(&self, region: &str) -> Result<AttributeMap, PipelineError>;
    async fn describe_instance_type(
        &self,
        instance_type: &str,
    ) -> Result<AttributeMap, PipelineError>;
    async fn describe_image(&self, image_id: &str) -> Result<AttributeMap, PipelineError>;
    async fn describe_resource(
        &self,
        resource_type: &str,
        resource_address: &str,
    ) -> Result<AttributeMap, PipelineError>;
    async fn list_load_balancer_listeners(
        &self,
        lb_address: &str,
    ) -> Result<Vec<AttributeMap>, PipelineError>;
    async fn list_db_snapshots(
        &self,
        db_address: &str,
    ) -> Result<Vec<AttributeMap>, PipelineError>;
}
