//! No provider SDK exists anywhere in this codebase's dependency stack, so
//! the describe-* seam the metadata resolver depends on has no production
//! implementation here: every call fails fast with `UpstreamUnavailable`
//! rather than silently returning fabricated attributes. A deployment that
//! wires in a real provider SDK replaces this with a client that actually
//! calls the describe endpoints.

use async_trait::async_trait;
use domain_cost_model::{AttributeMap, PipelineError};
use domain_metadata_resolver::DescribeClient;

pub struct UnavailableDescribeClient;

fn unavailable(call: &str) -> PipelineError {
    PipelineError::UpstreamUnavailable(format!("no describe-* provider configured for {call}"))
}

#[async_trait]
impl DescribeClient for UnavailableDescribeClient {
    async fn describe_region(&self, _region: &str) -> Result<AttributeMap, PipelineError> {
        Err(unavailable("describe_region"))
    }

    async fn describe_instance_type(
        &self,
        _instance_type: &str,
    ) -> Result<AttributeMap, PipelineError> {
        Err(unavailable("describe_instance_type"))
    }

    async fn describe_image(&self, _image_id: &str) -> Result<AttributeMap, PipelineError> {
        Err(unavailable("describe_image"))
    }

    async fn describe_resource(
        &self,
        _resource_type: &str,
        _resource_address: &str,
    ) -> Result<AttributeMap, PipelineError> {
        Err(unavailable("describe_resource"))
    }

    async fn list_load_balancer_listeners(
        &self,
        _lb_address: &str,
    ) -> Result<Vec<AttributeMap>, PipelineError> {
        Err(unavailable("list_load_balancer_listeners"))
    }

    async fn list_db_snapshots(
        &self,
        _db_address: &str,
    ) -> Result<Vec<AttributeMap>, PipelineError> {
        Err(unavailable("list_db_snapshots"))
    }
}
