use std::collections::BTreeMap;

use chrono::Utc;
use domain_cost_model::{
    AttributeMap, Confidence, InterpretationMetadata, NormalizedResourceGraph, NrgNode,
    PipelineError, UnresolvedDependency,
};
use sha2::{Digest, Sha256};

use crate::model::{ChildModule, ModuleValues, PlanDocument, PlannedResource};

struct Collected {
    resource: PlannedResource,
    module_path: Vec<String>,
}

/// Pure transform from a planned-change document to a Normalized Resource
/// Graph. Deterministic and side-effect-free: identical input always
/// produces an identical output, including `plan_hash`.
pub fn interpret_plan_document(
    plan: &PlanDocument,
) -> Result<NormalizedResourceGraph, PipelineError> {
    let collected = collect_depth_first(&plan.planned_values.root_module, Vec::new());
    if collected.is_empty() {
        return Err(PipelineError::DeterministicTransformFailure(
            "planned-values tree contains no resource instances".to_string(),
        ));
    }

    let max_module_depth = collected.iter().map(|c| c.module_path.len()).max().unwrap_or(0);

    // Build the base-address -> sorted full-address index used to resolve
    // a dependency declared against a base address that expanded into
    // multiple indexed instances.
    let mut by_base_address: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in &collected {
        by_base_address
            .entry(base_address(&item.resource.address))
            .or_default()
            .push(item.resource.address.clone());
    }
    for addresses in by_base_address.values_mut() {
        addresses.sort();
    }

    let mut nodes = Vec::with_capacity(collected.len());
    let mut unresolved_dependencies = Vec::new();
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    let mut unknown_count = 0usize;

    for item in &collected {
        let resource = &item.resource;
        let resource_id = stable_hash(&resource.address);

        let mut attributes: AttributeMap = AttributeMap::new();
        for (key, value) in &resource.values {
            if resource.unknown_attributes.contains(key) {
                continue;
            }
            attributes.insert(key.clone(), value.clone().into());
        }
        let unknown_attributes = resource.unknown_attributes.clone();
        unknown_count += unknown_attributes.len();

        let confidence =
            NrgNode::confidence_from_counts(attributes.len(), unknown_attributes.len());

        let mut dependencies = Vec::new();
        for dep_address in &resource.depends_on {
            match resolve_dependency(dep_address, &by_base_address) {
                Some(resolved) => dependencies.push(stable_hash(&resolved)),
                None => unresolved_dependencies.push(UnresolvedDependency {
                    from_resource_id: resource_id.clone(),
                    unresolved_address: dep_address.clone(),
                }),
            }
        }

        *by_type.entry(resource.resource_type.clone()).or_insert(0) += 1;

        nodes.push(NrgNode {
            resource_id,
            address: resource.address.clone(),
            resource_type: resource.resource_type.clone(),
            provider: resource.provider_name.clone(),
            region: resource
                .values
                .get("region")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            attributes,
            unknown_attributes,
            quantity: 1,
            module_path: item.module_path.clone(),
            dependencies,
            confidence,
        });
    }

    let plan_hash = stable_hash(
        &serde_json::to_string(plan)
            .map_err(|e| PipelineError::DeterministicTransformFailure(e.to_string()))?,
    );

    let metadata = InterpretationMetadata {
        plan_hash,
        total_resources: nodes.len(),
        by_type,
        unknown_count,
        max_module_depth,
        timestamp: Utc::now(),
    };

    Ok(NormalizedResourceGraph {
        nodes,
        metadata,
        unresolved_dependencies,
    })
}

/// Strips a trailing `[0]` / `["key"]` index suffix, if present.
fn base_address(address: &str) -> String {
    match address.rfind('[') {
        Some(idx) => address[..idx].to_string(),
        None => address.to_string(),
    }
}

fn resolve_dependency(
    dep_address: &str,
    by_base_address: &BTreeMap<String, Vec<String>>,
) -> Option<String> {
    if let Some(addresses) = by_base_address.get(dep_address) {
        return addresses.first().cloned();
    }
    // dep_address might itself already be a full indexed address that
    // just wasn't in the base-address index because it's the only
    // instance; fall back to treating it as its own base.
    by_base_address
        .get(&base_address(dep_address))
        .and_then(|addresses| addresses.first().cloned())
}

fn stable_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    format!("{digest:x}")
}

fn collect_depth_first(module: &ModuleValues, module_path: Vec<String>) -> Vec<Collected> {
    let mut out = Vec::new();
    for resource in &module.resources {
        out.push(Collected {
            resource: resource.clone(),
            module_path: module_path.clone(),
        });
    }
    for child in &module.child_modules {
        out.extend(collect_child(child, module_path.clone()));
    }
    out
}

fn collect_child(child: &ChildModule, mut module_path: Vec<String>) -> Vec<Collected> {
    module_path.push(child.address.clone());
    let mut out = Vec::new();
    for resource in &child.resources {
        out.push(Collected {
            resource: resource.clone(),
            module_path: module_path.clone(),
        });
    }
    for grandchild in &child.child_modules {
        out.extend(collect_child(grandchild, module_path.clone()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlannedValues, ResourceChange};
    use serde_json::json;

    fn resource(address: &str, ty: &str) -> PlannedResource {
        PlannedResource {
            address: address.to_string(),
            resource_type: ty.to_string(),
            provider_name: "registry.terraform.io/hashicorp/aws".to_string(),
            index: None,
            values: json!({"instance_type": "t3.micro", "region": "us-east-1"})
                .as_object()
                .unwrap()
                .clone(),
            unknown_attributes: vec![],
            depends_on: vec![],
        }
    }

    fn plan_with(resources: Vec<PlannedResource>) -> PlanDocument {
        PlanDocument {
            planned_values: PlannedValues {
                root_module: ModuleValues {
                    resources,
                    child_modules: vec![],
                },
            },
            resource_changes: vec![ResourceChange {
                address: "aws_instance.web".to_string(),
                resource_type: "aws_instance".to_string(),
            }],
        }
    }

    #[test]
    fn identical_input_produces_identical_plan_hash() {
        let plan = plan_with(vec![resource("aws_instance.web", "aws_instance")]);
        let a = interpret_plan_document(&plan).unwrap();
        let b = interpret_plan_document(&plan).unwrap();
        assert_eq!(a.metadata.plan_hash, b.metadata.plan_hash);
    }

    #[test]
    fn each_declared_instance_becomes_one_node_with_quantity_one() {
        let plan = plan_with(vec![
            resource("aws_instance.web[0]", "aws_instance"),
            resource("aws_instance.web[1]", "aws_instance"),
        ]);
        let nrg = interpret_plan_document(&plan).unwrap();
        assert_eq!(nrg.nodes.len(), 2);
        assert!(nrg.nodes.iter().all(|n| n.quantity == 1));
    }

    #[test]
    fn unknown_attribute_is_excluded_from_known_attributes() {
        let mut res = resource("aws_instance.web", "aws_instance");
        res.unknown_attributes = vec!["instance_type".to_string()];
        let plan = plan_with(vec![res]);
        let nrg = interpret_plan_document(&plan).unwrap();
        let node = &nrg.nodes[0];
        assert!(!node.attributes.contains_key("instance_type"));
        assert_eq!(node.unknown_attributes, vec!["instance_type".to_string()]);
    }

    #[test]
    fn dependency_on_expanded_base_address_picks_first_instance() {
        let mut dependent = resource("aws_eip.web", "aws_eip");
        dependent.depends_on = vec!["aws_instance.web".to_string()];
        let plan = plan_with(vec![
            resource("aws_instance.web[1]", "aws_instance"),
            resource("aws_instance.web[0]", "aws_instance"),
            dependent,
        ]);
        let nrg = interpret_plan_document(&plan).unwrap();
        let eip = nrg.nodes.iter().find(|n| n.address == "aws_eip.web").unwrap();
        let expected_target = nrg
            .nodes
            .iter()
            .find(|n| n.address == "aws_instance.web[0]")
            .unwrap();
        assert_eq!(eip.dependencies, vec![expected_target.resource_id.clone()]);
    }

    #[test]
    fn unresolved_dependency_is_recorded_not_fatal() {
        let mut dependent = resource("aws_eip.web", "aws_eip");
        dependent.depends_on = vec!["aws_instance.missing".to_string()];
        let plan = plan_with(vec![dependent]);
        let nrg = interpret_plan_document(&plan).unwrap();
        assert_eq!(nrg.unresolved_dependencies.len(), 1);
        assert_eq!(
            nrg.unresolved_dependencies[0].unresolved_address,
            "aws_instance.missing"
        );
    }

    #[test]
    fn child_module_resources_carry_module_path() {
        let plan = PlanDocument {
            planned_values: PlannedValues {
                root_module: ModuleValues {
                    resources: vec![],
                    child_modules: vec![ChildModule {
                        address: "module.vpc".to_string(),
                        resources: vec![resource("module.vpc.aws_subnet.a", "aws_subnet")],
                        child_modules: vec![],
                    }],
                },
            },
            resource_changes: vec![],
        };
        let nrg = interpret_plan_document(&plan).unwrap();
        assert_eq!(nrg.nodes[0].module_path, vec!["module.vpc".to_string()]);
        assert_eq!(nrg.metadata.max_module_depth, 1);
    }

    #[test]
    fn empty_plan_is_a_deterministic_transform_failure() {
        let plan = plan_with(vec![]);
        assert!(interpret_plan_document(&plan).is_err());
    }
}
