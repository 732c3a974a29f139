//! Virtual network allocation.
//!
//! Creates the top-level network container from a validated spec, plus
//! the network-scoped security group. Pure allocation: depends on
//! nothing but the spec itself.

use super::types::{SecurityGroup, VirtualNetwork};
use crate::error::SynthesisError;
use crate::provider::{NetworkRequest, Provider};
use crate::spec::TopologySpec;

/// Create the network container with its CIDR and tags.
pub fn allocate_network(
    spec: &TopologySpec,
    provider: &mut dyn Provider,
) -> Result<VirtualNetwork, SynthesisError> {
    let name = format!("{}-vpc", spec.name);
    let request = NetworkRequest {
        cidr: spec.vpc_cidr,
        instance_tenancy: spec.instance_tenancy.clone(),
        enable_dns_hostnames: spec.enable_dns_hostnames,
        enable_dns_support: spec.enable_dns_support,
        tags: spec.tags.clone(),
    };
    let id = provider
        .create_network(&name, &request)
        .map_err(|e| SynthesisError::from_provider(&name, e))?;
    log::info!("allocated network '{}' ({}) with CIDR {}", name, id, spec.vpc_cidr);

    Ok(VirtualNetwork {
        id,
        name,
        cidr: spec.vpc_cidr,
        tags: spec.tags.clone(),
    })
}

/// Create the network-scoped security group named by the spec.
pub fn create_security_group(
    spec: &TopologySpec,
    network: &VirtualNetwork,
    provider: &mut dyn Provider,
) -> Result<SecurityGroup, SynthesisError> {
    let name = spec.security_group_name.clone();
    let id = provider
        .create_security_group(&name, &network.id)
        .map_err(|e| SynthesisError::from_provider(&name, e))?;
    log::info!("created security group '{}' ({})", name, id);

    Ok(SecurityGroup { id, name })
}
