//! Topology synthesizer.
//!
//! Drives the synthesis pipeline over a validated spec: network
//! allocation, subnet partitioning, gateway provisioning, route
//! wiring, output projection. Each stage consumes only the outputs of
//! prior stages; nothing outside this function observes a half-built
//! network.

use crate::error::SynthesisError;
use crate::network::{allocator, gateways, routes, subnets};
use crate::outputs::{self, OutputSet};
use crate::provider::Provider;
use crate::spec::TopologySpec;

/// Synthesize the declared topology against the given provider.
///
/// On success every declared entity exists and is wired exactly as
/// specified. Re-running with the same spec against the same provider
/// state is a no-op that returns the same outputs: every resource is
/// keyed by its logical name and associations are keyed
/// `(subnet, route table)`.
///
/// If one or more zones' NAT chains fail, the remaining zones still
/// complete their chains, and the run ends with
/// `SynthesisError::NotConverged` listing every failed zone. Entities
/// created before the failure stay recorded with the provider.
pub fn synthesize(
    spec: &TopologySpec,
    provider: &mut dyn Provider,
) -> Result<OutputSet, SynthesisError> {
    log::info!(
        "synthesizing topology '{}' ({} zone(s), {} CIDR)",
        spec.name,
        spec.zone_count(),
        spec.vpc_cidr
    );

    let network = allocator::allocate_network(spec, provider)?;
    let security_group = allocator::create_security_group(spec, &network, provider)?;
    let subnet_plan = subnets::partition_subnets(spec, &network, provider)?;
    let gateway_set = gateways::provision_gateways(spec, &network, &subnet_plan, provider)?;
    let wiring = routes::wire_routes(spec, &network, &subnet_plan, &gateway_set, provider)?;

    if !gateway_set.converged() {
        return Err(SynthesisError::NotConverged {
            failures: gateway_set.zone_failures,
        });
    }

    let output_set = outputs::project(&network, &security_group, &subnet_plan, &gateway_set);
    log::info!(
        "topology '{}' converged: {} public subnet(s), {} private subnet(s), {} NAT gateway(s), {} association(s)",
        spec.name,
        output_set.public_subnet_ids.len(),
        output_set.private_subnet_ids.len(),
        output_set.nat_gateway_ids.len(),
        wiring.associations.len()
    );
    Ok(output_set)
}
