//! Subnet partitioning.
//!
//! Derives the public and private subnet set from the validated spec,
//! one of each per availability zone, bound to the network. Logical
//! names encode the zone index so that re-synthesis with identical
//! input converges on identical names.

use super::types::{Subnet, SubnetKind, VirtualNetwork};
use crate::error::SynthesisError;
use crate::provider::{Provider, SubnetRequest};
use crate::spec::TopologySpec;

/// The two subnet sequences, index-aligned with the spec's zone order.
#[derive(Debug, Clone)]
pub struct SubnetPlan {
    pub public: Vec<Subnet>,
    pub private: Vec<Subnet>,
}

impl SubnetPlan {
    /// The public subnet of zone `zone_index`.
    pub fn public_for_zone(&self, zone_index: usize) -> Option<&Subnet> {
        self.public.get(zone_index)
    }
}

/// Construct one public and (where declared) one private subnet per
/// zone. Returns the ordered sequences downstream stages index by zone.
pub fn partition_subnets(
    spec: &TopologySpec,
    network: &VirtualNetwork,
    provider: &mut dyn Provider,
) -> Result<SubnetPlan, SynthesisError> {
    let public = build_subnets(
        spec,
        network,
        provider,
        SubnetKind::Public,
        &spec.public_subnet_cidrs,
    )?;
    let private = build_subnets(
        spec,
        network,
        provider,
        SubnetKind::Private,
        &spec.private_subnet_cidrs,
    )?;

    log::info!(
        "partitioned {} into {} public and {} private subnets across {} zone(s)",
        spec.vpc_cidr,
        public.len(),
        private.len(),
        spec.zone_count()
    );
    Ok(SubnetPlan { public, private })
}

fn build_subnets(
    spec: &TopologySpec,
    network: &VirtualNetwork,
    provider: &mut dyn Provider,
    kind: SubnetKind,
    cidrs: &[crate::cidr::CidrBlock],
) -> Result<Vec<Subnet>, SynthesisError> {
    let mut subnets = Vec::with_capacity(cidrs.len());
    for (i, cidr) in cidrs.iter().enumerate() {
        let zone = &spec.availability_zones[i];
        let name = format!("{}-{}-subnet-{}", spec.name, kind, i + 1);
        let map_public_ip = kind == SubnetKind::Public;
        let request = SubnetRequest {
            network: network.id.clone(),
            cidr: *cidr,
            availability_zone: zone.clone(),
            map_public_ip_on_launch: map_public_ip,
        };
        let id = provider
            .create_subnet(&name, &request)
            .map_err(|e| SynthesisError::from_provider(&name, e))?;
        log::debug!("created {} subnet '{}' ({}) in zone {}", kind, name, id, zone);
        subnets.push(Subnet {
            id,
            name,
            cidr: *cidr,
            zone: zone.clone(),
            zone_index: i,
            kind,
            map_public_ip,
        });
    }
    Ok(subnets)
}
