//! Gateway provisioning.
//!
//! Creates the shared internet gateway, then one elastic IP + NAT
//! gateway pair per zone that owns a private subnet. Within a zone the
//! order is fixed: the elastic IP and the backing public subnet must
//! both exist before the NAT gateway is created. A failure in one
//! zone's chain is recorded and the remaining zones still run; the
//! caller decides convergence from the collected failures.

use super::subnets::SubnetPlan;
use super::types::{ElasticIp, InternetGateway, NatGateway, VirtualNetwork};
use crate::error::SynthesisError;
use crate::provider::Provider;
use crate::spec::{NatStrategy, TopologySpec};

/// The provisioned gateways plus any per-zone failures.
#[derive(Debug)]
pub struct GatewaySet {
    pub internet_gateway: InternetGateway,
    pub elastic_ips: Vec<ElasticIp>,
    pub nat_gateways: Vec<NatGateway>,
    /// `NatProvisioning` errors for zones whose chain failed.
    pub zone_failures: Vec<SynthesisError>,
}

impl GatewaySet {
    /// The NAT gateway serving `zone_index`, if its chain succeeded.
    pub fn nat_for_zone(&self, zone_index: usize) -> Option<&NatGateway> {
        self.nat_gateways.iter().find(|n| n.zone_index == zone_index)
    }

    pub fn converged(&self) -> bool {
        self.zone_failures.is_empty()
    }
}

/// Create the internet gateway and the per-zone NAT chains.
///
/// With `NatStrategy::Single`, or when the topology has no private
/// subnets at all, the per-zone loop degenerates to one or zero
/// iterations with no special-casing.
pub fn provision_gateways(
    spec: &TopologySpec,
    network: &VirtualNetwork,
    subnets: &SubnetPlan,
    provider: &mut dyn Provider,
) -> Result<GatewaySet, SynthesisError> {
    let igw_name = format!("{}-igw", spec.name);
    let igw_id = provider
        .create_internet_gateway(&igw_name, &network.id)
        .map_err(|e| SynthesisError::from_provider(&igw_name, e))?;
    log::info!("attached internet gateway '{}' ({})", igw_name, igw_id);

    let mut set = GatewaySet {
        internet_gateway: InternetGateway {
            id: igw_id,
            name: igw_name,
        },
        elastic_ips: Vec::new(),
        nat_gateways: Vec::new(),
        zone_failures: Vec::new(),
    };

    for zone_index in nat_zone_indices(spec) {
        match provision_zone_nat(spec, subnets, provider, zone_index) {
            Ok((eip, nat)) => {
                set.elastic_ips.push(eip);
                set.nat_gateways.push(nat);
            }
            Err(failure) => {
                log::warn!("{}", failure);
                set.zone_failures.push(failure);
            }
        }
    }

    if set.converged() {
        log::info!(
            "provisioned {} NAT gateway(s) ({:?} strategy)",
            set.nat_gateways.len(),
            spec.nat_strategy
        );
    }
    Ok(set)
}

/// Zone indices that receive a NAT gateway: every zone under the
/// per-zone strategy, zone 0 only under the single-NAT strategy, none
/// when the topology has no private subnets.
fn nat_zone_indices(spec: &TopologySpec) -> std::ops::Range<usize> {
    if !spec.has_private_subnets() {
        0..0
    } else {
        match spec.nat_strategy {
            NatStrategy::PerZone => 0..spec.zone_count(),
            NatStrategy::Single => 0..1,
        }
    }
}

/// One zone's chain: elastic IP, then the NAT gateway bound to that IP
/// and the zone's own public subnet.
fn provision_zone_nat(
    spec: &TopologySpec,
    subnets: &SubnetPlan,
    provider: &mut dyn Provider,
    zone_index: usize,
) -> Result<(ElasticIp, NatGateway), SynthesisError> {
    let zone = &spec.availability_zones[zone_index];
    let nat_failure = |reason: String| SynthesisError::NatProvisioning {
        zone: zone.clone(),
        reason,
    };

    let public_subnet = subnets
        .public_for_zone(zone_index)
        .ok_or_else(|| nat_failure(format!("no public subnet for zone index {}", zone_index)))?;

    let eip_name = format!("{}-eip-{}", spec.name, zone_index + 1);
    let eip_id = provider
        .allocate_address(&eip_name)
        .map_err(|e| nat_failure(e.to_string()))?;
    let eip = ElasticIp {
        id: eip_id,
        name: eip_name,
        zone_index,
    };

    let nat_name = format!("{}-nat-gateway-{}", spec.name, zone_index + 1);
    let nat_id = provider
        .create_nat_gateway(&nat_name, &eip.id, &public_subnet.id)
        .map_err(|e| nat_failure(e.to_string()))?;
    log::debug!(
        "created NAT gateway '{}' ({}) on {} in zone {}",
        nat_name,
        nat_id,
        public_subnet.name,
        zone
    );

    let nat = NatGateway {
        id: nat_id,
        name: nat_name,
        zone_index,
        allocation_id: eip.id.clone(),
        subnet_id: public_subnet.id.clone(),
    };
    Ok((eip, nat))
}
