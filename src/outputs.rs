//! Output projection and export.
//!
//! The `OutputSet` is the read-only view downstream consumers (the
//! compute cluster, for one) use to reference the network. Every
//! sequence preserves the spec's zone order, so a consumer can zip
//! `availability_zones[i]` with `public_subnet_ids[i]` or
//! `nat_gateway_ids[i]` without a side lookup. No provider calls
//! happen here.

use crate::cidr::CidrBlock;
use crate::network::gateways::GatewaySet;
use crate::network::subnets::SubnetPlan;
use crate::network::types::{SecurityGroup, VirtualNetwork};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The stable identifiers of a converged network.
///
/// Written to `network_outputs.json` for consumption by other stacks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OutputSet {
    /// Id of the network container.
    pub network_id: String,
    /// The network's CIDR block.
    pub network_cidr: CidrBlock,
    /// Public subnet ids, one per zone, in input zone order.
    pub public_subnet_ids: Vec<String>,
    /// Private subnet ids, in input zone order; empty for a
    /// public-subnet-only network.
    pub private_subnet_ids: Vec<String>,
    /// Id of the shared internet gateway.
    pub internet_gateway_id: String,
    /// NAT gateway ids in zone order. One per zone under the per-zone
    /// strategy, a single entry under the single-NAT strategy.
    pub nat_gateway_ids: Vec<String>,
    /// Id of the network-scoped security group.
    pub security_group_id: String,
    /// Name of the network-scoped security group.
    pub security_group_name: String,
}

/// Project the constructed entities into an `OutputSet`.
pub fn project(
    network: &VirtualNetwork,
    security_group: &SecurityGroup,
    subnets: &SubnetPlan,
    gateways: &GatewaySet,
) -> OutputSet {
    let mut nat_gateways = gateways.nat_gateways.clone();
    nat_gateways.sort_by_key(|n| n.zone_index);

    OutputSet {
        network_id: network.id.clone(),
        network_cidr: network.cidr,
        public_subnet_ids: subnets.public.iter().map(|s| s.id.clone()).collect(),
        private_subnet_ids: subnets.private.iter().map(|s| s.id.clone()).collect(),
        internet_gateway_id: gateways.internet_gateway.id.clone(),
        nat_gateway_ids: nat_gateways.into_iter().map(|n| n.id).collect(),
        security_group_id: security_group.id.clone(),
        security_group_name: security_group.name.clone(),
    }
}

/// Write the output set as pretty-printed JSON.
pub fn write_outputs(outputs: &OutputSet, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(outputs)?;
    std::fs::write(path, json)
        .wrap_err_with(|| format!("Failed to write outputs to '{}'", path.display()))?;
    log::info!("wrote network outputs to {:?}", path);
    Ok(())
}
