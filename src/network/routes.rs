//! Route wiring.
//!
//! Builds the route tables and the associations binding subnets to
//! them: one shared public table with a default route to the internet
//! gateway, and one private table per zone (or one shared private
//! table under the single-NAT strategy) with a default route to the
//! zone's NAT gateway. Associations are keyed `(subnet, route table)`
//! in the provider, so re-running synthesis never duplicates them.

use super::gateways::GatewaySet;
use super::subnets::SubnetPlan;
use super::types::{RouteAssociation, RouteTable, Subnet, VirtualNetwork};
use crate::cidr::DEFAULT_ROUTE;
use crate::error::SynthesisError;
use crate::provider::{Provider, RouteTarget};
use crate::spec::{NatStrategy, TopologySpec};

/// The constructed route tables and subnet associations.
#[derive(Debug)]
pub struct RouteWiring {
    pub public_route_table: RouteTable,
    pub private_route_tables: Vec<RouteTable>,
    pub associations: Vec<RouteAssociation>,
}

/// Wire every subnet to its gateway.
///
/// Zones whose NAT chain failed are skipped here; their failures are
/// already recorded in the gateway set and the run will be reported
/// non-converged.
pub fn wire_routes(
    spec: &TopologySpec,
    network: &VirtualNetwork,
    subnets: &SubnetPlan,
    gateways: &GatewaySet,
    provider: &mut dyn Provider,
) -> Result<RouteWiring, SynthesisError> {
    let mut wiring = RouteWiring {
        public_route_table: wire_public(spec, network, gateways, provider)?,
        private_route_tables: Vec::new(),
        associations: Vec::new(),
    };
    for subnet in &subnets.public {
        wiring.associations.push(associate(
            provider,
            &format!("{}-public-route-table-association-{}", spec.name, subnet.zone_index + 1),
            subnet,
            &wiring.public_route_table,
        )?);
    }

    match spec.nat_strategy {
        NatStrategy::PerZone => {
            for subnet in &subnets.private {
                let Some(nat) = gateways.nat_for_zone(subnet.zone_index) else {
                    continue;
                };
                let table = build_private_table(
                    network,
                    provider,
                    &format!("{}-private-route-table-{}", spec.name, subnet.zone_index + 1),
                    &nat.id,
                )?;
                wiring.associations.push(associate(
                    provider,
                    &format!(
                        "{}-private-route-table-association-{}",
                        spec.name,
                        subnet.zone_index + 1
                    ),
                    subnet,
                    &table,
                )?);
                wiring.private_route_tables.push(table);
            }
        }
        NatStrategy::Single => {
            if !subnets.private.is_empty() {
                if let Some(nat) = gateways.nat_for_zone(0) {
                    let table = build_private_table(
                        network,
                        provider,
                        &format!("{}-private-route-table", spec.name),
                        &nat.id,
                    )?;
                    for subnet in &subnets.private {
                        wiring.associations.push(associate(
                            provider,
                            &format!(
                                "{}-private-route-table-association-{}",
                                spec.name,
                                subnet.zone_index + 1
                            ),
                            subnet,
                            &table,
                        )?);
                    }
                    wiring.private_route_tables.push(table);
                }
            }
        }
    }

    log::info!(
        "wired {} route table(s) and {} association(s)",
        1 + wiring.private_route_tables.len(),
        wiring.associations.len()
    );
    Ok(wiring)
}

/// The shared public route table, defaulting to the internet gateway.
fn wire_public(
    spec: &TopologySpec,
    network: &VirtualNetwork,
    gateways: &GatewaySet,
    provider: &mut dyn Provider,
) -> Result<RouteTable, SynthesisError> {
    let name = format!("{}-public-route-table", spec.name);
    let id = provider
        .create_route_table(&name, &network.id)
        .map_err(|e| SynthesisError::from_provider(&name, e))?;
    provider
        .create_route(
            &id,
            DEFAULT_ROUTE,
            RouteTarget::InternetGateway(gateways.internet_gateway.id.clone()),
        )
        .map_err(|e| SynthesisError::from_provider(&name, e))?;
    log::debug!("created public route table '{}' ({})", name, id);
    Ok(RouteTable { id, name })
}

/// One private route table, defaulting to the given NAT gateway.
fn build_private_table(
    network: &VirtualNetwork,
    provider: &mut dyn Provider,
    name: &str,
    nat_id: &str,
) -> Result<RouteTable, SynthesisError> {
    let id = provider
        .create_route_table(name, &network.id)
        .map_err(|e| SynthesisError::from_provider(name, e))?;
    provider
        .create_route(&id, DEFAULT_ROUTE, RouteTarget::NatGateway(nat_id.to_string()))
        .map_err(|e| SynthesisError::from_provider(name, e))?;
    log::debug!("created private route table '{}' ({})", name, id);
    Ok(RouteTable {
        id,
        name: name.to_string(),
    })
}

fn associate(
    provider: &mut dyn Provider,
    name: &str,
    subnet: &Subnet,
    table: &RouteTable,
) -> Result<RouteAssociation, SynthesisError> {
    provider
        .associate_route_table(name, &subnet.id, &table.id)
        .map_err(|e| SynthesisError::from_provider(name, e))?;
    Ok(RouteAssociation {
        name: name.to_string(),
        subnet_id: subnet.id.clone(),
        route_table_id: table.id.clone(),
    })
}
