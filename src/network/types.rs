//! Network entity definitions.
//!
//! This module contains the typed entities the synthesis pipeline
//! constructs: the network container, its subnets, gateways, route
//! tables and associations. Entities are created once, in dependency
//! order, and never mutated afterwards.
//!
//! Subnets are index-addressable: entry *i* of each list belongs to
//! availability zone *i* of the validated spec. That alignment is the
//! contract downstream stages and the output exporter rely on, so the
//! lists are ordered `Vec`s rather than name-keyed maps.

use crate::cidr::CidrBlock;
use std::collections::BTreeMap;

/// Whether a subnet fronts the internet or sits behind a NAT gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetKind {
    Public,
    Private,
}

impl std::fmt::Display for SubnetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SubnetKind::Public => write!(f, "public"),
            SubnetKind::Private => write!(f, "private"),
        }
    }
}

/// The top-level network container. Owns every other entity.
#[derive(Debug, Clone)]
pub struct VirtualNetwork {
    pub id: String,
    pub name: String,
    pub cidr: CidrBlock,
    pub tags: BTreeMap<String, String>,
}

/// A network-scoped security group.
#[derive(Debug, Clone)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
}

/// One subnet, bound to a single availability zone.
#[derive(Debug, Clone)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    pub cidr: CidrBlock,
    pub zone: String,
    pub zone_index: usize,
    pub kind: SubnetKind,
    /// True iff the subnet is public.
    pub map_public_ip: bool,
}

/// The shared internet gateway, one per network.
#[derive(Debug, Clone)]
pub struct InternetGateway {
    pub id: String,
    pub name: String,
}

/// An elastic IP backing a NAT gateway.
#[derive(Debug, Clone)]
pub struct ElasticIp {
    pub id: String,
    pub name: String,
    pub zone_index: usize,
}

/// A NAT gateway, bound to the public subnet of its own zone.
#[derive(Debug, Clone)]
pub struct NatGateway {
    pub id: String,
    pub name: String,
    pub zone_index: usize,
    pub allocation_id: String,
    pub subnet_id: String,
}

/// A route table; its role (public/private) is fixed by its routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pub id: String,
    pub name: String,
}

/// A subnet-to-route-table binding. At most one per subnet.
#[derive(Debug, Clone)]
pub struct RouteAssociation {
    pub name: String,
    pub subnet_id: String,
    pub route_table_id: String,
}
