//! Provider abstraction for network primitives.
//!
//! The synthesizer talks to a `Provider` rather than to any concrete
//! cloud API. Each operation creates one primitive, keyed by a stable
//! logical name so that re-running synthesis converges on the same
//! resources instead of duplicating them.

pub mod memory;

pub use memory::MemoryProvider;

use crate::cidr::CidrBlock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The kinds of primitive a provider can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Network,
    SecurityGroup,
    Subnet,
    InternetGateway,
    ElasticIp,
    NatGateway,
    RouteTable,
    Route,
    RouteAssociation,
}

impl ResourceKind {
    /// Prefix used when minting ids for this kind.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Network => "vpc",
            ResourceKind::SecurityGroup => "sg",
            ResourceKind::Subnet => "subnet",
            ResourceKind::InternetGateway => "igw",
            ResourceKind::ElasticIp => "eipalloc",
            ResourceKind::NatGateway => "nat",
            ResourceKind::RouteTable => "rtb",
            ResourceKind::Route => "r",
            ResourceKind::RouteAssociation => "rtbassoc",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Network => "virtual network",
            ResourceKind::SecurityGroup => "security group",
            ResourceKind::Subnet => "subnet",
            ResourceKind::InternetGateway => "internet gateway",
            ResourceKind::ElasticIp => "elastic IP",
            ResourceKind::NatGateway => "NAT gateway",
            ResourceKind::RouteTable => "route table",
            ResourceKind::Route => "route",
            ResourceKind::RouteAssociation => "route table association",
        };
        write!(f, "{}", name)
    }
}

/// Errors surfaced by a provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{kind} '{name}' could not be created: {reason}")]
    CreateFailed {
        kind: ResourceKind,
        name: String,
        reason: String,
    },
    #[error("unknown {kind} id '{id}'")]
    UnknownId { kind: ResourceKind, id: String },
}

/// Arguments for creating the top-level network container.
#[derive(Debug, Clone)]
pub struct NetworkRequest {
    pub cidr: CidrBlock,
    pub instance_tenancy: String,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
    pub tags: BTreeMap<String, String>,
}

/// Arguments for creating a subnet inside a network.
#[derive(Debug, Clone)]
pub struct SubnetRequest {
    pub network: String,
    pub cidr: CidrBlock,
    pub availability_zone: String,
    pub map_public_ip_on_launch: bool,
}

/// The gateway a route forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    InternetGateway(String),
    NatGateway(String),
}

impl RouteTarget {
    pub fn id(&self) -> &str {
        match self {
            RouteTarget::InternetGateway(id) | RouteTarget::NatGateway(id) => id,
        }
    }

    fn kind(&self) -> ResourceKind {
        match self {
            RouteTarget::InternetGateway(_) => ResourceKind::InternetGateway,
            RouteTarget::NatGateway(_) => ResourceKind::NatGateway,
        }
    }
}

/// Whether an association call created a new binding or found the
/// existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationOutcome {
    Created,
    AlreadyAssociated,
}

/// One primitive per operation, each keyed by a stable logical name.
///
/// Implementations must be idempotent on the logical name: creating a
/// name that already exists returns the existing id. Binding operations
/// must reject ids that were never created (the dependency-order
/// contract of the synthesis pipeline).
pub trait Provider {
    fn create_network(&mut self, name: &str, req: &NetworkRequest) -> Result<String, ProviderError>;

    fn create_security_group(
        &mut self,
        name: &str,
        network: &str,
    ) -> Result<String, ProviderError>;

    fn create_subnet(&mut self, name: &str, req: &SubnetRequest) -> Result<String, ProviderError>;

    fn create_internet_gateway(
        &mut self,
        name: &str,
        network: &str,
    ) -> Result<String, ProviderError>;

    fn allocate_address(&mut self, name: &str) -> Result<String, ProviderError>;

    fn create_nat_gateway(
        &mut self,
        name: &str,
        allocation: &str,
        subnet: &str,
    ) -> Result<String, ProviderError>;

    fn create_route_table(&mut self, name: &str, network: &str) -> Result<String, ProviderError>;

    fn create_route(
        &mut self,
        route_table: &str,
        destination: CidrBlock,
        target: RouteTarget,
    ) -> Result<(), ProviderError>;

    fn associate_route_table(
        &mut self,
        name: &str,
        subnet: &str,
        route_table: &str,
    ) -> Result<AssociationOutcome, ProviderError>;
}
