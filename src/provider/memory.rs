//! Deterministic in-memory provider.
//!
//! This file implements the provider trait against process-local state.
//! Ids are minted from per-kind counters, every created resource is
//! recorded in an ownership ledger in creation order, and re-creating a
//! logical name returns the existing id, which is what makes repeated
//! synthesis runs converge instead of duplicating resources.

use super::{
    AssociationOutcome, NetworkRequest, Provider, ProviderError, ResourceKind, RouteTarget,
    SubnetRequest,
};
use crate::cidr::CidrBlock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One created resource, as recorded in the ownership ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub name: String,
    pub id: String,
    pub kind: ResourceKind,
}

/// In-memory provider state.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    /// Logical name -> minted id.
    ids_by_name: HashMap<String, String>,
    /// Minted id -> resource kind, for dependency checking.
    kinds_by_id: HashMap<String, ResourceKind>,
    /// Every created resource, in creation order.
    ledger: Vec<LedgerEntry>,
    /// Association keys: (subnet id, route table id).
    associations: HashSet<(String, String)>,
    /// Subnet id -> route table id it is associated with.
    table_by_subnet: HashMap<String, String>,
    /// (route table id, destination) -> target gateway id.
    routes: HashMap<(String, CidrBlock), String>,
    /// NAT gateway id -> (allocation id, subnet id).
    nat_bindings: HashMap<String, (String, String)>,
    /// Per-kind id counters.
    counters: HashMap<ResourceKind, u32>,
    /// Logical names whose creation is forced to fail (fault injection).
    fail_names: HashSet<String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force creation of `name` to fail, to exercise partial-failure
    /// reporting. Clearing happens via `clear_faults`, modelling a
    /// transient provider error that a retry would get past.
    pub fn fail_creation_of(&mut self, name: &str) {
        self.fail_names.insert(name.to_string());
    }

    pub fn clear_faults(&mut self) {
        self.fail_names.clear();
    }

    /// The ownership ledger: every created resource in creation order.
    pub fn ledger(&self) -> &[LedgerEntry] {
        &self.ledger
    }

    /// Logical names in the order teardown must destroy them: the
    /// reverse of creation order.
    pub fn teardown_plan(&self) -> Vec<String> {
        self.ledger.iter().rev().map(|e| e.name.clone()).collect()
    }

    /// The route table a subnet is associated with, if any.
    pub fn route_table_for_subnet(&self, subnet: &str) -> Option<&str> {
        self.table_by_subnet.get(subnet).map(String::as_str)
    }

    /// The gateway id a route table forwards `destination` to, if set.
    pub fn route_target(&self, route_table: &str, destination: CidrBlock) -> Option<&str> {
        self.routes
            .get(&(route_table.to_string(), destination))
            .map(String::as_str)
    }

    /// The (allocation id, subnet id) pair a NAT gateway is bound to.
    pub fn nat_binding(&self, nat_gateway: &str) -> Option<&(String, String)> {
        self.nat_bindings.get(nat_gateway)
    }

    /// Number of resources of the given kind in the ledger.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.ledger.iter().filter(|e| e.kind == kind).count()
    }

    fn create(&mut self, kind: ResourceKind, name: &str) -> Result<String, ProviderError> {
        if self.fail_names.contains(name) {
            return Err(ProviderError::CreateFailed {
                kind,
                name: name.to_string(),
                reason: "injected provider fault".to_string(),
            });
        }
        if let Some(id) = self.ids_by_name.get(name) {
            log::debug!("{} '{}' already exists as {}", kind, name, id);
            return Ok(id.clone());
        }
        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        let id = format!("{}-{:08x}", kind.id_prefix(), counter);
        self.ids_by_name.insert(name.to_string(), id.clone());
        self.kinds_by_id.insert(id.clone(), kind);
        self.ledger.push(LedgerEntry {
            name: name.to_string(),
            id: id.clone(),
            kind,
        });
        log::debug!("created {} '{}' as {}", kind, name, id);
        Ok(id)
    }

    fn require(&self, kind: ResourceKind, id: &str) -> Result<(), ProviderError> {
        match self.kinds_by_id.get(id) {
            Some(actual) if *actual == kind => Ok(()),
            _ => Err(ProviderError::UnknownId {
                kind,
                id: id.to_string(),
            }),
        }
    }
}

impl Provider for MemoryProvider {
    fn create_network(&mut self, name: &str, _req: &NetworkRequest) -> Result<String, ProviderError> {
        self.create(ResourceKind::Network, name)
    }

    fn create_security_group(
        &mut self,
        name: &str,
        network: &str,
    ) -> Result<String, ProviderError> {
        self.require(ResourceKind::Network, network)?;
        self.create(ResourceKind::SecurityGroup, name)
    }

    fn create_subnet(&mut self, name: &str, req: &SubnetRequest) -> Result<String, ProviderError> {
        self.require(ResourceKind::Network, &req.network)?;
        self.create(ResourceKind::Subnet, name)
    }

    fn create_internet_gateway(
        &mut self,
        name: &str,
        network: &str,
    ) -> Result<String, ProviderError> {
        self.require(ResourceKind::Network, network)?;
        self.create(ResourceKind::InternetGateway, name)
    }

    fn allocate_address(&mut self, name: &str) -> Result<String, ProviderError> {
        self.create(ResourceKind::ElasticIp, name)
    }

    fn create_nat_gateway(
        &mut self,
        name: &str,
        allocation: &str,
        subnet: &str,
    ) -> Result<String, ProviderError> {
        self.require(ResourceKind::ElasticIp, allocation)?;
        self.require(ResourceKind::Subnet, subnet)?;
        let id = self.create(ResourceKind::NatGateway, name)?;
        self.nat_bindings
            .entry(id.clone())
            .or_insert_with(|| (allocation.to_string(), subnet.to_string()));
        Ok(id)
    }

    fn create_route_table(&mut self, name: &str, network: &str) -> Result<String, ProviderError> {
        self.require(ResourceKind::Network, network)?;
        self.create(ResourceKind::RouteTable, name)
    }

    fn create_route(
        &mut self,
        route_table: &str,
        destination: CidrBlock,
        target: RouteTarget,
    ) -> Result<(), ProviderError> {
        self.require(ResourceKind::RouteTable, route_table)?;
        self.require(target.kind(), target.id())?;
        let key = (route_table.to_string(), destination);
        if let Some(existing) = self.routes.get(&key) {
            if existing == target.id() {
                return Ok(());
            }
            return Err(ProviderError::CreateFailed {
                kind: ResourceKind::Route,
                name: format!("{} -> {}", route_table, destination),
                reason: format!(
                    "destination already routed to {}, refusing to repoint to {}",
                    existing,
                    target.id()
                ),
            });
        }
        self.routes.insert(key, target.id().to_string());
        Ok(())
    }

    fn associate_route_table(
        &mut self,
        name: &str,
        subnet: &str,
        route_table: &str,
    ) -> Result<AssociationOutcome, ProviderError> {
        self.require(ResourceKind::Subnet, subnet)?;
        self.require(ResourceKind::RouteTable, route_table)?;

        let key = (subnet.to_string(), route_table.to_string());
        if self.associations.contains(&key) {
            return Ok(AssociationOutcome::AlreadyAssociated);
        }
        // Every subnet belongs to exactly one route table.
        if let Some(existing) = self.table_by_subnet.get(subnet) {
            return Err(ProviderError::CreateFailed {
                kind: ResourceKind::RouteAssociation,
                name: name.to_string(),
                reason: format!("subnet {} is already associated with {}", subnet, existing),
            });
        }
        self.create(ResourceKind::RouteAssociation, name)?;
        self.associations.insert(key);
        self.table_by_subnet
            .insert(subnet.to_string(), route_table.to_string());
        Ok(AssociationOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn network_request() -> NetworkRequest {
        NetworkRequest {
            cidr: CidrBlock::parse("10.0.0.0/16").unwrap(),
            instance_tenancy: "default".to_string(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
            tags: BTreeMap::new(),
        }
    }

    fn subnet_request(network: &str) -> SubnetRequest {
        SubnetRequest {
            network: network.to_string(),
            cidr: CidrBlock::parse("10.0.1.0/24").unwrap(),
            availability_zone: "az-a".to_string(),
            map_public_ip_on_launch: true,
        }
    }

    #[test]
    fn test_recreate_returns_existing_id() {
        let mut provider = MemoryProvider::new();
        let first = provider.create_network("t-vpc", &network_request()).unwrap();
        let second = provider.create_network("t-vpc", &network_request()).unwrap();
        assert_eq!(first, second);
        assert_eq!(provider.ledger().len(), 1);
    }

    #[test]
    fn test_dependency_checked_on_binding() {
        let mut provider = MemoryProvider::new();
        let err = provider
            .create_subnet("t-public-subnet-1", &subnet_request("vpc-bogus"))
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::UnknownId {
                kind: ResourceKind::Network,
                ..
            }
        ));
    }

    #[test]
    fn test_association_is_idempotent_and_exclusive() {
        let mut provider = MemoryProvider::new();
        let vpc = provider.create_network("t-vpc", &network_request()).unwrap();
        let subnet = provider
            .create_subnet("t-public-subnet-1", &subnet_request(&vpc))
            .unwrap();
        let table = provider.create_route_table("t-public-rtb", &vpc).unwrap();

        let first = provider
            .associate_route_table("t-assoc-1", &subnet, &table)
            .unwrap();
        assert_eq!(first, AssociationOutcome::Created);

        let second = provider
            .associate_route_table("t-assoc-1", &subnet, &table)
            .unwrap();
        assert_eq!(second, AssociationOutcome::AlreadyAssociated);

        // A second table may not claim the same subnet.
        let other = provider.create_route_table("t-other-rtb", &vpc).unwrap();
        let err = provider
            .associate_route_table("t-assoc-2", &subnet, &other)
            .unwrap_err();
        assert!(matches!(err, ProviderError::CreateFailed { .. }));
    }

    #[test]
    fn test_route_conflict_rejected() {
        let mut provider = MemoryProvider::new();
        let vpc = provider.create_network("t-vpc", &network_request()).unwrap();
        let igw = provider.create_internet_gateway("t-igw", &vpc).unwrap();
        let table = provider.create_route_table("t-public-rtb", &vpc).unwrap();
        let destination = crate::cidr::DEFAULT_ROUTE;

        provider
            .create_route(&table, destination, RouteTarget::InternetGateway(igw.clone()))
            .unwrap();
        // Same route again is fine
        provider
            .create_route(&table, destination, RouteTarget::InternetGateway(igw))
            .unwrap();

        let eip = provider.allocate_address("t-eip-1").unwrap();
        let subnet = provider
            .create_subnet("t-public-subnet-1", &subnet_request(&vpc))
            .unwrap();
        let nat = provider
            .create_nat_gateway("t-nat-1", &eip, &subnet)
            .unwrap();
        let err = provider
            .create_route(&table, destination, RouteTarget::NatGateway(nat))
            .unwrap_err();
        assert!(matches!(err, ProviderError::CreateFailed { .. }));
    }

    #[test]
    fn test_teardown_plan_reverses_creation_order() {
        let mut provider = MemoryProvider::new();
        let vpc = provider.create_network("t-vpc", &network_request()).unwrap();
        provider.create_internet_gateway("t-igw", &vpc).unwrap();
        provider
            .create_subnet("t-public-subnet-1", &subnet_request(&vpc))
            .unwrap();

        let plan = provider.teardown_plan();
        assert_eq!(plan, vec!["t-public-subnet-1", "t-igw", "t-vpc"]);
    }

    #[test]
    fn test_fault_injection() {
        let mut provider = MemoryProvider::new();
        provider.fail_creation_of("t-vpc");
        assert!(provider.create_network("t-vpc", &network_request()).is_err());

        provider.clear_faults();
        assert!(provider.create_network("t-vpc", &network_request()).is_ok());
    }
}
