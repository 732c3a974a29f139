//! Network topology construction.
//!
//! The stages of the synthesis pipeline, in dependency order:
//!
//! - `allocator`: the network container and its security group
//! - `subnets`: per-zone public/private subnet partitioning
//! - `gateways`: the internet gateway and per-zone NAT chains
//! - `routes`: route tables, default routes and subnet associations
//!
//! Each stage consumes only the outputs of prior stages.

pub mod allocator;
pub mod gateways;
pub mod routes;
pub mod subnets;
pub mod types;

pub use allocator::{allocate_network, create_security_group};
pub use gateways::{provision_gateways, GatewaySet};
pub use routes::{wire_routes, RouteWiring};
pub use subnets::{partition_subnets, SubnetPlan};
