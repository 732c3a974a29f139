//! # vpcsynth - Topology synthesizer for multi-tier virtual networks
//!
//! This library declares and provisions a VPC-equivalent network for
//! workloads spanning one or more availability zones: address space is
//! split into public and private subnets, internet egress is attached
//! (a shared internet gateway for public subnets, per-zone NAT
//! gateways for private subnets), and routing is wired so traffic from
//! each subnet reaches the correct gateway.
//!
//! ## Architecture
//!
//! Synthesis is a single-pass, dependency-ordered pipeline:
//!
//! - `spec`: declarative input types, validation and normalization
//! - `spec_loader`: deployment file loading
//! - `cidr`: CIDR block parsing, containment and overlap checks
//! - `provider`: the provider seam and the in-memory implementation
//! - `network`: the construction stages (allocator, subnets, gateways,
//!   routes)
//! - `outputs`: the read-only output projection for downstream stacks
//! - `synthesizer`: the pipeline driver
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vpcsynth::{provider::MemoryProvider, spec_loader, synthesizer};
//!
//! let spec = spec_loader::load_spec("deployment.yaml".as_ref())?;
//! let mut provider = MemoryProvider::new();
//! let outputs = synthesizer::synthesize(&spec, &mut provider)?;
//! println!("network: {}", outputs.network_id);
//! # Ok::<(), color_eyre::Report>(())
//! ```
//!
//! ## Error Handling
//!
//! Domain errors are typed (`spec::InvalidTopology`,
//! `error::SynthesisError`); validation failures abort before any
//! provider call is made, and provisioning failures report exactly
//! which zone chains failed while the provider's ledger records what
//! was created.

pub mod cidr;
pub mod error;
pub mod network;
pub mod outputs;
pub mod provider;
pub mod spec;
pub mod spec_loader;
pub mod synthesizer;
