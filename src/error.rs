//! Synthesis error taxonomy.

use crate::provider::{ProviderError, ResourceKind};
use crate::spec::InvalidTopology;

/// Errors raised while synthesizing a topology.
///
/// Validation failures (`InvalidTopology`) are raised before any
/// provider call is made. Provisioning failures after validation may
/// leave partially-created infrastructure behind; the provider's
/// ledger records exactly what was created so the caller can retry or
/// tear down.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// Input validation failure. Always fatal, never retried.
    #[error("invalid topology: {0}")]
    InvalidTopology(#[from] InvalidTopology),

    /// A single entity failed to create. Retryable by the caller.
    #[error("failed to provision {kind} '{name}': {reason}")]
    Provisioning {
        kind: ResourceKind,
        name: String,
        reason: String,
    },

    /// One zone's NAT chain failed. Other zones' chains still run.
    #[error("NAT provisioning failed in zone '{zone}': {reason}")]
    NatProvisioning { zone: String, reason: String },

    /// At least one zone chain failed; the run did not converge.
    #[error("synthesis did not converge: {} zone chain(s) failed", .failures.len())]
    NotConverged { failures: Vec<SynthesisError> },

    /// An entity was asked to bind to a dependency that does not exist.
    /// A programming-contract violation: the dependency order of the
    /// pipeline was broken.
    #[error("'{dependent}' requested a binding to '{dependency}', which was never created")]
    DependencyUnresolved {
        dependent: String,
        dependency: String,
    },
}

impl SynthesisError {
    /// Lift a provider error into the synthesis taxonomy, attributing
    /// unknown-id failures to the named dependent entity.
    pub fn from_provider(dependent: &str, err: ProviderError) -> SynthesisError {
        match err {
            ProviderError::CreateFailed { kind, name, reason } => {
                SynthesisError::Provisioning { kind, name, reason }
            }
            ProviderError::UnknownId { id, .. } => SynthesisError::DependencyUnresolved {
                dependent: dependent.to_string(),
                dependency: id,
            },
        }
    }
}
