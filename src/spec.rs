use crate::cidr::{CidrBlock, CidrParseError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// NAT gateway placement strategy.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NatStrategy {
    /// One NAT gateway per availability zone (highly available).
    #[default]
    PerZone,
    /// One NAT gateway shared by every zone (cost-optimized).
    Single,
}

/// A deployment file: a named deployment plus the network it declares.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeploymentFile {
    pub deployment: DeploymentConfig,
    pub network: RawTopologySpec,
}

/// Deployment-level settings shared by every resource in the stack.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeploymentConfig {
    /// Name prefixed to every logical resource name (e.g. "non-prod").
    pub name: String,
    /// Tags applied to every taggable resource.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Raw network arguments as they appear in the deployment file.
///
/// Required fields have no serde defaults: omitting them fails
/// deserialization rather than being silently defaulted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RawTopologySpec {
    pub vpc_cidr: String,
    pub availability_zones: Vec<String>,
    pub public_subnet_cidrs: Vec<String>,
    /// May be empty for a public-subnet-only network.
    #[serde(default)]
    pub private_subnet_cidrs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_tenancy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dns_hostnames: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dns_support: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_strategy: Option<NatStrategy>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Topology validation errors. Each variant names the violated invariant.
#[derive(Debug, thiserror::Error)]
pub enum InvalidTopology {
    #[error("deployment name cannot be empty")]
    EmptyDeploymentName,
    #[error("availability_zones cannot be empty")]
    EmptyZones,
    #[error("duplicate availability zone '{0}'")]
    DuplicateZone(String),
    #[error("{field} has {got} entries but availability_zones has {zones}")]
    CountMismatch {
        field: &'static str,
        got: usize,
        zones: usize,
    },
    #[error("{field}: malformed CIDR: {source}")]
    MalformedCidr {
        field: &'static str,
        source: CidrParseError,
    },
    #[error("subnet CIDR {subnet} is not contained in vpc_cidr {vpc}")]
    NotContained { subnet: CidrBlock, vpc: CidrBlock },
    #[error("subnet CIDRs {a} and {b} overlap")]
    OverlappingCidrs { a: CidrBlock, b: CidrBlock },
}

/// A validated, normalized topology specification.
///
/// Immutable once constructed; the synthesis pipeline consumes it
/// read-only. All CIDRs are parsed, all defaults applied, and the
/// zone/subnet sequences are index-aligned: entry *i* of each subnet
/// list belongs to `availability_zones[i]`.
#[derive(Debug, Clone)]
pub struct TopologySpec {
    pub name: String,
    pub vpc_cidr: CidrBlock,
    pub availability_zones: Vec<String>,
    pub public_subnet_cidrs: Vec<CidrBlock>,
    pub private_subnet_cidrs: Vec<CidrBlock>,
    pub instance_tenancy: String,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
    pub security_group_name: String,
    pub nat_strategy: NatStrategy,
    pub tags: BTreeMap<String, String>,
}

impl TopologySpec {
    /// Validate and normalize a deployment file into a `TopologySpec`.
    ///
    /// Checks, in order: non-empty deployment name, non-empty and
    /// duplicate-free zone list, zone/subnet count alignment, CIDR
    /// syntax, containment in `vpc_cidr`, and pairwise non-overlap
    /// across the union of public and private subnet CIDRs.
    pub fn validate(file: &DeploymentFile) -> Result<TopologySpec, InvalidTopology> {
        let deployment = &file.deployment;
        let raw = &file.network;

        if deployment.name.trim().is_empty() {
            return Err(InvalidTopology::EmptyDeploymentName);
        }

        let zones = &raw.availability_zones;
        if zones.is_empty() {
            return Err(InvalidTopology::EmptyZones);
        }
        for (i, zone) in zones.iter().enumerate() {
            if zones[..i].contains(zone) {
                return Err(InvalidTopology::DuplicateZone(zone.clone()));
            }
        }

        if raw.public_subnet_cidrs.len() != zones.len() {
            return Err(InvalidTopology::CountMismatch {
                field: "public_subnet_cidrs",
                got: raw.public_subnet_cidrs.len(),
                zones: zones.len(),
            });
        }
        // An empty private list declares a public-subnet-only network.
        if !raw.private_subnet_cidrs.is_empty() && raw.private_subnet_cidrs.len() != zones.len() {
            return Err(InvalidTopology::CountMismatch {
                field: "private_subnet_cidrs",
                got: raw.private_subnet_cidrs.len(),
                zones: zones.len(),
            });
        }

        let vpc_cidr = parse_cidr("vpc_cidr", &raw.vpc_cidr)?;
        let public_subnet_cidrs = parse_cidr_list("public_subnet_cidrs", &raw.public_subnet_cidrs)?;
        let private_subnet_cidrs =
            parse_cidr_list("private_subnet_cidrs", &raw.private_subnet_cidrs)?;

        let all_subnets: Vec<CidrBlock> = public_subnet_cidrs
            .iter()
            .chain(private_subnet_cidrs.iter())
            .copied()
            .collect();
        for subnet in &all_subnets {
            if !vpc_cidr.contains(subnet) {
                return Err(InvalidTopology::NotContained {
                    subnet: *subnet,
                    vpc: vpc_cidr,
                });
            }
        }
        for (i, a) in all_subnets.iter().enumerate() {
            for b in &all_subnets[i + 1..] {
                if a.overlaps(b) {
                    return Err(InvalidTopology::OverlappingCidrs { a: *a, b: *b });
                }
            }
        }

        let mut tags = deployment.tags.clone();
        tags.extend(raw.tags.clone());

        Ok(TopologySpec {
            name: deployment.name.clone(),
            vpc_cidr,
            availability_zones: zones.clone(),
            public_subnet_cidrs,
            private_subnet_cidrs,
            instance_tenancy: raw
                .instance_tenancy
                .clone()
                .unwrap_or_else(|| "default".to_string()),
            enable_dns_hostnames: raw.enable_dns_hostnames.unwrap_or(true),
            enable_dns_support: raw.enable_dns_support.unwrap_or(true),
            security_group_name: raw
                .security_group_name
                .clone()
                .unwrap_or_else(|| format!("{}-sg", deployment.name)),
            nat_strategy: raw.nat_strategy.unwrap_or_default(),
            tags,
        })
    }

    /// Number of availability zones in the topology.
    pub fn zone_count(&self) -> usize {
        self.availability_zones.len()
    }

    /// True if the topology declares private subnets.
    pub fn has_private_subnets(&self) -> bool {
        !self.private_subnet_cidrs.is_empty()
    }
}

fn parse_cidr(field: &'static str, s: &str) -> Result<CidrBlock, InvalidTopology> {
    CidrBlock::parse(s).map_err(|source| InvalidTopology::MalformedCidr { field, source })
}

fn parse_cidr_list(field: &'static str, list: &[String]) -> Result<Vec<CidrBlock>, InvalidTopology> {
    list.iter().map(|s| parse_cidr(field, s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_file(yaml: &str) -> DeploymentFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    const TWO_ZONE_YAML: &str = r#"
deployment:
  name: "non-prod"
  tags:
    Name: non-prod-vpc
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: ["az-a", "az-b"]
  public_subnet_cidrs: ["10.0.1.0/24", "10.0.2.0/24"]
  private_subnet_cidrs: ["10.0.3.0/24", "10.0.4.0/24"]
  security_group_name: "sg-non-prod"
"#;

    #[test]
    fn test_valid_spec_normalization() {
        let file = parse_file(TWO_ZONE_YAML);
        let spec = TopologySpec::validate(&file).unwrap();

        assert_eq!(spec.name, "non-prod");
        assert_eq!(spec.zone_count(), 2);
        assert_eq!(spec.vpc_cidr.to_string(), "10.0.0.0/16");
        assert_eq!(spec.public_subnet_cidrs.len(), 2);
        assert_eq!(spec.private_subnet_cidrs.len(), 2);

        // Defaults for optional fields only
        assert_eq!(spec.instance_tenancy, "default");
        assert!(spec.enable_dns_hostnames);
        assert!(spec.enable_dns_support);
        assert_eq!(spec.nat_strategy, NatStrategy::PerZone);
        assert_eq!(spec.security_group_name, "sg-non-prod");
        assert_eq!(spec.tags.get("Name"), Some(&"non-prod-vpc".to_string()));
    }

    #[test]
    fn test_count_mismatch() {
        let yaml = r#"
deployment:
  name: "t"
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: ["az-a", "az-b"]
  public_subnet_cidrs: ["10.0.1.0/24"]
"#;
        let err = TopologySpec::validate(&parse_file(yaml)).unwrap_err();
        assert!(matches!(
            err,
            InvalidTopology::CountMismatch {
                field: "public_subnet_cidrs",
                got: 1,
                zones: 2,
            }
        ));
    }

    #[test]
    fn test_private_count_mismatch() {
        let yaml = r#"
deployment:
  name: "t"
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: ["az-a", "az-b"]
  public_subnet_cidrs: ["10.0.1.0/24", "10.0.2.0/24"]
  private_subnet_cidrs: ["10.0.3.0/24"]
"#;
        let err = TopologySpec::validate(&parse_file(yaml)).unwrap_err();
        assert!(matches!(
            err,
            InvalidTopology::CountMismatch {
                field: "private_subnet_cidrs",
                ..
            }
        ));
    }

    #[test]
    fn test_overlapping_subnets() {
        let yaml = r#"
deployment:
  name: "t"
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: ["az-a", "az-b"]
  public_subnet_cidrs: ["10.0.1.0/24", "10.0.1.128/25"]
"#;
        let err = TopologySpec::validate(&parse_file(yaml)).unwrap_err();
        assert!(matches!(err, InvalidTopology::OverlappingCidrs { .. }));
    }

    #[test]
    fn test_subnet_outside_vpc() {
        let yaml = r#"
deployment:
  name: "t"
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: ["az-a"]
  public_subnet_cidrs: ["10.1.1.0/24"]
"#;
        let err = TopologySpec::validate(&parse_file(yaml)).unwrap_err();
        assert!(matches!(err, InvalidTopology::NotContained { .. }));
    }

    #[test]
    fn test_duplicate_zone() {
        let yaml = r#"
deployment:
  name: "t"
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: ["az-a", "az-a"]
  public_subnet_cidrs: ["10.0.1.0/24", "10.0.2.0/24"]
"#;
        let err = TopologySpec::validate(&parse_file(yaml)).unwrap_err();
        assert!(matches!(err, InvalidTopology::DuplicateZone(z) if z == "az-a"));
    }

    #[test]
    fn test_empty_zone_list() {
        let yaml = r#"
deployment:
  name: "t"
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: []
  public_subnet_cidrs: []
"#;
        let err = TopologySpec::validate(&parse_file(yaml)).unwrap_err();
        assert!(matches!(err, InvalidTopology::EmptyZones));
    }

    #[test]
    fn test_malformed_cidr() {
        let yaml = r#"
deployment:
  name: "t"
network:
  vpc_cidr: "10.0.0.0"
  availability_zones: ["az-a"]
  public_subnet_cidrs: ["10.0.1.0/24"]
"#;
        let err = TopologySpec::validate(&parse_file(yaml)).unwrap_err();
        assert!(matches!(
            err,
            InvalidTopology::MalformedCidr {
                field: "vpc_cidr",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_required_field_fails_deserialization() {
        // No default may stand in for a required field.
        let yaml = r#"
deployment:
  name: "t"
network:
  availability_zones: ["az-a"]
  public_subnet_cidrs: ["10.0.1.0/24"]
"#;
        assert!(serde_yaml::from_str::<DeploymentFile>(yaml).is_err());
    }

    #[test]
    fn test_nat_strategy_parsing() {
        let yaml = r#"
deployment:
  name: "t"
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: ["az-a"]
  public_subnet_cidrs: ["10.0.1.0/24"]
  private_subnet_cidrs: ["10.0.2.0/24"]
  nat_strategy: single
"#;
        let spec = TopologySpec::validate(&parse_file(yaml)).unwrap();
        assert_eq!(spec.nat_strategy, NatStrategy::Single);
    }
}
