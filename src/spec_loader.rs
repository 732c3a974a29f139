use crate::spec::{DeploymentFile, TopologySpec};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load, parse and validate a deployment file.
pub fn load_spec(path: &Path) -> Result<TopologySpec> {
    info!("Loading deployment file from: {:?}", path);

    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open deployment file '{}'", path.display()))?;

    let deployment: DeploymentFile = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse deployment file '{}'", path.display()))?;

    let spec = TopologySpec::validate(&deployment)
        .wrap_err("Deployment file declares an invalid topology")?;

    info!(
        "Validated topology '{}': {} zone(s) in {}",
        spec.name,
        spec.zone_count(),
        spec.vpc_cidr
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::NatStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_deployment() {
        let yaml = r#"
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

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let spec = load_spec(temp_file.path()).unwrap();
        assert_eq!(spec.name, "non-prod");
        assert_eq!(spec.zone_count(), 2);
        assert_eq!(spec.nat_strategy, NatStrategy::PerZone);
    }

    #[test]
    fn test_load_rejects_invalid_topology() {
        // Subnet lists shorter than the zone list
        let yaml = r#"
deployment:
  name: "bad"
network:
  vpc_cidr: "10.0.0.0/16"
  availability_zones: ["az-a", "az-b"]
  public_subnet_cidrs: ["10.0.1.0/24"]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        assert!(load_spec(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_rejects_missing_file() {
        assert!(load_spec(Path::new("/nonexistent/deployment.yaml")).is_err());
    }
}
