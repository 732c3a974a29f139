use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use vpcsynth::provider::MemoryProvider;
use vpcsynth::{outputs, spec_loader, synthesizer};

/// Topology synthesizer for multi-tier virtual networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the deployment configuration YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory for the network outputs and resource ledger
    #[arg(short, long, default_value = "network_output")]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting vpcsynth topology synthesizer");
    info!("Deployment file: {:?}", args.config);
    info!("Output directory: {:?}", args.output);

    let spec = spec_loader::load_spec(&args.config)?;

    fs::create_dir_all(&args.output)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", args.output.display()))?;

    let mut provider = MemoryProvider::new();
    let output_set = synthesizer::synthesize(&spec, &mut provider)?;

    let outputs_path = args.output.join("network_outputs.json");
    outputs::write_outputs(&output_set, &outputs_path)?;

    // The ledger records creation order; teardown is its reverse.
    let ledger_path = args.output.join("resource_ledger.json");
    let ledger_json = serde_json::to_string_pretty(provider.ledger())?;
    fs::write(&ledger_path, ledger_json)
        .wrap_err_with(|| format!("Failed to write ledger to '{}'", ledger_path.display()))?;

    info!("Network outputs written to {:?}", outputs_path);
    info!("Resource ledger written to {:?}", ledger_path);
    info!(
        "Synthesized {} resource(s) for topology '{}'",
        provider.ledger().len(),
        spec.name
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(&["vpcsynth", "--config", "deployment.yaml"]);

        assert_eq!(args.config, PathBuf::from("deployment.yaml"));
        assert_eq!(args.output, PathBuf::from("network_output"));
    }

    #[test]
    fn test_cli_output_override() {
        let args = Args::parse_from(&[
            "vpcsynth",
            "--config",
            "deployment.yaml",
            "--output",
            "out/prod",
        ]);

        assert_eq!(args.output, PathBuf::from("out/prod"));
    }
}
