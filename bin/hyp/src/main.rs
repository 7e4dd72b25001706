//! hyp deploys the interchain gas paymaster across chains and validates warp route configs.

mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;

use cli::{Cli, Command, DeployIgpArgs, ValidateWarpArgs};
use hyp_deploy::{
    AddressMap, BalanceSource, ChainName, CommandDeployer, DeployCmdBuilder, DeployConfig,
    LocalOwnerSigner, MultiProvider, PermissionlessIgpDeployer, RpcBalanceSource, WarpRouteConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    match cli.command {
        Command::DeployIgp(args) => deploy_igp(args).await,
        Command::ValidateWarp(args) => validate_warp(args),
    }
}

async fn deploy_igp(args: DeployIgpArgs) -> Result<()> {
    tracing::info!("Preparing IGP deployer");

    let config = DeployConfig::load_from_file(&args.chains)?;
    let registry = config.multi_provider();

    let signer = LocalOwnerSigner::from_hex(&args.key).context("Invalid --key")?;

    let cmd = DeployCmdBuilder::new(&args.deployer_cmd)
        .args(args.deployer_args.iter())
        .env("HYP_PRIVATE_KEY", &args.key);
    let deployer = CommandDeployer::new(cmd, registry.clone())
        .timeout(Duration::from_secs(args.deploy_timeout));

    let remotes = args.remotes.iter().map(ChainName::new).collect();

    let run = PermissionlessIgpDeployer::new(
        registry,
        signer,
        deployer,
        ChainName::new(&args.local),
        remotes,
        &args.artifacts,
    )
    .igp_settings(config.igp)
    .write_agent_config(args.write_agent_config);

    tracing::info!(
        artifacts = %run.artifacts_dir().display(),
        local = %args.local,
        remotes = ?args.remotes,
        "Beginning IGP deployment"
    );

    if args.skip_balance_check {
        tracing::warn!("Skipping owner balance check");
        execute(run).await
    } else {
        execute(run.balance_check(RpcBalanceSource::new()?)).await
    }
}

async fn execute<B: BalanceSource>(
    mut run: PermissionlessIgpDeployer<MultiProvider, LocalOwnerSigner, CommandDeployer, B>,
) -> Result<()> {
    let report = run.deploy().await.context("IGP deployment failed")?;

    println!("{}", summary_table(&report.addresses, &report.deployed));

    Ok(())
}

fn validate_warp(args: ValidateWarpArgs) -> Result<()> {
    let config = WarpRouteConfig::load_from_file(&args.path)?;

    tracing::info!(
        path = %args.path.display(),
        base = %config.base.chain_name,
        synthetics = config.synthetics.len(),
        "Warp config is valid"
    );

    for chain in config.chains() {
        println!("{chain}");
    }

    Ok(())
}

/// Render every recorded address, marking the ones deployed by this run.
fn summary_table(addresses: &AddressMap, deployed: &AddressMap) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Chain", "Contract", "Address", "Status"]);

    for (chain, contracts) in addresses {
        for (contract, address) in contracts {
            let is_new = deployed
                .get(chain)
                .and_then(|c| c.get(contract))
                .is_some_and(|a| a == address);
            let status = if is_new { "deployed" } else { "cached" };
            table.add_row(vec![chain.as_str(), contract.as_str(), address.as_str(), status]);
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_table_marks_new_deployments() {
        let mut addresses = AddressMap::new();
        addresses
            .entry("polygon".into())
            .or_default()
            .insert("interchainGasPaymaster".to_string(), "0x1".to_string());
        addresses
            .entry("ethereum".into())
            .or_default()
            .insert("interchainGasPaymaster".to_string(), "0x2".to_string());

        let mut deployed = AddressMap::new();
        deployed
            .entry("ethereum".into())
            .or_default()
            .insert("interchainGasPaymaster".to_string(), "0x2".to_string());

        let rendered = summary_table(&addresses, &deployed).to_string();
        assert!(rendered.contains("deployed"));
        assert!(rendered.contains("cached"));
        assert!(rendered.contains("polygon"));
    }
}
