use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use hyp_deploy::{CHAINS_FILENAME, DEFAULT_ARTIFACTS_DIR};
use tracing::level_filters::LevelFilter;

/// Default timeout in seconds of a single chain deployment.
const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 600;

#[derive(Parser)]
#[command(name = "hyp")]
#[command(
    author,
    version,
    about = "Permissionless interchain gas paymaster deployment and warp route tooling"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, global = true, env = "HYP_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the interchain gas paymaster to a local chain and its remotes.
    DeployIgp(DeployIgpArgs),
    /// Validate a warp route config and print the chains it deploys to.
    ValidateWarp(ValidateWarpArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DeployIgpArgs {
    /// The chain to deploy to.
    #[arg(long, env = "HYP_LOCAL")]
    pub local: String,

    /// The chains with which `local` will be able to send and receive messages.
    #[arg(long, env = "HYP_REMOTES", value_delimiter = ',', num_args = 1.., required = true)]
    pub remotes: Vec<String>,

    /// A hexadecimal private key for transaction signing.
    #[arg(long, env = "HYP_KEY", hide_env_values = true)]
    pub key: String,

    /// Whether or not to write the agent config.
    #[arg(long, env = "HYP_WRITE_AGENT_CONFIG", default_value_t = true, action = ArgAction::Set)]
    pub write_agent_config: bool,

    /// The directory holding `addresses.json`.
    ///
    /// Addresses recorded by earlier runs are read from it, so an interrupted
    /// deployment resumes where it stopped.
    #[arg(long, env = "HYP_ARTIFACTS", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Path to the chain registry file.
    #[arg(long, env = "HYP_CHAINS", default_value = CHAINS_FILENAME)]
    pub chains: PathBuf,

    /// Program deploying the IGP contracts of a single chain.
    ///
    /// It receives the chain's IGP config as JSON on stdin and must print a JSON
    /// object of contract name to address, including `proxyAdmin`,
    /// `storageGasOracle` and `interchainGasPaymaster`.
    #[arg(long, env = "HYP_DEPLOYER_CMD")]
    pub deployer_cmd: String,

    /// Extra argument passed to the deployer program. May be repeated.
    #[arg(long = "deployer-arg", allow_hyphen_values = true)]
    pub deployer_args: Vec<String>,

    /// Skip checking that the key holds funds on every deployable chain.
    #[arg(long, env = "HYP_SKIP_BALANCE_CHECK")]
    pub skip_balance_check: bool,

    /// Timeout in seconds of a single chain deployment.
    #[arg(long, env = "HYP_DEPLOY_TIMEOUT", default_value_t = DEFAULT_DEPLOY_TIMEOUT_SECS)]
    pub deploy_timeout: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateWarpArgs {
    /// Path to a warp route config (JSON or TOML).
    pub path: PathBuf,
}
