//! hyp-deploy - Permissionless interchain gas paymaster deployment.
//!
//! This crate deploys the interchain gas paymaster (IGP) to a local chain and the
//! remote chains it exchanges messages with, recording every deployed address in a
//! resumable artifact. It also validates warp route token configurations.

pub mod addresses;
pub mod agent;
pub mod balance;
pub mod chains;
pub mod config;
mod deployer;
pub mod error;
pub mod igp;
pub mod participants;
pub mod services;
pub mod traits;
pub mod warp;

pub use addresses::{ADDRESSES_FILENAME, AddressMap, AddressStore, ContractAddresses, merge};
pub use agent::{AGENT_CONFIG_FILENAME, AgentConfig};
pub use balance::{BalanceSource, RpcBalanceSource, assert_balances};
pub use chains::{ChainMetadata, ChainName, ChainRegistry, MultiProvider, ProtocolType};
pub use config::{CHAINS_FILENAME, DeployConfig};
pub use deployer::{
    DEFAULT_ARTIFACTS_DIR, DeploymentReport, DeploymentStage, PermissionlessIgpDeployer,
};
pub use error::{DeployError, Result};
pub use igp::{IgpConfig, IgpSettings, build_igp_config_map};
pub use participants::{DeploymentParticipants, is_deployable_chain};
pub use services::{CommandDeployer, DeployCmdBuilder};
pub use traits::{DeploymentFailure, IgpDeployer, LocalOwnerSigner, OwnerSigner, StaticOwner};
pub use warp::{ValidationError, WarpRouteConfig, validate_warp_route_config};
