//! Collaborator seams of the deployment orchestrator.
//!
//! The orchestrator never talks to a network or holds key material itself: the
//! owner identity comes from an [`OwnerSigner`] and contracts are deployed by an
//! [`IgpDeployer`]. Both are injected at construction.

mod deployer;
mod signer;

pub use deployer::{DeploymentFailure, IgpDeployer};
pub use signer::{LocalOwnerSigner, OwnerSigner, StaticOwner};
