//! Concrete deployer backends.
//!
//! Each backend is in its own submodule with:
//! - `cmd.rs` - Command builder for invoking the external tool
//! - `mod.rs` - The [`IgpDeployer`](crate::traits::IgpDeployer) implementation

pub mod command;

pub use command::{CommandDeployer, DeployCmdBuilder};
