//! `vfleet vdb` subcommands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use vfleet_engine::Operation;
use vfleet_engine::ops::{DeleteVdb, RefreshVdb};

#[derive(Subcommand, Debug)]
pub enum VdbCommand {
    /// Refresh a virtual database
    Refresh(RefreshArgs),

    /// Delete a virtual database
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Name of the VDB to refresh
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Name of the VDB to delete
    pub name: String,

    /// Force deletion even if the engine reports the source in use
    #[arg(long)]
    pub force: bool,
}

pub fn operation(cmd: VdbCommand) -> Arc<dyn Operation> {
    match cmd {
        VdbCommand::Refresh(args) => Arc::new(RefreshVdb { name: args.name }),
        VdbCommand::Delete(args) => Arc::new(DeleteVdb {
            name: args.name,
            force: args.force,
        }),
    }
}
