//! `vfleet replication` subcommands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use vfleet_engine::Operation;
use vfleet_engine::ops::{ListReplicationSpecs, RunReplication};

#[derive(Subcommand, Debug)]
pub enum ReplicationCommand {
    /// Execute a replication profile
    Run(RunArgs),

    /// List replication profiles on the selected engines
    List,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Name of the replication profile to execute
    pub profile: String,
}

pub fn operation(cmd: ReplicationCommand) -> Arc<dyn Operation> {
    match cmd {
        ReplicationCommand::Run(args) => Arc::new(RunReplication {
            profile: args.profile,
        }),
        ReplicationCommand::List => Arc::new(ListReplicationSpecs),
    }
}
