//! `vfleet engine` subcommands: local catalog operations, no sessions.

use clap::Subcommand;

use vfleet_engine::{EngineCatalog, EngineError};

use crate::opts::FleetOpts;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum EngineCommand {
    /// List the engines in the catalog
    List,
}

pub fn run(opts: &FleetOpts, cmd: EngineCommand) -> Result<(), EngineError> {
    match cmd {
        EngineCommand::List => {
            let catalog = EngineCatalog::load(&opts.config)?;
            output::print_catalog(opts, &catalog);
            Ok(())
        }
    }
}
