//! `vfleet container` subcommands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use vfleet_engine::Operation;
use vfleet_engine::ops::{
    AddOwner, CreateContainer, DeleteContainer, ListContainers, RefreshContainer, RemoveOwner,
    RestoreContainer,
};

#[derive(Subcommand, Debug)]
pub enum ContainerCommand {
    /// Create a container from a template and a source database
    Create(CreateArgs),

    /// Delete a container
    Delete(DeleteArgs),

    /// Refresh a container from its template
    Refresh(NameArg),

    /// Restore a container to a named bookmark
    Restore(RestoreArgs),

    /// Add an owner to a container
    AddOwner(OwnerArgs),

    /// Remove an owner from a container
    RemoveOwner(OwnerArgs),

    /// List containers on the selected engines
    List,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name of the new container
    pub name: String,

    /// Template to create the container from
    #[arg(long)]
    pub template: String,

    /// Source database for the container
    #[arg(long)]
    pub database: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Name of the container to delete
    pub name: String,

    /// Keep the underlying VDBs when deleting the container
    #[arg(long)]
    pub keep_vdbs: bool,
}

#[derive(Args, Debug)]
pub struct NameArg {
    /// Name of the container
    pub name: String,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Name of the container to restore
    pub name: String,

    /// Bookmark to restore the container to
    #[arg(long)]
    pub bookmark: String,
}

#[derive(Args, Debug)]
pub struct OwnerArgs {
    /// Name of the owner
    pub user: String,

    /// Name of the container
    #[arg(long)]
    pub container: String,
}

pub fn operation(cmd: ContainerCommand) -> Arc<dyn Operation> {
    match cmd {
        ContainerCommand::Create(args) => Arc::new(CreateContainer {
            name: args.name,
            template: args.template,
            database: args.database,
        }),
        ContainerCommand::Delete(args) => Arc::new(DeleteContainer {
            name: args.name,
            keep_vdbs: args.keep_vdbs,
        }),
        ContainerCommand::Refresh(args) => Arc::new(RefreshContainer { name: args.name }),
        ContainerCommand::Restore(args) => Arc::new(RestoreContainer {
            name: args.name,
            bookmark: args.bookmark,
        }),
        ContainerCommand::AddOwner(args) => Arc::new(AddOwner {
            container: args.container,
            user: args.user,
        }),
        ContainerCommand::RemoveOwner(args) => Arc::new(RemoveOwner {
            container: args.container,
            user: args.user,
        }),
        ContainerCommand::List => Arc::new(ListContainers),
    }
}
