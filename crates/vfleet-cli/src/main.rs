mod commands;
mod opts;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::container::ContainerCommand;
use commands::engines::EngineCommand;
use commands::replication::ReplicationCommand;
use commands::vdb::VdbCommand;
use opts::FleetOpts;

#[derive(Parser, Debug)]
#[command(
    name = "vfleet",
    version,
    about = "Lifecycle operations across a fleet of virtualization engines"
)]
struct Cli {
    #[command(flatten)]
    opts: FleetOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Self-service container operations
    #[command(subcommand)]
    Container(ContainerCommand),

    /// Virtual database operations
    #[command(subcommand)]
    Vdb(VdbCommand),

    /// Replication profile operations
    #[command(subcommand)]
    Replication(ReplicationCommand),

    /// Engine catalog commands
    #[command(subcommand)]
    Engine(EngineCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.opts);
    let opts = cli.opts;

    let op = match cli.command {
        Command::Container(cmd) => commands::container::operation(cmd),
        Command::Vdb(cmd) => commands::vdb::operation(cmd),
        Command::Replication(cmd) => commands::replication::operation(cmd),
        Command::Engine(cmd) => {
            return match commands::engines::run(&opts, cmd) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("error: {err}");
                    ExitCode::from(2)
                }
            };
        }
    };

    // The single place exit codes are decided: configuration and target
    // resolution problems are distinct from engine failures, which are
    // distinct from an operator interrupt.
    match commands::run_command(&opts, op).await {
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
        Ok(run) => {
            output::print_report(&opts, &run.report, &run.data);
            if run.report.interrupted() {
                ExitCode::from(130)
            } else if !run.report.success() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn setup_logging(opts: &FleetOpts) {
    let default = if opts.debug {
        "debug"
    } else if opts.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("VFLEET_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
