//! Command handlers.

pub mod aggregate;
pub mod config_cmd;

use rbxfolio_core::Aggregator;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route an aggregation command. `config` is handled before connecting.
pub async fn dispatch(
    cmd: Command,
    aggregator: &Aggregator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Whois(args) => aggregate::whois(aggregator, &args, global).await,
        Command::Resources(args) => aggregate::resources(aggregator, &args, global).await,
        Command::Passes(args) => aggregate::passes(aggregator, &args, global).await,
        Command::Config(args) => config_cmd::handle(&args, global),
    }
}
