//! Aggregation commands: `whois`, `resources`, `passes`.
//!
//! Success prints the listing envelope. Failure prints the error envelope
//! on stdout, then surfaces the error for the exit code.

use serde::Serialize;

use rbxfolio_core::{Aggregator, CoreError, ErrorEnvelope, SubResourceView};

use crate::cli::{GlobalOpts, IdentityArgs, OutputFormat, PassesArgs};
use crate::error::CliError;
use crate::output;

fn report<T: Serialize>(format: OutputFormat, result: Result<T, CoreError>) -> Result<(), CliError> {
    match result {
        Ok(document) => output::print(format, &document),
        Err(err) => {
            output::print(format, &ErrorEnvelope::from(&err))?;
            Err(err.into())
        }
    }
}

pub async fn whois(
    aggregator: &Aggregator,
    args: &IdentityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    report(global.output, aggregator.resolve_identity(&args.identity).await)
}

pub async fn resources(
    aggregator: &Aggregator,
    args: &IdentityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    report(global.output, aggregator.list_resources(&args.identity).await)
}

pub async fn passes(
    aggregator: &Aggregator,
    args: &PassesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let view = if args.non_empty {
        SubResourceView::NonEmpty
    } else {
        SubResourceView::All
    };
    report(
        global.output,
        aggregator
            .list_sub_resources(&args.target.identity, view)
            .await,
    )
}
