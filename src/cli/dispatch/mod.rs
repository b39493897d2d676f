use crate::cli::{
    actions::{render::Args, Action},
    commands::{idp, output},
};
use anyhow::Result;

/// # Errors
/// Returns an error if the arguments cannot be turned into an action.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    // Snapshot the configuration once; nothing downstream reads the environment.
    let config = idp::snapshot(matches);
    let policy = idp::policy(matches);
    let output = output::Options::parse(matches);

    Ok(Action::Render(Args {
        config,
        policy,
        output,
    }))
}
