use anyhow::Result;
use idp_metadata::cli;

// Main function
fn main() -> Result<()> {
    let action = cli::start()?;

    action.execute()?;

    Ok(())
}
