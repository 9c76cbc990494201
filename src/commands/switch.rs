use super::LemContext;
use anyhow::Result;

/// Select `stage` for subsequent commands
///
/// # Errors
///
/// Returns an error if the stage is invalid or the selection cannot be saved
pub fn execute(ctx: &LemContext, stage: &str) -> Result<()> {
    let mut config = ctx.load()?;
    config.switch(stage)?;
    Ok(())
}
