use super::LemContext;
use anyhow::Result;

/// Check the configuration and report unknown keys
///
/// # Errors
///
/// Returns the first validation error
pub fn execute(ctx: &LemContext) -> Result<()> {
    let mut config = ctx.load()?;
    config.validate()?;
    Ok(())
}
