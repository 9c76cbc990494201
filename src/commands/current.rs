use super::LemContext;
use anyhow::Result;

/// Show the selected stage
///
/// # Errors
///
/// Returns an error if no stage is selected or the selection no longer
/// resolves
pub fn execute(ctx: &LemContext) -> Result<()> {
    let mut config = ctx.load()?;
    config.current()?;
    Ok(())
}
