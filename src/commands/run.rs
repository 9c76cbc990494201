use super::LemContext;
use anyhow::Result;

/// Distribute the central env to every group
///
/// # Errors
///
/// Returns the first stage, group, check or write error. Groups written
/// before the failure keep their new `.env`.
pub fn execute(ctx: &LemContext, stage: Option<&str>) -> Result<()> {
    let mut config = ctx.load()?;
    config.run(stage)?;
    Ok(())
}
