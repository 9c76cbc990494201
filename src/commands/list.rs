use super::LemContext;
use crate::output::render_entries;
use anyhow::Result;

/// Print the entries every group receives as a table
///
/// # Errors
///
/// Returns an error if the stage cannot be resolved or its env read
pub fn execute(ctx: &LemContext, stage: Option<&str>) -> Result<()> {
    let mut config = ctx.load()?;
    let entries = config.list(stage)?;
    config.output_mut().raw(&render_entries(&entries));
    Ok(())
}
