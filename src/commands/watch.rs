use super::LemContext;
use crate::watch::CancelToken;
use anyhow::Result;

/// Distribute, then keep redistributing on change until `cancel` fires
///
/// # Errors
///
/// Returns the initial run error, a watcher error or the first failed rerun
pub fn execute(ctx: &LemContext, stage: Option<&str>, cancel: &CancelToken) -> Result<()> {
    let mut config = ctx.load()?;
    config.watch(stage, cancel)?;
    config.output_mut().notice("stopped watching");
    Ok(())
}
