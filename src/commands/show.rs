use anyhow::Result;
use std::path::Path;

use crate::Context;
use crate::commands::plan;
use crate::models::SECRET_KEYS;
use crate::ui;

/// Print the request document apply would send, secrets masked
pub fn run(ctx: &Context, file: &Path) -> Result<()> {
    let store = ctx.config.state_store()?;
    let planned = plan::prepare(ctx, &store, file)?;
    println!("{}", ui::pretty(&ui::redact(&planned.request, SECRET_KEYS)));
    Ok(())
}
