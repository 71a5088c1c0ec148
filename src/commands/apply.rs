//! `skein apply`: plan, confirm, send, record state

use anyhow::{Context as AnyhowContext, Result};
use dialoguer::Confirm;
use std::path::Path;

use crate::Context;
use crate::commands::plan;
use crate::engine::Cycle;
use crate::models::SECRET_KEYS;
use crate::state::{StateEntry, StateStore};
use crate::transport::{LoopbackTransport, Transport};
use crate::ui;

pub fn run(ctx: &Context, file: &Path, dry_run: bool, yes: bool) -> Result<()> {
    let store = ctx.config.state_store()?;
    let planned = plan::prepare(ctx, &store, file)?;

    if !plan::print_plan(&planned) {
        return Ok(());
    }

    if dry_run {
        ui::info("Dry run, nothing was sent");
        return Ok(());
    }

    if !(yes || ctx.config.auto_approve) && !confirm_apply()? {
        ui::warn("Apply cancelled");
        return Ok(());
    }

    let transport = LoopbackTransport::new(SECRET_KEYS);
    let entry = apply_with(ctx, &store, &transport, planned.cycle)?;

    ui::success(&format!("Applied '{}'", entry.project));
    if let Some(id) = entry.model.id.as_present() {
        ui::kv("Project id", id);
    }
    ui::kv("State", &store.dir().display().to_string());
    Ok(())
}

/// Send a planned project and persist what comes back
pub fn apply_with(
    ctx: &Context,
    store: &StateStore,
    transport: &dyn Transport,
    planned: Cycle,
) -> Result<StateEntry> {
    // fresh handler: the plan's reference map and diagnostics are spent
    let mut cycle = Cycle::new(planned.project);
    let result = cycle.apply(transport);
    ui::diagnostics(&cycle.handler.diags, ctx.verbose > 0);
    let response = result.with_context(|| format!("Failed to apply '{}'", cycle.name()))?;

    let name = cycle.name().to_string();
    let entry = StateEntry::new(name, cycle.project, response);
    store.save(&entry)?;
    Ok(entry)
}

fn confirm_apply() -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt("Apply these changes?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;

    Ok(confirmed)
}
