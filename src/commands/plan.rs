//! `skein plan`: diff the last applied state against the proposal

use anyhow::{Context as AnyhowContext, Result};
use modelkit::Document;
use std::path::Path;

use crate::Context;
use crate::engine::{self, Cycle};
use crate::models::{self, SECRET_KEYS};
use crate::state::{StateEntry, StateStore};
use crate::ui;

/// A stabilized proposal and the request it serializes to
pub struct Planned {
    pub cycle: Cycle,
    pub request: Document,
    pub prior: Option<StateEntry>,
}

impl Planned {
    pub fn name(&self) -> &str {
        self.cycle.name()
    }

    /// The prior side of the diff, rendered like a request
    pub fn prior_document(&self) -> Document {
        self.prior
            .as_ref()
            .map(|entry| engine::render(&entry.model))
            .unwrap_or_default()
    }
}

pub fn run(ctx: &Context, file: &Path) -> Result<()> {
    let store = ctx.config.state_store()?;
    let planned = prepare(ctx, &store, file)?;
    print_plan(&planned);
    Ok(())
}

/// Load, stabilize against stored state, and serialize
pub fn prepare(ctx: &Context, store: &StateStore, file: &Path) -> Result<Planned> {
    let project = models::load_project(file)?;
    let mut cycle = Cycle::new(project);

    let prior = match cycle.name() {
        "" => None,
        name => store.load(name)?,
    };
    if cycle.stabilize(prior.as_ref().map(|entry| &entry.model)) {
        log::info!("Stabilized '{}' against stored state", cycle.name());
    }

    let result = cycle.request();
    ui::diagnostics(&cycle.handler.diags, ctx.verbose > 0);
    let request = result.with_context(|| format!("Cannot plan {}", file.display()))?;

    Ok(Planned {
        cycle,
        request,
        prior,
    })
}

/// Print the plan; returns whether anything would change
pub fn print_plan(planned: &Planned) -> bool {
    ui::header(&format!("Plan: {}", planned.name()));
    match &planned.prior {
        Some(entry) => ui::kv(
            "Last applied",
            &entry.last_updated.format("%Y-%m-%d %H:%M UTC").to_string(),
        ),
        None => ui::info("No stored state, everything will be created"),
    }
    println!();

    let old = ui::pretty(&ui::redact(&planned.prior_document(), SECRET_KEYS));
    let new = ui::pretty(&ui::redact(&planned.request, SECRET_KEYS));
    let changed = ui::print_diff(&old, &new);

    let pending = planned.cycle.pending();
    if !pending.is_empty() {
        ui::section("(known after apply)");
        for entity in &pending {
            ui::dim(&format!("id of {entity}"));
        }
    }

    println!();
    if changed {
        ui::info("Run 'skein apply' to make these changes");
    } else {
        ui::success("No changes");
    }
    changed
}
