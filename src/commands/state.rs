use anyhow::{Result, bail};
use colored::Colorize;

use crate::Context;
use crate::cli::StateCommand;
use crate::models::SECRET_KEYS;
use crate::ui;

pub fn run(ctx: &Context, cmd: StateCommand) -> Result<()> {
    let store = ctx.config.state_store()?;

    match cmd {
        StateCommand::List => {
            let entries = store.list()?;
            if entries.is_empty() {
                ui::info("No stored state");
                return Ok(());
            }
            ui::header("Stored state");
            for entry in &entries {
                println!(
                    "  {} {} {}",
                    entry.project.bold(),
                    entry.model.id.value_str().dimmed(),
                    entry
                        .last_updated
                        .format("%Y-%m-%d %H:%M UTC")
                        .to_string()
                        .dimmed()
                );
            }
            if ctx.verbose > 0 {
                ui::kv("Directory", &store.dir().display().to_string());
            }
        }
        StateCommand::Show { project } => {
            let Some(entry) = store.load(&project)? else {
                bail!("No stored state for '{project}'");
            };
            ui::kv(
                "Last applied",
                &entry.last_updated.format("%Y-%m-%d %H:%M UTC").to_string(),
            );
            println!("{}", ui::pretty(&ui::redact(&entry.document, SECRET_KEYS)));
        }
        StateCommand::Rm { project } => {
            if store.remove(&project)? {
                ui::success(&format!("Removed state for '{project}'"));
            } else {
                ui::warn(&format!("No stored state for '{project}'"));
            }
        }
    }

    Ok(())
}
