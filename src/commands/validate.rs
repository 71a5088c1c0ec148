//! `skein validate`: build the request document without state or transport

use anyhow::{Context as AnyhowContext, Result, bail};
use modelkit::Diagnostics;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::engine::Cycle;
use crate::models;
use crate::ui;

struct FileReport {
    path: PathBuf,
    outcome: Result<Diagnostics>,
}

impl FileReport {
    fn has_errors(&self) -> bool {
        match &self.outcome {
            Ok(diags) => diags.has_errors(),
            Err(_) => true,
        }
    }
}

pub fn run(ctx: &Context, paths: &[PathBuf], jobs: Option<usize>) -> Result<()> {
    let files = models::discover(paths);
    if files.is_empty() {
        bail!("No project files found");
    }

    let jobs = jobs.unwrap_or(ctx.config.jobs).max(1);
    log::debug!("Validating {} file(s) with {jobs} job(s)", files.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to build thread pool")?;

    let reports: Vec<FileReport> = pool.install(|| {
        files
            .par_iter()
            .map(|path| FileReport {
                path: path.clone(),
                outcome: check_file(path),
            })
            .collect()
    });

    let failed = reports.iter().filter(|r| r.has_errors()).count();
    for report in &reports {
        print_report(ctx, report);
    }

    if failed > 0 {
        bail!("{failed} of {} file(s) failed validation", reports.len());
    }
    if !ctx.quiet {
        println!();
        ui::success(&format!("{} file(s) valid", reports.len()));
    }
    Ok(())
}

fn check_file(path: &Path) -> Result<Diagnostics> {
    let project = models::load_project(path)?;
    let mut cycle = Cycle::new(project);
    // references are only resolved while the document is built
    if let Err(e) = cycle.request() {
        log::debug!("{}: {e}", path.display());
    }
    Ok(std::mem::take(&mut cycle.handler.diags))
}

fn print_report(ctx: &Context, report: &FileReport) {
    let path = report.path.display().to_string();
    match &report.outcome {
        Err(e) => ui::error(&format!("{path}: {e:#}")),
        Ok(diags) if diags.has_errors() => {
            ui::error(&format!("{path}: {} error(s)", diags.errors().count()));
            ui::diagnostics(diags, ctx.verbose > 0);
        }
        Ok(diags) => {
            if !ctx.quiet {
                ui::success(&path);
            }
            ui::diagnostics(diags, ctx.verbose > 0);
        }
    }
}
