//! `multipage build`.
//!
//! One pass: plan the pages, write a temporary template and manifest per
//! unit, run every unit's bundler in parallel, then assemble the outputs.
//! Temporary files are owned by a guard and removed on every exit path.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use multipage_config::{ConfigContext, MultiPageOptions};
use multipage_core::temp::sweep_stale;
use multipage_core::{
    cancel_pair, merge_all, plan, reorganize, synthesize, BuildResult, BuildUnit, Orchestrator,
    PageConfigSource, TempArtifacts,
};

use crate::cli::{BuildArgs, GlobalArgs};
use crate::commands::utils;
use crate::error::{BuildError, Result};
use crate::ui;

/// Execute the build command.
///
/// Any failed unit fails the command after every unit has finished. Unit
/// output directories are left in place for inspection in that case.
pub async fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let started = Instant::now();

    let root = utils::project_root(global.cwd.as_deref())?;
    let loaded = utils::load_options(&root, args.config.as_deref(), &ConfigContext::cli_build())?;
    let mut options = loaded.options;
    if let Some(merge) = args.merge {
        options.merge = merge.into();
    }
    let debug = global.verbose || options.debug;

    let mut forward = args.forward;
    if let Some(dir) = utils::extract_out_dir(&mut forward) {
        options.out_dir = PathBuf::from(dir);
    }
    let out_dir = utils::resolve_path(&options.out_dir, &root);

    let swept = sweep_stale(&root)?;
    if swept > 0 {
        tracing::debug!(removed = swept, "removed stale temporary files");
    }
    utils::clean_output_dir(&out_dir, &root)?;

    let spinner = ui::Spinner::new("Planning pages...");
    let source = PageConfigSource::from(options.page_configs.clone());
    let mut temps = TempArtifacts::new();
    let planned = plan_units(
        &root,
        &out_dir,
        &args.strategy,
        args.page.as_deref(),
        &options,
        &source,
        &mut temps,
    );
    let units = match planned {
        Ok(units) => units,
        Err(err) => {
            spinner.fail("Planning failed");
            return Err(err);
        }
    };
    let page_count: usize = units.iter().map(|unit| unit.pages.len()).sum();
    spinner.finish(&format!(
        "Planned {page_count} page(s) in {} build(s), merge mode '{}'",
        units.len(),
        options.merge
    ));

    let (cancel, signal) = cancel_pair();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut orchestrator = Orchestrator::new(&root, &options.bundler)
        .with_args(forward)
        .with_debug(debug)
        .with_cancel(signal.clone());
    if let Some(secs) = args.timeout {
        orchestrator = orchestrator.with_timeout(Duration::from_secs(secs));
    }

    let results = run_units(&orchestrator, &units, !debug && !global.quiet && ui::interactive()).await;
    ctrl_c.abort();

    if !global.quiet {
        ui::print_unit_summary(&results, started.elapsed());
    }

    if signal.is_cancelled() {
        return Err(BuildError::Cancelled.into());
    }
    let failed = results.iter().filter(|r| !r.success).count();
    if failed > 0 {
        return Err(BuildError::UnitsFailed {
            failed,
            total: results.len(),
        }
        .into());
    }

    // Templates and manifests are only needed while the bundlers run.
    drop(temps);

    let pages = assemble(&root, &out_dir, &options, &units, &results, debug)?;
    if !global.quiet {
        for page in &pages {
            ui::info(&format!("  {}", display_path(&out_dir.join(page), &root)));
        }
    }
    ui::success(&format!(
        "Built {} page(s) in {}",
        pages.len(),
        ui::format_duration(started.elapsed())
    ));
    Ok(())
}

fn plan_units(
    root: &Path,
    out_dir: &Path,
    strategies: &[String],
    page: Option<&str>,
    options: &MultiPageOptions,
    source: &PageConfigSource,
    temps: &mut TempArtifacts,
) -> Result<Vec<BuildUnit>> {
    let mut plan = plan(root, options, source)?.retain_strategies(strategies, options)?;
    if let Some(page) = page {
        plan = plan.retain_page(page)?;
    }
    for (strategy, pages) in &plan.groups {
        tracing::debug!(strategy = %strategy, pages = ?pages, "strategy group");
    }
    Ok(synthesize(root, out_dir, options, source, &plan, page.is_some(), temps)?)
}

async fn run_units(orchestrator: &Orchestrator, units: &[BuildUnit], show_progress: bool) -> Vec<BuildResult> {
    let mut progress = ui::BuildProgress::new(units.len() as u64, show_progress);
    for unit in units {
        progress.add_task(&unit.id);
    }

    let results = orchestrator
        .run_all_with(units, |index, result| {
            if result.success {
                progress.finish_task(index, &result.id, result.duration);
            } else {
                progress.fail_task(index, &result.id);
            }
        })
        .await;

    progress.finish("builds finished");
    results
}

/// Merge unit outputs into `out_dir`, drop the unit directories and, for
/// isolated merge modes, split the tree per page or strategy. Returns the
/// final HTML files relative to `out_dir`.
fn assemble(
    root: &Path,
    out_dir: &Path,
    options: &MultiPageOptions,
    units: &[BuildUnit],
    results: &[BuildResult],
    debug: bool,
) -> Result<Vec<String>> {
    let merged = merge_all(out_dir, results)?;
    tracing::debug!(
        copied = merged.copied,
        deduplicated = merged.deduplicated,
        renamed = merged.renamed.len(),
        "merged unit outputs"
    );
    for renamed in &merged.renamed {
        tracing::debug!(unit = %renamed.unit, from = %renamed.from, to = %renamed.to, "renamed conflicting asset");
    }

    for result in results {
        if let Err(err) = fs::remove_dir_all(&result.out_dir) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(dir = %result.out_dir.display(), %err, "failed to remove unit output");
            }
        }
    }

    let page_strategies: HashMap<String, String> = units
        .iter()
        .flat_map(|unit| unit.pages.iter().map(|page| (page.clone(), unit.strategy.clone())))
        .collect();
    let public_dir = utils::resolve_path(&options.public_dir, root);
    let summary = reorganize(out_dir, options.merge, &page_strategies, &public_dir)?;

    for warning in &summary.warnings {
        if debug {
            ui::warning(warning);
        } else {
            tracing::debug!(%warning, "reorganize");
        }
    }
    if debug {
        for (asset, pages) in &summary.usage {
            tracing::debug!(asset = %asset, pages = ?pages, "asset usage");
        }
    }
    Ok(summary.pages)
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
