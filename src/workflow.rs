use crate::cli::{ResolveArgs, SourceArgs, SyncArgs};
use crate::config::{load_config, SyncConfig};
use crate::layout::Layout;
use crate::report::{CategoryStatus, RunReport};
use crate::spec_table::{load_spec_table, SpecTable};
use crate::sync::Synchronizer;
use crate::version::TagScheme;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a command needs once configuration errors have been ruled out.
struct RunContext {
    config: SyncConfig,
    layout: Layout,
    table: SpecTable,
}

impl RunContext {
    fn load(source: &SourceArgs) -> Result<Self> {
        let config = match &source.config {
            Some(path) => load_config(path)?,
            None => SyncConfig::default(),
        };
        let table = load_spec_table(&source.spec, &config)?;
        let layout = Layout::new(&source.root, source.enum_dir.as_deref(), &config);
        layout.ensure_enum_dir()?;
        Ok(RunContext {
            config,
            layout,
            table,
        })
    }
}

pub fn run_sync(args: SyncArgs) -> Result<()> {
    let ctx = RunContext::load(&args.source)?;
    let scheme = TagScheme::new(&ctx.config.tag_namespace, &ctx.config.unknown_tag);
    tracing::info!(
        target_version = %scheme.render(ctx.table.target),
        spec = %ctx.table.source.display(),
        enum_dir = %ctx.layout.enum_dir().display(),
        mode = if args.write { "write" } else { "dry-run" },
        "starting synchronization"
    );

    let sync = Synchronizer::new(&ctx.config, &ctx.layout, &ctx.table);
    let categories = match &args.category {
        Some(selector) => {
            let stem = ctx
                .table
                .resolve_selector(selector, &ctx.config)
                .ok_or_else(|| anyhow!("no specification data for {selector}"))?;
            if ctx.layout.resolve(&stem).is_none() {
                return Err(anyhow!("no source file found for {stem}"));
            }
            BTreeMap::from([(stem.clone(), sync.sync_category(&stem, args.write))])
        }
        None => {
            if ctx.table.categories.is_empty() {
                tracing::info!("no valid enum data in specification, nothing to do");
            }
            sync.sync_all(args.write)
        }
    };

    let report = RunReport {
        mode: if args.write { "write" } else { "dry_run" },
        target_version: scheme.render(ctx.table.target),
        specification: ctx.table.source.display().to_string(),
        row_issues: ctx.table.issues.clone(),
        categories,
    };
    tracing::info!(
        updated = report.count(CategoryStatus::Updated),
        pending = report.count(CategoryStatus::Pending),
        unchanged =
            report.count(CategoryStatus::NoChanges) + report.count(CategoryStatus::Unmodified),
        skipped = report.count(CategoryStatus::Skipped),
        failed = report.count(CategoryStatus::Failed),
        "synchronization finished"
    );
    print_json(&report)
}

#[derive(Serialize)]
struct ResolvedCategory {
    categories: Vec<String>,
    file: Option<String>,
    values: usize,
}

pub fn run_resolve(args: ResolveArgs) -> Result<()> {
    let ctx = RunContext::load(&args.source)?;
    let resolved: BTreeMap<&str, ResolvedCategory> = ctx
        .table
        .categories
        .iter()
        .map(|(stem, spec)| {
            let file = ctx.layout.resolve(stem).map(|path| path.display().to_string());
            if file.is_none() {
                tracing::warn!(category = %stem, "no source file found");
            }
            (
                stem.as_str(),
                ResolvedCategory {
                    categories: spec.categories.clone(),
                    file,
                    values: spec.values.len(),
                },
            )
        })
        .collect();
    print_json(&resolved)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize summary")?;
    println!("{json}");
    Ok(())
}
