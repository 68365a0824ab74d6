mod cli;
mod config;
mod repo;
mod types;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{BarProgress, NoProgress, Progress, Writer};
use config::{Config, Opts};
use repo::Scanner;
use std::sync::Arc;
use types::PackageFilter;
use utils::{cancel::Cancel, mirror::HttpMirror};

/// Exit codes:
/// 1 => program screwed up, or some fetch failed with --strict
/// 2 => user cancelled operation
#[tokio::main]
async fn main() {
    let opts = Opts::parse();
    let writer = Arc::new(Writer::new(opts.verbose, opts.quiet));
    match try_main(opts, writer.clone()).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            writer.error(&err);
            err.chain().skip(1).for_each(|cause| {
                writer.due_to(cause);
            });
            std::process::exit(1);
        }
    }
}

async fn try_main(opts: Opts, writer: Arc<Writer>) -> Result<i32> {
    let mut config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_opts(&opts);
    config.check_sanity()?;

    let (handle, cancel) = Cancel::new();
    ctrlc::set_handler(move || handle.cancel()).context("Failed to install Ctrl-C handler")?;

    let mirror = HttpMirror::new(config.timeout()).context("Failed to initialize HTTP client")?;
    let progress: Arc<dyn Progress> = if opts.no_progress || opts.quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(BarProgress::new(writer.multibar()))
    };
    let scanner = Scanner::new(Arc::new(mirror), config.policy(), writer.clone())
        .with_progress(progress)
        .with_max_concurrent(config.max_concurrent_fetches)
        .with_cancel(cancel.clone());

    writer.info(format!(
        "Looking for {} in section {} across {} distributions...",
        config.package,
        config.section,
        config.dists.len()
    ));
    let filter = PackageFilter::new(&config.package, &config.section);
    let (versions, errors) = scanner
        .get_matching_versions(&filter, &config.mirror, &config.dists)
        .await;

    for version in &versions {
        println!("{}", version);
    }

    if cancel.is_cancelled() {
        writer.warn("Cancelled, the list above is incomplete.");
        return Ok(2);
    }
    if errors.is_empty() {
        writer.success(format!("Found {} distinct versions.", versions.len()));
        Ok(0)
    } else {
        writer.warn(format!(
            "Found {} distinct versions, but {} fetches failed.",
            versions.len(),
            errors.len()
        ));
        Ok(if opts.strict { 1 } else { 0 })
    }
}
