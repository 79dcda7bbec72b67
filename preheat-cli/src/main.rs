//! Static-site cache warmer.
//!
//! Reads the site configuration, plans every URL worth warming, and
//! replays them against the site so its page cache is rebuilt before a
//! visitor ever waits on a render.

mod cli;
mod config;
mod error;
mod output;

use std::process;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use preheat_engine::{CustomRoute, OnEvent, RouteSource, SourceSet, Warmer};

use crate::cli::CliArgs;
use crate::config::ProgramConfig;
use crate::error::Result;
use crate::output::Reporter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "Error:".red().bold());
        process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let config = ProgramConfig::load(&args.config)?;
    debug!(config = %args.config.display(), "configuration loaded");

    println!("Please wait. This may take a while if you have a lot of content.");

    let sources = build_sources(&config);
    let reporter = Arc::new(Reporter::new(args.queue));
    let on_event: OnEvent = {
        let reporter = Arc::clone(&reporter);
        Arc::new(move |event| reporter.handle(&event))
    };

    let warmer = Warmer::new(config.cache, sources).with_events(on_event);
    let summary = warmer.run(&args.warm_options()).await?;
    reporter.summarize(&summary);

    Ok(())
}

fn build_sources(config: &ProgramConfig) -> SourceSet {
    let base_url = &config.cache.base_url;
    let mut sources = SourceSet::new(base_url.clone());

    if !config.content.routes.is_empty() {
        let routes: Vec<CustomRoute> = config
            .content
            .routes
            .iter()
            .map(|route| CustomRoute::new(route.as_str()))
            .collect();
        sources.add_source(RouteSource::new(base_url.clone(), routes));
    }

    if !config.content.urls.is_empty() {
        let urls = config.content.urls.clone();
        sources.add_hook(move || urls.clone());
    }

    sources
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "preheat=debug,preheat_engine=debug"
    } else {
        "preheat=info,preheat_engine=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
