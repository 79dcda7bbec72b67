//! # Command Line Interface
//!
//! Argument surface of the warmer and its mapping onto engine options.

use std::path::PathBuf;

use clap::Parser;

use preheat_engine::{WarmFilter, WarmOptions};

/// Warm the static page cache by visiting every URL this site serves.
#[derive(Debug, Parser)]
#[command(name = "preheat", version, about)]
pub struct CliArgs {
    /// Path to the site configuration file
    #[arg(short, long, default_value = "preheat.toml", value_name = "FILE")]
    pub config: PathBuf,

    /// Queue the requests instead of fetching them inline
    #[arg(long)]
    pub queue: bool,

    /// HTTP basic-auth user
    #[arg(short, long)]
    pub user: Option<String>,

    /// HTTP basic-auth password
    #[arg(short, long)]
    pub password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Only warm pages without a fresh cache entry
    #[arg(long)]
    pub uncached: bool,

    /// Deepest URL to warm, counted in path segments
    #[arg(long, value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// Comma-separated URI patterns to warm exclusively
    #[arg(long, value_name = "PATTERNS")]
    pub include: Option<String>,

    /// Comma-separated URI patterns to skip
    #[arg(long, value_name = "PATTERNS")]
    pub exclude: Option<String>,

    /// Cap on the number of requests to warm
    #[arg(long, value_name = "COUNT")]
    pub max_requests: Option<usize>,

    /// Warm into this directory instead of the configured cache root
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Maps the argument surface onto engine options.
    pub fn warm_options(&self) -> WarmOptions {
        WarmOptions {
            queue: self.queue,
            user: self.user.clone(),
            password: self.password.clone(),
            insecure: self.insecure,
            filter: WarmFilter {
                include: self
                    .include
                    .as_deref()
                    .map(WarmFilter::parse_patterns)
                    .unwrap_or_default(),
                exclude: self
                    .exclude
                    .as_deref()
                    .map(WarmFilter::parse_patterns)
                    .unwrap_or_default(),
                max_depth: self.max_depth,
                uncached_only: self.uncached,
                max_requests: self.max_requests,
            },
            temp_dir: self.temp_dir.clone(),
        }
    }
}
