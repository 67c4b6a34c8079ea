//! filedex - live content-addressed directory indexer.
//!
//! Usage:
//!   filedex crawl [PATH]       One-shot crawl with a tree summary
//!   filedex export [PATH]      Crawl and export the index as JSON
//!   filedex watch PATH...      Index roots and keep them fresh
//!   filedex --help             Show help

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filedex_core::{IndexConfig, IndexNode};
use filedex_crawl::Crawler;
use filedex_watch::Supervisor;

#[derive(Parser)]
#[command(
    name = "filedex",
    version,
    about = "Live content-addressed directory indexer",
    long_about = "filedex maintains a content-addressed index of directory trees: \
                  sizes and BLAKE3 hashes for files, child sets for directories. \
                  In watch mode the index is kept fresh by combining periodic full \
                  recrawls with incremental recrawls of OS-reported changes."
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One-shot crawl with a tree summary
    Crawl {
        /// Path to crawl
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Maximum tree depth to display
        #[arg(short, long, default_value = "3")]
        depth: u32,

        /// Show file hashes in the tree
        #[arg(long)]
        hashes: bool,
    },

    /// Crawl and export the index as JSON
    Export {
        /// Path to crawl
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Index one or more roots and keep them fresh until killed
    Watch {
        /// Roots to watch
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Seconds between status lines
        #[arg(short, long, default_value = "10")]
        interval: u64,

        /// Seconds between full recrawls
        #[arg(long, default_value = "7200")]
        full_interval: u64,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Command::Crawl {
            path,
            depth,
            hashes,
        } => run_crawl(&path, depth, hashes),
        Command::Export { path, output } => run_export(&path, output),
        Command::Watch {
            paths,
            interval,
            full_interval,
        } => run_watch(paths, interval, full_interval),
    }
}

/// Crawl once and print a summary tree.
fn run_crawl(path: &PathBuf, max_depth: u32, hashes: bool) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;

    eprintln!("Crawling {}...", path.display());

    let crawler = Crawler::new(IndexConfig::new(&path));
    let crawled = crawler.crawl(&path);

    println!();
    println!("{}", "─".repeat(60));
    println!(" {} - {}", path.display(), format_size(crawled.stats.bytes));
    println!(
        " {} files ({} hashed, {} skipped), {} directories",
        crawled.stats.files, crawled.stats.hashed, crawled.stats.skipped, crawled.stats.dirs
    );
    println!(" Crawled in {:.2}s", crawled.duration.as_secs_f64());
    println!("{}", "─".repeat(60));
    println!();

    print_node(
        &crawled.node,
        &path.display().to_string(),
        0,
        max_depth,
        hashes,
    );

    if !crawled.warnings.is_empty() {
        println!();
        println!("{} warning(s) during crawl", crawled.warnings.len());
    }

    Ok(())
}

/// Crawl once and export the index as JSON.
fn run_export(path: &PathBuf, output: Option<PathBuf>) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;

    eprintln!("Crawling {}...", path.display());

    let crawler = Crawler::new(IndexConfig::new(&path));
    let crawled = crawler.crawl(&path);

    let json = serde_json::to_string_pretty(&crawled.node)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Watch roots, printing a status line per root on an interval.
fn run_watch(paths: Vec<PathBuf>, interval: u64, full_interval: u64) -> Result<()> {
    let supervisor = Supervisor::new();
    let mut roots = Vec::new();

    for path in paths {
        let config = IndexConfig::builder()
            .root(path.clone())
            .full_recrawl_interval(Duration::from_secs(full_interval))
            .build()
            .map_err(|err| {
                color_eyre::eyre::eyre!("invalid config for {}: {err}", path.display())
            })?;

        let root = supervisor
            .start(config)
            .wrap_err_with(|| format!("cannot watch {}", path.display()))?;
        roots.push(root);
    }

    loop {
        std::thread::sleep(Duration::from_secs(interval));
        for root in &roots {
            let Some(index) = supervisor.snapshot(root) else {
                continue;
            };
            let degraded = supervisor.is_degraded(root).unwrap_or(false);
            println!(
                "{}: {} files, {}{}",
                root.display(),
                index.file_count(),
                format_size(index.total_size()),
                if degraded { " (watch degraded)" } else { "" }
            );
        }
    }
}

/// Print a node and its children up to a depth limit.
fn print_node(node: &IndexNode, name: &str, depth: u32, max_depth: u32, hashes: bool) {
    let indent = "  ".repeat(depth as usize);

    match node {
        IndexNode::File(entry) => {
            let hash = match (&entry.hash, hashes) {
                (Some(hash), true) => format!("  {}", hash.to_hex()),
                (None, true) => "  (unhashed)".to_string(),
                _ => String::new(),
            };
            println!(
                "{}{:<40} {:>10}{}",
                indent,
                name,
                format_size(entry.size),
                hash
            );
        }
        IndexNode::Directory(dir) => {
            println!(
                "{}{}/ ({} files, {})",
                indent,
                name,
                node.file_count(),
                format_size(node.total_size())
            );
            if depth < max_depth {
                let mut children: Vec<_> = dir.children.iter().collect();
                children.sort_by(|(a, _), (b, _)| a.cmp(b));
                for (child_name, child) in children {
                    print_node(child, child_name, depth + 1, max_depth, hashes);
                }
            }
        }
        IndexNode::Unresolved => {
            println!("{}{} (unresolved)", indent, name);
        }
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
