use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use sheaf::config::Config;
use sheaf::feed::FeedSource;
use sheaf::pipeline;

/// Get the default config file path (~/.config/sheaf/config.toml)
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("sheaf")
            .join("config.toml"),
    )
}

#[derive(Parser, Debug)]
#[command(
    name = "sheaf",
    about = "Fetch the pages behind an RSS/Atom feed into one text digest"
)]
struct Args {
    /// Feed to read: a local file path or an http(s) URL
    #[arg(value_name = "FEED")]
    feed: String,

    /// Digest output file
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Maximum concurrent page fetches
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Config file (default: ~/.config/sheaf/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Flags override config file values, which override defaults
    let mut config = match args.config.clone().or_else(default_config_path) {
        Some(path) => Config::load(&path).context("Failed to load config")?,
        None => Config::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(out) = args.out {
        config.output = out;
    }

    let source = FeedSource::parse(&args.feed);

    // Print progress lines as fetches complete; the channel closes when the
    // pipeline drops its senders. The (0, total) kickoff event becomes the
    // link-count line.
    let workers = config.workers;
    let (progress_tx, mut progress_rx) = mpsc::channel::<(usize, usize)>(32);
    let printer = tokio::spawn(async move {
        while let Some((done, total)) = progress_rx.recv().await {
            if done == 0 && total > 0 {
                println!("Found {} link(s). Fetching with {} worker(s)...", total, workers);
            } else if done > 0 {
                println!("Fetched {}/{}", done, total);
            }
        }
    });

    match pipeline::run(&config, &source, progress_tx).await {
        Ok(summary) => {
            let _ = printer.await;
            if summary.total == 0 {
                println!(
                    "No links found in feed. Wrote empty digest to '{}'.",
                    summary.out_path.display()
                );
            } else {
                println!(
                    "OK: Wrote {} article(s) to '{}' ({} failed, {:.1}s).",
                    summary.total,
                    summary.out_path.display(),
                    summary.failed,
                    summary.elapsed.as_secs_f64()
                );
            }
            Ok(())
        }
        Err(e) => {
            let _ = printer.await;
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
