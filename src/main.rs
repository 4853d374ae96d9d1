use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mdl::cli::ExistingFilePolicy;
use mdl::downloader::{DownloadConfig, Downloader};
use mdl::pool::{self, DownloadRequest};
use mdl::prompt;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory to save downloaded files
    #[arg(short = 'd', long = "download-dir", default_value = "download")]
    download_dir: PathBuf,

    /// What to do when a final file already exists
    #[arg(long = "existing", value_enum, default_value = "overwrite")]
    existing: ExistingFilePolicy,

    /// Connect timeout per request, in seconds
    #[arg(long = "connect-timeout", default_value_t = 10)]
    connect_timeout: u64,

    /// Global rate limit in bytes per second (e.g., 1048576 for 1MB/s)
    #[arg(short = 'r', long)]
    rate_limit: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let Some(mode) = prompt::select_mode()? else {
        return Ok(());
    };

    let requests = prompt::collect_urls()?;
    if requests.is_empty() {
        println!("{}", "[!] No URLs provided. Exiting...".red());
        return Ok(());
    }

    tokio::fs::create_dir_all(&args.download_dir)
        .await
        .context("Failed to create download directory")?;

    let config = DownloadConfig {
        download_dir: args.download_dir,
        existing: args.existing,
        connect_timeout: Duration::from_secs(args.connect_timeout),
        rate_limit: args.rate_limit,
    };
    let downloader = Arc::new(Downloader::new(config));

    println!("{}", "\nStarting downloads...\n".cyan());

    let task = {
        let downloader = downloader.clone();
        move |request: DownloadRequest| {
            let downloader = downloader.clone();
            async move { downloader.download_file(&request).await }
        }
    };
    let outcomes = pool::run(requests, mode.concurrency(), task).await;

    let mut failed = 0;
    for outcome in &outcomes {
        if let Err(error) = &outcome.result {
            failed += 1;
            eprintln!(
                "{}",
                format!("[ERROR] Failed to download {}: {}", outcome.url, error).red()
            );
        }
    }
    println!(
        "{}",
        format!(
            "\nFinished: {}/{} succeeded",
            outcomes.len() - failed,
            outcomes.len()
        )
        .cyan()
    );

    Ok(())
}
