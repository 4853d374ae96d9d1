use bytes::Bytes;
use chrono::{DateTime, Local};
use futures::stream::{self, BoxStream, StreamExt};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::header::{CONTENT_LENGTH, RANGE};
use reqwest::Client;
use std::io::ErrorKind;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::cli::ExistingFilePolicy;
use crate::error::DownloadError;
use crate::pool::DownloadRequest;
use crate::progress::{format_size_mb, TransferProgress};

/// Upper bound on a single chunk handed to the write loop.
pub const CHUNK_SIZE: usize = 8 * 1024;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes:>12}/{total_bytes:<12} {msg}";

/// Read-only settings shared by every task in a run.
#[derive(Clone, Debug)]
pub struct DownloadConfig {
    pub download_dir: PathBuf,
    pub existing: ExistingFilePolicy,
    pub connect_timeout: Duration,
    pub rate_limit: Option<u32>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("download"),
            existing: ExistingFilePolicy::Overwrite,
            connect_timeout: Duration::from_secs(10),
            rate_limit: None,
        }
    }
}

/// Completion record for a finished task.
#[derive(Debug, Clone)]
pub struct TaskSummary {
    pub file_name: String,
    pub total_bytes: u64,
}

pub struct Downloader {
    client: Client,
    config: DownloadConfig,
    multi_progress: MultiProgress,
    rate_limiter: Option<Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Self {
        let client = Client::builder()
            .user_agent(concat!("mdl/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let multi_progress = MultiProgress::new();
        multi_progress.set_draw_target(ProgressDrawTarget::stderr_with_hz(5));

        let rate_limiter = config
            .rate_limit
            .and_then(NonZeroU32::new)
            .map(|limit| Arc::new(RateLimiter::direct(Quota::per_second(limit))));

        Self {
            client,
            config,
            multi_progress,
            rate_limiter,
        }
    }

    /// HEAD request for `Content-Length`. The task ends here when the
    /// remote does not declare a size.
    pub async fn probe_size(&self, url: &str) -> Result<u64, DownloadError> {
        let response = self.client.head(url).send().await?.error_for_status()?;
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .ok_or(DownloadError::SizeUnavailable)
    }

    /// Size of an existing `.part` file, 0 when absent. Read-only probe.
    pub async fn resume_offset(&self, part_path: &Path) -> Result<u64, DownloadError> {
        match fs::metadata(part_path).await {
            Ok(metadata) => Ok(metadata.len()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(0),
            Err(error) => Err(error.into()),
        }
    }

    /// Opens the content stream, range-resumed when `resume_offset > 0`.
    /// Yielded chunks never exceed [`CHUNK_SIZE`].
    pub async fn fetch(
        &self,
        url: &str,
        resume_offset: u64,
    ) -> Result<BoxStream<'static, Result<Bytes, DownloadError>>, DownloadError> {
        let mut request = self.client.get(url);
        if resume_offset > 0 {
            request = request.header(RANGE, format!("bytes={}-", resume_offset));
        }
        let response = request.send().await?.error_for_status()?;
        let stream = response
            .bytes_stream()
            .flat_map(|item| {
                let chunks: Vec<Result<Bytes, DownloadError>> = match item {
                    Ok(chunk) => split_chunk(chunk).into_iter().map(Ok).collect(),
                    Err(error) => vec![Err(DownloadError::from(error))],
                };
                stream::iter(chunks)
            })
            .boxed();
        Ok(stream)
    }

    /// Runs one download to a terminal state: probe, resume, fetch, write,
    /// atomic rename. Any failure after the first write leaves the `.part`
    /// file behind as the checkpoint for the next run.
    pub async fn download_file(
        &self,
        request: &DownloadRequest,
    ) -> Result<TaskSummary, DownloadError> {
        let file_name = request.file_name();
        let final_path = self.config.download_dir.join(&file_name);
        let part_path = self.config.download_dir.join(format!("{}.part", file_name));

        // A checkpoint always wins over an existing final file.
        if final_path.exists()
            && !part_path.exists()
            && self.config.existing == ExistingFilePolicy::Skip
        {
            return self.report_skipped(&file_name, &final_path).await;
        }

        let total_bytes = self.probe_size(&request.url).await?;

        let mut pos = self.resume_offset(&part_path).await?;
        if pos > total_bytes {
            // Leftover from a different resource; the checkpoint is useless.
            pos = 0;
        }

        let mut file = if pos > 0 {
            OpenOptions::new().append(true).open(&part_path).await?
        } else {
            File::create(&part_path).await?
        };

        let pb = self.multi_progress.add(ProgressBar::new(total_bytes));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap()
                .progress_chars("=>-"),
        );
        pb.set_position(pos);
        pb.set_message(format!("Downloading {}", file_name));

        let mut downloaded = pos;
        if downloaded < total_bytes {
            let mut stream = self.fetch(&request.url, pos).await?;
            let mut progress = TransferProgress::new(pos);

            while let Some(item) = stream.next().await {
                let chunk = item?;
                if chunk.is_empty() {
                    continue;
                }

                if let Some(limiter) = &self.rate_limiter {
                    if let Some(n) = NonZeroU32::new(chunk.len() as u32) {
                        let _ = limiter.until_n_ready(n).await;
                    }
                }

                file.write_all(&chunk).await?;
                downloaded += chunk.len() as u64;
                pb.inc(chunk.len() as u64);

                if let Some(speed) = progress.sample(downloaded, Instant::now()) {
                    pb.set_message(format!("Downloading {} ({})", file_name, speed));
                }
            }
        }

        file.flush().await?;
        drop(file);

        if downloaded != total_bytes {
            pb.abandon_with_message(format!("Incomplete  {}", file_name));
            return Err(DownloadError::Incomplete {
                expected: total_bytes,
                received: downloaded,
            });
        }

        fs::rename(&part_path, &final_path)
            .await
            .map_err(DownloadError::Finalize)?;
        pb.finish_with_message(format!(
            "Completed   {} ({})",
            file_name,
            format_size_mb(total_bytes)
        ));

        Ok(TaskSummary {
            file_name,
            total_bytes,
        })
    }

    async fn report_skipped(
        &self,
        file_name: &str,
        final_path: &Path,
    ) -> Result<TaskSummary, DownloadError> {
        let metadata = fs::metadata(final_path).await?;
        let modified: DateTime<Local> = metadata.modified()?.into();

        let pb = self.multi_progress.add(ProgressBar::new(0));
        pb.set_style(ProgressStyle::default_bar().template("{msg}").unwrap());
        pb.finish_with_message(format!(
            "Skipped     {} ({}, {})",
            file_name,
            format_size_mb(metadata.len()),
            modified.format("%Y-%m-%d %H:%M"),
        ));

        Ok(TaskSummary {
            file_name: file_name.to_string(),
            total_bytes: metadata.len(),
        })
    }
}

/// Transport reads larger than [`CHUNK_SIZE`] are split before the write
/// loop sees them, keeping per-chunk memory bounded.
fn split_chunk(mut chunk: Bytes) -> Vec<Bytes> {
    let mut pieces = Vec::with_capacity(chunk.len() / CHUNK_SIZE + 1);
    while chunk.len() > CHUNK_SIZE {
        pieces.push(chunk.split_to(CHUNK_SIZE));
    }
    pieces.push(chunk);
    pieces
}
