//! Resumable multi-file downloader.
//!
//! The engine probes the remote size with a HEAD request, resumes from an
//! on-disk `.part` checkpoint via `Range` requests, streams the body in
//! bounded chunks, and finalizes each file with an atomic rename. A
//! semaphore-bounded pool runs many downloads with a fixed number in
//! flight, collecting per-task outcomes without aborting siblings.

pub mod cli;
pub mod downloader;
pub mod error;
pub mod pool;
pub mod progress;
pub mod prompt;
pub mod utils;

pub use downloader::{DownloadConfig, Downloader, TaskSummary};
pub use error::DownloadError;
pub use pool::{DownloadRequest, TaskOutcome};
