use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::downloader::TaskSummary;
use crate::error::DownloadError;
use crate::utils::filename_from_url;

/// One URL to fetch. The target filename is derived, never stored.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Last path segment of the URL with any query string stripped.
    pub fn file_name(&self) -> String {
        filename_from_url(&self.url)
    }
}

/// Terminal record for one task, collected by [`run`].
#[derive(Debug)]
pub struct TaskOutcome {
    pub url: String,
    pub result: Result<TaskSummary, DownloadError>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs every request through `task` with at most `concurrency` in flight.
///
/// A permit is taken before each task is spawned, so admission is strictly
/// in input order and `concurrency == 1` degenerates to sequential
/// execution. A failing or panicking task is recorded and never cancels
/// its siblings. Returns once all tasks are terminal, outcomes in input
/// order.
pub async fn run<F, Fut>(
    requests: Vec<DownloadRequest>,
    concurrency: usize,
    task: F,
) -> Vec<TaskOutcome>
where
    F: Fn(DownloadRequest) -> Fut,
    Fut: Future<Output = Result<TaskSummary, DownloadError>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(requests.len());

    for request in requests {
        let permit = semaphore.clone().acquire_owned().await.unwrap();
        let url = request.url.clone();
        let fut = task(request);
        let handle = tokio::spawn(async move {
            let _permit = permit;
            fut.await
        });
        handles.push((url, handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (url, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(DownloadError::from(join_error)),
        };
        outcomes.push(TaskOutcome { url, result });
    }
    outcomes
}
