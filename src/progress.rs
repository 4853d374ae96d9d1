use std::time::{Duration, Instant};

const MIB: f64 = 1024.0 * 1024.0;

/// Per-task throughput tracker.
///
/// Speed is a running average over the current session: bytes written
/// since the resume offset divided by time since the session started.
/// `sample` reports at most once per elapsed wall-clock second.
pub struct TransferProgress {
    resume_offset: u64,
    session_start: Instant,
    last_sample: Instant,
}

impl TransferProgress {
    pub fn new(resume_offset: u64) -> Self {
        let now = Instant::now();
        Self {
            resume_offset,
            session_start: now,
            last_sample: now,
        }
    }

    /// Returns a formatted speed when at least a second has passed since
    /// the previous sample, `None` otherwise.
    pub fn sample(&mut self, downloaded: u64, now: Instant) -> Option<String> {
        if now.duration_since(self.last_sample) < Duration::from_secs(1) {
            return None;
        }
        self.last_sample = now;
        let elapsed = now.duration_since(self.session_start).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }
        let session_bytes = downloaded.saturating_sub(self.resume_offset);
        Some(format_speed(session_bytes as f64 / elapsed))
    }
}

/// Renders a byte rate, switching from KB/s to MB/s above 1 MiB/s.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if bytes_per_sec > MIB {
        format!("{:.2} MB/s", bytes_per_sec / MIB)
    } else {
        format!("{:.2} KB/s", bytes_per_sec / 1024.0)
    }
}

/// Renders a completed size in MB with two decimals.
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MIB)
}
