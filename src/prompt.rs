use anyhow::Result;
use colored::Colorize;
use inquire::{InquireError, Text};

use crate::pool::DownloadRequest;

pub const MAX_URLS: usize = 20;

/// Concurrency mode chosen interactively at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Parallel,
}

impl Mode {
    pub fn concurrency(self) -> usize {
        match self {
            Mode::Normal => 1,
            Mode::Parallel => 3,
        }
    }
}

/// Shows the mode menu. `None` means the run should end gracefully
/// (invalid choice, or the prompt was cancelled).
pub fn select_mode() -> Result<Option<Mode>> {
    println!("{}", "=== Multi Downloader ===".cyan().bold());
    println!("{}", "01. Normal Mode (one file at a time)".yellow());
    println!("{}", "02. Parallel Mode (3 files at a time)".yellow());
    println!();

    let choice = match Text::new("Select an option (1 or 2):").prompt() {
        Ok(choice) => choice,
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            return Ok(None);
        }
        Err(error) => return Err(error.into()),
    };

    match choice.trim() {
        "1" => Ok(Some(Mode::Normal)),
        "2" => Ok(Some(Mode::Parallel)),
        _ => {
            println!("{}", "[!] Invalid choice. Exiting...".red());
            Ok(None)
        }
    }
}

/// Collects up to [`MAX_URLS`] URLs; a blank line stops collection early.
pub fn collect_urls() -> Result<Vec<DownloadRequest>> {
    println!(
        "{}",
        format!(
            "Enter up to {} URLs (press ENTER without typing to stop):",
            MAX_URLS
        )
        .yellow()
    );

    let mut requests = Vec::new();
    for index in 1..=MAX_URLS {
        let input = match Text::new(&format!("{:02}. URL:", index)).prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => break,
            Err(error) => return Err(error.into()),
        };

        let url = input.trim().to_string();
        if url.is_empty() {
            break;
        }
        requests.push(DownloadRequest::new(url));
    }
    Ok(requests)
}
