use clap::ValueEnum;

/// What to do when the final file already exists and no `.part`
/// checkpoint is present.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExistingFilePolicy {
    /// Re-download from scratch, replacing the file on completion.
    #[default]
    Overwrite,
    /// Leave the file untouched and count the task as done.
    Skip,
}
