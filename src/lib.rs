use error_set::error_set;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

pub mod exit_codes;
pub mod marker;
pub mod split;

pub use marker::{ConfigError, Marker};
pub use split::{MissingDiffPolicy, SentinelPolicy, SplitConfig, SplitStats, Splitter, StreamError};

error_set! {
    /// Top-level error for patchsplit operations
    PatchSplitError := {
        #[display("something is amiss - 0 message lines")]
        NoMessageLines,
        #[display("something is amiss - 0 diff lines")]
        NoDiffLines,
        ConfigError(ConfigError),
    } || FileError

    /// Errors from opening, reading or writing the files involved in a split
    FileError := {
        #[display("{path}: {message}")]
        OpenFailed { path: String, message: String },
        #[display("{path}: read failed: {message}")]
        ReadFailed { path: String, message: String },
        #[display("{path}: write failed: {message}")]
        WriteFailed { path: String, message: String },
    }
}

impl PatchSplitError {
    /// The process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PatchSplitError::NoMessageLines => exit_codes::NO_MESSAGE,
            PatchSplitError::NoDiffLines => exit_codes::NO_DIFF,
            PatchSplitError::ConfigError(_) => exit_codes::USAGE,
            PatchSplitError::OpenFailed { .. } => exit_codes::OPEN_FAILURE,
            PatchSplitError::ReadFailed { .. } | PatchSplitError::WriteFailed { .. } => {
                exit_codes::IO_FAILURE
            }
        }
    }
}

/// Outcome of a split that passed the completion checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitReport {
    pub stats: SplitStats,
    /// False when the diff output is empty and the policy only reports it
    pub diff_found: bool,
}

impl SplitReport {
    /// Line-count summary naming both outputs.
    ///
    /// The diff line is left out when no diff was found.
    pub fn summary(&self, message_name: &str, diff_name: &str) -> String {
        let mut summary = format!("{}: {} lines", message_name, self.stats.message_lines);
        if self.diff_found {
            summary.push_str(&format!("\n{}: {} lines", diff_name, self.stats.diff_lines));
        }
        summary
    }
}

/// Validate the counts of a finished split against the missing-diff policy.
///
/// # Errors
///
/// [`PatchSplitError::NoMessageLines`] whenever the message is empty, and
/// [`PatchSplitError::NoDiffLines`] for an empty diff under
/// [`MissingDiffPolicy::Fatal`].
pub fn check_stats(stats: SplitStats, config: &SplitConfig) -> Result<SplitReport, PatchSplitError> {
    if stats.message_lines == 0 {
        return Err(PatchSplitError::NoMessageLines);
    }

    if stats.diff_lines == 0 {
        return match config.missing_diff {
            MissingDiffPolicy::Fatal => Err(PatchSplitError::NoDiffLines),
            MissingDiffPolicy::Report => Ok(SplitReport {
                stats,
                diff_found: false,
            }),
        };
    }

    Ok(SplitReport {
        stats,
        diff_found: true,
    })
}

/// Main interface for splitting patch submissions
pub struct PatchSplitter {
    config: SplitConfig,
}

impl PatchSplitter {
    /// Create a new PatchSplitter with resolved settings
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Split `patch` into `message` and `diff`.
    ///
    /// The patch is opened first, then both outputs are created or
    /// truncated before any line is read. Outputs keep whatever was
    /// written even when a completion check fails afterwards.
    ///
    /// # Examples
    /// ```no_run
    /// # use patchsplit::{PatchSplitter, SplitConfig};
    /// # use std::path::Path;
    /// let splitter = PatchSplitter::new(SplitConfig::default());
    /// let report = splitter
    ///     .split_files(Path::new("fix.patch"), Path::new("fix.msg"), Path::new("fix.diff"))
    ///     .unwrap();
    /// println!("{}", report.summary("fix.msg", "fix.diff"));
    /// ```
    pub fn split_files(
        &self,
        patch: &Path,
        message: &Path,
        diff: &Path,
    ) -> Result<SplitReport, PatchSplitError> {
        let input = BufReader::new(File::open(patch).map_err(open_failed(patch))?);
        let mut message_out = BufWriter::new(File::create(message).map_err(open_failed(message))?);
        let mut diff_out = BufWriter::new(File::create(diff).map_err(open_failed(diff))?);

        log::debug!(
            "splitting {} into {} and {}",
            patch.display(),
            message.display(),
            diff.display()
        );

        let stats = Splitter::new(&self.config)
            .split(input, &mut message_out, &mut diff_out)
            .map_err(|e| match e {
                StreamError::ReadFailed { message: m } => FileError::ReadFailed {
                    path: patch.display().to_string(),
                    message: m,
                },
                StreamError::MessageWriteFailed { message: m } => FileError::WriteFailed {
                    path: message.display().to_string(),
                    message: m,
                },
                StreamError::DiffWriteFailed { message: m } => FileError::WriteFailed {
                    path: diff.display().to_string(),
                    message: m,
                },
            })?;

        flush(&mut message_out, message)?;
        flush(&mut diff_out, diff)?;

        log::debug!(
            "{} message lines, {} diff lines, {} discarded, marker on line {:?}",
            stats.message_lines,
            stats.diff_lines,
            stats.discarded_lines,
            stats.marker_line
        );

        check_stats(stats, &self.config)
    }
}

fn open_failed(path: &Path) -> impl FnOnce(io::Error) -> FileError + '_ {
    move |e| FileError::OpenFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn flush<W: Write>(writer: &mut W, path: &Path) -> Result<(), FileError> {
    writer.flush().map_err(|e| FileError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
