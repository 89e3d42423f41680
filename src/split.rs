//! Line-by-line splitting of a patch submission.
//!
//! The [`Splitter`] reads raw lines and routes each one to the message or the
//! diff output. Lines are copied byte for byte, terminators included.

use crate::marker::Marker;
use error_set::error_set;
use std::io::{BufRead, Write};

error_set! {
    /// Errors from reading or writing the split streams
    StreamError := {
        #[display("Failed to read input: {message}")]
        ReadFailed { message: String },
        #[display("Failed to write message output: {message}")]
        MessageWriteFailed { message: String },
        #[display("Failed to write diff output: {message}")]
        DiffWriteFailed { message: String },
    }
}

/// Which output the splitter is currently writing to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Message,
    Diff,
}

/// What happens to a line that contains the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SentinelPolicy {
    /// Drop marker lines from both outputs
    Discard,
    /// Write the marker line to the diff output
    Retain,
}

/// How an empty diff output is treated once the input is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MissingDiffPolicy {
    /// Fail with a distinct exit status
    Fatal,
    /// Report "no diff found" and succeed
    Report,
}

/// Resolved settings for one split run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    pub marker: Marker,
    pub sentinel: SentinelPolicy,
    pub missing_diff: MissingDiffPolicy,
    /// Print the line-count summary on success
    pub verbose: bool,
}

impl SplitConfig {
    /// Settings for `*** VERSION.orig` submissions: the marker line belongs
    /// to the diff and a missing diff is only reported.
    pub fn version() -> Self {
        Self {
            marker: Marker::version_orig(),
            sentinel: SentinelPolicy::Retain,
            missing_diff: MissingDiffPolicy::Report,
            verbose: true,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            marker: Marker::cut_here(),
            sentinel: SentinelPolicy::Discard,
            missing_diff: MissingDiffPolicy::Fatal,
            verbose: true,
        }
    }
}

/// Line counts collected during a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitStats {
    pub message_lines: usize,
    pub diff_lines: usize,
    /// Marker lines dropped under [`SentinelPolicy::Discard`]
    pub discarded_lines: usize,
    /// 1-based input line that switched the splitter into diff mode
    pub marker_line: Option<usize>,
}

/// Where a single line ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Message,
    Diff,
    Discard,
}

/// State machine that routes input lines to the message or diff output.
#[derive(Debug)]
pub struct Splitter<'a> {
    config: &'a SplitConfig,
    mode: Mode,
    stats: SplitStats,
}

impl<'a> Splitter<'a> {
    pub fn new(config: &'a SplitConfig) -> Self {
        Self {
            config,
            mode: Mode::Message,
            stats: SplitStats::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn stats(&self) -> SplitStats {
        self.stats
    }

    /// Decide where `line` goes and advance the mode.
    fn route(&mut self, line: &[u8], line_number: usize) -> Route {
        let is_marker = self.config.marker.matches(line);
        if is_marker && self.mode == Mode::Message {
            self.mode = Mode::Diff;
            self.stats.marker_line = Some(line_number);
            log::debug!("marker found on line {line_number}");
        }

        match (is_marker, self.config.sentinel, self.mode) {
            (true, SentinelPolicy::Discard, _) => {
                self.stats.discarded_lines += 1;
                Route::Discard
            }
            (_, _, Mode::Message) => {
                self.stats.message_lines += 1;
                Route::Message
            }
            (_, _, Mode::Diff) => {
                self.stats.diff_lines += 1;
                Route::Diff
            }
        }
    }

    /// Consume `input` to the end, writing each line to `message` or `diff`.
    ///
    /// Outputs are not flushed; callers own their writers.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] on the first failed read or write.
    pub fn split<R, M, D>(
        &mut self,
        mut input: R,
        message: &mut M,
        diff: &mut D,
    ) -> Result<SplitStats, StreamError>
    where
        R: BufRead,
        M: Write + ?Sized,
        D: Write + ?Sized,
    {
        let mut line = Vec::new();
        let mut line_number = 0;

        loop {
            line.clear();
            let read = input
                .read_until(b'\n', &mut line)
                .map_err(|e| StreamError::ReadFailed {
                    message: e.to_string(),
                })?;
            if read == 0 {
                break;
            }
            line_number += 1;

            match self.route(&line, line_number) {
                Route::Message => {
                    message
                        .write_all(&line)
                        .map_err(|e| StreamError::MessageWriteFailed {
                            message: e.to_string(),
                        })?;
                }
                Route::Diff => {
                    diff.write_all(&line)
                        .map_err(|e| StreamError::DiffWriteFailed {
                            message: e.to_string(),
                        })?;
                }
                Route::Discard => {}
            }
        }

        Ok(self.stats)
    }
}

/// Split an in-memory submission, returning the message and diff bytes.
///
/// # Examples
///
/// ```
/// use patchsplit::split::{split_bytes, SplitConfig};
///
/// let (message, diff, stats) =
///     split_bytes(b"hello\ncut here\nworld\n", &SplitConfig::default()).unwrap();
/// assert_eq!(message, b"hello\n");
/// assert_eq!(diff, b"world\n");
/// assert_eq!(stats.discarded_lines, 1);
/// ```
pub fn split_bytes(
    input: &[u8],
    config: &SplitConfig,
) -> Result<(Vec<u8>, Vec<u8>, SplitStats), StreamError> {
    let mut message = Vec::new();
    let mut diff = Vec::new();
    let stats = Splitter::new(config).split(input, &mut message, &mut diff)?;
    Ok((message, diff, stats))
}
