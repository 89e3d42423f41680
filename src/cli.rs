use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use patchsplit::{
    ConfigError, Marker, MissingDiffPolicy, SentinelPolicy, SplitConfig, exit_codes,
};
use std::io;
use std::path::PathBuf;

/// Exit code for a clap error: help and version output are not usage errors.
pub fn clap_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        exit_codes::USAGE
    } else {
        exit_codes::SUCCESS
    }
}

#[derive(Parser, Debug)]
#[command(name = "patchsplit")]
#[command(version)]
#[command(about = "Split a mailed patch into its message and diff parts")]
pub struct Cli {
    /// Use the string "*** VERSION.orig" as the split point
    #[arg(short = 'v', long, conflicts_with = "marker")]
    pub version_marker: bool,

    /// Split on lines containing TEXT instead of "cut here"
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub marker: Option<String>,

    /// Whether the marker line is dropped or kept at the top of the diff
    #[arg(long, value_enum)]
    pub sentinel: Option<SentinelPolicy>,

    /// Whether an empty diff fails the run or is only reported
    #[arg(long, value_enum)]
    pub missing_diff: Option<MissingDiffPolicy>,

    /// Do not print line counts on success
    #[arg(short, long)]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,

    /// Print a man page and exit
    #[arg(long)]
    pub man: bool,

    /// Mailed patch to split
    #[arg(required_unless_present_any = ["completions", "man"])]
    pub patchfile: Option<PathBuf>,

    /// File receiving the message part
    #[arg(required_unless_present_any = ["completions", "man"])]
    pub messagefile: Option<PathBuf>,

    /// File receiving the diff part
    #[arg(required_unless_present_any = ["completions", "man"])]
    pub difffile: Option<PathBuf>,
}

/// The three files of a split run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPaths {
    pub patch: PathBuf,
    pub message: PathBuf,
    pub diff: PathBuf,
}

impl Cli {
    /// Resolve flags into split settings.
    ///
    /// `-v` picks the version marker with retain/report defaults, anything
    /// else starts from the `cut here` discard/fatal defaults. Explicit
    /// `--sentinel` and `--missing-diff` always win.
    pub fn split_config(&self) -> Result<SplitConfig, ConfigError> {
        let mut config = if self.version_marker {
            SplitConfig::version()
        } else {
            SplitConfig::default()
        };

        if let Some(text) = &self.marker {
            config.marker = Marker::new(text.as_str())?;
        }
        if let Some(sentinel) = self.sentinel {
            config.sentinel = sentinel;
        }
        if let Some(missing_diff) = self.missing_diff {
            config.missing_diff = missing_diff;
        }
        config.verbose = !self.quiet;

        Ok(config)
    }

    /// The positional file arguments.
    ///
    /// # Errors
    ///
    /// A clap usage error when any of the three is missing.
    pub fn paths(&self) -> Result<SplitPaths, clap::Error> {
        match (&self.patchfile, &self.messagefile, &self.difffile) {
            (Some(patch), Some(message), Some(diff)) => Ok(SplitPaths {
                patch: patch.clone(),
                message: message.clone(),
                diff: diff.clone(),
            }),
            _ => Err(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "<patchfile> <messagefile> <difffile> are required",
            )),
        }
    }

    /// Write completions or a man page if one was requested.
    ///
    /// Returns `Ok(true)` when something was generated.
    pub fn generate(&self, out: &mut dyn io::Write) -> io::Result<bool> {
        if let Some(shell) = self.completions {
            clap_complete::generate(shell, &mut Cli::command(), "patchsplit", out);
            return Ok(true);
        }
        if self.man {
            clap_mangen::Man::new(Cli::command()).render(out)?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("patchsplit").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn three_positionals_use_cut_here_defaults() {
        let cli = parse(&["in.patch", "out.msg", "out.diff"]).unwrap();
        assert_eq!(
            cli.paths().unwrap(),
            SplitPaths {
                patch: "in.patch".into(),
                message: "out.msg".into(),
                diff: "out.diff".into(),
            }
        );
        assert_eq!(cli.split_config().unwrap(), SplitConfig::default());
    }

    #[test]
    fn short_v_selects_version_marker() {
        let cli = parse(&["-v", "in.patch", "out.msg", "out.diff"]).unwrap();
        let config = cli.split_config().unwrap();
        assert_eq!(config, SplitConfig::version());
        assert_eq!(config.sentinel, SentinelPolicy::Retain);
        assert_eq!(config.missing_diff, MissingDiffPolicy::Report);
    }

    #[test]
    fn two_positionals_is_a_usage_error() {
        let err = parse(&["in.patch", "out.msg"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn four_positionals_is_a_usage_error() {
        let err = parse(&["in.patch", "out.msg", "out.diff", "extra"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn v_with_two_positionals_is_a_usage_error() {
        assert!(parse(&["-v", "in.patch", "out.msg"]).is_err());
    }

    #[test]
    fn explicit_policies_override_defaults() {
        let cli = parse(&[
            "-v",
            "--sentinel",
            "discard",
            "--missing-diff",
            "fatal",
            "-q",
            "in.patch",
            "out.msg",
            "out.diff",
        ])
        .unwrap();
        let config = cli.split_config().unwrap();
        assert_eq!(config.marker, Marker::version_orig());
        assert_eq!(config.sentinel, SentinelPolicy::Discard);
        assert_eq!(config.missing_diff, MissingDiffPolicy::Fatal);
        assert!(!config.verbose);
    }

    #[test]
    fn custom_marker() {
        let cli = parse(&["--marker", "---8<---", "a", "b", "c"]).unwrap();
        let config = cli.split_config().unwrap();
        assert_eq!(config.marker, Marker::new("---8<---").unwrap());
        assert_eq!(config.sentinel, SentinelPolicy::Discard);
    }

    #[test]
    fn custom_marker_with_leading_dashes() {
        let cli = parse(&["--marker", "-- >8 --", "a", "b", "c"]).unwrap();
        assert_eq!(cli.split_config().unwrap().marker, Marker::new("-- >8 --").unwrap());
        assert_eq!(cli.paths().unwrap().patch, PathBuf::from("a"));
    }

    #[test]
    fn help_exits_successfully() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(clap_exit_code(&err), exit_codes::SUCCESS);
    }

    #[test]
    fn version_exits_successfully() {
        let err = parse(&["--version"]).unwrap_err();
        assert_eq!(clap_exit_code(&err), exit_codes::SUCCESS);
    }

    #[test]
    fn missing_positional_exits_with_usage() {
        let err = parse(&["in.patch"]).unwrap_err();
        assert_eq!(clap_exit_code(&err), exit_codes::USAGE);
    }

    #[test]
    fn empty_marker_is_rejected() {
        let cli = parse(&["--marker", "", "a", "b", "c"]).unwrap();
        assert!(matches!(cli.split_config(), Err(ConfigError::EmptyMarker)));
    }

    #[test]
    fn marker_conflicts_with_version_flag() {
        let err = parse(&["-v", "--marker", "x", "a", "b", "c"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn completions_need_no_positionals() {
        let cli = parse(&["--completions", "bash"]).unwrap();
        let err = cli.paths().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(clap_exit_code(&err), exit_codes::USAGE);

        let mut out = Vec::new();
        assert!(cli.generate(&mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("patchsplit"));
    }

    #[test]
    fn man_page_renders() {
        let cli = parse(&["--man"]).unwrap();
        let mut out = Vec::new();
        assert!(cli.generate(&mut out).unwrap());
        let page = String::from_utf8(out).unwrap();
        assert!(page.contains(".TH"));
        assert!(page.contains("patchsplit"));
    }

    #[test]
    fn plain_run_generates_nothing() {
        let cli = parse(&["a", "b", "c"]).unwrap();
        let mut out = Vec::new();
        assert!(!cli.generate(&mut out).unwrap());
        assert!(out.is_empty());
    }
}
