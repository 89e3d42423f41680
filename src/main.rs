use clap::Parser;
use patchsplit::{PatchSplitError, PatchSplitter, exit_codes};
use std::io;
use std::process::ExitCode;

mod cli;

use cli::{Cli, SplitPaths, clap_exit_code};

fn main() -> ExitCode {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_clap_error(&err),
    };

    match cli.generate(&mut io::stdout().lock()) {
        Ok(true) => return ExitCode::from(exit_codes::SUCCESS),
        Ok(false) => {}
        Err(err) => {
            eprintln!("Failed to write generated output: {err}");
            return ExitCode::from(exit_codes::IO_FAILURE);
        }
    }

    let paths = match cli.paths() {
        Ok(paths) => paths,
        Err(err) => return report_clap_error(&err),
    };

    match run(&cli, &paths) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn report_clap_error(err: &clap::Error) -> ExitCode {
    match err.print() {
        Ok(()) => ExitCode::from(clap_exit_code(err)),
        Err(print_err) => {
            log::error!("Failed to print usage: {print_err}");
            ExitCode::from(exit_codes::IO_FAILURE)
        }
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_target(false)
        .init();
}

fn run(cli: &Cli, paths: &SplitPaths) -> Result<(), PatchSplitError> {
    let config = cli.split_config()?;
    log::debug!(
        "marker {:?}, sentinel {:?}, missing diff {:?}",
        config.marker.to_string(),
        config.sentinel,
        config.missing_diff
    );

    let splitter = PatchSplitter::new(config);
    let report = splitter.split_files(&paths.patch, &paths.message, &paths.diff)?;

    if splitter.config().verbose {
        eprintln!(
            "{}",
            report.summary(
                &paths.message.display().to_string(),
                &paths.diff.display().to_string()
            )
        );
    }
    if !report.diff_found {
        eprintln!("no diff found");
    }

    Ok(())
}
