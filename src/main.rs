use clap::{CommandFactory, Parser};
use gniphyl::cli::{Cli, parse_error_status, run_command};
use gniphyl::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_error_status(err.kind()));
        }
    };

    let Some(command) = &cli.command else {
        let _ = Cli::command().print_long_help();
        return ExitCode::SUCCESS;
    };

    let location = match cli.config_location() {
        Ok(location) => location,
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            return ExitCode::SUCCESS;
        }
    };

    // Command failures are reported, not turned into a failing exit status.
    if let Err(e) = run_command(command, &location) {
        OutputFormatter::error(&e);
    }

    ExitCode::SUCCESS
}
