use clap::Parser;
use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match self::cli::Cli::parse().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
