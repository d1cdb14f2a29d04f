use std::process::ExitCode;

use clap::Parser;
use rasterpad::cli::{self, CliArgs};
use rasterpad::logger;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Session log (overwrites the previous session's log)
    match &args.log {
        Some(path) => logger::init_at(path),
        None => logger::init(),
    }

    cli::run(args)
}
