use clap::Parser;
use pluck_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    if cli.log_file {
        if let Err(err) = logging::init_logging_file(&cli.log_level) {
            logging::init_logging_stderr(&cli.log_level);
            tracing::warn!("file logging unavailable, using stderr: {:#}", err);
        }
    } else {
        logging::init_logging_stderr(&cli.log_level);
    }

    if let Err(err) = cli.run() {
        eprintln!("pluck error: {:#}", err);
        std::process::exit(1);
    }
}
