use clap::Parser;
use seqpeel_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A missing state dir must not prevent a run.
    if logging::init_logging(cli.verbose).is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = cli.run().await {
        eprintln!("seqpeel error: {:#}", err);
        std::process::exit(1);
    }
}
