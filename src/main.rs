use clap::Parser;

use anyhow::Result;

use tostring::cli::{handle_error, init_logging, run, Args, CliConfig};

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    init_logging(args.verbose);

    let outcome = CliConfig::from_args(args).and_then(|config| run(&config));
    if let Err(error) = outcome {
        handle_error(&error);
        std::process::exit(1);
    }

    Ok(())
}
