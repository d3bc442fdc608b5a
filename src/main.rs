use clap::Parser;
use rdf_materializer::{CliArgs, LoggingConfig, init_logging, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let logging_config = LoggingConfig::from_env();
    let _guard = match init_logging(logging_config) {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("Error: {error:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(outcome) => outcome.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
