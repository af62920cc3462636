use clap::Parser;
use std::process::ExitCode;
use vrepl_ctl::cli::{error_message, run, shutdown_signal, Cli, RunOutcome, USAGE};
use vrepl_ctl::error::CtlError;
use vrepl_ctl::logging::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(&cli, |settings| settings.connector(), shutdown_signal()).await {
        Ok(RunOutcome::DryRun(json)) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Ok(outcome) => {
            if let RunOutcome::Submitted(ref report) = outcome {
                print!("{}", report.render());
            }
            ExitCode::from(outcome.exit_code() as u8)
        }
        Err(e) => {
            if !matches!(e, CtlError::Usage(_)) {
                tracing::error!(error = %e, "vrepl failed");
            }
            eprintln!("{}", error_message(&e, USAGE));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
