use clap::Parser;
use std::process::ExitCode;
use vrepl_ctl::cli::{error_message, run_reset, shutdown_signal, ResetCli, RunOutcome, RESET_USAGE};
use vrepl_ctl::error::CtlError;
use vrepl_ctl::logging::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = ResetCli::parse();
    match run_reset(&cli, |settings| settings.connector(), shutdown_signal()).await {
        Ok(RunOutcome::DryRun(json)) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Submitted(report)) => {
            print!("{}", report.render());
            if report.any_failed() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            if !matches!(e, CtlError::Usage(_)) {
                tracing::error!(error = %e, "vrepl-reset failed");
            }
            eprintln!("{}", error_message(&e, RESET_USAGE));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
