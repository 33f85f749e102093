use std::path::PathBuf;
use std::process::ExitCode;

use calendar_dispatch::config::{self, ActionInputs};
use calendar_dispatch::error::RunError;
use calendar_dispatch::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init();

    let result = match ActionInputs::from_env() {
        Ok(inputs) => calendar_dispatch::run(&inputs).await,
        Err(e) => Err(RunError::from(e)),
    };

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("{}", e);
            log::info!("{}", e.recovery_suggestion());
            return ExitCode::FAILURE;
        }
    };

    let output_file = std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from);
    if let Err(e) = config::write_outputs(&summary, output_file.as_deref()) {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
