//! gh_release - publish a release and its artifacts to GitHub.

use gh_release_client::cli;
use gh_release_client::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false);
            output.error(&format!("Fatal error: {e}"));

            for suggestion in e.recovery_suggestions() {
                output.hint(&suggestion);
            }
            if e.is_recoverable() {
                output.hint("GitHub never answered; running again may succeed");
            }

            process::exit(1);
        }
    }
}
