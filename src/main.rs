use std::process::ExitCode;

use konnect_provisioner::cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists (optional - won't fail if missing)
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: error loading .env file: {}", e);
        }
    }

    match cli::run_cli().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", cli::output::diagnostic(&err));
            ExitCode::FAILURE
        }
    }
}
