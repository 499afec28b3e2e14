use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("YOLODEX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match yolodex::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            if err.is_archive_error() {
                eprintln!("The archive was rejected: it could not be opened or read.");
            } else if err.is_manifest_error() {
                eprintln!("The archive was rejected: its data.yaml manifest is missing or invalid.");
            }
            ExitCode::FAILURE
        }
    }
}
