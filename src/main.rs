//! us-visa demo entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger (one file per run under the log dir)
//!   4. Run the demo, which fails with an annotated division-by-zero error

use tracing::info;
use us_visa::{config, demo, error::AppError, logger};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    let sink = logger::init(&config.logging)?;

    info!(
        project_root = %config.project_root.display(),
        log_file = %sink.path().display(),
        log_level = %sink.level(),
        "config loaded"
    );

    let quotient = demo::run(sink)?;
    info!(quotient, "demo finished");

    Ok(())
}
