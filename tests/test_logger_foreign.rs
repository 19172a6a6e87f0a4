//! Logger initialisation when another global subscriber got there first.
//! Kept in its own test binary because it installs a global subscriber.

use std::fs;

use tempfile::TempDir;
use us_visa::{AppError, config::LogConfig, logger};

#[test]
fn refused_init_leaves_no_log_file() {
    tracing::subscriber::set_global_default(tracing_subscriber::fmt().finish())
        .expect("no subscriber installed yet in this binary");

    let root = TempDir::new().unwrap();
    let log_dir = root.path().join("logs");
    let err = logger::init(&LogConfig::new(&log_dir, "trace")).unwrap_err();

    match err {
        AppError::Logger(msg) => assert!(msg.contains("already installed"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(logger::sink().is_none());
    assert!(!log_dir.exists() || fs::read_dir(&log_dir).unwrap().next().is_none());
}
