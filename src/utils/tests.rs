use super::error::StoreError;
use super::logging;
use std::time::Duration;
use tracing::Level;

#[test]
fn test_parse_level_known_names() {
    assert_eq!(logging::parse_level("error"), Level::ERROR);
    assert_eq!(logging::parse_level("WARNING"), Level::WARN);
    assert_eq!(logging::parse_level(" debug "), Level::DEBUG);
    assert_eq!(logging::parse_level("trace"), Level::TRACE);
}

#[test]
fn test_parse_level_defaults_to_info() {
    assert_eq!(logging::parse_level("verbose"), Level::INFO);
    assert_eq!(logging::parse_level(""), Level::INFO);
}

#[test]
fn test_logging_init_reports_second_install() {
    let _ = logging::init("info");
    assert!(logging::init("debug").is_err());
}

#[test]
fn test_open_errors_are_classified() {
    let timeout = StoreError::LockTimeout {
        path: "x.db".into(),
        waited: Duration::from_millis(250),
    };
    assert!(timeout.is_open_error());
    assert!(!StoreError::Unavailable.is_open_error());
    assert_eq!(StoreError::Unavailable.to_string(), "store is not open");
}
