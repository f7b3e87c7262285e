//! Global subscriber installation. Lives in its own test binary so the
//! subscriber does not leak into other tests.

use cdm_bootstrap::config::{LogFormat, LoggingConfig};
use cdm_bootstrap::observability::init_logging;

#[test]
fn test_init_logging_installs_once() {
    let config = LoggingConfig {
        level: "warn".into(),
        format: LogFormat::Json,
    };

    init_logging(&config).unwrap();
    assert!(init_logging(&config).is_err());
}
