use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

static LOG_HANDLE: OnceLock<LoggerHandle> = OnceLock::new();

/// Starts the process-wide logger: rotating files under `logs/`, warnings and
/// above mirrored to stderr. `base_level` accepts the `RUST_LOG` syntax, e.g.
/// `"info"` or `"depth_ccl=trace"`; `RUST_LOG` overrides it when set.
pub fn setup_logging(base_level: &str) {
    let handle = Logger::try_with_env_or_str(base_level)
        .unwrap_or_else(|e| panic!("Invalid log filter: {}", e))
        .log_to_file(FileSpec::default().directory("logs"))
        .duplicate_to_stderr(Duplicate::Warn)
        .rotate(
            Criterion::Size(1024 * 1024), //1MB
            Naming::Timestamps,
            Cleanup::KeepLogFiles(5),
        )
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {}", e));

    LOG_HANDLE
        .set(handle)
        .unwrap_or_else(|_| panic!("Logging already initialized"));
}
