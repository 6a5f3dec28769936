use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Filter used when `RUST_LOG` is unset. A configured level wins over `verbose`.
pub fn default_directive(verbose: bool, log_level: Option<&str>) -> String {
    match log_level {
        Some(level) => format!("vertex_output={},info", level.to_ascii_lowercase()),
        None if verbose => "vertex_output=debug,info".to_string(),
        None => "vertex_output=info".to_string(),
    }
}

pub fn init_cli_logger(verbose: bool, log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines 格式，方便批次作業收集日誌
pub fn init_json_logger(verbose: bool, log_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, None), "vertex_output=info");
        assert_eq!(default_directive(true, None), "vertex_output=debug,info");
        assert_eq!(default_directive(true, Some("WARN")), "vertex_output=warn,info");
        assert_eq!(default_directive(false, Some("trace")), "vertex_output=trace,info");
    }
}
