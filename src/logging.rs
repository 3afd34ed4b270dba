use std::io;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub fn configure_logging() {
    // Stdout log configuration
    let stdout_log = fmt::layer().with_writer(io::stdout).with_filter(EnvFilter::new(
        "info,pipeline=info,llm_request=info,web_request=warn,market_data=warn",
    ));

    // File log configuration
    let file_appender = rolling::daily("logs", "newsradar.log");
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_filter(EnvFilter::new(
            "info,pipeline=debug,llm_request=debug,market_data=debug",
        ));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}
