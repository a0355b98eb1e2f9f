//! Structured logging setup
//!
//! `RUST_LOG` wins over the configured level when set. Calling
//! [`init_logging`] more than once is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};

use orchestration_types::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::error::SetupError;

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

pub fn init_logging(config: &LoggingConfig) -> Result<(), SetupError> {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=warn,reqwest=warn", config.level)));

    let json_layer = config.json_format.then(|| {
        fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(true)
    });
    let text_layer = (!config.json_format).then(|| fmt::layer().with_target(true));

    let subscriber = Registry::default()
        .with(filter)
        .with(json_layer)
        .with(text_layer);

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        LOGGING_INITIALIZED.store(false, Ordering::SeqCst);
        return Err(SetupError::Logging(e.to_string()));
    }

    tracing::info!(
        service = %config.service_name,
        level = %config.level,
        json = config.json_format,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        assert!(init_logging(&config).is_ok());
    }
}
