//! HLR front-end configuration, spec §6.4.
//!
//! Modeled as an explicit enumerated set read once at startup rather than
//! ambient `env::var` calls scattered through the handlers.

use std::time::Duration;

/// Complete configuration for the HLR GSUP front-end.
#[derive(Debug, Clone)]
pub struct HlrConfig {
    /// Bind address for the GSUP/IPA listener.
    pub host: String,
    /// Bind port for the GSUP/IPA listener.
    pub port: u16,
    /// Base URL of the external auth/provisioning service.
    pub auth_service_url: String,
    /// HTTP timeout for provisioner requests.
    pub auth_service_timeout: Duration,
    /// Bound on the nested Update Location wait, spec §4.5.4.
    pub update_location_timeout: Duration,
    /// Log verbosity.
    pub log_level: LogLevel,
}

/// Verbosity levels accepted by `LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn parse(raw: &str) -> Result<Self, crate::errors::HlrError> {
        match raw.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            other => Err(crate::errors::HlrError::Config(format!(
                "invalid LOG_LEVEL: {other}"
            ))),
        }
    }

    pub fn as_tracing_directive(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl HlrConfig {
    /// Load configuration from environment variables, applying the
    /// documented defaults for anything unset.
    pub fn from_env() -> Result<Self, crate::errors::HlrError> {
        let host = std::env::var("HLR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match std::env::var("HLR_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| crate::errors::HlrError::Config(format!("invalid HLR_PORT: {e}")))?,
            Err(_) => 4222,
        };

        let auth_service_url = std::env::var("AUTH_SERVICE_URL").map_err(|_| {
            crate::errors::HlrError::Config("AUTH_SERVICE_URL must be set".to_string())
        })?;

        let auth_service_timeout = match std::env::var("AUTH_SERVICE_TIMEOUT") {
            Ok(v) => Duration::from_secs(v.parse::<u64>().map_err(|e| {
                crate::errors::HlrError::Config(format!("invalid AUTH_SERVICE_TIMEOUT: {e}"))
            })?),
            Err(_) => Duration::from_secs(30),
        };

        let update_location_timeout = match std::env::var("UPDATE_LOCATION_TIMEOUT") {
            Ok(v) => Duration::from_secs(v.parse::<u64>().map_err(|e| {
                crate::errors::HlrError::Config(format!("invalid UPDATE_LOCATION_TIMEOUT: {e}"))
            })?),
            Err(_) => Duration::from_secs(30),
        };

        let log_level = match std::env::var("LOG_LEVEL") {
            Ok(v) => LogLevel::parse(&v)?,
            Err(_) => LogLevel::Info,
        };

        Ok(Self {
            host,
            port,
            auth_service_url,
            auth_service_timeout,
            update_location_timeout,
            log_level,
        })
    }
}

/// Install the global tracing subscriber, honoring `config.log_level`.
pub fn init_tracing(config: &HlrConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "hlr_gsup={}",
            config.log_level.as_tracing_directive()
        ))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!(LogLevel::parse("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::parse("WARN").unwrap(), LogLevel::Warn);
        assert!(LogLevel::parse("bogus").is_err());
    }
}
