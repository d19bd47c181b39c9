//! Runtime configuration
//!
//! All settings come from environment variables (loaded from `.env` by the
//! binary via dotenvy before this module is consulted).
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: Added CHIME_BACKEND selection
//! - 1.0.0: Socket path and default label

use log::warn;

/// Default socket path for page connections
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/chimed.sock";

/// Title used when a reminder carries no text
pub const DEFAULT_LABEL: &str = "Reminder";

/// Which delivery backend the daemon runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Timer-backed deferred delivery (the normal mode)
    Deferred,
    /// Show-now only; deferred registrations are reported as gaps
    Immediate,
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Unix socket path pages connect to
    pub socket_path: String,
    /// Delivery backend selection
    pub backend: BackendKind,
    /// Fallback notification title
    pub default_label: String,
}

impl Config {
    /// Build configuration from the environment
    ///
    /// Unknown `CHIME_BACKEND` values fall back to `Deferred` with a warning
    /// rather than refusing to start.
    pub fn from_env() -> Self {
        let socket_path =
            std::env::var("CHIME_SOCKET").unwrap_or_else(|_| DEFAULT_SOCKET_PATH.to_string());

        let backend = match std::env::var("CHIME_BACKEND").as_deref() {
            Ok("immediate") => BackendKind::Immediate,
            Ok("deferred") | Err(_) => BackendKind::Deferred,
            Ok(other) => {
                warn!("Unknown CHIME_BACKEND '{other}', using deferred");
                BackendKind::Deferred
            }
        };

        let default_label =
            std::env::var("CHIME_DEFAULT_LABEL").unwrap_or_else(|_| DEFAULT_LABEL.to_string());

        Config {
            socket_path,
            backend,
            default_label,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            backend: BackendKind::Deferred,
            default_label: DEFAULT_LABEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.socket_path, DEFAULT_SOCKET_PATH);
        assert_eq!(config.backend, BackendKind::Deferred);
        assert_eq!(config.default_label, "Reminder");
    }
}
