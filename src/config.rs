//! Configuration file structures for the wynnbot.
//!
//! The configuration is a YAML file split into three sections: the Wynncraft
//! API, the Matrix account and the interactive messages settings.
//!
//! # Configuration File Format
//!
//! ```yaml
//! wynn:
//!   # Base URL of the Wynncraft API
//!   url: "https://api.wynncraft.com"
//!
//! matrix:
//!   # Fully qualified Matrix user ID for the bot account
//!   user_id: "@wynnbot:matrix.org"
//!   # Matrix account password
//!   password: "secret-password"
//!   # Passphrase encrypting the local Matrix store
//!   passphrase: "store-passphrase"
//!
//! # Optional section
//! interactive:
//!   # Seconds a reaction-driven message stays live
//!   timeout: 300
//!   # Seconds between two sweeps of expired messages
//!   sweep_interval: 5
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every value can be overridden with a `WYNNBOT_` prefixed variable, sections
//! being separated by a double underscore:
//!
//! ```bash
//! export WYNNBOT_MATRIX__PASSWORD="secret-from-env"
//! export WYNNBOT_INTERACTIVE__TIMEOUT=600
//! ```

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Root configuration structure.
#[derive(Deserialize, Debug)]
pub struct Config {
    /// Wynncraft API configuration
    pub wynn: Wynn,
    /// Matrix account configuration
    pub matrix: Matrix,
    /// Interactive messages configuration
    #[serde(default)]
    pub interactive: Interactive,
}

impl Config {
    /// Loads the configuration from a YAML file, then applies `WYNNBOT_`
    /// environment variable overrides.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if a required value is
    /// missing from both the file and the environment.
    pub fn load(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("WYNNBOT_").split("__"))
            .extract()
    }
}

/// Wynncraft API configuration.
#[derive(Deserialize, Debug)]
pub struct Wynn {
    /// Base URL of the Wynncraft API.
    ///
    /// A trailing slash is ignored.
    pub url: String,
}

/// Matrix account configuration.
#[derive(Deserialize, Debug)]
pub struct Matrix {
    /// Matrix ID of the bot account in the format `@username:homeserver.com`.
    pub user_id: String,

    /// Matrix account password.
    ///
    /// Used for the first login only. The session is then persisted and
    /// restored on later starts.
    pub password: String,

    /// Passphrase encrypting the local SQLite store.
    pub passphrase: String,
}

/// Interactive messages configuration.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Interactive {
    /// Seconds an interactive message reacts to users before its markers
    /// are removed
    pub timeout: u64,
    /// Seconds between two sweeps of expired interactive messages
    pub sweep_interval: u64,
}

impl Interactive {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn sweep_interval(&self) -> Duration {
        // A zero interval would make the sweep task panic
        Duration::from_secs(self.sweep_interval.max(1))
    }
}

impl Default for Interactive {
    fn default() -> Self {
        Interactive {
            timeout: 300,
            sweep_interval: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const FULL_CONFIG: &str = r#"
wynn:
  url: "https://api.wynncraft.com"
matrix:
  user_id: "@wynnbot:example.com"
  password: "password"
  passphrase: "passphrase"
interactive:
  timeout: 60
  sweep_interval: 2
"#;

    #[test]
    #[serial]
    fn test_load_full_config() {
        let file = write_config(FULL_CONFIG);
        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.wynn.url, "https://api.wynncraft.com");
        assert_eq!(config.matrix.user_id, "@wynnbot:example.com");
        assert_eq!(config.interactive.timeout(), Duration::from_secs(60));
        assert_eq!(config.interactive.sweep_interval(), Duration::from_secs(2));
    }

    #[test]
    #[serial]
    fn test_interactive_section_is_optional() {
        let file = write_config(
            r#"
wynn:
  url: "https://api.wynncraft.com"
matrix:
  user_id: "@wynnbot:example.com"
  password: "password"
  passphrase: "passphrase"
"#,
        );
        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.interactive, Interactive::default());
    }

    #[test]
    #[serial]
    fn test_missing_matrix_section_fails() {
        let file = write_config("wynn:\n  url: \"https://api.wynncraft.com\"\n");
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let file = write_config(FULL_CONFIG);

        // SAFETY: serial tests are the only ones touching the environment
        unsafe {
            std::env::set_var("WYNNBOT_MATRIX__PASSWORD", "from-env");
            std::env::set_var("WYNNBOT_INTERACTIVE__TIMEOUT", "900");
        }
        let config = Config::load(file.path().to_str().unwrap());
        unsafe {
            std::env::remove_var("WYNNBOT_MATRIX__PASSWORD");
            std::env::remove_var("WYNNBOT_INTERACTIVE__TIMEOUT");
        }

        let config = config.unwrap();
        assert_eq!(config.matrix.password, "from-env");
        assert_eq!(config.interactive.timeout, 900);
        assert_eq!(config.interactive.sweep_interval, 2);
    }

    #[test]
    fn test_zero_sweep_interval_is_clamped() {
        let interactive = Interactive {
            timeout: 10,
            sweep_interval: 0,
        };
        assert_eq!(interactive.sweep_interval(), Duration::from_secs(1));
    }
}
