//! Dashboard configuration loaded via OrthoConfig.
//!
//! Values layer defaults, an optional `.dashboard.toml`, `DASHBOARD_*`
//! environment variables and command-line flags, in that order.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use camino::Utf8PathBuf;
use farm_data::{ActivityPolicy, StoreOptions};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_VISUALS: &str = "svg";
const SESSION_KEY_MIN_LEN: usize = 32;

/// Errors raised while interpreting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        /// Configured value.
        value: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// `activity_policy` names no known policy.
    #[error("invalid activity policy: {message}")]
    ActivityPolicy {
        /// Parse failure.
        message: String,
    },
    /// `data_dir` is not valid UTF-8.
    #[error("data directory {} is not valid UTF-8", .path.display())]
    DataDir {
        /// Configured path.
        path: PathBuf,
    },
    /// The session key file could not be read.
    #[error("failed to read session key at {}: {source}", .path.display())]
    KeyRead {
        /// Key file path.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short to derive a key from.
    #[error("session key at {} too short: need >= {min_len} bytes, got {length}", .path.display())]
    KeyTooShort {
        /// Key file path.
        path: PathBuf,
        /// Bytes read.
        length: usize,
        /// Required bytes.
        min_len: usize,
    },
}

/// Configuration values for the dashboard server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DASHBOARD")]
pub struct DashboardSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Directory holding the flat-file data store.
    pub data_dir: Option<PathBuf>,
    /// Seed for generated tables.
    pub seed: Option<u64>,
    /// `regenerate` or `persist`.
    pub activity_policy: Option<String>,
    /// Chart renderer: `svg` or `plain`.
    pub visuals: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = false)]
    pub cookie_secure: bool,
}

impl DashboardSettings {
    /// Socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Data directory, defaulting to `data`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::DataDir`] for non-UTF-8 paths.
    pub fn data_dir(&self) -> Result<Utf8PathBuf, SettingsError> {
        self.data_dir.clone().map_or_else(
            || Ok(Utf8PathBuf::from(DEFAULT_DATA_DIR)),
            |configured| {
                Utf8PathBuf::from_path_buf(configured)
                    .map_err(|path| SettingsError::DataDir { path })
            },
        )
    }

    /// Activity table policy, defaulting to `regenerate`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ActivityPolicy`] for unknown names.
    pub fn activity_policy(&self) -> Result<ActivityPolicy, SettingsError> {
        self.activity_policy.as_deref().map_or_else(
            || Ok(ActivityPolicy::default()),
            |raw| {
                raw.parse()
                    .map_err(|message| SettingsError::ActivityPolicy { message })
            },
        )
    }

    /// Options for the data store loader.
    ///
    /// # Errors
    ///
    /// Propagates [`DashboardSettings::activity_policy`] failures.
    pub fn store_options(&self) -> Result<StoreOptions, SettingsError> {
        Ok(StoreOptions {
            seed: self.seed,
            policy: self.activity_policy()?,
            ..StoreOptions::default()
        })
    }

    /// Configured chart renderer name, defaulting to `svg`.
    #[must_use]
    pub fn visuals(&self) -> &str {
        self.visuals.as_deref().unwrap_or(DEFAULT_VISUALS)
    }

    /// Session cookie key.
    ///
    /// Without a key file an ephemeral key is generated, so sessions do not
    /// survive a restart.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::KeyRead`] or [`SettingsError::KeyTooShort`]
    /// when a configured key file is unusable.
    pub fn session_key(&self) -> Result<Key, SettingsError> {
        match &self.session_key_file {
            Some(path) => read_session_key(path),
            None => {
                warn!("no session key file configured; using an ephemeral session key");
                Ok(Key::generate())
            }
        }
    }
}

fn read_session_key(path: &Path) -> Result<Key, SettingsError> {
    let bytes = std::fs::read(path).map_err(|source| SettingsError::KeyRead {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.len() < SESSION_KEY_MIN_LEN {
        return Err(SettingsError::KeyTooShort {
            path: path.to_path_buf(),
            length: bytes.len(),
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    Ok(Key::derive_from(&bytes))
}

#[cfg(test)]
mod tests {
    //! Unit tests for dashboard configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "DASHBOARD_BIND_ADDR",
        "DASHBOARD_DATA_DIR",
        "DASHBOARD_SEED",
        "DASHBOARD_ACTIVITY_POLICY",
        "DASHBOARD_VISUALS",
        "DASHBOARD_SESSION_KEY_FILE",
        "DASHBOARD_COOKIE_SECURE",
    ];

    fn load_from_empty_args() -> DashboardSettings {
        DashboardSettings::load_from_iter([OsString::from("dashboard")])
            .expect("config should load")
    }

    fn default_settings() -> DashboardSettings {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        load_from_empty_args()
    }

    fn scratch_file(label: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "dashboard-{label}-{}",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("write scratch file");
        path
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let settings = default_settings();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal address")
        );
        assert_eq!(settings.data_dir().expect("utf-8 path"), "data");
        assert_eq!(
            settings.activity_policy().expect("default policy"),
            ActivityPolicy::Regenerate
        );
        assert_eq!(settings.visuals(), "svg");
        assert!(settings.seed.is_none());
        assert!(!settings.cookie_secure);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("DASHBOARD_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("DASHBOARD_DATA_DIR", Some("/tmp/farm".to_owned())),
            ("DASHBOARD_SEED", Some("42".to_owned())),
            ("DASHBOARD_ACTIVITY_POLICY", Some("persist".to_owned())),
            ("DASHBOARD_VISUALS", Some("plain".to_owned())),
            ("DASHBOARD_SESSION_KEY_FILE", None::<String>),
            ("DASHBOARD_COOKIE_SECURE", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("configured address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal address")
        );
        assert_eq!(settings.data_dir().expect("utf-8 path"), "/tmp/farm");
        let options = settings.store_options().expect("store options");
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.policy, ActivityPolicy::Persist);
        assert_eq!(settings.visuals(), "plain");
        assert!(settings.cookie_secure);
    }

    #[rstest]
    fn command_line_flags_override_the_environment() {
        let _guard = lock_env([
            ("DASHBOARD_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("DASHBOARD_VISUALS", Some("svg".to_owned())),
        ]);

        let settings = DashboardSettings::load_from_iter(
            ["dashboard", "--bind-addr", "127.0.0.1:7000", "--visuals", "plain"]
                .map(OsString::from),
        )
        .expect("flags should parse");
        assert_eq!(
            settings.bind_addr().expect("flag address"),
            "127.0.0.1:7000".parse::<SocketAddr>().expect("literal address")
        );
        assert_eq!(settings.visuals(), "plain");
    }

    #[rstest]
    fn invalid_values_are_reported() {
        let _guard = lock_env([
            ("DASHBOARD_BIND_ADDR", Some("not-an-address".to_owned())),
            ("DASHBOARD_ACTIVITY_POLICY", Some("sometimes".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
        assert!(matches!(
            settings.store_options(),
            Err(SettingsError::ActivityPolicy { .. })
        ));
    }

    #[rstest]
    fn session_key_is_read_from_file() {
        let path = scratch_file("session-key", &[7_u8; 64]);
        let settings = DashboardSettings {
            session_key_file: Some(path.clone()),
            ..default_settings()
        };
        let first = settings.session_key().expect("key from file");
        let second = settings.session_key().expect("key from file");
        assert_eq!(first.master(), second.master());
        std::fs::remove_file(path).expect("clean up");
    }

    #[rstest]
    fn short_session_keys_are_rejected() {
        let path = scratch_file("short-key", b"short");
        let settings = DashboardSettings {
            session_key_file: Some(path.clone()),
            ..default_settings()
        };
        assert!(matches!(
            settings.session_key(),
            Err(SettingsError::KeyTooShort { length: 5, .. })
        ));
        std::fs::remove_file(path).expect("clean up");
    }

    #[rstest]
    fn missing_key_file_is_an_error() {
        let settings = DashboardSettings {
            session_key_file: Some(PathBuf::from("/nonexistent/dashboard/session_key")),
            ..default_settings()
        };
        assert!(matches!(
            settings.session_key(),
            Err(SettingsError::KeyRead { .. })
        ));
    }
}
