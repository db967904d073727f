use std::net::IpAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;

/// Why the server configuration could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("The environment variable \"{0}\" is not set. Please set it before starting the server.")]
    Missing(&'static str),

    /// A variable is set but its value cannot be used.
    #[error("The environment variable \"{key}\" has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Server configuration loaded from environment variables.
///
/// `PORT` and `SQLITE_FILE_NAME` are required; everything else falls back to
/// a default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: IpAddr,
    /// Bind port, 1..=65535.
    pub port: u16,
    /// Directory holding the SQLite file (default: `database`).
    pub database_dir: PathBuf,
    /// SQLite file name inside [`ServerConfig::database_dir`].
    pub sqlite_file_name: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
}

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DATABASE_DIR: &str = "database";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `PORT`                  | required                |
    /// | `SQLITE_FILE_NAME`      | required                |
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `DATABASE_DIR`          | `database`              |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port_raw = var("PORT").ok_or(ConfigError::Missing("PORT"))?;
        let port = parse_port(&port_raw)?;

        let sqlite_file_name = var("SQLITE_FILE_NAME")
            .ok_or(ConfigError::Missing("SQLITE_FILE_NAME"))?
            .trim()
            .to_string();

        let host = match var("HOST") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "HOST",
                value: raw.clone(),
                reason: "must be an IP address",
            })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let database_dir =
            PathBuf::from(var("DATABASE_DIR").unwrap_or_else(|| DEFAULT_DATABASE_DIR.into()));

        let cors_origins =
            parse_origins(&var("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into()))?;

        let request_timeout_secs = parse_secs(
            "REQUEST_TIMEOUT_SECS",
            var("REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let shutdown_timeout_secs = parse_secs(
            "SHUTDOWN_TIMEOUT_SECS",
            var("SHUTDOWN_TIMEOUT_SECS"),
            DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        )?;

        Ok(Self {
            host,
            port,
            database_dir,
            sqlite_file_name,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
        })
    }

    /// Full path of the SQLite file.
    pub fn database_path(&self) -> PathBuf {
        self.database_dir.join(&self.sqlite_file_name)
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::Invalid {
            key: "PORT",
            value: raw.to_string(),
            reason: "must be an integer between 1 and 65535",
        }),
    }
}

fn parse_secs(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "must be a positive number of seconds",
        }),
    }
}

/// Split a comma-separated origin list, rejecting values that cannot be sent
/// as a header.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            if origin == "*" {
                return Err(ConfigError::Invalid {
                    key: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: "wildcard origins are not allowed with credentials",
                });
            }
            HeaderValue::from_str(origin)
                .map(|_| origin.to_string())
                .map_err(|_| ConfigError::Invalid {
                    key: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: "must be a valid origin header value",
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_required_vars_with_defaults() {
        let config = load(&[("PORT", "8080"), ("SQLITE_FILE_NAME", "forum.db")]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.sqlite_file_name, "forum.db");
        assert_eq!(config.host.to_string(), DEFAULT_HOST);
        assert_eq!(config.database_path(), PathBuf::from("database/forum.db"));
        assert_eq!(config.cors_origins, vec![DEFAULT_CORS_ORIGINS.to_string()]);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.shutdown_timeout_secs, DEFAULT_SHUTDOWN_TIMEOUT_SECS);
    }

    #[test]
    fn test_missing_port() {
        assert_eq!(
            load(&[("SQLITE_FILE_NAME", "forum.db")]).unwrap_err(),
            ConfigError::Missing("PORT")
        );
        assert_eq!(
            load(&[("PORT", ""), ("SQLITE_FILE_NAME", "forum.db")]).unwrap_err(),
            ConfigError::Missing("PORT")
        );
    }

    #[test]
    fn test_missing_sqlite_file_name() {
        assert_eq!(
            load(&[("PORT", "8080")]).unwrap_err(),
            ConfigError::Missing("SQLITE_FILE_NAME")
        );
    }

    #[test]
    fn test_port_out_of_range() {
        for raw in ["0", "65536", "-1", "http"] {
            assert_matches!(
                load(&[("PORT", raw), ("SQLITE_FILE_NAME", "forum.db")]),
                Err(ConfigError::Invalid { key: "PORT", .. }),
                "PORT={raw}"
            );
        }
        assert_eq!(
            load(&[("PORT", "65535"), ("SQLITE_FILE_NAME", "forum.db")])
                .unwrap()
                .port,
            65535
        );
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "3000"),
            ("SQLITE_FILE_NAME", "forum.db"),
            ("HOST", "127.0.0.1"),
            ("DATABASE_DIR", "/var/lib/agora"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("SHUTDOWN_TIMEOUT_SECS", "2"),
        ])
        .unwrap();

        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/agora/forum.db"));
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.shutdown_timeout_secs, 2);
    }

    #[test]
    fn test_invalid_optional_values() {
        let base = [("PORT", "3000"), ("SQLITE_FILE_NAME", "forum.db")];

        let with = |key, value| {
            let mut vars = base.to_vec();
            vars.push((key, value));
            load(&vars)
        };

        assert_matches!(
            with("HOST", "localhost"),
            Err(ConfigError::Invalid { key: "HOST", .. })
        );
        assert_matches!(
            with("REQUEST_TIMEOUT_SECS", "0"),
            Err(ConfigError::Invalid { key: "REQUEST_TIMEOUT_SECS", .. })
        );
        assert_matches!(
            with("CORS_ORIGINS", "http://bad\norigin"),
            Err(ConfigError::Invalid { key: "CORS_ORIGINS", .. })
        );
    }

    #[test]
    fn test_missing_message_names_variable() {
        let message = ConfigError::Missing("PORT").to_string();
        assert!(message.contains("\"PORT\""));
    }
}
