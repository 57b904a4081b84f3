//! Gateway configuration with validation.
//!
//! Loaded from TOML, then overridden from the environment:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `SC_HTTP_PORT` | `http.port` |
//! | `SC_FRESHNESS_WINDOW` | `auth.freshness_window` (`"300s"`, `"5m"`, `"off"`) |

use chrono::{DateTime, Utc};
use sc_01_auth_protocol::{
    is_canonical_user_id, AuthPolicy, InMemoryKeyStore, SharedKey, StoreError, UserRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Request authentication settings
    pub auth: AuthConfig,
    /// Request size limits
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// Seed users loaded into the key store at startup
    pub users: Vec<UserConfig>,
}

impl GatewayConfig {
    /// Parse a TOML document. Does not apply overrides or validate.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path` (or defaults when `None`), apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SC_HTTP_PORT` and `SC_FRESHNESS_WINDOW` from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SC_HTTP_PORT") {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride("SC_HTTP_PORT".into(), port))?;
        }
        if let Some(window) = lookup("SC_FRESHNESS_WINDOW") {
            self.auth.freshness_window = match window.trim() {
                "" | "off" | "none" => None,
                text => Some(humantime_serde::parse_duration(text).map_err(|_| {
                    ConfigError::InvalidOverride("SC_FRESHNESS_WINDOW".into(), window.clone())
                })?),
            };
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        // Validate limits
        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        // Validate timeouts
        if self.timeouts.request.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request timeout cannot be 0".into(),
            ));
        }

        if self.auth.freshness_window.is_some_and(|w| w.is_zero()) {
            return Err(ConfigError::InvalidFreshnessWindow);
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.user_id.as_str()) {
                return Err(ConfigError::DuplicateUser(user.user_id.clone()));
            }
            user.to_record()?;
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Authentication policy for the protocol service
    pub fn auth_policy(&self) -> AuthPolicy {
        AuthPolicy {
            freshness_window: self.auth.freshness_window,
        }
    }

    /// Key store seeded with the configured users
    pub fn build_key_store(&self) -> Result<InMemoryKeyStore, ConfigError> {
        let records = self
            .users
            .iter()
            .map(UserConfig::to_record)
            .collect::<Result<Vec<_>, _>>()?;
        InMemoryKeyStore::with_users(records).map_err(|e| match e {
            StoreError::InvalidUserId(user_id) => ConfigError::InvalidUser {
                user_id,
                reason: "rejected by key store".into(),
            },
        })
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8000,
        }
    }
}

/// Request authentication settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Maximum accepted clock skew between client timestamp and server time.
    /// Unset disables the check.
    #[serde(with = "humantime_serde::option")]
    pub freshness_window: Option<Duration>,
    /// Answer every 401 with the same `unauthorized` message
    pub uniform_errors: bool,
}

/// Request size limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body in bytes
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 16 * 1024,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(10),
        }
    }
}

/// A provisioned user. Exactly one of `shared_key` (hex) or
/// `shared_key_text` must be set.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_key_text: Option<String>,
    /// RFC 3339 instant
    pub expires_at: DateTime<Utc>,
}

impl UserConfig {
    pub fn to_record(&self) -> Result<UserRecord, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUser {
            user_id: self.user_id.clone(),
            reason,
        };

        let key = match (&self.shared_key, &self.shared_key_text) {
            (Some(hex), None) => SharedKey::from_hex(hex),
            (None, Some(text)) => SharedKey::from_text(text),
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "set only one of shared_key and shared_key_text".into(),
                ))
            }
            (None, None) => return Err(invalid("missing shared key".into())),
        }
        .map_err(|e| invalid(e.to_string()))?;

        if !is_canonical_user_id(&self.user_id) {
            return Err(invalid(
                "user_id must be non-empty and must not contain '|'".into(),
            ));
        }

        Ok(UserRecord::new(self.user_id.clone(), key, self.expires_at))
    }
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("user_id", &self.user_id)
            .field("shared_key", &self.shared_key.as_ref().map(|_| "<redacted>"))
            .field(
                "shared_key_text",
                &self.shared_key_text.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config: {0}")]
    Read(String),
    /// Config file is not valid TOML for this schema
    #[error("cannot parse config: {0}")]
    Parse(String),
    /// Environment override has an unusable value
    #[error("invalid value for {0}: {1:?}")]
    InvalidOverride(String, String),
    /// Port 0 is reserved for ephemeral binds
    #[error("http.port cannot be 0")]
    InvalidPort,
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// A zero-length window would reject every request
    #[error("auth.freshness_window cannot be 0; omit it to disable the check")]
    InvalidFreshnessWindow,
    /// The same user id appears twice in `users`
    #[error("duplicate user: {0}")]
    DuplicateUser(String),
    /// A seed user cannot be turned into a key store record
    #[error("invalid user {user_id:?}: {reason}")]
    InvalidUser { user_id: String, reason: String },
}

/// Durations as `"300s"`, `"1500ms"`, `"5m"` or plain seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}s", duration.as_secs()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else {
            // Plain seconds
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| super::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
        [http]
        host = "127.0.0.1"
        port = 9000

        [auth]
        freshness_window = "5m"
        uniform_errors = true

        [limits]
        max_request_size = 4096

        [timeouts]
        request = "2s"

        [[users]]
        user_id = "user123"
        shared_key_text = "THIS_IS_A_32_BYTE_MINIMUM_SECRET_KEY"
        expires_at = "2030-01-01T00:00:00Z"

        [[users]]
        user_id = "user456"
        shared_key = "4242424242424242424242424242424242424242424242424242424242424242"
        expires_at = "2020-06-01T12:00:00+00:00"
    "#;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn user(id: &str) -> UserConfig {
        UserConfig {
            user_id: id.into(),
            shared_key: None,
            shared_key_text: Some("THIS_IS_A_32_BYTE_MINIMUM_SECRET_KEY".into()),
            expires_at: "2030-01-01T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.port, 8000);
        assert_eq!(config.auth.freshness_window, None);
        assert!(!config.auth.uniform_errors);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_parse_sample() {
        let config = GatewayConfig::from_toml_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.http_addr(), "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.auth.freshness_window, Some(Duration::from_secs(300)));
        assert!(config.auth.uniform_errors);
        assert_eq!(config.limits.max_request_size, 4096);
        assert_eq!(config.timeouts.request, Duration::from_secs(2));

        let store = config.build_key_store().unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config = GatewayConfig::from_toml_str("[http]\nport = 8080\n").unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.timeouts.request, Duration::from_secs(10));
        assert_eq!(config.limits.max_request_size, 16 * 1024);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            GatewayConfig::from_toml_str("[auth]\nfreshness_window = \"soon\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GatewayConfig::from_toml_str("[http]\nport = \"eighty\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_duration_formats() {
        assert_eq!(
            humantime_serde::parse_duration("300s"),
            Ok(Duration::from_secs(300))
        );
        assert_eq!(
            humantime_serde::parse_duration("1500ms"),
            Ok(Duration::from_millis(1500))
        );
        assert_eq!(
            humantime_serde::parse_duration("5m"),
            Ok(Duration::from_secs(300))
        );
        assert_eq!(
            humantime_serde::parse_duration("42"),
            Ok(Duration::from_secs(42))
        );
        assert!(humantime_serde::parse_duration("5h").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        config
            .apply_env_overrides(lookup_from(&[
                ("SC_HTTP_PORT", "9100"),
                ("SC_FRESHNESS_WINDOW", "30s"),
            ]))
            .unwrap();
        assert_eq!(config.http.port, 9100);
        assert_eq!(config.auth.freshness_window, Some(Duration::from_secs(30)));

        config
            .apply_env_overrides(lookup_from(&[("SC_FRESHNESS_WINDOW", "off")]))
            .unwrap();
        assert_eq!(config.auth.freshness_window, None);

        assert!(matches!(
            config.apply_env_overrides(lookup_from(&[("SC_HTTP_PORT", "http")])),
            Err(ConfigError::InvalidOverride(..))
        ));
    }

    #[test]
    fn test_validation_rejections() {
        let mut config = GatewayConfig::default();
        config.http.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort));

        let mut config = GatewayConfig::default();
        config.limits.max_request_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));

        let mut config = GatewayConfig::default();
        config.timeouts.request = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));

        let mut config = GatewayConfig::default();
        config.auth.freshness_window = Some(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::InvalidFreshnessWindow));
    }

    #[test]
    fn test_user_validation() {
        let mut config = GatewayConfig::default();
        config.users = vec![user("alice"), user("alice")];
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateUser("alice".into()))
        );

        let mut short = user("bob");
        short.shared_key_text = Some("too-short".into());
        assert!(matches!(
            short.to_record(),
            Err(ConfigError::InvalidUser { .. })
        ));

        let mut both = user("carol");
        both.shared_key = Some("ab".repeat(32));
        assert!(both.to_record().is_err());

        let mut neither = user("dave");
        neither.shared_key_text = None;
        assert!(neither.to_record().is_err());

        assert!(user("a|b").to_record().is_err());
    }

    #[test]
    fn test_user_debug_redacts_keys() {
        let debug = format!("{:?}", user("alice"));
        assert!(!debug.contains("SECRET"));
        assert!(debug.contains("<redacted>"));
    }
}
