use crate::auth::token::DEFAULT_SESSION_TTL_SECS;
use crate::storage::nonce::DEFAULT_CHALLENGE_TTL_SECS;
use std::env;
use std::net::SocketAddr;
use zeroize::Zeroizing;

/// Minimum accepted length of `SESSION_SECRET` in bytes (HS256 key size).
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct Config {
    // Session signing
    pub session_secret: Zeroizing<Vec<u8>>,

    // Server
    pub bind_addr: SocketAddr,
    pub public_host: Option<String>,

    // TTLs (in seconds)
    pub challenge_ttl_secs: u64,
    pub session_ttl_secs: u64,

    // Cookies
    pub cookie_secure: bool,

    // Background sweep of expired challenges (0 = disabled)
    pub sweep_interval_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("session_secret", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("public_host", &self.public_host)
            .field("challenge_ttl_secs", &self.challenge_ttl_secs)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("cookie_secure", &self.cookie_secure)
            .field("sweep_interval_secs", &self.sweep_interval_secs)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        // (env vars may be set directly in production)
        let _ = dotenvy::dotenv();

        let session_secret = Zeroizing::new(
            env::var("SESSION_SECRET")
                .map_err(|_| ConfigError::MissingVar("SESSION_SECRET".to_string()))?
                .into_bytes(),
        );

        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "SESSION_SECRET".to_string(),
                format!("must be at least {} bytes", MIN_SESSION_SECRET_LEN),
            ));
        }

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        let public_host = env::var("PUBLIC_HOST")
            .ok()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        // TTLs
        let challenge_ttl_secs =
            parse_env_or_default("CHALLENGE_TTL_SECS", DEFAULT_CHALLENGE_TTL_SECS)?;
        let session_ttl_secs = parse_env_or_default("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;

        if challenge_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "CHALLENGE_TTL_SECS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }
        if session_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_TTL_SECS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        let cookie_secure = parse_env_or_default("COOKIE_SECURE", true)?;
        let sweep_interval_secs = parse_env_or_default("SWEEP_INTERVAL_SECS", 0)?;

        Ok(Config {
            session_secret,
            bind_addr,
            public_host,
            challenge_ttl_secs,
            session_ttl_secs,
            cookie_secure,
            sweep_interval_secs,
        })
    }
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Use a mutex to ensure tests run serially since they modify global env vars.
    // unwrap_or_else handles poison from prior panics.
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn lock_test() -> std::sync::MutexGuard<'static, ()> {
        TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
    }

    const TEST_SECRET: &str = "test-secret-test-secret-test-secret!";

    fn clear_test_env() {
        env::remove_var("SESSION_SECRET");
        env::remove_var("BIND_ADDR");
        env::remove_var("PUBLIC_HOST");
        env::remove_var("CHALLENGE_TTL_SECS");
        env::remove_var("SESSION_TTL_SECS");
        env::remove_var("COOKIE_SECURE");
        env::remove_var("SWEEP_INTERVAL_SECS");
    }

    #[test]
    fn test_parse_env_or_default() {
        let _guard = lock_test();

        env::set_var("TEST_U64", "12345");
        let result: Result<u64, ConfigError> = parse_env_or_default("TEST_U64", 100);
        assert_eq!(result.unwrap(), 12345);

        env::remove_var("TEST_U64");
        let result: Result<u64, ConfigError> = parse_env_or_default("TEST_U64", 100);
        assert_eq!(result.unwrap(), 100);
    }

    #[test]
    fn test_config_defaults() {
        let _guard = lock_test();
        clear_test_env();

        env::set_var("SESSION_SECRET", TEST_SECRET);
        env::set_var("BIND_ADDR", "0.0.0.0:3000");

        let config = Config::from_env().unwrap();

        assert_eq!(config.session_secret.as_slice(), TEST_SECRET.as_bytes());
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.public_host, None);
        assert_eq!(config.challenge_ttl_secs, 300);
        assert_eq!(config.session_ttl_secs, 604_800);
        assert!(config.cookie_secure);
        assert_eq!(config.sweep_interval_secs, 0);

        clear_test_env();
    }

    #[test]
    fn test_empty_session_secret() {
        let _guard = lock_test();
        clear_test_env();

        // Set to empty rather than removing so a local .env cannot supply one
        env::set_var("SESSION_SECRET", "");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue(ref s, _) if s == "SESSION_SECRET"
        ));

        clear_test_env();
    }

    #[test]
    fn test_short_session_secret() {
        let _guard = lock_test();
        clear_test_env();

        env::set_var("SESSION_SECRET", "too-short");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue(ref s, _) if s == "SESSION_SECRET"
        ));

        clear_test_env();
    }

    #[test]
    fn test_invalid_socket_addr() {
        let _guard = lock_test();
        clear_test_env();

        env::set_var("SESSION_SECRET", TEST_SECRET);
        env::set_var("BIND_ADDR", "invalid_address");

        let result = Config::from_env();
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_, _)));

        clear_test_env();
    }

    #[test]
    fn test_overrides() {
        let _guard = lock_test();
        clear_test_env();

        env::set_var("SESSION_SECRET", TEST_SECRET);
        env::set_var("BIND_ADDR", "127.0.0.1:8080");
        env::set_var("PUBLIC_HOST", " login.example.com ");
        env::set_var("CHALLENGE_TTL_SECS", "60");
        env::set_var("SESSION_TTL_SECS", "3600");
        env::set_var("COOKIE_SECURE", "false");
        env::set_var("SWEEP_INTERVAL_SECS", "30");

        let config = Config::from_env().unwrap();
        assert_eq!(config.public_host.as_deref(), Some("login.example.com"));
        assert_eq!(config.challenge_ttl_secs, 60);
        assert_eq!(config.session_ttl_secs, 3600);
        assert!(!config.cookie_secure);
        assert_eq!(config.sweep_interval_secs, 30);

        clear_test_env();
    }

    #[test]
    fn test_zero_challenge_ttl_rejected() {
        let _guard = lock_test();
        clear_test_env();

        env::set_var("SESSION_SECRET", TEST_SECRET);
        env::set_var("BIND_ADDR", "0.0.0.0:3000");
        env::set_var("CHALLENGE_TTL_SECS", "0");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue(ref s, _) if s == "CHALLENGE_TTL_SECS"
        ));

        clear_test_env();
    }

    #[test]
    fn test_unparsable_bool() {
        let _guard = lock_test();
        clear_test_env();

        env::set_var("SESSION_SECRET", TEST_SECRET);
        env::set_var("BIND_ADDR", "0.0.0.0:3000");
        env::set_var("COOKIE_SECURE", "yes");

        let result = Config::from_env();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ParseError(ref s, _) if s == "COOKIE_SECURE"
        ));

        clear_test_env();
    }

    #[test]
    fn test_debug_redacts_secret() {
        let _guard = lock_test();
        clear_test_env();

        env::set_var("SESSION_SECRET", TEST_SECRET);
        env::set_var("BIND_ADDR", "0.0.0.0:3000");

        let config = Config::from_env().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(TEST_SECRET));

        clear_test_env();
    }
}
