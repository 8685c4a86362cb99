use base64::engine::general_purpose::STANDARD as b64;
use base64::Engine;
use once_cell::sync::Lazy;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;
use zeroize::{Zeroize, Zeroizing};

#[cfg(not(test))]
pub static CONF: Lazy<Config> = Lazy::new(|| match Config::from_env() {
    Ok(c) => c,
    Err(e) => {
        eprintln!("ERROR: Failed to load config: {e}");
        std::process::exit(1);
    }
});

#[cfg(test)]
pub static CONF: Lazy<Config> = Lazy::new(testing::config);

const DATABASE_PATH_VAR: &str = "POTLUCK_DATABASE_PATH";
const DB_MAX_CONNECTIONS_VAR: &str = "POTLUCK_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "POTLUCK_DB_IDLE_TIMEOUT_SECS";
const DB_BUSY_TIMEOUT_MS_VAR: &str = "POTLUCK_DB_BUSY_TIMEOUT_MS";

const HASHING_KEY_VAR: &str = "POTLUCK_HASHING_KEY_B64";
const TOKEN_SIGNING_KEY_VAR: &str = "POTLUCK_TOKEN_SIGNING_KEY_B64";

const HASH_LENGTH_VAR: &str = "POTLUCK_HASH_LENGTH";
const HASH_ITERATIONS_VAR: &str = "POTLUCK_HASH_ITERATIONS";
const HASH_MEM_COST_KIB_VAR: &str = "POTLUCK_HASH_MEM_COST_KIB";
const HASH_THREADS_VAR: &str = "POTLUCK_HASH_THREADS";
const HASH_SALT_LENGTH_VAR: &str = "POTLUCK_HASH_SALT_LENGTH";

const ACCESS_TOKEN_LIFETIME_DAYS_VAR: &str = "POTLUCK_ACCESS_TOKEN_LIFETIME_DAYS";

const ACTIX_WORKER_COUNT_VAR: &str = "POTLUCK_ACTIX_WORKER_COUNT";
const MAX_JSON_PAYLOAD_BYTES_VAR: &str = "POTLUCK_MAX_JSON_PAYLOAD_BYTES";

const LOG_LEVEL_VAR: &str = "POTLUCK_LOG_LEVEL";

const HASHING_KEY_SIZE: usize = 32;
const TOKEN_SIGNING_KEY_SIZE: usize = 64;

#[derive(Zeroize)]
pub struct ConfigInner {
    #[zeroize(skip)]
    pub database_path: String,
    #[zeroize(skip)]
    pub db_max_connections: u32,
    #[zeroize(skip)]
    pub db_idle_timeout: Duration,
    #[zeroize(skip)]
    pub db_busy_timeout: Duration,

    pub hashing_key: [u8; HASHING_KEY_SIZE],
    pub token_signing_key: [u8; TOKEN_SIGNING_KEY_SIZE],

    pub hash_length: u32,
    pub hash_iterations: u32,
    pub hash_mem_cost_kib: u32,
    pub hash_threads: u32,
    pub hash_salt_length: u32,

    #[zeroize(skip)]
    pub access_token_lifetime: Duration,

    #[zeroize(skip)]
    pub actix_worker_count: usize,
    #[zeroize(skip)]
    pub max_json_payload_bytes: usize,

    #[zeroize(skip)]
    pub log_level: String,
}

pub struct Config {
    inner: UnsafeCell<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        // Safe as long as `unsafe Config::zeroize()` hasn't been called
        unsafe { &*self.inner.get() }
    }
}

// Safe to be shared across threads as long as `unsafe Config::zeroize()` hasn't been called
unsafe impl Sync for Config {}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let inner = ConfigInner {
            database_path: env_var_or(DATABASE_PATH_VAR, String::from("potluck.db")),
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 16),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),
            db_busy_timeout: Duration::from_millis(env_var_or(DB_BUSY_TIMEOUT_MS_VAR, 5000)),

            hashing_key: b64_key::<HASHING_KEY_SIZE>(HASHING_KEY_VAR)?,
            token_signing_key: b64_key::<TOKEN_SIGNING_KEY_SIZE>(TOKEN_SIGNING_KEY_VAR)?,

            hash_length: env_var_or(HASH_LENGTH_VAR, 32),
            hash_iterations: env_var_or(HASH_ITERATIONS_VAR, 3),
            hash_mem_cost_kib: env_var_or(HASH_MEM_COST_KIB_VAR, 65536),
            hash_threads: env_var_or(HASH_THREADS_VAR, 1),
            hash_salt_length: env_var_or(HASH_SALT_LENGTH_VAR, 16),

            access_token_lifetime: Duration::from_secs(
                env_var_or(ACCESS_TOKEN_LIFETIME_DAYS_VAR, 7) * 86400,
            ),

            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),
            max_json_payload_bytes: env_var_or(MAX_JSON_PAYLOAD_BYTES_VAR, 2 * 1024 * 1024),

            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
        };

        Ok(Config {
            inner: UnsafeCell::new(inner),
        })
    }

    /// # Safety
    ///
    /// Safe only if the Config isn't being used by other threads or across an async
    /// boundary. Generally, this should only be used at the end of the main function once
    /// all threads have been joined.
    pub unsafe fn zeroize(&self) {
        unsafe {
            (*self.inner.get()).zeroize();
        }
    }
}

fn b64_key<const N: usize>(key: &'static str) -> Result<[u8; N], ConfigError> {
    let decoded = Zeroizing::new(
        b64.decode(Zeroizing::new(env_var::<String>(key)?).as_bytes())
            .map_err(|_| ConfigError::invalid(key))?,
    );

    if decoded.len() < N {
        return Err(ConfigError::invalid(key));
    }

    decoded[..N].try_into().map_err(|_| ConfigError::invalid(key))
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Fixed keys and deliberately cheap argon2 parameters.
    pub fn config() -> Config {
        let inner = ConfigInner {
            database_path: String::new(),
            db_max_connections: 4,
            db_idle_timeout: Duration::from_secs(30),
            db_busy_timeout: Duration::from_millis(5000),

            hashing_key: [7; HASHING_KEY_SIZE],
            token_signing_key: [11; TOKEN_SIGNING_KEY_SIZE],

            hash_length: 32,
            hash_iterations: 1,
            hash_mem_cost_kib: 1024,
            hash_threads: 1,
            hash_salt_length: 16,

            access_token_lifetime: Duration::from_secs(7 * 86400),

            actix_worker_count: 1,
            max_json_payload_bytes: 64 * 1024,

            log_level: String::from("debug"),
        };

        Config {
            inner: UnsafeCell::new(inner),
        }
    }

    #[test]
    fn test_missing_keys_fail_to_load() {
        std::env::remove_var(HASHING_KEY_VAR);
        assert_eq!(
            Config::from_env().err(),
            Some(ConfigError::MissingVar(HASHING_KEY_VAR))
        );
    }

    #[test]
    fn test_short_key_is_invalid() {
        const SHORT_KEY_VAR: &str = "POTLUCK_TEST_SHORT_KEY_B64";
        std::env::set_var(SHORT_KEY_VAR, b64.encode([1u8; 8]));

        assert_eq!(
            b64_key::<HASHING_KEY_SIZE>(SHORT_KEY_VAR).err(),
            Some(ConfigError::InvalidVar(SHORT_KEY_VAR))
        );

        std::env::set_var(SHORT_KEY_VAR, b64.encode([1u8; 40]));
        assert_eq!(
            b64_key::<HASHING_KEY_SIZE>(SHORT_KEY_VAR).unwrap(),
            [1u8; HASHING_KEY_SIZE]
        );
    }
}
