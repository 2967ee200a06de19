use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 10;
const DEFAULT_FLASH_INTERVAL_MS: u64 = 500;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite { database_url: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub reminder_interval: Duration,
    pub flash_interval: Duration,
    pub store: StoreBackend,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(
            lookup("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let reminder_secs = parse_u64(&lookup, "REMINDER_INTERVAL_SECS", DEFAULT_REMINDER_INTERVAL_SECS)?;
        if reminder_secs == 0 {
            return Err(AppError::Config(
                "REMINDER_INTERVAL_SECS must be greater than 0".to_string(),
            ));
        }
        let flash_ms = parse_u64(&lookup, "FLASH_INTERVAL_MS", DEFAULT_FLASH_INTERVAL_MS)?;
        if flash_ms == 0 {
            return Err(AppError::Config(
                "FLASH_INTERVAL_MS must be greater than 0".to_string(),
            ));
        }

        let store = match lookup("STORE_BACKEND").as_deref() {
            None | Some("json") => StoreBackend::Json,
            Some("sqlite") => StoreBackend::Sqlite {
                database_url: lookup("DATABASE_URL").unwrap_or_else(|| {
                    format!("sqlite://{}", data_dir.join("jianji.db").display())
                }),
            },
            Some(other) => {
                return Err(AppError::Config(format!(
                    "STORE_BACKEND must be json or sqlite, got {}",
                    other
                )));
            }
        };

        Ok(Self {
            data_dir,
            bind_addr,
            reminder_interval: Duration::from_secs(reminder_secs),
            flash_interval: Duration::from_millis(flash_ms),
            store,
        })
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join("items.json")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a whole number, got {}", key, raw))),
    }
}
