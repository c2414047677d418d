use std::{env::var, str::FromStr};

use crate::{
    errors::SystemError,
    rota::{
        generator::{GeneratorConfig, DEFAULT_MAX_DAYS, DEFAULT_NIGHT_CREW_SIZE},
        records::{ShiftTimes, ShiftWindow},
    },
};

const DEFAULT_RECORD_NOTE: &str = "Auto-generated rota";
const DEFAULT_UPLOAD_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub generator: GeneratorConfig,
    pub schedulable_roles: Vec<String>,
    pub record_note: String,
    pub shift_times: ShiftTimes,
    pub upload_limit: usize,
}

impl AppConfig {
    /// 從環境變數讀取設定，`.env` 需在呼叫前由 dotenvy 載入
    pub fn from_env() -> Result<Self, SystemError> {
        Self::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SystemError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.is_empty())
            .ok_or_else(|| SystemError::EnvVarMissing("DATABASE_URL".to_string()))?;

        let defaults = ShiftTimes::default();
        let shift_times = ShiftTimes {
            morning: window(&lookup, "ROTA_MORNING", defaults.morning)?,
            afternoon: window(&lookup, "ROTA_AFTERNOON", defaults.afternoon)?,
            night: window(&lookup, "ROTA_NIGHT", defaults.night)?,
        };

        Ok(Self {
            database_url,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "APP_PORT", 3000)?,
            cors_origins: list(&lookup, "CORS_ORIGINS", "http://localhost:5173"),
            generator: GeneratorConfig {
                night_crew_size: parsed(&lookup, "ROTA_NIGHT_CREW_SIZE", DEFAULT_NIGHT_CREW_SIZE)?,
                max_days: parsed(&lookup, "ROTA_MAX_DAYS", DEFAULT_MAX_DAYS)?,
            },
            schedulable_roles: list(&lookup, "ROTA_SCHEDULABLE_ROLES", "staff"),
            record_note: lookup("ROTA_RECORD_NOTE")
                .unwrap_or_else(|| DEFAULT_RECORD_NOTE.to_string()),
            shift_times,
            upload_limit: parsed(&lookup, "UPLOAD_LIMIT_BYTES", DEFAULT_UPLOAD_LIMIT)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, SystemError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| SystemError::InvalidEnvVar(key.to_string(), value)),
        None => Ok(default),
    }
}

fn list<F>(lookup: &F, key: &str, default: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn window<F>(lookup: &F, key: &str, default: ShiftWindow) -> Result<ShiftWindow, SystemError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => ShiftWindow::parse(&value)
            .ok_or_else(|| SystemError::InvalidEnvVar(key.to_string(), value)),
        None => Ok(default),
    }
}
