use std::num::{IntErrorKind, NonZeroU16, NonZeroU32, NonZeroU64, ParseIntError};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// 延滞検出の既定周期（1日）
const DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be an integer within range, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must not be zero")]
    Zero { name: &'static str },
}

/// アプリケーション設定
///
/// 環境変数から読み込む。`DATABASE_URL`がない場合はインメモリのストアで起動する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub port: u16,
    pub database_max_connections: u32,
    pub overdue_sweep_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let port = parse_non_zero::<NonZeroU16, _>("PORT", &lookup)?
            .map_or(DEFAULT_PORT, NonZeroU16::get);
        let database_max_connections =
            parse_non_zero::<NonZeroU32, _>("DATABASE_MAX_CONNECTIONS", &lookup)?
                .map_or(DEFAULT_MAX_CONNECTIONS, NonZeroU32::get);
        let sweep_secs = parse_non_zero::<NonZeroU64, _>("OVERDUE_SWEEP_INTERVAL_SECS", &lookup)?
            .map_or(DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS, NonZeroU64::get);

        Ok(Self {
            database_url,
            port,
            database_max_connections,
            overdue_sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}

/// 0を許さない整数の環境変数を読む。未設定なら`None`
fn parse_non_zero<T, F>(name: &'static str, lookup: &F) -> Result<Option<T>, ConfigError>
where
    T: FromStr<Err = ParseIntError>,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };

    match raw.trim().parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(err) if *err.kind() == IntErrorKind::Zero => Err(ConfigError::Zero { name }),
        Err(_) => Err(ConfigError::InvalidNumber { name, value: raw }),
    }
}
