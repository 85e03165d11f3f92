use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::NaiveTime;
use dotenvy::dotenv;

use crate::analytics::ZeroSessionPolicy;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_assign_per_min: u32,
    pub rate_report_per_min: u32,
    pub rate_protected_per_min: u32,

    /// Used when a defaulter request does not name a threshold.
    pub defaulter_threshold: u8,
    /// Slots starting before this are morning slots.
    pub half_day_boundary: NaiveTime,
    pub zero_session_policy: ZeroSessionPolicy,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

fn parsed<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaulter_threshold: u8 = parsed("DEFAULTER_THRESHOLD", "75")?;
        if defaulter_threshold > 100 {
            bail!("DEFAULTER_THRESHOLD must be between 0 and 100, got {}", defaulter_threshold);
        }

        let boundary = env::var("HALF_DAY_BOUNDARY").unwrap_or_else(|_| "12:30".to_string());
        let half_day_boundary = NaiveTime::parse_from_str(&boundary, "%H:%M")
            .with_context(|| format!("HALF_DAY_BOUNDARY must be HH:MM, got {:?}", boundary))?;

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_assign_per_min: parsed("RATE_ASSIGN_PER_MIN", "30")?,
            rate_report_per_min: parsed("RATE_REPORT_PER_MIN", "60")?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", "1000")?,

            defaulter_threshold,
            half_day_boundary,
            zero_session_policy: parsed("ZERO_SESSION_POLICY", "flag")?,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults without touching the environment.
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            rate_assign_per_min: 30,
            rate_report_per_min: 60,
            rate_protected_per_min: 1000,
            defaulter_threshold: 75,
            half_day_boundary: NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
            zero_session_policy: ZeroSessionPolicy::Flag,
        }
    }
}
