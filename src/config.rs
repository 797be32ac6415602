use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// How calorie reports turn timestamps into calendar dates.
#[derive(Debug, Clone, Deserialize)]
pub struct CaloriesConfig {
    /// Fixed UTC offset applied to every timestamp before truncating to a date.
    pub utc_offset_hours: i8,
    /// Number of trailing local dates in the daily report.
    pub window_days: u16,
}

impl Default for CaloriesConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 7,
            window_days: 14,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub calories: CaloriesConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10)?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutritrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutritrack-users".into()),
            ttl_minutes: parse_or("JWT_TTL_MINUTES", 60)?,
            refresh_ttl_minutes: parse_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14)?,
        };

        let defaults = CaloriesConfig::default();
        let calories = CaloriesConfig {
            utc_offset_hours: parse_or("CALORIES_UTC_OFFSET_HOURS", defaults.utc_offset_hours)?,
            window_days: parse_or("CALORIES_WINDOW_DAYS", defaults.window_days)?,
        };
        calories.validate()?;

        Ok(Self {
            database_url,
            max_connections,
            jwt,
            calories,
        })
    }
}

impl CaloriesConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (-23..=23).contains(&self.utc_offset_hours),
            "CALORIES_UTC_OFFSET_HOURS must be within -23..=23, got {}",
            self.utc_offset_hours
        );
        anyhow::ensure!(self.window_days >= 1, "CALORIES_WINDOW_DAYS must be at least 1");
        Ok(())
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {v:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calories_config_is_valid() {
        let cfg = CaloriesConfig::default();
        assert_eq!(cfg.utc_offset_hours, 7);
        assert_eq!(cfg.window_days, 14);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_offset_and_empty_window() {
        let bad_offset = CaloriesConfig {
            utc_offset_hours: 24,
            window_days: 14,
        };
        assert!(bad_offset.validate().is_err());

        let bad_window = CaloriesConfig {
            utc_offset_hours: 0,
            window_days: 0,
        };
        assert!(bad_window.validate().is_err());
    }
}
