use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse_or_default, server::ServerConfig};
use domain_tasks::DEFAULT_CACHE_TTL;
use std::time::Duration;

use database::postgres::PostgresConfig;
use database::redis::RedisConfig;

pub use core_config::Environment;

/// Upper bound for `TASK_CACHE_TTL_SECS` (30 days)
const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Lifetime of task cache entries (`TASK_CACHE_TTL_SECS`)
    pub cache_ttl: Duration,
    /// Apply pending migrations on startup (`RUN_MIGRATIONS`)
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - will fail if not set
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let redis = RedisConfig::from_env()?; // Required - will fail if not set
        let (cache_ttl, run_migrations) = task_settings()?;

        Ok(Self {
            app: app_info!(),
            database,
            redis,
            server,
            environment,
            cache_ttl,
            run_migrations,
        })
    }
}

fn task_settings() -> Result<(Duration, bool), ConfigError> {
    let ttl_secs: u64 =
        env_parse_or_default("TASK_CACHE_TTL_SECS", DEFAULT_CACHE_TTL.as_secs())?;
    if !(1..=MAX_CACHE_TTL_SECS).contains(&ttl_secs) {
        return Err(ConfigError::ParseError {
            key: "TASK_CACHE_TTL_SECS".to_string(),
            details: format!("must be between 1 and {MAX_CACHE_TTL_SECS}"),
        });
    }
    let run_migrations = env_parse_or_default("RUN_MIGRATIONS", true)?;
    Ok((Duration::from_secs(ttl_secs), run_migrations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_settings_defaults() {
        temp_env::with_vars(
            [
                ("TASK_CACHE_TTL_SECS", None::<&str>),
                ("RUN_MIGRATIONS", None),
            ],
            || {
                let (ttl, run_migrations) = task_settings().unwrap();
                assert_eq!(ttl, DEFAULT_CACHE_TTL);
                assert!(run_migrations);
            },
        );
    }

    #[test]
    fn test_task_settings_overrides() {
        temp_env::with_vars(
            [
                ("TASK_CACHE_TTL_SECS", Some("60")),
                ("RUN_MIGRATIONS", Some("false")),
            ],
            || {
                let (ttl, run_migrations) = task_settings().unwrap();
                assert_eq!(ttl, Duration::from_secs(60));
                assert!(!run_migrations);
            },
        );
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        temp_env::with_var("TASK_CACHE_TTL_SECS", Some("0"), || {
            assert!(task_settings().is_err());
        });
    }

    #[test]
    fn test_ttl_above_limit_is_rejected() {
        temp_env::with_var("TASK_CACHE_TTL_SECS", Some("2592001"), || {
            let err = task_settings().unwrap_err();
            assert!(err.to_string().contains("TASK_CACHE_TTL_SECS"));
        });
        temp_env::with_var("TASK_CACHE_TTL_SECS", Some("2592000"), || {
            assert_eq!(task_settings().unwrap().0, Duration::from_secs(2_592_000));
        });
    }

    #[test]
    fn test_config_requires_database_url() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", None::<&str>),
                ("REDIS_URL", Some("redis://127.0.0.1:6379")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
