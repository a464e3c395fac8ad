use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub kafka: Option<KafkaConfig>,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_seat_hold_seconds")]
    pub seat_hold_seconds: u64,
}

/// Longest hold a seat may carry: one day
pub const MAX_SEAT_HOLD_SECONDS: u64 = 86_400;

impl BusinessRules {
    pub fn is_valid_hold(seconds: u64) -> bool {
        (1..=MAX_SEAT_HOLD_SECONDS).contains(&seconds)
    }

    pub fn hold_duration(&self) -> chrono::Duration {
        let seconds = self.seat_hold_seconds.clamp(1, MAX_SEAT_HOLD_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if Self::is_valid_hold(self.seat_hold_seconds) {
            Ok(())
        } else {
            Err(config::ConfigError::Message(format!(
                "business_rules.seat_hold_seconds must be between 1 and {}, got {}",
                MAX_SEAT_HOLD_SECONDS, self.seat_hold_seconds
            )))
        }
    }
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self { seat_hold_seconds: default_seat_hold_seconds() }
    }
}

fn default_seat_hold_seconds() -> u64 { 300 }

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(env_source())
            .build()?;

        Self::from_settings(s)
    }

    fn from_settings(settings: config::Config) -> Result<Self, config::ConfigError> {
        let cfg: Self = settings.try_deserialize()?;
        cfg.business_rules.validate()?;
        Ok(cfg)
    }
}

/// Nested keys are joined with `__`, including after the prefix:
/// `CINEMA__BUSINESS_RULES__SEAT_HOLD_SECONDS=120`
fn env_source() -> config::Environment {
    config::Environment::with_prefix("CINEMA").separator("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_duration_defaults_to_five_minutes() {
        let rules = BusinessRules::default();
        assert_eq!(rules.hold_duration(), chrono::Duration::minutes(5));
    }

    #[test]
    fn test_missing_optional_sections() {
        let cfg: Config = config::Config::builder()
            .set_override("server.port", 8080)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.database.is_none());
        assert!(cfg.kafka.is_none());
        assert_eq!(cfg.business_rules.seat_hold_seconds, 300);
    }

    fn env_settings(vars: &[(&str, &str)]) -> config::Config {
        let map: config::Map<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        config::Config::builder()
            .set_default("server.port", 3000)
            .unwrap()
            .add_source(env_source().source(Some(map)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_hold_override_from_environment() {
        let cfg = Config::from_settings(env_settings(&[
            ("CINEMA__BUSINESS_RULES__SEAT_HOLD_SECONDS", "120"),
            ("CINEMA__SERVER__PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.business_rules.hold_duration(), chrono::Duration::minutes(2));
    }

    #[test]
    fn test_out_of_range_hold_is_rejected() {
        for seconds in ["0", "18446744073709551615"] {
            let result = Config::from_settings(env_settings(&[(
                "CINEMA__BUSINESS_RULES__SEAT_HOLD_SECONDS",
                seconds,
            )]));
            assert!(result.is_err(), "accepted seat_hold_seconds={}", seconds);
        }
    }

    #[test]
    fn test_hold_duration_is_clamped() {
        let rules = BusinessRules { seat_hold_seconds: u64::MAX };
        assert_eq!(rules.hold_duration(), chrono::Duration::seconds(MAX_SEAT_HOLD_SECONDS as i64));
    }
}
