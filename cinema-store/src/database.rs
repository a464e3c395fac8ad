use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::{info, warn};
use crate::app_config::BusinessRules;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Applying seat ledger schema");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Overlay rules stored in the `business_rules` table on top of the file
    /// configuration. Rows are shaped `{"value": <number>}`.
    pub async fn fetch_business_rules(&self, defaults: BusinessRules) -> Result<BusinessRules, sqlx::Error> {
        let rows: Vec<(String, serde_json::Value)> =
            sqlx::query_as("SELECT rule_key, rule_value FROM business_rules")
                .fetch_all(&self.pool)
                .await?;

        let mut rules = defaults;
        for (key, value) in rows {
            match (key.as_str(), value.get("value").and_then(serde_json::Value::as_u64)) {
                ("seat_hold_seconds", Some(seconds)) if BusinessRules::is_valid_hold(seconds) => rules.seat_hold_seconds = seconds,
                ("seat_hold_seconds", _) => warn!("Ignoring malformed seat_hold_seconds rule: {}", value),
                _ => {}
            }
        }
        Ok(rules)
    }
}
