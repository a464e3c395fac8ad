use anyhow::Context;
use cinema_api::{app, AppState};
use cinema_core::{BookingNotifier, LogNotifier, SeatRepository, SystemClock};
use cinema_store::app_config::Config;
use cinema_store::{DbClient, MemorySeatStore, PgSeatRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinema_api=debug,cinema_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load config")?;
    let mut business_rules = config.business_rules.clone();

    let repo: Arc<dyn SeatRepository> = match &config.database {
        Some(database) => {
            let db = DbClient::new(&database.url).await.context("failed to connect to Postgres")?;
            db.migrate().await.context("failed to run migrations")?;
            business_rules = db
                .fetch_business_rules(business_rules)
                .await
                .context("failed to load business rules")?;
            Arc::new(PgSeatRepository::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database configured; seat ledger is in-memory only");
            Arc::new(MemorySeatStore::new())
        }
    };

    let notifier = build_notifier(&config)?;
    tracing::info!("Seat holds last {} seconds", business_rules.seat_hold_seconds);

    let state = AppState::new(repo, notifier, Arc::new(SystemClock), business_rules);
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.context("failed to bind")?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

#[cfg(feature = "kafka")]
fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn BookingNotifier>> {
    match &config.kafka {
        Some(kafka) => {
            let producer = cinema_store::EventProducer::new(&kafka.brokers)
                .context("failed to create Kafka producer")?;
            Ok(Arc::new(cinema_store::KafkaNotifier::new(producer)))
        }
        None => Ok(Arc::new(LogNotifier)),
    }
}

#[cfg(not(feature = "kafka"))]
fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn BookingNotifier>> {
    if config.kafka.is_some() {
        tracing::warn!("Kafka configured but the `kafka` feature is disabled; logging confirmations");
    }
    Ok(Arc::new(LogNotifier))
}
