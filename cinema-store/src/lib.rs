pub mod app_config;
pub mod database;
pub mod memory;
pub mod seat_repo;
#[cfg(feature = "kafka")]
pub mod events;

pub use database::DbClient;
pub use memory::MemorySeatStore;
pub use seat_repo::PgSeatRepository;
#[cfg(feature = "kafka")]
pub use events::{EventProducer, KafkaNotifier};
