use async_trait::async_trait;
use cinema_core::{BookingConfirmation, BookingNotifier};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{info, error};

pub const BOOKING_CONFIRMED_TOPIC: &str = "booking.confirmed";

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    pub async fn publish(&self, topic: &str, key: &str, payload: &str) -> Result<(), rdkafka::error::KafkaError> {
        let record = FutureRecord::to(topic)
            .key(key)
            .payload(payload);

        match self.producer.send(record, Timeout::After(Duration::from_secs(0))).await {
            Ok(delivery) => {
                info!("Published {} for {}: partition {} offset {}", topic, key, delivery.partition, delivery.offset);
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to publish to {}: {}", topic, e);
                Err(e)
            }
        }
    }
}

/// Hands confirmations to the downstream mailer over Kafka, keyed by showtime
pub struct KafkaNotifier {
    producer: EventProducer,
}

impl KafkaNotifier {
    pub fn new(producer: EventProducer) -> Self {
        Self { producer }
    }
}

#[async_trait]
impl BookingNotifier for KafkaNotifier {
    async fn booking_confirmed(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let payload = serde_json::to_string(confirmation)?;
        self.producer
            .publish(BOOKING_CONFIRMED_TOPIC, &confirmation.showtime_id.to_string(), &payload)
            .await?;
        Ok(())
    }
}
