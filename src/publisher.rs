//! Domain event publication over NATS.

use tracing::{debug, warn};

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    /// Publisher that drops every event.
    pub fn disabled() -> Self { Self::default() }

    /// Connects when a URL is configured. An unreachable server is logged and publishing disabled.
    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => Self { nats: Some(client) },
            Err(e) => {
                warn!(%url, error = %e, "NATS unavailable, events will not be published");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    pub async fn publish(&self, event: &DomainEvent) {
        let Some(client) = &self.nats else {
            debug!(subject = event.subject(), "event dropped, no NATS client");
            return;
        };
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => { warn!(subject = event.subject(), error = %e, "event serialization failed"); return; }
        };
        if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
            warn!(subject = event.subject(), error = %e, "event publication failed");
        }
    }

    pub async fn publish_all(&self, events: &[DomainEvent]) {
        for event in events { self.publish(event).await; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_publisher_drops_events() {
        let publisher = EventPublisher::connect(None).await;
        assert!(!publisher.is_enabled());
        publisher.publish(&DomainEvent::CategoryCreated { category_id: uuid::Uuid::nil(), name: "Soins Visage".into() }).await;
    }
}
