//! Domain events
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    CategoryCreated { category_id: Uuid, name: String },
    FamilyCreated { family_id: Uuid, category_id: Uuid, reference: String, name: String },
    SubfamilyCreated { subfamily_id: Uuid, family_id: Uuid, reference: String, name: String },
    ImportCompleted { total_rows: usize, created_families: usize, created_subfamilies: usize, failed_rows: usize },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::CategoryCreated { .. } => "catalog.category.created",
            Self::FamilyCreated { .. } => "catalog.family.created",
            Self::SubfamilyCreated { .. } => "catalog.subfamily.created",
            Self::ImportCompleted { .. } => "catalog.import.completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_is_tagged() {
        let event = DomainEvent::ImportCompleted { total_rows: 3, created_families: 1, created_subfamilies: 2, failed_rows: 1 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "import_completed");
        assert_eq!(json["created_subfamilies"], 2);
        assert_eq!(event.subject(), "catalog.import.completed");
    }
}
