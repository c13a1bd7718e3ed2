//! Hierarchy resolver: turns one validated row into category, family and subfamily records.
//!
//! Categories are loaded once per run and matched by exact trimmed name; they are
//! never created from a sheet. Families and subfamilies are resolved through a
//! per-run cache first, then through the store's create-or-reuse upsert.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use super::error::{RowError, RowFailure};
use super::parser::{Column, RowData};
use crate::domain::aggregates::{Category, Family, NewFamily, NewSubfamily, Subfamily};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::Reference;
use crate::store::HierarchyStore;

/// What a successful row resolved to.
#[derive(Debug, Clone)]
pub struct ResolvedRow {
    pub category: Category,
    pub family: Family,
    pub family_created: bool,
    pub subfamily: Option<Subfamily>,
    pub subfamily_created: bool,
}

/// Validated view of a row. Built before any lookup so that bad data never touches the store.
struct RowRequest<'a> {
    category: &'a str,
    family_reference: Reference,
    family_name: &'a str,
    subfamily: Option<(Reference, &'a str)>,
}

impl<'a> RowRequest<'a> {
    fn validate(data: &'a RowData) -> Result<Self, RowError> {
        let required = move |column: Column| {
            let value = data.get(column);
            if value.is_empty() { Err(RowError::MissingRequiredField(column)) } else { Ok(value) }
        };
        let reference = |column: Column, value: &str| {
            Reference::new(value).map_err(|e| RowError::InvalidReference { column, reason: e.to_string() })
        };

        let category = required(Column::Category)?;
        let family_reference = reference(Column::FamilyReference, required(Column::FamilyReference)?)?;
        let family_name = required(Column::FamilyName)?;

        // A subfamily name without a reference is ignored: the row is family-only.
        let subfamily = match data.get(Column::SubfamilyReference) {
            "" => None,
            raw => {
                let reference = reference(Column::SubfamilyReference, raw)?;
                Some((reference, required(Column::SubfamilyName)?))
            }
        };

        Ok(Self { category, family_reference, family_name, subfamily })
    }
}

pub struct HierarchyResolver<'s> {
    store: &'s dyn HierarchyStore,
    categories: HashMap<String, Category>,
    families: HashMap<(Uuid, Reference), Family>,
    subfamilies: HashMap<(Uuid, Reference), Subfamily>,
    events: Vec<DomainEvent>,
}

impl<'s> HierarchyResolver<'s> {
    /// Preloads every category from the store, active or not.
    pub async fn load(store: &'s dyn HierarchyStore) -> crate::Result<Self> {
        let categories = store.list_categories().await?;
        Ok(Self::with_categories(store, categories))
    }

    pub fn with_categories(store: &'s dyn HierarchyStore, categories: Vec<Category>) -> Self {
        let mut by_name = HashMap::new();
        for category in categories {
            by_name.entry(category.name.trim().to_string()).or_insert(category);
        }
        Self {
            store,
            categories: by_name,
            families: HashMap::new(),
            subfamilies: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn category_count(&self) -> usize { self.categories.len() }

    pub async fn resolve(&mut self, data: &RowData) -> Result<ResolvedRow, RowFailure> {
        let request = RowRequest::validate(data)?;

        let category = self.categories.get(request.category)
            .cloned()
            .ok_or_else(|| RowError::CategoryNotFound(request.category.to_string()))?;

        let (family, family_created) = self.family(&category, &request).await?;

        let (subfamily, subfamily_created) = match request.subfamily {
            Some((reference, name)) => match self.subfamily(&family, reference, name).await {
                Ok((subfamily, created)) => (Some(subfamily), created),
                Err(error) => return Err(RowFailure { error, created_family: family_created.then_some(family) }),
            },
            None => (None, false),
        };

        Ok(ResolvedRow { category, family, family_created, subfamily, subfamily_created })
    }

    /// Creation events recorded so far, drained.
    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    async fn family(&mut self, category: &Category, request: &RowRequest<'_>) -> Result<(Family, bool), RowError> {
        let key = (category.id, request.family_reference.clone());
        if let Some(family) = self.families.get(&key) {
            return Ok((family.clone(), false));
        }

        let new = NewFamily::new(category.id, request.family_reference.clone(), request.family_name, None);
        let upserted = self.store.upsert_family(new).await.map_err(|e| RowError::Creation(e.to_string()))?;
        let family = upserted.record;

        if upserted.created {
            debug!(reference = %family.reference, category = %category.name, "family created");
            self.events.push(DomainEvent::FamilyCreated {
                family_id: family.id,
                category_id: category.id,
                reference: family.reference.clone(),
                name: family.name.clone(),
            });
        } else if family.name != request.family_name {
            debug!(reference = %family.reference, kept = %family.name, ignored = %request.family_name, "family exists, name left unchanged");
        }

        self.families.insert(key, family.clone());
        Ok((family, upserted.created))
    }

    async fn subfamily(&mut self, family: &Family, reference: Reference, name: &str) -> Result<(Subfamily, bool), RowError> {
        let key = (family.id, reference);
        if let Some(subfamily) = self.subfamilies.get(&key) {
            return Ok((subfamily.clone(), false));
        }

        let new = NewSubfamily::new(family.id, key.1.clone(), name, None);
        let upserted = self.store.upsert_subfamily(new).await.map_err(|e| RowError::Creation(e.to_string()))?;
        let subfamily = upserted.record;

        if upserted.created {
            debug!(reference = %subfamily.reference, family = %family.reference, "subfamily created");
            self.events.push(DomainEvent::SubfamilyCreated {
                subfamily_id: subfamily.id,
                family_id: family.id,
                reference: subfamily.reference.clone(),
                name: subfamily.name.clone(),
            });
        } else if subfamily.name != name {
            debug!(reference = %subfamily.reference, kept = %subfamily.name, ignored = %name, "subfamily exists, name left unchanged");
        }

        self.subfamilies.insert(key, subfamily.clone());
        Ok((subfamily, upserted.created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_validation_happens_before_lookup() {
        let store = MemoryStore::seeded();
        let mut resolver = HierarchyResolver::load(&store).await.unwrap();

        // Unknown category but missing family name: the missing field wins.
        let err = resolver.resolve(&RowData::new("Inconnue", "1", "", "", "")).await.unwrap_err().error;
        assert_eq!(err, RowError::MissingRequiredField(Column::FamilyName));

        let err = resolver.resolve(&RowData::new("Soins Visage", "1", "Crèmes", "20", "")).await.unwrap_err().error;
        assert_eq!(err, RowError::MissingRequiredField(Column::SubfamilyName));

        let long = "9".repeat(51);
        let err = resolver.resolve(&RowData::new("Soins Visage", &long, "Crèmes", "", "")).await.unwrap_err().error;
        assert_eq!(err.code(), "InvalidReference");
        assert_eq!(store.family_count(), 0);
    }

    #[tokio::test]
    async fn test_category_match_is_exact() {
        let store = MemoryStore::seeded();
        let mut resolver = HierarchyResolver::load(&store).await.unwrap();
        assert_eq!(resolver.category_count(), 8);

        let err = resolver.resolve(&RowData::new("soins visage", "1", "Crèmes", "", "")).await.unwrap_err().error;
        assert_eq!(err, RowError::CategoryNotFound("soins visage".into()));
    }

    #[tokio::test]
    async fn test_cache_reuses_family_and_records_events_once() {
        let store = MemoryStore::seeded();
        let mut resolver = HierarchyResolver::load(&store).await.unwrap();

        let first = resolver.resolve(&RowData::new("Capillaires", "00004", "Shampoings", "10004", "Antipelliculaire")).await.unwrap();
        let second = resolver.resolve(&RowData::new("Capillaires", "00004", "Autre nom", "10005", "Cheveux Gras")).await.unwrap();

        assert!(first.family_created && first.subfamily_created);
        assert!(!second.family_created && second.subfamily_created);
        assert_eq!(first.family.id, second.family.id);
        assert_eq!(second.family.name, "Shampoings");
        assert_eq!(resolver.take_events().len(), 3);
        assert!(resolver.take_events().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_becomes_creation_error() {
        let store = MemoryStore::seeded();
        store.fail_creations_for("00009");
        let mut resolver = HierarchyResolver::load(&store).await.unwrap();

        let failure = resolver.resolve(&RowData::new("Bébé & Maman", "00009", "Laits", "", "")).await.unwrap_err();
        assert_eq!(failure.error.code(), "CreationError");
        assert!(failure.created_family.is_none());
    }

    #[tokio::test]
    async fn test_subfamily_failure_keeps_created_family() {
        let store = MemoryStore::seeded();
        store.fail_creations_for("S9");
        let mut resolver = HierarchyResolver::load(&store).await.unwrap();

        let failure = resolver.resolve(&RowData::new("Soins Visage", "F1", "Famille Un", "S9", "Sous")).await.unwrap_err();
        assert_eq!(failure.error.code(), "CreationError");
        assert_eq!(failure.created_family.map(|f| f.reference), Some("F1".to_string()));

        // Same family again: reused from the cache, not reported as created a second time.
        let failure = resolver.resolve(&RowData::new("Soins Visage", "F1", "Famille Un", "S9", "Sous")).await.unwrap_err();
        assert!(failure.created_family.is_none());
        assert_eq!(store.family_count(), 1);
    }

    #[tokio::test]
    async fn test_existing_subfamily_keeps_first_name() {
        let store = MemoryStore::seeded();
        let mut resolver = HierarchyResolver::load(&store).await.unwrap();

        resolver.resolve(&RowData::new("Capillaires", "00004", "Shampoings", "10004", "Antipelliculaire")).await.unwrap();
        let mut rerun = HierarchyResolver::load(&store).await.unwrap();
        let again = rerun.resolve(&RowData::new("Capillaires", "00004", "Shampoings", "10004", "Autre nom")).await.unwrap();

        assert!(!again.subfamily_created);
        assert_eq!(again.subfamily.map(|s| s.name), Some("Antipelliculaire".to_string()));
    }
}
