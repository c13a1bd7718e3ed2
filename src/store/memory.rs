//! In-memory hierarchy store with the same create-or-reuse semantics as Postgres.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::HierarchyStore;
use crate::domain::aggregates::{Category, Family, NewCategory, NewFamily, NewSubfamily, Subfamily, Upserted, DEFAULT_CATEGORIES};
use crate::domain::value_objects::{Reference, Slug};
use crate::{CatalogError, Result};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    families: Vec<Family>,
    subfamilies: Vec<Subfamily>,
    failing_references: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Store holding the eight storefront categories.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut tables = store.lock();
            for (idx, name) in DEFAULT_CATEGORIES.iter().enumerate() {
                tables.categories.push(Category {
                    id: Uuid::now_v7(),
                    name: name.to_string(),
                    slug: Slug::from_name(name).to_string(),
                    description: None,
                    is_active: true,
                    sort_order: idx as i32 + 1,
                    created_at: Utc::now(),
                });
            }
        }
        store
    }

    /// Makes every later family/subfamily insert with this reference fail with a storage error.
    pub fn fail_creations_for(&self, reference: &str) {
        self.lock().failing_references.insert(reference.to_string());
    }

    pub fn family_count(&self) -> usize { self.lock().families.len() }
    pub fn subfamily_count(&self) -> usize { self.lock().subfamilies.len() }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl HierarchyStore for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by_key(|c| c.sort_order);
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category> {
        let mut tables = self.lock();
        if tables.categories.iter().any(|c| c.slug == new.slug.as_str()) {
            return Err(CatalogError::DuplicateCategory);
        }
        let sort_order = tables.categories.iter().map(|c| c.sort_order + 1).max().unwrap_or(0);
        let category = Category {
            id: Uuid::now_v7(),
            name: new.name,
            slug: new.slug.to_string(),
            description: new.description,
            is_active: true,
            sort_order,
            created_at: Utc::now(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_families(&self, category_id: Option<Uuid>) -> Result<Vec<Family>> {
        let mut families: Vec<Family> = self.lock().families.iter()
            .filter(|f| category_id.map_or(true, |id| f.category_id == id))
            .cloned()
            .collect();
        families.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(families)
    }

    async fn get_family(&self, id: Uuid) -> Result<Option<Family>> {
        Ok(self.lock().families.iter().find(|f| f.id == id).cloned())
    }

    async fn find_family(&self, category_id: Uuid, reference: &Reference) -> Result<Option<Family>> {
        Ok(self.lock().families.iter()
            .find(|f| f.category_id == category_id && f.reference == reference.as_str())
            .cloned())
    }

    async fn upsert_family(&self, new: NewFamily) -> Result<Upserted<Family>> {
        let mut tables = self.lock();
        if tables.failing_references.contains(new.reference.as_str()) {
            return Err(CatalogError::StorageError(format!("insert family {} rejected", new.reference)));
        }
        if let Some(existing) = tables.families.iter().find(|f| f.category_id == new.category_id && f.reference == new.reference.as_str()) {
            return Ok(Upserted::existing(existing.clone()));
        }
        let sort_order = tables.families.iter()
            .filter(|f| f.category_id == new.category_id)
            .map(|f| f.sort_order + 1)
            .max()
            .unwrap_or(0);
        let family = Family {
            id: Uuid::now_v7(),
            reference: new.reference.to_string(),
            name: new.name,
            slug: new.slug.to_string(),
            description: new.description,
            is_active: true,
            sort_order,
            category_id: new.category_id,
            created_at: Utc::now(),
        };
        tables.families.push(family.clone());
        Ok(Upserted::created(family))
    }

    async fn list_subfamilies(&self, family_id: Option<Uuid>) -> Result<Vec<Subfamily>> {
        let mut subfamilies: Vec<Subfamily> = self.lock().subfamilies.iter()
            .filter(|s| family_id.map_or(true, |id| s.family_id == id))
            .cloned()
            .collect();
        subfamilies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subfamilies)
    }

    async fn find_subfamily(&self, family_id: Uuid, reference: &Reference) -> Result<Option<Subfamily>> {
        Ok(self.lock().subfamilies.iter()
            .find(|s| s.family_id == family_id && s.reference == reference.as_str())
            .cloned())
    }

    async fn upsert_subfamily(&self, new: NewSubfamily) -> Result<Upserted<Subfamily>> {
        let mut tables = self.lock();
        if tables.failing_references.contains(new.reference.as_str()) {
            return Err(CatalogError::StorageError(format!("insert subfamily {} rejected", new.reference)));
        }
        if !tables.families.iter().any(|f| f.id == new.family_id) {
            return Err(CatalogError::NotFound("Famille"));
        }
        if let Some(existing) = tables.subfamilies.iter().find(|s| s.family_id == new.family_id && s.reference == new.reference.as_str()) {
            return Ok(Upserted::existing(existing.clone()));
        }
        let sort_order = tables.subfamilies.iter()
            .filter(|s| s.family_id == new.family_id)
            .map(|s| s.sort_order + 1)
            .max()
            .unwrap_or(0);
        let subfamily = Subfamily {
            id: Uuid::now_v7(),
            reference: new.reference.to_string(),
            name: new.name,
            slug: new.slug.to_string(),
            description: new.description,
            is_active: true,
            sort_order,
            family_id: new.family_id,
            created_at: Utc::now(),
        };
        tables.subfamilies.push(subfamily.clone());
        Ok(Upserted::created(subfamily))
    }
}
