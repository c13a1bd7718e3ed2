//! Postgres-backed hierarchy store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::HierarchyStore;
use crate::domain::aggregates::{Category, Family, NewCategory, NewFamily, NewSubfamily, Subfamily, Upserted};
use crate::domain::value_objects::Reference;
use crate::{CatalogError, Result};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self { Self { db } }
    pub fn pool(&self) -> &PgPool { &self.db }
}

#[async_trait]
impl HierarchyStore for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY sort_order, name")
            .fetch_all(&self.db).await?;
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1").bind(id).fetch_optional(&self.db).await?)
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, slug, description, is_active, sort_order, created_at) \
             VALUES ($1, $2, $3, $4, TRUE, COALESCE((SELECT MAX(sort_order) + 1 FROM categories), 0), NOW()) \
             ON CONFLICT (slug) DO NOTHING RETURNING *")
            .bind(Uuid::now_v7()).bind(&new.name).bind(new.slug.as_str()).bind(&new.description)
            .fetch_optional(&self.db).await?
            .ok_or(CatalogError::DuplicateCategory)
    }

    async fn list_families(&self, category_id: Option<Uuid>) -> Result<Vec<Family>> {
        let families = sqlx::query_as::<_, Family>(
            "SELECT * FROM families WHERE ($1::uuid IS NULL OR category_id = $1) ORDER BY name")
            .bind(category_id).fetch_all(&self.db).await?;
        Ok(families)
    }

    async fn get_family(&self, id: Uuid) -> Result<Option<Family>> {
        Ok(sqlx::query_as::<_, Family>("SELECT * FROM families WHERE id = $1").bind(id).fetch_optional(&self.db).await?)
    }

    async fn find_family(&self, category_id: Uuid, reference: &Reference) -> Result<Option<Family>> {
        Ok(sqlx::query_as::<_, Family>("SELECT * FROM families WHERE category_id = $1 AND reference = $2")
            .bind(category_id).bind(reference.as_str()).fetch_optional(&self.db).await?)
    }

    async fn upsert_family(&self, new: NewFamily) -> Result<Upserted<Family>> {
        let inserted = sqlx::query_as::<_, Family>(
            "INSERT INTO families (id, reference, name, slug, description, is_active, sort_order, category_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, TRUE, COALESCE((SELECT MAX(sort_order) + 1 FROM families WHERE category_id = $6), 0), $6, NOW()) \
             ON CONFLICT (category_id, reference) DO NOTHING RETURNING *")
            .bind(Uuid::now_v7()).bind(new.reference.as_str()).bind(&new.name).bind(new.slug.as_str())
            .bind(&new.description).bind(new.category_id)
            .fetch_optional(&self.db).await?;
        if let Some(family) = inserted { return Ok(Upserted::created(family)); }
        // Lost the race or re-import: the row is there, reuse it.
        self.find_family(new.category_id, &new.reference).await?
            .map(Upserted::existing)
            .ok_or_else(|| CatalogError::StorageError(format!("family {} vanished after conflict", new.reference)))
    }

    async fn list_subfamilies(&self, family_id: Option<Uuid>) -> Result<Vec<Subfamily>> {
        let subfamilies = sqlx::query_as::<_, Subfamily>(
            "SELECT * FROM subfamilies WHERE ($1::uuid IS NULL OR family_id = $1) ORDER BY name")
            .bind(family_id).fetch_all(&self.db).await?;
        Ok(subfamilies)
    }

    async fn find_subfamily(&self, family_id: Uuid, reference: &Reference) -> Result<Option<Subfamily>> {
        Ok(sqlx::query_as::<_, Subfamily>("SELECT * FROM subfamilies WHERE family_id = $1 AND reference = $2")
            .bind(family_id).bind(reference.as_str()).fetch_optional(&self.db).await?)
    }

    async fn upsert_subfamily(&self, new: NewSubfamily) -> Result<Upserted<Subfamily>> {
        let inserted = sqlx::query_as::<_, Subfamily>(
            "INSERT INTO subfamilies (id, reference, name, slug, description, is_active, sort_order, family_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, TRUE, COALESCE((SELECT MAX(sort_order) + 1 FROM subfamilies WHERE family_id = $6), 0), $6, NOW()) \
             ON CONFLICT (family_id, reference) DO NOTHING RETURNING *")
            .bind(Uuid::now_v7()).bind(new.reference.as_str()).bind(&new.name).bind(new.slug.as_str())
            .bind(&new.description).bind(new.family_id)
            .fetch_optional(&self.db).await?;
        if let Some(subfamily) = inserted { return Ok(Upserted::created(subfamily)); }
        self.find_subfamily(new.family_id, &new.reference).await?
            .map(Upserted::existing)
            .ok_or_else(|| CatalogError::StorageError(format!("subfamily {} vanished after conflict", new.reference)))
    }
}
