//! Hierarchy persistence.
//!
//! Family and subfamily creation is create-or-reuse on the natural key
//! (parent id, reference): inserting a key that already exists hands back the
//! stored record with `created == false` instead of failing. Two imports racing
//! on the same key therefore both succeed and agree on one record.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::aggregates::{Category, Family, NewCategory, NewFamily, NewSubfamily, Subfamily, Upserted};
use crate::domain::value_objects::Reference;
use crate::Result;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait HierarchyStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>>;
    /// Fails with `DuplicateCategory` when the slug is taken.
    async fn create_category(&self, new: NewCategory) -> Result<Category>;

    async fn list_families(&self, category_id: Option<Uuid>) -> Result<Vec<Family>>;
    async fn get_family(&self, id: Uuid) -> Result<Option<Family>>;
    async fn find_family(&self, category_id: Uuid, reference: &Reference) -> Result<Option<Family>>;
    async fn upsert_family(&self, new: NewFamily) -> Result<Upserted<Family>>;

    async fn list_subfamilies(&self, family_id: Option<Uuid>) -> Result<Vec<Subfamily>>;
    async fn find_subfamily(&self, family_id: Uuid, reference: &Reference) -> Result<Option<Subfamily>>;
    async fn upsert_subfamily(&self, new: NewSubfamily) -> Result<Upserted<Subfamily>>;
}
