//! Category → Family → Subfamily hierarchy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::value_objects::{Reference, Slug};

/// The storefront's top-level categories, in display order.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Vitamines & Compléments",
    "Capillaires",
    "Soins Visage",
    "Soins Corps",
    "Bébé & Maman",
    "Bio & Naturel",
    "Hygiène Intime",
    "Matériel Médical",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Second level of the hierarchy. `reference` is unique within `category_id` only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: Uuid,
    pub reference: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Third level of the hierarchy. `reference` is unique within `family_id` only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subfamily {
    pub id: Uuid,
    pub reference: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub family_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let name = name.into().trim().to_string();
        Self { slug: Slug::from_name(&name), name, description }
    }
}

/// Creation request for a family; the store assigns id, sort order and timestamps.
#[derive(Clone, Debug)]
pub struct NewFamily {
    pub category_id: Uuid,
    pub reference: Reference,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
}

impl NewFamily {
    pub fn new(category_id: Uuid, reference: Reference, name: impl Into<String>, description: Option<String>) -> Self {
        let name = name.into().trim().to_string();
        Self { category_id, reference, slug: Slug::from_name(&name), name, description }
    }
}

#[derive(Clone, Debug)]
pub struct NewSubfamily {
    pub family_id: Uuid,
    pub reference: Reference,
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
}

impl NewSubfamily {
    pub fn new(family_id: Uuid, reference: Reference, name: impl Into<String>, description: Option<String>) -> Self {
        let name = name.into().trim().to_string();
        Self { family_id, reference, slug: Slug::from_name(&name), name, description }
    }
}

/// Outcome of a create-or-reuse: the stored record and whether this call inserted it.
#[derive(Clone, Debug, PartialEq)]
pub struct Upserted<T> {
    pub record: T,
    pub created: bool,
}

impl<T> Upserted<T> {
    pub fn created(record: T) -> Self { Self { record, created: true } }
    pub fn existing(record: T) -> Self { Self { record, created: false } }
}

#[derive(Clone, Debug, Serialize)]
pub struct FamilyCounts { pub subfamilies: usize }

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyNode {
    #[serde(flatten)]
    pub family: Family,
    pub subfamilies: Vec<Subfamily>,
    #[serde(rename = "_count")]
    pub count: FamilyCounts,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryCounts { pub families: usize }

/// Category with its active families and their active subfamilies, in display order.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub families: Option<Vec<FamilyNode>>,
    #[serde(rename = "_count")]
    pub count: CategoryCounts,
}

impl CategoryTree {
    /// Assembles the tree from flat listings. Inactive records and orphans are dropped.
    pub fn build(categories: Vec<Category>, families: &[Family], subfamilies: &[Subfamily], include_families: bool) -> Vec<CategoryTree> {
        let mut categories: Vec<Category> = categories.into_iter().filter(|c| c.is_active).collect();
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));

        categories.into_iter().map(|category| {
            let mut owned: Vec<&Family> = families.iter().filter(|f| f.category_id == category.id && f.is_active).collect();
            owned.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.reference.cmp(&b.reference)));
            let count = CategoryCounts { families: owned.len() };
            let families = include_families.then(|| owned.into_iter().map(|family| {
                let mut subs: Vec<Subfamily> = subfamilies.iter()
                    .filter(|s| s.family_id == family.id && s.is_active)
                    .cloned()
                    .collect();
                subs.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.reference.cmp(&b.reference)));
                FamilyNode { count: FamilyCounts { subfamilies: subs.len() }, family: family.clone(), subfamilies: subs }
            }).collect());
            CategoryTree { category, families, count }
        }).collect()
    }
}
