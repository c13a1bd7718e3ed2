//! Category, family and subfamily endpoints

use axum::{extract::{Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ApiError, ApiResult, AppState};
use crate::domain::aggregates::{Category, CategoryTree, Family, NewCategory, NewFamily, NewSubfamily, Subfamily};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::Reference;
use crate::CatalogError;

#[derive(Debug, Deserialize)] pub struct CategoryParams { pub include: Option<String> }

pub async fn list_categories(State(s): State<AppState>, Query(p): Query<CategoryParams>) -> ApiResult<Json<Vec<CategoryTree>>> {
    let categories = s.store.list_categories().await?;
    let families = s.store.list_families(None).await?;
    let include = p.include.as_deref() == Some("families");
    let subfamilies = if include { s.store.list_subfamilies(None).await? } else { Vec::new() };
    Ok(Json(CategoryTree::build(categories, &families, &subfamilies, include)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 2, message = "Le nom doit contenir au moins 2 caractères"))]
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_category(State(s): State<AppState>, Json(r): Json<CreateCategoryRequest>) -> ApiResult<(StatusCode, Json<Category>)> {
    r.validate()?;
    let category = s.store.create_category(NewCategory::new(r.name, r.description)).await?;
    s.publisher.publish(&DomainEvent::CategoryCreated { category_id: category.id, name: category.name.clone() }).await;
    Ok((StatusCode::CREATED, Json(category)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyParams { pub category_id: Option<Uuid> }

pub async fn list_families(State(s): State<AppState>, Query(p): Query<FamilyParams>) -> ApiResult<Json<Vec<Family>>> {
    Ok(Json(s.store.list_families(p.category_id).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFamilyRequest {
    #[validate(length(min = 1, message = "La référence est requise"))]
    pub reference: String,
    #[validate(length(min = 2, message = "Le nom doit contenir au moins 2 caractères"))]
    pub name: String,
    pub category_id: Uuid,
    pub description: Option<String>,
}

pub async fn create_family(State(s): State<AppState>, Json(r): Json<CreateFamilyRequest>) -> ApiResult<(StatusCode, Json<Family>)> {
    r.validate()?;
    let reference = parse_reference(&r.reference)?;
    s.store.get_category(r.category_id).await?.ok_or(CatalogError::NotFound("Catégorie"))?;
    if s.store.find_family(r.category_id, &reference).await?.is_some() {
        return Err(CatalogError::DuplicateReference.into());
    }
    let upserted = s.store.upsert_family(NewFamily::new(r.category_id, reference, r.name, r.description)).await?;
    // Someone else inserted the same key between the check and the insert.
    if !upserted.created { return Err(CatalogError::DuplicateReference.into()); }
    let family = upserted.record;
    s.publisher.publish(&DomainEvent::FamilyCreated {
        family_id: family.id, category_id: family.category_id, reference: family.reference.clone(), name: family.name.clone(),
    }).await;
    Ok((StatusCode::CREATED, Json(family)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubfamilyParams { pub family_id: Option<Uuid> }

pub async fn list_subfamilies(State(s): State<AppState>, Query(p): Query<SubfamilyParams>) -> ApiResult<Json<Vec<Subfamily>>> {
    Ok(Json(s.store.list_subfamilies(p.family_id).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubfamilyRequest {
    #[validate(length(min = 1, message = "La référence est requise"))]
    pub reference: String,
    #[validate(length(min = 2, message = "Le nom doit contenir au moins 2 caractères"))]
    pub name: String,
    pub family_id: Uuid,
    pub description: Option<String>,
}

pub async fn create_subfamily(State(s): State<AppState>, Json(r): Json<CreateSubfamilyRequest>) -> ApiResult<(StatusCode, Json<Subfamily>)> {
    r.validate()?;
    let reference = parse_reference(&r.reference)?;
    s.store.get_family(r.family_id).await?.ok_or(CatalogError::NotFound("Famille"))?;
    if s.store.find_subfamily(r.family_id, &reference).await?.is_some() {
        return Err(CatalogError::DuplicateReference.into());
    }
    let upserted = s.store.upsert_subfamily(NewSubfamily::new(r.family_id, reference, r.name, r.description)).await?;
    if !upserted.created { return Err(CatalogError::DuplicateReference.into()); }
    let subfamily = upserted.record;
    s.publisher.publish(&DomainEvent::SubfamilyCreated {
        subfamily_id: subfamily.id, family_id: subfamily.family_id, reference: subfamily.reference.clone(), name: subfamily.name.clone(),
    }).await;
    Ok((StatusCode::CREATED, Json(subfamily)))
}

fn parse_reference(raw: &str) -> ApiResult<Reference> {
    Reference::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}
