//! Product listing: filter combinators and pagination over a fetched catalog

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;

pub const PRODUCTS_PER_PAGE: u32 = 20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Named { pub id: String, pub name: String, pub slug: String }

/// Product as the storefront listing receives it, with its hierarchy attachments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub reference: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub promo_price: Option<Money>,
    #[serde(default)]
    pub is_on_promo: bool,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub brand: Option<Named>,
    #[serde(default)]
    pub category: Option<Named>,
    #[serde(default)]
    pub family: Option<Named>,
    #[serde(default)]
    pub subfamily: Option<Named>,
}

/// Promo price wins when set and non-zero.
pub fn resolve_price(price: Money, promo_price: Option<Money>) -> Money {
    promo_price.filter(|p| !p.is_zero()).unwrap_or(price)
}

impl Product {
    pub fn is_in_stock(&self) -> bool { self.stock_quantity > 0 }

    /// Price shown in listings: the promo price only counts while the promotion is on.
    pub fn listing_price(&self) -> Money {
        if self.is_on_promo { resolve_price(self.price, self.promo_price) } else { self.price }
    }

    fn search_haystack(&self) -> impl Iterator<Item = &str> {
        [Some(self.name.as_str()), Some(self.reference.as_str()), self.description.as_deref()]
            .into_iter()
            .chain([&self.brand, &self.category, &self.family, &self.subfamily].into_iter().map(|n| n.as_ref().map(|n| n.name.as_str())))
            .flatten()
    }
}

fn slug_of(named: &Option<Named>) -> Option<&str> { named.as_ref().map(|n| n.slug.as_str()) }

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub family: Option<String>,
    pub subfamily: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    #[serde(default)]
    pub promo_only: bool,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            if !product.search_haystack().any(|field| field.to_lowercase().contains(&query)) { return false; }
        }
        let slug_filters = [
            (&self.category, &product.category),
            (&self.family, &product.family),
            (&self.subfamily, &product.subfamily),
            (&self.brand, &product.brand),
        ];
        for (wanted, actual) in slug_filters {
            if let Some(wanted) = wanted.as_deref().filter(|s| !s.is_empty()) {
                if slug_of(actual) != Some(wanted) { return false; }
            }
        }
        let price = product.listing_price();
        if self.min_price.is_some_and(|min| price < min) { return false; }
        if self.max_price.is_some_and(|max| price > max) { return false; }
        if self.promo_only && !product.is_on_promo { return false; }
        true
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_pages: u32,
}

/// Slices one page out of `items`. Page numbers start at 1; 0 is treated as 1.
pub fn paginate<T>(items: Vec<T>, page: u32, per_page: u32) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page as usize) as u32;
    let start = (page as usize - 1).saturating_mul(per_page as usize);
    let items = items.into_iter().skip(start).take(per_page as usize).collect();
    Page { items, page, per_page, total, total_pages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn named(name: &str, slug: &str) -> Option<Named> { Some(Named { id: slug.into(), name: name.into(), slug: slug.into() }) }

    fn product(id: &str, name: &str, price: i64) -> Product {
        Product {
            id: id.into(), reference: format!("REF-{id}"), name: name.into(), slug: name.to_lowercase().replace(' ', "-"),
            description: None, price: Money::dinars(price), promo_price: None, is_on_promo: false, stock_quantity: 5,
            brand: named("Avène", "avene"), category: named("Soins Visage", "soins-visage"),
            family: named("Sérums", "serums"), subfamily: None,
        }
    }

    #[test]
    fn test_search_covers_hierarchy_names() {
        let products = vec![product("1", "Sérum Vitamine C", 34), product("2", "Gel Douche", 12)];
        let filter = ProductFilter { search: Some("SÉRUMS".into()), ..Default::default() };
        assert_eq!(filter.apply(&products).len(), 2);
        let filter = ProductFilter { search: Some("vitamine".into()), ..Default::default() };
        assert_eq!(filter.apply(&products)[0].id, "1");
    }

    #[test]
    fn test_price_bounds_use_promo_only_when_on_promo() {
        let mut promo = product("1", "Crème", 30);
        promo.promo_price = Some(Money::dinars(20));
        promo.is_on_promo = true;
        let mut stale = product("2", "Lait", 30);
        stale.promo_price = Some(Money::dinars(20));
        let products = vec![promo, stale];

        let filter = ProductFilter { max_price: Some(Money::dinars(25)), ..Default::default() };
        let hits = filter.apply(&products);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");

        let filter = ProductFilter { promo_only: true, min_price: Some(Money::new(Decimal::new(195, 1)).unwrap()), ..Default::default() };
        assert_eq!(filter.apply(&products).len(), 1);
    }

    #[test]
    fn test_slug_filters_combine() {
        let mut other = product("2", "Shampoing", 15);
        other.category = named("Capillaires", "capillaires");
        let products = vec![product("1", "Sérum", 30), other];
        let filter = ProductFilter { category: Some("capillaires".into()), brand: Some("avene".into()), ..Default::default() };
        assert_eq!(filter.apply(&products).len(), 1);
        let filter = ProductFilter { subfamily: Some("anything".into()), ..Default::default() };
        assert!(filter.apply(&products).is_empty());
    }

    #[test]
    fn test_paginate() {
        let page = paginate((1..=45).collect::<Vec<_>>(), 3, PRODUCTS_PER_PAGE);
        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total_pages, 3);
        let first = paginate((1..=45).collect::<Vec<_>>(), 0, PRODUCTS_PER_PAGE);
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 20);
        assert!(paginate(Vec::<u8>::new(), 1, 20).items.is_empty());
    }
}
