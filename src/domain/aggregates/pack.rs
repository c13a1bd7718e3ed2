//! Pack Aggregate: bundled products sold at a single price

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::cart::{CartItem, PackTag};
use crate::domain::aggregates::product::resolve_price;
use crate::domain::value_objects::{Money, Slug};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackItem {
    pub product_id: String,
    pub name: String,
    pub slug: String,
    pub price: Money,
    #[serde(default)]
    pub promo_price: Option<Money>,
    pub quantity: u32,
    #[serde(default)]
    pub stock_quantity: u32,
}

impl PackItem {
    pub fn unit_price(&self) -> Money { resolve_price(self.price, self.promo_price) }
    pub fn line_total(&self) -> Money { self.unit_price().multiply(self.quantity) }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    id: String,
    name: String,
    slug: Slug,
    pack_price: Money,
    items: Vec<PackItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackSavings {
    pub total_price: Money,
    pub pack_price: Money,
    pub savings: Money,
    pub percent: u32,
}

impl Pack {
    pub fn create(id: impl Into<String>, name: impl Into<String>, pack_price: Money, items: Vec<PackItem>) -> Result<Self, PackError> {
        let name = name.into();
        if name.trim().is_empty() { return Err(PackError::MissingName); }
        if items.is_empty() { return Err(PackError::NoItems); }
        if items.iter().any(|i| i.quantity == 0) { return Err(PackError::InvalidQuantity); }
        Ok(Self { id: id.into(), slug: Slug::from_name(&name), name, pack_price, items })
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn slug(&self) -> &Slug { &self.slug }
    pub fn items(&self) -> &[PackItem] { &self.items }
    pub fn pack_price(&self) -> Money { self.pack_price }

    /// Sum of what the items would cost bought separately.
    pub fn total_price(&self) -> Money { self.items.iter().map(PackItem::line_total).sum() }

    pub fn savings(&self) -> PackSavings {
        let total_price = self.total_price();
        let savings = total_price.saturating_sub(&self.pack_price);
        let percent = if total_price.is_zero() {
            0
        } else {
            (savings.amount() * Decimal::ONE_HUNDRED / total_price.amount()).round().to_u32().unwrap_or(0)
        };
        PackSavings { total_price, pack_price: self.pack_price, savings, percent }
    }

    /// Cart lines for this pack, each unit price discounted by `pack_price / total_price`.
    pub fn to_cart_items(&self) -> Vec<CartItem> {
        let total = self.total_price();
        let ratio = if total.is_zero() { Decimal::ONE } else { self.pack_price.amount() / total.amount() };
        let tag = PackTag { pack_id: self.id.clone(), pack_name: self.name.clone() };
        self.items.iter().map(|item| CartItem {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            slug: item.slug.clone(),
            price: item.price,
            promo_price: Some(item.unit_price().scale(ratio)),
            quantity: item.quantity,
            stock_quantity: item.stock_quantity,
            pack: Some(tag.clone()),
        }).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum PackError { MissingName, NoItems, InvalidQuantity }
impl std::error::Error for PackError {}
impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "Le nom du pack est requis"),
            Self::NoItems => write!(f, "Le pack doit contenir au moins un produit"),
            Self::InvalidQuantity => write!(f, "Quantité invalide"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: i64, promo: Option<i64>, quantity: u32) -> PackItem {
        PackItem { product_id: id.into(), name: format!("Produit {id}"), slug: format!("produit-{id}"), price: Money::dinars(price), promo_price: promo.map(Money::dinars), quantity, stock_quantity: 10 }
    }

    #[test]
    fn test_pack_savings() {
        let pack = Pack::create("P1", "Pack Été", Money::dinars(60), vec![item("a", 40, Some(30), 1), item("b", 25, None, 2)]).unwrap();
        assert_eq!(pack.slug().as_str(), "pack-ete");
        let savings = pack.savings();
        assert_eq!(savings.total_price, Money::dinars(80));
        assert_eq!(savings.savings, Money::dinars(20));
        assert_eq!(savings.percent, 25);
    }

    #[test]
    fn test_cart_items_spread_discount() {
        let pack = Pack::create("P1", "Pack", Money::dinars(60), vec![item("a", 40, Some(30), 1), item("b", 25, None, 2)]).unwrap();
        let lines = pack.to_cart_items();
        assert_eq!(lines[0].promo_price, Some(Money::new(Decimal::new(22500, 3)).unwrap()));
        assert_eq!(lines[1].promo_price, Some(Money::new(Decimal::new(18750, 3)).unwrap()));
        let total: Money = lines.iter().map(CartItem::line_total).sum();
        assert_eq!(total, Money::dinars(60));
        assert!(lines.iter().all(|l| l.pack.as_ref().is_some_and(|t| t.pack_id == "P1")));
    }

    #[test]
    fn test_pack_validation() {
        assert_eq!(Pack::create("P", "Pack", Money::dinars(1), vec![]).unwrap_err(), PackError::NoItems);
        assert_eq!(Pack::create("P", " ", Money::dinars(1), vec![item("a", 1, None, 1)]).unwrap_err(), PackError::MissingName);
        assert_eq!(Pack::create("P", "Pack", Money::dinars(1), vec![item("a", 1, None, 0)]).unwrap_err(), PackError::InvalidQuantity);
        assert_eq!(PackError::NoItems.to_string(), "Le pack doit contenir au moins un produit");
    }
}
