//! Cart Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::product::resolve_price;
use crate::domain::value_objects::Money;

/// Marks a cart line as belonging to a pack; such lines never merge with other lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackTag {
    pub pack_id: String,
    pub pack_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub slug: String,
    pub price: Money,
    #[serde(default)]
    pub promo_price: Option<Money>,
    pub quantity: u32,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub pack: Option<PackTag>,
}

impl CartItem {
    pub fn unit_price(&self) -> Money { resolve_price(self.price, self.promo_price) }
    pub fn line_total(&self) -> Money { self.unit_price().multiply(self.quantity) }
    pub fn is_pack_line(&self) -> bool { self.pack.is_some() }
}

#[derive(Clone, Debug)]
pub struct Cart {
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackGroup {
    pub pack_id: String,
    pub pack_name: String,
    pub items: Vec<CartItem>,
    pub total: Money,
}

/// Cart lines split the way the basket page shows them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartGroups {
    pub packs: Vec<PackGroup>,
    pub individual: Vec<CartItem>,
}

impl Default for Cart {
    fn default() -> Self { Self::new() }
}

impl Cart {
    pub fn new() -> Self {
        Self { items: vec![], created_at: Utc::now(), updated_at: Utc::now() }
    }

    /// Rebuilds a cart from stored lines, re-applying the add rules line by line.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Result<Self, CartError> {
        let mut cart = Self::new();
        for item in items { cart.add_item(item)?; }
        Ok(cart)
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn item_count(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn subtotal(&self) -> Money { self.items.iter().map(CartItem::line_total).sum() }

    /// Individual lines merge by product and are capped at the known stock; pack lines are appended as-is.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 { return Err(CartError::InvalidQuantity); }
        if item.is_pack_line() {
            self.items.push(item);
            self.touch();
            return Ok(());
        }
        if item.stock_quantity == 0 { return Err(CartError::OutOfStock); }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == item.product_id && !i.is_pack_line()) {
            existing.quantity = (existing.quantity + item.quantity).min(item.stock_quantity);
            existing.stock_quantity = item.stock_quantity;
        } else {
            let quantity = item.quantity.min(item.stock_quantity);
            self.items.push(CartItem { quantity, ..item });
        }
        self.touch();
        Ok(())
    }

    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 { return self.remove_item(product_id); }
        let item = self.items.iter_mut()
            .find(|i| i.product_id == product_id && !i.is_pack_line())
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = if item.stock_quantity > 0 { quantity.min(item.stock_quantity) } else { quantity };
        self.touch();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id || i.is_pack_line());
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.touch();
        Ok(())
    }

    pub fn remove_pack(&mut self, pack_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.pack.as_ref().map_or(true, |p| p.pack_id != pack_id));
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        self.touch();
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); self.touch(); }

    /// Packs in first-seen order, followed by the individual lines.
    pub fn groups(&self) -> CartGroups {
        let mut packs: Vec<PackGroup> = Vec::new();
        let mut individual = Vec::new();
        for item in &self.items {
            match &item.pack {
                Some(tag) => {
                    let idx = match packs.iter().position(|g| g.pack_id == tag.pack_id) {
                        Some(idx) => idx,
                        None => {
                            packs.push(PackGroup { pack_id: tag.pack_id.clone(), pack_name: tag.pack_name.clone(), items: vec![], total: Money::ZERO });
                            packs.len() - 1
                        }
                    };
                    let group = &mut packs[idx];
                    group.total = group.total.add(&item.line_total());
                    group.items.push(item.clone());
                }
                None => individual.push(item.clone()),
            }
        }
        CartGroups { packs, individual }
    }

    pub fn quote(&self, policy: &DeliveryPolicy, governorate: &str) -> Result<CartQuote, CartError> {
        if self.is_empty() { return Err(CartError::Empty); }
        let subtotal = self.subtotal();
        let delivery_fee = policy.fee_for(subtotal, governorate);
        Ok(CartQuote {
            item_count: self.item_count(),
            subtotal,
            delivery_fee,
            free_delivery: delivery_fee.is_zero(),
            total: subtotal.add(&delivery_fee),
            currency: Money::CURRENCY,
            groups: self.groups(),
        })
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Flat delivery fee waived above a threshold that depends on the destination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPolicy {
    pub fee: Money,
    pub home_governorate: String,
    pub home_free_threshold: Money,
    pub free_threshold: Money,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            fee: Money::dinars(7),
            home_governorate: "Sousse".to_string(),
            home_free_threshold: Money::dinars(50),
            free_threshold: Money::dinars(100),
        }
    }
}

impl DeliveryPolicy {
    pub fn fee_for(&self, subtotal: Money, governorate: &str) -> Money {
        let threshold = if governorate.trim().eq_ignore_ascii_case(&self.home_governorate) {
            self.home_free_threshold
        } else {
            self.free_threshold
        };
        if subtotal >= threshold { Money::ZERO } else { self.fee }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuote {
    pub item_count: u32,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub free_delivery: bool,
    pub total: Money,
    pub currency: &'static str,
    pub groups: CartGroups,
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound, InvalidQuantity, OutOfStock, Empty }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound => write!(f, "Article introuvable dans le panier"),
            Self::InvalidQuantity => write!(f, "Quantité invalide"),
            Self::OutOfStock => write!(f, "Produit en rupture de stock"),
            Self::Empty => write!(f, "Le panier est vide"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::pack::{Pack, PackItem};

    fn widget(quantity: u32) -> CartItem {
        CartItem { product_id: "P1".into(), name: "Crème".into(), slug: "creme".into(), price: Money::dinars(10), promo_price: None, quantity, stock_quantity: 5, pack: None }
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new();
        cart.add_item(widget(2)).unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal(), Money::dinars(20));
        cart.add_item(widget(4)).unwrap();
        assert_eq!(cart.items()[0].quantity, 5); // merged, capped at stock
        cart.update_quantity("P1", 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity("P1", 1), Err(CartError::ItemNotFound));
    }

    #[test]
    fn test_promo_price_wins() {
        let mut cart = Cart::new();
        cart.add_item(CartItem { promo_price: Some(Money::dinars(8)), ..widget(3) }).unwrap();
        cart.add_item(CartItem { product_id: "P2".into(), promo_price: Some(Money::ZERO), ..widget(1) }).unwrap();
        assert_eq!(cart.subtotal(), Money::dinars(34));
    }

    #[test]
    fn test_pack_lines_stay_grouped() {
        let pack = Pack::create("K1", "Pack Visage", Money::dinars(15), vec![
            PackItem { product_id: "P1".into(), name: "Crème".into(), slug: "creme".into(), price: Money::dinars(10), promo_price: None, quantity: 1, stock_quantity: 5 },
            PackItem { product_id: "P9".into(), name: "Sérum".into(), slug: "serum".into(), price: Money::dinars(10), promo_price: None, quantity: 1, stock_quantity: 5 },
        ]).unwrap();
        let mut cart = Cart::new();
        cart.add_item(widget(1)).unwrap();
        for line in pack.to_cart_items() { cart.add_item(line).unwrap(); }
        assert_eq!(cart.items().len(), 3);

        let groups = cart.groups();
        assert_eq!(groups.packs.len(), 1);
        assert_eq!(groups.packs[0].total, Money::dinars(15));
        assert_eq!(groups.individual.len(), 1);

        cart.remove_item("P1").unwrap();
        assert_eq!(cart.items().len(), 2);
        cart.remove_pack("K1").unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_delivery_tiers() {
        let policy = DeliveryPolicy::default();
        assert_eq!(policy.fee_for(Money::dinars(50), "sousse"), Money::ZERO);
        assert_eq!(policy.fee_for(Money::dinars(49), "Sousse"), Money::dinars(7));
        assert_eq!(policy.fee_for(Money::dinars(99), "Tunis"), Money::dinars(7));
        assert_eq!(policy.fee_for(Money::dinars(100), "Tunis"), Money::ZERO);

        let mut cart = Cart::new();
        assert_eq!(cart.quote(&policy, "Tunis"), Err(CartError::Empty));
        cart.add_item(widget(3)).unwrap();
        let quote = cart.quote(&policy, "Tunis").unwrap();
        assert_eq!(quote.total, Money::dinars(37));
        assert!(!quote.free_delivery);
    }

    #[test]
    fn test_out_of_stock_rejected() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(CartItem { stock_quantity: 0, ..widget(1) }), Err(CartError::OutOfStock));
        assert_eq!(cart.add_item(widget(0)), Err(CartError::InvalidQuantity));
        assert_eq!(CartError::OutOfStock.to_string(), "Produit en rupture de stock");
        assert_eq!(Cart::new().quote(&DeliveryPolicy::default(), "Sousse").unwrap_err().to_string(), "Le panier est vide");
    }
}
