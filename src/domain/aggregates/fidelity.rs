//! Fidelity Aggregate: loyalty points earned on delivered orders

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;

/// 2% of the order total, counted in thousandths of a dinar.
pub const POINTS_PER_DINAR: i64 = 20;

/// Points earned by an order of `total`, rounded down.
pub fn points_for(total: Money) -> i64 {
    (total.amount() * Decimal::from(POINTS_PER_DINAR)).floor().to_i64().unwrap_or(0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus { Pending, Confirmed, Processing, Shipped, Delivered, Cancelled, Refunded }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FidelityEntryType { EarnedPurchase, ManualAdd, ManualDeduct, Redeemed, Expired, Refund }

impl FidelityEntryType {
    pub fn label(self) -> &'static str {
        match self {
            Self::EarnedPurchase => "Achat en ligne",
            Self::ManualAdd => "Ajout manuel",
            Self::ManualDeduct => "Déduction",
            Self::Redeemed => "Points utilisés",
            Self::Expired => "Expiration",
            Self::Refund => "Remboursement",
        }
    }
}

/// One line of a customer's points history. `points` is negative for debits.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FidelityEntry {
    pub points: i64,
    #[serde(rename = "type")]
    pub entry_type: FidelityEntryType,
    pub description: String,
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FidelityAccount {
    balance: i64,
    history: Vec<FidelityEntry>,
}

impl FidelityAccount {
    pub fn new(balance: i64) -> Self { Self { balance: balance.max(0), history: Vec::new() } }
    pub fn balance(&self) -> i64 { self.balance }
    pub fn history(&self) -> &[FidelityEntry] { &self.history }

    /// Applies an order status change. Points are awarded once, when the order first
    /// becomes delivered, and taken back if a delivered order is cancelled or refunded.
    /// A refund larger than the balance is skipped.
    pub fn apply_status_change(&mut self, order_number: &str, total: Money, previous: OrderStatus, next: OrderStatus) -> Option<&FidelityEntry> {
        let points = points_for(total);
        let entry = match (previous, next) {
            (OrderStatus::Delivered, OrderStatus::Delivered) => return None,
            (_, OrderStatus::Delivered) => FidelityEntry {
                points,
                entry_type: FidelityEntryType::EarnedPurchase,
                description: format!("Points gagnés pour la commande #{order_number}"),
                reference: Some(order_number.to_string()),
            },
            (OrderStatus::Delivered, OrderStatus::Cancelled | OrderStatus::Refunded) if self.balance >= points => FidelityEntry {
                points: -points,
                entry_type: FidelityEntryType::Refund,
                description: format!("Points remboursés pour la commande annulée #{order_number}"),
                reference: Some(order_number.to_string()),
            },
            _ => return None,
        };
        Some(self.record(entry))
    }

    /// Manual credit or debit from the back office.
    pub fn adjust(&mut self, points: i64, description: &str, reference: Option<String>) -> Result<&FidelityEntry, FidelityError> {
        let description = description.trim();
        if description.is_empty() { return Err(FidelityError::MissingDescription); }
        if points == 0 { return Err(FidelityError::ZeroPoints); }
        if points < 0 && self.balance + points < 0 {
            return Err(FidelityError::InsufficientPoints { balance: self.balance, requested: -points });
        }
        let entry_type = if points > 0 { FidelityEntryType::ManualAdd } else { FidelityEntryType::ManualDeduct };
        Ok(self.record(FidelityEntry { points, entry_type, description: description.to_string(), reference }))
    }

    fn record(&mut self, entry: FidelityEntry) -> &FidelityEntry {
        self.balance += entry.points;
        self.history.push(entry);
        &self.history[self.history.len() - 1]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum FidelityError { MissingDescription, ZeroPoints, InsufficientPoints { balance: i64, requested: i64 } }
impl std::error::Error for FidelityError {}
impl std::fmt::Display for FidelityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDescription => write!(f, "La description est requise"),
            Self::ZeroPoints => write!(f, "Le nombre de points doit être différent de zéro"),
            Self::InsufficientPoints { balance, requested } => {
                write!(f, "Points insuffisants : solde de {balance}, déduction de {requested} demandée")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_round_down() {
        assert_eq!(points_for(Money::dinars(50)), 1000);
        assert_eq!(points_for(Money::new(Decimal::new(12345, 3)).unwrap()), 246);
        assert_eq!(points_for(Money::ZERO), 0);
    }

    #[test]
    fn test_delivery_awards_once() {
        let mut account = FidelityAccount::new(0);
        let entry = account.apply_status_change("CMD-1", Money::dinars(80), OrderStatus::Shipped, OrderStatus::Delivered).cloned().unwrap();
        assert_eq!(entry.points, 1600);
        assert_eq!(entry.entry_type, FidelityEntryType::EarnedPurchase);
        assert_eq!(entry.description, "Points gagnés pour la commande #CMD-1");
        assert!(account.apply_status_change("CMD-1", Money::dinars(80), OrderStatus::Delivered, OrderStatus::Delivered).is_none());
        assert_eq!(account.balance(), 1600);
    }

    #[test]
    fn test_cancelled_delivery_refunds() {
        let mut account = FidelityAccount::new(0);
        account.apply_status_change("CMD-2", Money::dinars(10), OrderStatus::Pending, OrderStatus::Delivered);
        let entry = account.apply_status_change("CMD-2", Money::dinars(10), OrderStatus::Delivered, OrderStatus::Refunded).cloned().unwrap();
        assert_eq!(entry.points, -200);
        assert_eq!(entry.entry_type.label(), "Remboursement");
        assert_eq!(account.balance(), 0);
        assert_eq!(account.history().len(), 2);
    }

    #[test]
    fn test_refund_skipped_when_points_spent() {
        let mut account = FidelityAccount::new(0);
        account.apply_status_change("CMD-3", Money::dinars(10), OrderStatus::Pending, OrderStatus::Delivered);
        account.adjust(-150, "Bon d'achat", None).unwrap();
        assert!(account.apply_status_change("CMD-3", Money::dinars(10), OrderStatus::Delivered, OrderStatus::Cancelled).is_none());
        assert_eq!(account.balance(), 50);
        assert!(account.apply_status_change("CMD-4", Money::dinars(10), OrderStatus::Pending, OrderStatus::Cancelled).is_none());
    }

    #[test]
    fn test_manual_adjustments() {
        let mut account = FidelityAccount::new(100);
        assert_eq!(account.adjust(50, "Geste commercial", Some("SAV-9".into())).unwrap().entry_type, FidelityEntryType::ManualAdd);
        assert_eq!(account.adjust(-150, "Correction", None).unwrap().entry_type, FidelityEntryType::ManualDeduct);
        assert_eq!(account.balance(), 0);

        let err = account.adjust(-1, "Correction", None).unwrap_err();
        assert_eq!(err, FidelityError::InsufficientPoints { balance: 0, requested: 1 });
        assert_eq!(err.to_string(), "Points insuffisants : solde de 0, déduction de 1 demandée");
        assert_eq!(account.adjust(10, "  ", None).unwrap_err(), FidelityError::MissingDescription);
        assert_eq!(account.adjust(0, "Rien", None).unwrap_err(), FidelityError::ZeroPoints);
        assert_eq!(account.history().len(), 2);
    }

    #[test]
    fn test_entry_serializes_type_code() {
        let mut account = FidelityAccount::new(0);
        let json = serde_json::to_value(account.adjust(5, "Bienvenue", None).unwrap()).unwrap();
        assert_eq!(json["type"], "MANUAL_ADD");
        assert_eq!(json["points"], 5);
    }
}
