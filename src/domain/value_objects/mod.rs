//! Value Objects for the parapharmacy catalog

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Short code identifying a family or subfamily inside its parent ("00001", "DV").
///
/// References are the import key: two rows carrying the same reference under the
/// same parent designate the same record, whatever their display names say.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference(String);

impl Reference {
    pub const MAX_LEN: usize = 50;

    pub fn new(value: impl AsRef<str>) -> Result<Self, ReferenceError> {
        let value = value.as_ref().trim();
        if value.is_empty() { return Err(ReferenceError::Empty); }
        if value.chars().count() > Self::MAX_LEN { return Err(ReferenceError::TooLong); }
        if value.chars().any(char::is_control) { return Err(ReferenceError::InvalidCharacter); }
        Ok(Self(value.to_string()))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for Reference {
    type Error = ReferenceError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Reference> for String {
    fn from(value: Reference) -> Self { value.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ReferenceError { Empty, TooLong, InvalidCharacter }
impl std::error::Error for ReferenceError {}
impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Référence vide"),
            Self::TooLong => write!(f, "Référence trop longue ({} caractères max)", Reference::MAX_LEN),
            Self::InvalidCharacter => write!(f, "Référence contenant des caractères invalides"),
        }
    }
}

/// URL slug derived from a display name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// "Vitamines & Compléments" -> "vitamines-complements"
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;
        for ch in name.chars() {
            let mut buf = [0; 4];
            let part = if ch.is_ascii_alphanumeric() {
                &*ch.to_ascii_lowercase().encode_utf8(&mut buf)
            } else if let Some(folded) = fold_accent(ch) {
                folded
            } else {
                pending_dash = true;
                continue;
            };
            if pending_dash && !slug.is_empty() { slug.push('-'); }
            slug.push_str(part);
            pending_dash = false;
        }
        Self(slug)
    }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<String> for Slug {
    fn from(value: String) -> Self { Self(value) }
}

fn fold_accent(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'æ' | 'Æ' => "ae",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "o",
        'œ' | 'Œ' => "oe",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        _ => return None,
    };
    Some(folded)
}

/// Amount in Tunisian dinars. Prices carry up to three decimals (millimes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const CURRENCY: &'static str = "TND";
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() { return Err(MoneyError::Negative); }
        Ok(Self(amount))
    }
    pub fn dinars(whole: i64) -> Self { Self(Decimal::from(whole.max(0))) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
    pub fn add(&self, other: &Money) -> Money { Money(self.0 + other.0) }
    pub fn saturating_sub(&self, other: &Money) -> Money { Money((self.0 - other.0).max(Decimal::ZERO)) }
    pub fn multiply(&self, qty: u32) -> Money { Money(self.0 * Decimal::from(qty)) }
    /// Scales by `ratio`, rounding half-up to the millime.
    pub fn scale(&self, ratio: Decimal) -> Money {
        Money((self.0 * ratio).round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero).max(Decimal::ZERO))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.round_dp(3), Self::CURRENCY)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self { iter.fold(Money::ZERO, |acc, m| acc.add(&m)) }
}

#[derive(Debug, Clone)] pub enum MoneyError { Negative }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Montant négatif") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_trims() {
        let r = Reference::new("  00001 ").unwrap();
        assert_eq!(r.as_str(), "00001");
        assert_eq!(Reference::new("   "), Err(ReferenceError::Empty));
        assert_eq!(Reference::new("x".repeat(51)), Err(ReferenceError::TooLong));
    }

    #[test]
    fn test_slug_folds_accents() {
        assert_eq!(Slug::from_name("Vitamines & Compléments").as_str(), "vitamines-complements");
        assert_eq!(Slug::from_name("  Bébé & Maman ").as_str(), "bebe-maman");
        assert_eq!(Slug::from_name("Lait Infantile 1er Âge").as_str(), "lait-infantile-1er-age");
        assert_eq!(Slug::from_name("Sœurs -- Œuvre!").as_str(), "soeurs-oeuvre");
        assert!(Slug::from_name("&&").is_empty());
    }

    #[test]
    fn test_money_scale_rounds_to_millimes() {
        let m = Money::new(Decimal::new(10, 0)).unwrap();
        assert_eq!(m.scale(Decimal::new(2, 0) / Decimal::new(3, 0)).amount(), Decimal::new(6667, 3));
        assert!(Money::new(Decimal::new(-1, 0)).is_err());
        assert_eq!(m.saturating_sub(&Money::dinars(12)), Money::ZERO);
    }
}
