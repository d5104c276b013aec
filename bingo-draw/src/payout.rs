use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PayoutError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrizeShare {
    Percentage(f64),
    Amount(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrizeEntry {
    pub name: String,
    pub share: PrizeShare,
}

impl FromStr for PrizeEntry {
    type Err = PayoutError;

    /// `Línea=20%` is a share of sales, `Línea=150` a fixed amount.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PayoutError::InvalidEntry(s.to_string());
        let (name, value) = s.rsplit_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            return Err(invalid());
        }

        let share = match value.strip_suffix('%') {
            Some(pct) => PrizeShare::Percentage(parse_decimal(pct).ok_or_else(invalid)?),
            None => PrizeShare::Amount(parse_decimal(value).ok_or_else(invalid)?),
        };
        Ok(Self { name: name.to_string(), share })
    }
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeLine {
    pub name: String,
    pub percentage: f64,
    pub amount: f64,
}

/// How the takings of a series are shared between prizes and the house.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutSplit {
    pub paid_cards: u32,
    pub card_price: f64,
    pub total_sales: f64,
    pub prizes: Vec<PrizeLine>,
    pub house_amount: f64,
    pub house_percentage: f64,
}

impl PayoutSplit {
    pub fn compute(paid_cards: u32, card_price: f64, entries: &[PrizeEntry]) -> Result<Self, PayoutError> {
        if !card_price.is_finite() {
            return Err(PayoutError::InvalidEntry(format!("precio={card_price}")));
        }
        if card_price < 0.0 {
            return Err(PayoutError::NegativeValue("precio".to_string()));
        }
        let total_sales = paid_cards as f64 * card_price;

        let mut prizes: Vec<PrizeLine> = Vec::with_capacity(entries.len());
        for entry in entries {
            if prizes.iter().any(|p| p.name == entry.name) {
                continue;
            }
            let (percentage, amount) = match entry.share {
                PrizeShare::Percentage(p) | PrizeShare::Amount(p) if p < 0.0 => {
                    return Err(PayoutError::NegativeValue(entry.name.clone()));
                }
                PrizeShare::Percentage(p) => (p, total_sales * p / 100.0),
                PrizeShare::Amount(m) => (share_of(m, total_sales), m),
            };
            prizes.push(PrizeLine { name: entry.name.clone(), percentage, amount });
        }

        let total_prizes: f64 = prizes.iter().map(|p| p.amount).sum();
        let house_amount = total_sales - total_prizes;

        Ok(Self {
            paid_cards,
            card_price,
            total_sales,
            house_percentage: share_of(house_amount, total_sales),
            house_amount,
            prizes,
        })
    }

    pub fn total_prizes(&self) -> f64 {
        self.prizes.iter().map(|p| p.amount).sum()
    }

    pub fn house_in_deficit(&self) -> bool {
        self.house_amount < 0.0
    }

    /// Prize name → amount, as stored in a payout report.
    pub fn detail(&self) -> BTreeMap<String, f64> {
        self.prizes.iter().map(|p| (p.name.clone(), p.amount)).collect()
    }
}

fn share_of(amount: f64, total: f64) -> f64 {
    if total > 0.0 { amount * 100.0 / total } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(s: &str) -> PrizeEntry {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_entries() {
        assert_eq!(entry("Línea=20%").share, PrizeShare::Percentage(20.0));
        assert_eq!(entry(" Lleno = 150,50 ").share, PrizeShare::Amount(150.5));
        assert_eq!(entry("Lleno = 150,50").name, "Lleno");
        assert!("Línea".parse::<PrizeEntry>().is_err());
        assert!("=20%".parse::<PrizeEntry>().is_err());
        assert!("Línea=veinte".parse::<PrizeEntry>().is_err());
    }

    #[test]
    fn test_split_percentages_and_amounts() {
        let split = PayoutSplit::compute(40, 10.0, &[entry("Línea=20%"), entry("Lleno=150")]).unwrap();
        assert!((split.total_sales - 400.0).abs() < 1e-9);
        assert!((split.prizes[0].amount - 80.0).abs() < 1e-9);
        assert!((split.prizes[1].percentage - 37.5).abs() < 1e-9);
        assert!((split.total_prizes() - 230.0).abs() < 1e-9);
        assert!((split.house_amount - 170.0).abs() < 1e-9);
        assert!((split.house_percentage - 42.5).abs() < 1e-9);
        assert!(!split.house_in_deficit());
        assert_eq!(split.detail().len(), 2);
    }

    #[test]
    fn test_deficit_is_reported() {
        let split = PayoutSplit::compute(5, 10.0, &[entry("Lleno=80")]).unwrap();
        assert!(split.house_in_deficit());
        assert!((split.house_amount + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_sales() {
        let split = PayoutSplit::compute(0, 10.0, &[entry("Línea=20%"), entry("Lleno=50")]).unwrap();
        assert_eq!(split.prizes[0].amount, 0.0);
        assert_eq!(split.prizes[1].percentage, 0.0);
        assert_eq!(split.house_percentage, 0.0);
    }

    #[test]
    fn test_duplicate_names_ignored_and_negatives_rejected() {
        let split = PayoutSplit::compute(10, 10.0, &[entry("Línea=10%"), entry("Línea=50%")]).unwrap();
        assert_eq!(split.prizes.len(), 1);
        assert!((split.prizes[0].amount - 10.0).abs() < 1e-9);

        assert!(PayoutSplit::compute(10, -1.0, &[]).is_err());
        assert!(matches!(PayoutSplit::compute(10, f64::NAN, &[]), Err(PayoutError::InvalidEntry(_))));
        assert!(matches!(PayoutSplit::compute(10, f64::INFINITY, &[]), Err(PayoutError::InvalidEntry(_))));
        assert!(PayoutSplit::compute(10, 10.0, &[entry("Línea=-5")]).is_err());
    }
}
