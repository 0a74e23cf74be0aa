//! Desbloqueio de contato do proprietário com moedas

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::DomainError;

pub const UNLOCK_COST_COINS: i64 = 200;
pub const UNLOCK_VALIDITY_DAYS: i64 = 30;

pub fn expires_at(unlocked_at: DateTime<Utc>) -> DateTime<Utc> {
    unlocked_at + Duration::days(UNLOCK_VALIDITY_DAYS)
}

pub fn is_active(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now < expires_at
}

pub fn ensure_affordable(available: i64) -> Result<(), DomainError> {
    if available < UNLOCK_COST_COINS {
        return Err(DomainError::InsufficientCoins {
            required: UNLOCK_COST_COINS,
            available,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoinPackage {
    pub id: &'static str,
    pub coins: i64,
    /// Preço em centavos de BRL
    pub price_cents: i64,
}

impl CoinPackage {
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }
}

pub const COIN_PACKAGES: [CoinPackage; 4] = [
    CoinPackage { id: "basic", coins: 200, price_cents: 2000 },
    CoinPackage { id: "standard", coins: 500, price_cents: 4500 },
    CoinPackage { id: "premium", coins: 1000, price_cents: 8000 },
    CoinPackage { id: "pro", coins: 2000, price_cents: 15000 },
];

pub fn find_package(id: &str) -> Option<CoinPackage> {
    COIN_PACKAGES.iter().copied().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_lasts_thirty_days() {
        let now = Utc::now();
        let expiry = expires_at(now);
        assert!(is_active(expiry, now + Duration::days(29)));
        assert!(!is_active(expiry, now + Duration::days(30)));
    }

    #[test]
    fn test_insufficient_coins_reports_balance() {
        assert!(ensure_affordable(200).is_ok());
        assert_eq!(
            ensure_affordable(150),
            Err(DomainError::InsufficientCoins { required: 200, available: 150 })
        );
    }

    #[test]
    fn test_packages() {
        let standard = find_package("standard").unwrap();
        assert_eq!(standard.coins, 500);
        assert_eq!(standard.price(), Decimal::new(4500, 2));
        assert!(find_package("gold").is_none());
    }
}
