//! Calculadora de preços
//!
//! Valores monetários sempre em `Decimal`, arredondados em 2 casas
//! com meio para cima (`MidpointAwayFromZero`).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::DomainError;
use crate::models::coupon::DiscountType;
use crate::models::vehicle::DepositType;

pub const MAX_SERVICE_FEE_PERCENTAGE: i64 = 50;
pub const MAX_INSURANCE_FEE_PERCENTAGE: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub day_count: i64,
    pub daily_rate: Decimal,
    pub base: Decimal,
    pub service_fee: Decimal,
    pub insurance_fee: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn ensure_percentage(name: &str, value: Decimal) -> Result<(), DomainError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(DomainError::InvalidInput(format!(
            "{} deve estar entre 0 e 100 (recebido {})",
            name, value
        )));
    }
    Ok(())
}

/// Cada taxa incide sobre o valor base, de forma independente.
pub fn compute_price(
    daily_rate: Decimal,
    start: NaiveDate,
    end: NaiveDate,
    service_fee_pct: Decimal,
    insurance_fee_pct: Decimal,
    discount: Decimal,
) -> Result<PriceBreakdown, DomainError> {
    if daily_rate <= Decimal::ZERO {
        return Err(DomainError::InvalidInput(
            "a diária deve ser maior que zero".to_string(),
        ));
    }
    if discount < Decimal::ZERO {
        return Err(DomainError::InvalidInput(
            "o desconto não pode ser negativo".to_string(),
        ));
    }
    if end < start {
        return Err(DomainError::InvalidInput(
            "a data final não pode ser anterior à inicial".to_string(),
        ));
    }
    ensure_percentage("taxa de serviço", service_fee_pct)?;
    ensure_percentage("taxa de seguro", insurance_fee_pct)?;

    let day_count = (end - start).num_days().max(1);
    let daily_rate = round_money(daily_rate);
    let base = round_money(daily_rate * Decimal::from(day_count));
    let service_fee = round_money(base * service_fee_pct / Decimal::ONE_HUNDRED);
    let insurance_fee = round_money(base * insurance_fee_pct / Decimal::ONE_HUNDRED);
    let discount = round_money(discount);
    let total = (base + service_fee + insurance_fee - discount).max(Decimal::ZERO);

    Ok(PriceBreakdown {
        day_count,
        daily_rate,
        base,
        service_fee,
        insurance_fee,
        discount,
        total: round_money(total),
    })
}

/// Percentuais configurados pelo administrador
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeePolicy {
    pub service_fee_pct: Decimal,
    pub insurance_fee_pct: Decimal,
}

impl FeePolicy {
    pub fn validate(&self) -> Result<(), DomainError> {
        ensure_percentage("taxa de serviço", self.service_fee_pct)?;
        ensure_percentage("taxa de seguro", self.insurance_fee_pct)?;
        if self.service_fee_pct > Decimal::from(MAX_SERVICE_FEE_PERCENTAGE) {
            return Err(DomainError::InvalidInput(format!(
                "a taxa de serviço não pode passar de {}%",
                MAX_SERVICE_FEE_PERCENTAGE
            )));
        }
        if self.insurance_fee_pct > Decimal::from(MAX_INSURANCE_FEE_PERCENTAGE) {
            return Err(DomainError::InvalidInput(format!(
                "a taxa de seguro não pode passar de {}%",
                MAX_INSURANCE_FEE_PERCENTAGE
            )));
        }
        Ok(())
    }
}

/// Condições de um cupom no momento da aplicação
#[derive(Debug, Clone)]
pub struct CouponTerms {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Decimal,
    pub max_uses: i32,
    pub used_count: i32,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl CouponTerms {
    /// Desconto sobre o valor do pedido, limitado ao próprio pedido
    pub fn discount_for(
        &self,
        order_value: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal, DomainError> {
        if !self.is_active {
            return Err(DomainError::CouponRejected("Cupom inativo".to_string()));
        }
        if now > self.valid_until {
            return Err(DomainError::CouponRejected("Cupom expirado".to_string()));
        }
        if now < self.valid_from {
            return Err(DomainError::CouponRejected(
                "Cupom ainda não é válido".to_string(),
            ));
        }
        if self.max_uses > 0 && self.used_count >= self.max_uses {
            return Err(DomainError::CouponRejected("Cupom esgotado".to_string()));
        }
        if order_value < self.min_order_value {
            return Err(DomainError::CouponRejected(format!(
                "Valor mínimo do pedido: R$ {:.2}",
                self.min_order_value
            )));
        }

        let discount = match self.discount_type {
            DiscountType::Percentage => {
                round_money(order_value * self.discount_value / Decimal::ONE_HUNDRED)
            }
            DiscountType::Fixed => round_money(self.discount_value),
        };
        Ok(discount.min(order_value))
    }
}

/// Caução do veículo: percentual do valor base ou valor fixo
#[derive(Debug, Clone, Copy)]
pub struct DepositRule {
    pub deposit_type: DepositType,
    pub value: Decimal,
}

impl DepositRule {
    pub fn security_deposit(&self, base: Decimal) -> Decimal {
        match self.deposit_type {
            DepositType::Percentage => round_money(base * self.value / Decimal::ONE_HUNDRED),
            DepositType::Fixed => round_money(self.value),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingQuote {
    pub breakdown: PriceBreakdown,
    pub security_deposit: Decimal,
    pub coupon_code: Option<String>,
}

/// Orçamento completo: preço sem desconto, desconto do cupom sobre o total
/// bruto e a caução
pub fn quote(
    daily_rate: Decimal,
    start: NaiveDate,
    end: NaiveDate,
    policy: &FeePolicy,
    deposit: &DepositRule,
    coupon: Option<&CouponTerms>,
    now: DateTime<Utc>,
) -> Result<BookingQuote, DomainError> {
    let gross = compute_price(
        daily_rate,
        start,
        end,
        policy.service_fee_pct,
        policy.insurance_fee_pct,
        Decimal::ZERO,
    )?;

    let (breakdown, coupon_code) = match coupon {
        Some(terms) => {
            let discount = terms.discount_for(gross.total, now)?;
            let priced = compute_price(
                daily_rate,
                start,
                end,
                policy.service_fee_pct,
                policy.insurance_fee_pct,
                discount,
            )?;
            (priced, Some(terms.code.clone()))
        }
        None => (gross, None),
    };

    let security_deposit = deposit.security_deposit(breakdown.base);
    Ok(BookingQuote {
        breakdown,
        security_deposit,
        coupon_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn coupon(discount_type: DiscountType, value: Decimal) -> CouponTerms {
        let now = Utc::now();
        CouponTerms {
            code: "BEMVINDO10".to_string(),
            discount_type,
            discount_value: value,
            min_order_value: Decimal::ZERO,
            max_uses: 10,
            used_count: 0,
            is_active: true,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
        }
    }

    #[test]
    fn test_three_days_at_100_with_default_fees() {
        let price = compute_price(dec("100"), d(1), d(4), dec("10"), dec("15"), Decimal::ZERO).unwrap();
        assert_eq!(price.day_count, 3);
        assert_eq!(price.base, dec("300"));
        assert_eq!(price.service_fee, dec("30"));
        assert_eq!(price.insurance_fee, dec("45"));
        assert_eq!(price.total, dec("375"));
    }

    #[test]
    fn test_same_day_counts_as_one_day() {
        let price = compute_price(dec("80"), d(5), d(5), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(price.day_count, 1);
        assert_eq!(price.total, dec("80"));
    }

    #[test]
    fn test_total_is_monotonic_in_days() {
        let mut previous = Decimal::ZERO;
        for end in 2..20 {
            let price = compute_price(dec("99.90"), d(1), d(end), dec("10"), dec("15"), dec("5")).unwrap();
            assert!(price.total >= previous);
            previous = price.total;
        }
    }

    #[test]
    fn test_discount_never_makes_total_negative() {
        let price = compute_price(dec("50"), d(1), d(2), dec("10"), dec("0"), dec("500")).unwrap();
        assert_eq!(price.total, Decimal::ZERO);
    }

    #[test]
    fn test_fees_round_half_up() {
        // 33.33 * 15% = 4.9995 -> 5.00
        let price = compute_price(dec("33.33"), d(1), d(2), dec("0"), dec("15"), Decimal::ZERO).unwrap();
        assert_eq!(price.insurance_fee, dec("5.00"));
        // 0.05 * 10% = 0.005 -> 0.01
        let price = compute_price(dec("0.05"), d(1), d(2), dec("10"), dec("0"), Decimal::ZERO).unwrap();
        assert_eq!(price.service_fee, dec("0.01"));
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(matches!(
            compute_price(Decimal::ZERO, d(1), d(2), dec("10"), dec("15"), Decimal::ZERO),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(compute_price(dec("100"), d(1), d(2), dec("101"), dec("15"), Decimal::ZERO).is_err());
        assert!(compute_price(dec("100"), d(1), d(2), dec("10"), dec("-1"), Decimal::ZERO).is_err());
        assert!(compute_price(dec("100"), d(1), d(2), dec("10"), dec("15"), dec("-1")).is_err());
        assert!(compute_price(dec("100"), d(3), d(2), dec("10"), dec("15"), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_fee_policy_bounds() {
        let ok = FeePolicy { service_fee_pct: dec("50"), insurance_fee_pct: dec("30") };
        assert!(ok.validate().is_ok());
        let too_much_service = FeePolicy { service_fee_pct: dec("51"), insurance_fee_pct: dec("15") };
        assert!(too_much_service.validate().is_err());
        let too_much_insurance = FeePolicy { service_fee_pct: dec("10"), insurance_fee_pct: dec("31") };
        assert!(too_much_insurance.validate().is_err());
    }

    #[test]
    fn test_coupon_percentage_and_fixed() {
        let now = Utc::now();
        let pct = coupon(DiscountType::Percentage, dec("10"));
        assert_eq!(pct.discount_for(dec("375"), now).unwrap(), dec("37.50"));

        let fixed = coupon(DiscountType::Fixed, dec("500"));
        assert_eq!(fixed.discount_for(dec("375"), now).unwrap(), dec("375"));
    }

    #[test]
    fn test_coupon_rejections() {
        let now = Utc::now();

        let mut inactive = coupon(DiscountType::Fixed, dec("10"));
        inactive.is_active = false;
        assert_eq!(
            inactive.discount_for(dec("100"), now),
            Err(DomainError::CouponRejected("Cupom inativo".to_string()))
        );

        let mut expired = coupon(DiscountType::Fixed, dec("10"));
        expired.valid_until = now - Duration::hours(1);
        assert_eq!(
            expired.discount_for(dec("100"), now),
            Err(DomainError::CouponRejected("Cupom expirado".to_string()))
        );

        let mut exhausted = coupon(DiscountType::Fixed, dec("10"));
        exhausted.used_count = exhausted.max_uses;
        assert_eq!(
            exhausted.discount_for(dec("100"), now),
            Err(DomainError::CouponRejected("Cupom esgotado".to_string()))
        );

        let mut minimum = coupon(DiscountType::Fixed, dec("10"));
        minimum.min_order_value = dec("200");
        assert_eq!(
            minimum.discount_for(dec("100"), now),
            Err(DomainError::CouponRejected("Valor mínimo do pedido: R$ 200.00".to_string()))
        );
    }

    #[test]
    fn test_quote_applies_coupon_on_gross_total_and_deposit_on_base() {
        let policy = FeePolicy { service_fee_pct: dec("10"), insurance_fee_pct: dec("15") };
        let deposit = DepositRule { deposit_type: DepositType::Percentage, value: dec("20") };
        let terms = coupon(DiscountType::Percentage, dec("10"));

        let q = quote(dec("100"), d(1), d(4), &policy, &deposit, Some(&terms), Utc::now()).unwrap();
        assert_eq!(q.breakdown.discount, dec("37.50"));
        assert_eq!(q.breakdown.total, dec("337.50"));
        assert_eq!(q.security_deposit, dec("60"));
        assert_eq!(q.coupon_code.as_deref(), Some("BEMVINDO10"));
    }
}
