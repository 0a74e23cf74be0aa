//! Regras de negócio puras
//!
//! Nada aqui toca banco de dados ou rede: os services carregam os dados,
//! chamam estas funções e só então persistem o resultado.

pub mod availability;
pub mod contact_unlock;
pub mod contract_lifecycle;
pub mod pricing;
pub mod verification;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::document::VerificationStatus;

/// Falhas de regra de negócio, levantadas antes de qualquer mutação
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Período inválido: {0}")]
    InvalidRange(String),

    #[error("Dados inválidos: {0}")]
    InvalidInput(String),

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Transição inválida: {0}")]
    InvalidTransition(String),

    #[error("Verificação de documentos necessária (status atual: {})", .0.as_str())]
    VerificationRequired(VerificationStatus),

    #[error("Moedas insuficientes: necessário {required}, disponível {available}")]
    InsufficientCoins { required: i64, available: i64 },

    #[error("Pagamento recusado: {0}")]
    PaymentDeclined(String),

    #[error("Cupom recusado: {0}")]
    CouponRejected(String),
}

/// Intervalo de datas semiaberto `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start >= end {
            return Err(DomainError::InvalidRange(format!(
                "a data inicial ({}) deve ser anterior à data final ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Número de diárias cobertas pelo intervalo
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn ensure_not_in_past(&self, today: NaiveDate) -> Result<(), DomainError> {
        if self.start < today {
            return Err(DomainError::InvalidRange(format!(
                "a data inicial ({}) não pode estar no passado",
                self.start
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_range_rejects_empty_and_inverted() {
        assert!(matches!(
            DateRange::new(d(2025, 3, 10), d(2025, 3, 10)),
            Err(DomainError::InvalidRange(_))
        ));
        assert!(matches!(
            DateRange::new(d(2025, 3, 12), d(2025, 3, 10)),
            Err(DomainError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_half_open_ranges_touching_do_not_overlap() {
        let a = DateRange::new(d(2025, 3, 1), d(2025, 3, 5)).unwrap();
        let b = DateRange::new(d(2025, 3, 5), d(2025, 3, 8)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        let c = DateRange::new(d(2025, 3, 4), d(2025, 3, 6)).unwrap();
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_past_start_is_rejected() {
        let range = DateRange::new(d(2025, 3, 1), d(2025, 3, 5)).unwrap();
        assert!(range.ensure_not_in_past(d(2025, 3, 1)).is_ok());
        assert!(range.ensure_not_in_past(d(2025, 3, 2)).is_err());
        assert_eq!(range.days(), 4);
    }
}
