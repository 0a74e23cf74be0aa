//! Períodos de disponibilidade declarados pelo proprietário

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::availability::PeriodRule;
use crate::domain::DateRange;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AvailabilityPeriod {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_available: bool,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityPeriod {
    /// Linhas persistidas sempre respeitam `start_date < end_date` (CHECK na tabela).
    pub fn range(&self) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date).ok()
    }

    pub fn rule(&self) -> Option<PeriodRule> {
        self.range().map(|range| PeriodRule {
            id: Some(self.id),
            range,
            is_available: self.is_available,
        })
    }
}
