//! Disponibilidade de veículos
//!
//! Leitura pura sobre reservas confirmadas e períodos do proprietário. A
//! confirmação de pagamento repete a checagem dentro de uma transação
//! SERIALIZABLE (ver `BookingService`).

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::availability::{check_range, ensure_booking_length, ensure_period_does_not_overlap, PeriodRule};
use crate::domain::{DateRange, DomainError};
use crate::dto::availability_dto::{
    AvailabilityCheckResponse, BookedRange, PeriodRequest, VehicleCalendarResponse,
};
use crate::middleware::AuthenticatedUser;
use crate::models::availability::AvailabilityPeriod;
use crate::models::settings::AdminSettings;
use crate::models::vehicle::Vehicle;
use crate::repositories::{AvailabilityRepository, BookingRepository, VehicleRepository};
use crate::utils::errors::{not_found_error, AppError};

pub struct AvailabilityService {
    vehicles: VehicleRepository,
    periods: AvailabilityRepository,
    bookings: BookingRepository,
}

pub(crate) fn confirmed_to_ranges(rows: Vec<(NaiveDate, NaiveDate)>) -> Vec<DateRange> {
    rows.into_iter()
        .filter_map(|(start, end)| DateRange::new(start, end).ok())
        .collect()
}

pub(crate) fn period_rules(periods: &[AvailabilityPeriod]) -> Vec<PeriodRule> {
    periods.iter().filter_map(AvailabilityPeriod::rule).collect()
}

/// Intervalo pedido: `start < end` e início não anterior a hoje (UTC)
pub fn requested_range(start: NaiveDate, end: NaiveDate) -> Result<DateRange, DomainError> {
    let range = DateRange::new(start, end)?;
    range.ensure_not_in_past(Utc::now().date_naive())?;
    Ok(range)
}

pub fn ensure_bookable(vehicle: &Vehicle) -> Result<(), DomainError> {
    if !vehicle.is_bookable() {
        return Err(DomainError::Conflict(
            "veículo não está disponível para reservas".to_string(),
        ));
    }
    Ok(())
}

impl AvailabilityService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicles: VehicleRepository::new(pool.clone()),
            periods: AvailabilityRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool),
        }
    }

    async fn vehicle(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    /// Valida o intervalo completo para uma nova reserva
    pub async fn ensure_available(
        &self,
        vehicle: &Vehicle,
        range: &DateRange,
        settings: &AdminSettings,
    ) -> Result<(), AppError> {
        ensure_bookable(vehicle)?;
        ensure_booking_length(range, settings.minimum_booking_days, settings.maximum_booking_days)?;

        let confirmed = confirmed_to_ranges(self.bookings.confirmed_ranges(vehicle.id).await?);
        let periods = self.periods.list_for_vehicle(vehicle.id).await?;
        check_range(range, &confirmed, &period_rules(&periods))?;
        Ok(())
    }

    /// Consulta pública; regras violadas viram `available: false` com o motivo
    pub async fn check(
        &self,
        vehicle_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AvailabilityCheckResponse, AppError> {
        let range = requested_range(start, end)?;
        let vehicle = self.vehicle(vehicle_id).await?;

        let verdict = match ensure_bookable(&vehicle) {
            Ok(()) => {
                let confirmed = confirmed_to_ranges(self.bookings.confirmed_ranges(vehicle_id).await?);
                let periods = self.periods.list_for_vehicle(vehicle_id).await?;
                check_range(&range, &confirmed, &period_rules(&periods))
            }
            Err(e) => Err(e),
        };

        Ok(AvailabilityCheckResponse {
            vehicle_id,
            start_date: start,
            end_date: end,
            available: verdict.is_ok(),
            reason: verdict.err().map(|e| e.to_string()),
        })
    }

    pub async fn calendar(&self, vehicle_id: Uuid) -> Result<VehicleCalendarResponse, AppError> {
        self.vehicle(vehicle_id).await?;
        let periods = self.periods.list_for_vehicle(vehicle_id).await?;
        let booked = self
            .bookings
            .confirmed_ranges(vehicle_id)
            .await?
            .into_iter()
            .map(|(start_date, end_date)| BookedRange { start_date, end_date })
            .collect();
        Ok(VehicleCalendarResponse { periods, booked })
    }

    pub async fn create_period(
        &self,
        user: AuthenticatedUser,
        vehicle_id: Uuid,
        request: PeriodRequest,
    ) -> Result<AvailabilityPeriod, AppError> {
        let vehicle = self.vehicle(vehicle_id).await?;
        user.require_owner_or_admin(vehicle.owner_id)?;

        let range = DateRange::new(request.start_date, request.end_date)?;
        let existing = self.periods.list_for_vehicle(vehicle_id).await?;
        ensure_period_does_not_overlap(&range, &period_rules(&existing), None)?;

        let period = self
            .periods
            .create(vehicle_id, range, request.is_available, request.reason.as_deref())
            .await?;
        tracing::info!(
            "📅 Período {} a {} ({}) no veículo {}",
            range.start(),
            range.end(),
            if request.is_available { "disponível" } else { "bloqueado" },
            vehicle_id
        );
        Ok(period)
    }

    pub async fn update_period(
        &self,
        user: AuthenticatedUser,
        vehicle_id: Uuid,
        period_id: Uuid,
        request: PeriodRequest,
    ) -> Result<AvailabilityPeriod, AppError> {
        let vehicle = self.vehicle(vehicle_id).await?;
        user.require_owner_or_admin(vehicle.owner_id)?;
        self.period_of(vehicle_id, period_id).await?;

        let range = DateRange::new(request.start_date, request.end_date)?;
        let existing = self.periods.list_for_vehicle(vehicle_id).await?;
        ensure_period_does_not_overlap(&range, &period_rules(&existing), Some(period_id))?;

        self.periods
            .update(period_id, range, request.is_available, request.reason.as_deref())
            .await
    }

    pub async fn delete_period(&self, user: AuthenticatedUser, vehicle_id: Uuid, period_id: Uuid) -> Result<(), AppError> {
        let vehicle = self.vehicle(vehicle_id).await?;
        user.require_owner_or_admin(vehicle.owner_id)?;
        self.period_of(vehicle_id, period_id).await?;
        self.periods.delete(period_id).await?;
        Ok(())
    }

    async fn period_of(&self, vehicle_id: Uuid, period_id: Uuid) -> Result<AvailabilityPeriod, AppError> {
        self.periods
            .find_by_id(period_id)
            .await?
            .filter(|p| p.vehicle_id == vehicle_id)
            .ok_or_else(|| not_found_error("AvailabilityPeriod", period_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_requested_range_rejects_past_and_inverted() {
        let today = Utc::now().date_naive();
        assert!(requested_range(today, today + Duration::days(2)).is_ok());
        assert!(matches!(
            requested_range(today - Duration::days(1), today + Duration::days(2)),
            Err(DomainError::InvalidRange(_))
        ));
        assert!(matches!(
            requested_range(today + Duration::days(3), today + Duration::days(1)),
            Err(DomainError::InvalidRange(_))
        ));
    }
}
