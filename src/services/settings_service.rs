//! Configurações administrativas (taxas e limites de reserva)

use sqlx::PgPool;

use crate::domain::pricing::FeePolicy;
use crate::domain::DomainError;
use crate::models::settings::AdminSettings;
use crate::repositories::settings_repository::{SettingsChanges, SettingsRepository};
use crate::utils::errors::AppError;

/// Limite superior de duração configurável
const MAX_BOOKING_DAYS_CAP: i32 = 365;

pub struct SettingsService {
    repository: SettingsRepository,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: SettingsRepository::new(pool),
        }
    }

    /// Carrega e valida a política vigente
    pub async fn current(&self) -> Result<AdminSettings, AppError> {
        let settings = self.repository.get().await?;
        validate(&settings).map_err(|e| {
            tracing::error!("❌ Configurações administrativas inválidas no banco: {}", e);
            AppError::Internal(format!("configurações inválidas: {}", e))
        })?;
        Ok(settings)
    }

    pub async fn update(&self, changes: SettingsChanges) -> Result<AdminSettings, AppError> {
        let current = self.repository.get().await?;
        let merged = merge(&current, &changes);
        validate(&merged)?;

        let updated = self.repository.update(changes).await?;
        tracing::info!(
            "⚙️ Configurações atualizadas: serviço {}%, seguro {}%, {}-{} dias",
            updated.service_fee_percentage,
            updated.insurance_fee_percentage,
            updated.minimum_booking_days,
            updated.maximum_booking_days
        );
        Ok(updated)
    }
}

fn merge(current: &AdminSettings, changes: &SettingsChanges) -> AdminSettings {
    AdminSettings {
        service_fee_percentage: changes
            .service_fee_percentage
            .unwrap_or(current.service_fee_percentage),
        insurance_fee_percentage: changes
            .insurance_fee_percentage
            .unwrap_or(current.insurance_fee_percentage),
        minimum_booking_days: changes.minimum_booking_days.unwrap_or(current.minimum_booking_days),
        maximum_booking_days: changes.maximum_booking_days.unwrap_or(current.maximum_booking_days),
        cancellation_policy_days: changes
            .cancellation_policy_days
            .unwrap_or(current.cancellation_policy_days),
        currency: changes.currency.clone().unwrap_or_else(|| current.currency.clone()),
        updated_at: current.updated_at,
    }
}

pub fn validate(settings: &AdminSettings) -> Result<(), DomainError> {
    FeePolicy {
        service_fee_pct: settings.service_fee_percentage,
        insurance_fee_pct: settings.insurance_fee_percentage,
    }
    .validate()?;

    if settings.minimum_booking_days < 1 {
        return Err(DomainError::InvalidInput(
            "a duração mínima deve ser de pelo menos 1 dia".to_string(),
        ));
    }
    if settings.maximum_booking_days < settings.minimum_booking_days
        || settings.maximum_booking_days > MAX_BOOKING_DAYS_CAP
    {
        return Err(DomainError::InvalidInput(format!(
            "a duração máxima deve estar entre {} e {} dias",
            settings.minimum_booking_days, MAX_BOOKING_DAYS_CAP
        )));
    }
    if settings.cancellation_policy_days < 0 {
        return Err(DomainError::InvalidInput(
            "o prazo de cancelamento não pode ser negativo".to_string(),
        ));
    }
    if settings.currency.len() != 3 || !settings.currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(DomainError::InvalidInput(
            "a moeda deve ser um código ISO de 3 letras".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&AdminSettings::default()).is_ok());
    }

    #[test]
    fn test_fee_bounds_are_enforced() {
        let settings = merge(
            &AdminSettings::default(),
            &SettingsChanges {
                service_fee_percentage: Some(Decimal::new(51, 0)),
                ..Default::default()
            },
        );
        assert!(matches!(validate(&settings), Err(DomainError::InvalidInput(_))));

        let settings = merge(
            &AdminSettings::default(),
            &SettingsChanges {
                insurance_fee_percentage: Some(Decimal::new(3001, 2)),
                ..Default::default()
            },
        );
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_booking_day_limits() {
        let inverted = merge(
            &AdminSettings::default(),
            &SettingsChanges {
                minimum_booking_days: Some(10),
                maximum_booking_days: Some(5),
                ..Default::default()
            },
        );
        assert!(validate(&inverted).is_err());

        let partial = merge(
            &AdminSettings::default(),
            &SettingsChanges {
                maximum_booking_days: Some(60),
                ..Default::default()
            },
        );
        assert!(validate(&partial).is_ok());
        assert_eq!(partial.minimum_booking_days, 1);
    }
}
