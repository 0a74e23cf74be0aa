//! Anúncios de veículos: cadastro pelo proprietário, aprovação pelo admin

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::user::UserRole;
use crate::models::vehicle::{ApprovalStatus, DepositType, Vehicle, VehicleFilters};
use crate::repositories::vehicle_repository::{NewVehicle, VehicleChanges};
use crate::repositories::VehicleRepository;
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::validation::normalize_license_plate;

/// Caução padrão: 20% do valor base
const DEFAULT_DEPOSIT_PERCENTAGE: i64 = 20;

pub struct VehicleService {
    repository: VehicleRepository,
}

impl VehicleService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    pub async fn create(&self, user: AuthenticatedUser, request: CreateVehicleRequest) -> Result<Vehicle, AppError> {
        if user.role == UserRole::Renter {
            return Err(AppError::Forbidden(
                "Apenas proprietários podem anunciar veículos".to_string(),
            ));
        }
        ensure_positive_price(request.price_per_day)?;
        let deposit_type = request.deposit_type.unwrap_or(DepositType::Percentage);
        let deposit_value = request
            .deposit_value
            .unwrap_or_else(|| Decimal::from(DEFAULT_DEPOSIT_PERCENTAGE));
        ensure_deposit(deposit_type, deposit_value)?;

        let license_plate = normalize_license_plate(&request.license_plate);
        if self.repository.license_plate_exists(&license_plate).await? {
            return Err(AppError::Conflict("Placa já cadastrada".to_string()));
        }

        let vehicle = self
            .repository
            .create(
                user.user_id,
                NewVehicle {
                    brand: request.brand.trim().to_string(),
                    model: request.model.trim().to_string(),
                    year: request.year,
                    license_plate,
                    location: request.location.trim().to_string(),
                    price_per_day: request.price_per_day,
                    deposit_type,
                    deposit_value,
                },
            )
            .await?;

        tracing::info!("🚗 Veículo {} cadastrado por {} (aguardando aprovação)", vehicle.id, user.user_id);
        Ok(vehicle)
    }

    pub async fn find(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    /// Anúncios não aprovados só são visíveis ao dono e aos admins
    pub async fn get(&self, viewer: Option<AuthenticatedUser>, id: Uuid) -> Result<Vehicle, AppError> {
        let vehicle = self.find(id).await?;
        let privileged = viewer.map_or(false, |u| u.user_id == vehicle.owner_id || u.is_admin());
        if vehicle.approval_status != ApprovalStatus::Approved && !privileged {
            return Err(not_found_error("Vehicle", id));
        }
        Ok(vehicle)
    }

    pub async fn list_public(&self, filters: &VehicleFilters) -> Result<Vec<Vehicle>, AppError> {
        self.repository.list_public(filters).await
    }

    pub async fn list_mine(&self, user: AuthenticatedUser) -> Result<Vec<Vehicle>, AppError> {
        self.repository.list_by_owner(user.user_id).await
    }

    pub async fn list_pending(&self) -> Result<Vec<Vehicle>, AppError> {
        self.repository.list_by_approval(ApprovalStatus::Pending).await
    }

    pub async fn update(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<Vehicle, AppError> {
        let vehicle = self.find(id).await?;
        user.require_owner_or_admin(vehicle.owner_id)?;

        if let Some(price) = request.price_per_day {
            ensure_positive_price(price)?;
        }
        ensure_deposit(
            request.deposit_type.unwrap_or(vehicle.deposit_type),
            request.deposit_value.unwrap_or(vehicle.deposit_value),
        )?;

        self.repository
            .update(
                id,
                VehicleChanges {
                    brand: request.brand.map(|s| s.trim().to_string()),
                    model: request.model.map(|s| s.trim().to_string()),
                    year: request.year,
                    location: request.location.map(|s| s.trim().to_string()),
                    price_per_day: request.price_per_day,
                    deposit_type: request.deposit_type,
                    deposit_value: request.deposit_value,
                },
            )
            .await
    }

    pub async fn set_available(&self, user: AuthenticatedUser, id: Uuid, is_available: bool) -> Result<Vehicle, AppError> {
        let vehicle = self.find(id).await?;
        user.require_owner_or_admin(vehicle.owner_id)?;
        let updated = self.repository.set_available(id, is_available).await?;
        tracing::info!("🚗 Veículo {} is_available={}", id, is_available);
        Ok(updated)
    }

    pub async fn approve(&self, admin: AuthenticatedUser, id: Uuid) -> Result<Vehicle, AppError> {
        let vehicle = self.find(id).await?;
        if vehicle.approval_status == ApprovalStatus::Approved {
            return Err(DomainError::Conflict("veículo já aprovado".to_string()).into());
        }
        let updated = self
            .repository
            .review(id, ApprovalStatus::Approved, None, admin.user_id)
            .await?;
        tracing::info!("✅ Veículo {} aprovado por {}", id, admin.user_id);
        Ok(updated)
    }

    pub async fn reject(&self, admin: AuthenticatedUser, id: Uuid, reason: Option<&str>) -> Result<Vehicle, AppError> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty()).ok_or_else(|| {
            DomainError::InvalidInput("o motivo da rejeição é obrigatório".to_string())
        })?;
        self.find(id).await?;
        let updated = self
            .repository
            .review(id, ApprovalStatus::Rejected, Some(reason), admin.user_id)
            .await?;
        tracing::info!("🚫 Veículo {} rejeitado por {}: {}", id, admin.user_id, reason);
        Ok(updated)
    }
}

fn ensure_positive_price(price: Decimal) -> Result<(), DomainError> {
    if price <= Decimal::ZERO {
        return Err(DomainError::InvalidInput(
            "o valor da diária deve ser positivo".to_string(),
        ));
    }
    Ok(())
}

fn ensure_deposit(deposit_type: DepositType, value: Decimal) -> Result<(), DomainError> {
    if value < Decimal::ZERO {
        return Err(DomainError::InvalidInput("a caução não pode ser negativa".to_string()));
    }
    if deposit_type == DepositType::Percentage && value > Decimal::ONE_HUNDRED {
        return Err(DomainError::InvalidInput(
            "a caução percentual não pode passar de 100%".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_rules() {
        assert!(ensure_deposit(DepositType::Percentage, Decimal::from(20)).is_ok());
        assert!(ensure_deposit(DepositType::Percentage, Decimal::from(101)).is_err());
        assert!(ensure_deposit(DepositType::Fixed, Decimal::from(1500)).is_ok());
        assert!(ensure_deposit(DepositType::Fixed, Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(ensure_positive_price(Decimal::ZERO).is_err());
        assert!(ensure_positive_price(Decimal::new(9990, 2)).is_ok());
    }
}
