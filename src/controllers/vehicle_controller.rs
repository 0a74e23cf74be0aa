use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{
    ContactUnlockResponse, CreateVehicleRequest, UpdateVehicleRequest, VehicleListResponse,
};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::vehicle::{Vehicle, VehicleFilters};
use crate::services::{CoinService, VehicleService};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct VehicleController {
    service: VehicleService,
    coins: CoinService,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: VehicleService::new(state.pool.clone()),
            coins: CoinService::new(state.pool.clone(), state.providers.payments.clone()),
        }
    }

    pub async fn create(
        &self,
        user: AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;
        let vehicle = self.service.create(user, request).await?;
        Ok(ApiResponse::success_with_message(
            vehicle,
            "Veículo cadastrado, aguardando aprovação",
        ))
    }

    pub async fn list(&self, filters: VehicleFilters) -> Result<ApiResponse<VehicleListResponse>, AppError> {
        let vehicles = self.service.list_public(&filters).await?;
        Ok(ApiResponse::success(VehicleListResponse {
            count: vehicles.len(),
            vehicles,
        }))
    }

    pub async fn list_mine(&self, user: AuthenticatedUser) -> Result<ApiResponse<VehicleListResponse>, AppError> {
        let vehicles = self.service.list_mine(user).await?;
        Ok(ApiResponse::success(VehicleListResponse {
            count: vehicles.len(),
            vehicles,
        }))
    }

    pub async fn get(&self, viewer: Option<AuthenticatedUser>, id: Uuid) -> Result<ApiResponse<Vehicle>, AppError> {
        Ok(ApiResponse::success(self.service.get(viewer, id).await?))
    }

    pub async fn update(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;
        let vehicle = self.service.update(user, id, request).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Veículo atualizado"))
    }

    pub async fn set_available(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
        is_available: bool,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        let vehicle = self.service.set_available(user, id, is_available).await?;
        Ok(ApiResponse::success(vehicle))
    }

    pub async fn unlock_contact(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
    ) -> Result<ApiResponse<ContactUnlockResponse>, AppError> {
        let unlock = self.coins.unlock_contact(user, id).await?;
        let message = if unlock.coins_charged > 0 {
            format!("Contato desbloqueado por {} moedas", unlock.coins_charged)
        } else {
            "Contato já desbloqueado".to_string()
        };
        Ok(ApiResponse::success_with_message(unlock, message))
    }
}
