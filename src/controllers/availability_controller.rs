use uuid::Uuid;
use validator::Validate;

use crate::dto::availability_dto::{
    AvailabilityCheckResponse, AvailabilityQuery, PeriodRequest, VehicleCalendarResponse,
};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::availability::AvailabilityPeriod;
use crate::services::AvailabilityService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AvailabilityController {
    service: AvailabilityService,
}

impl AvailabilityController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: AvailabilityService::new(state.pool.clone()),
        }
    }

    pub async fn check(
        &self,
        vehicle_id: Uuid,
        query: AvailabilityQuery,
    ) -> Result<ApiResponse<AvailabilityCheckResponse>, AppError> {
        let result = self.service.check(vehicle_id, query.start_date, query.end_date).await?;
        Ok(ApiResponse::success(result))
    }

    pub async fn calendar(&self, vehicle_id: Uuid) -> Result<ApiResponse<VehicleCalendarResponse>, AppError> {
        Ok(ApiResponse::success(self.service.calendar(vehicle_id).await?))
    }

    pub async fn create_period(
        &self,
        user: AuthenticatedUser,
        vehicle_id: Uuid,
        request: PeriodRequest,
    ) -> Result<ApiResponse<AvailabilityPeriod>, AppError> {
        request.validate()?;
        let period = self.service.create_period(user, vehicle_id, request).await?;
        Ok(ApiResponse::success_with_message(period, "Período registrado"))
    }

    pub async fn update_period(
        &self,
        user: AuthenticatedUser,
        vehicle_id: Uuid,
        period_id: Uuid,
        request: PeriodRequest,
    ) -> Result<ApiResponse<AvailabilityPeriod>, AppError> {
        request.validate()?;
        let period = self
            .service
            .update_period(user, vehicle_id, period_id, request)
            .await?;
        Ok(ApiResponse::success(period))
    }

    pub async fn delete_period(
        &self,
        user: AuthenticatedUser,
        vehicle_id: Uuid,
        period_id: Uuid,
    ) -> Result<ApiResponse<()>, AppError> {
        self.service.delete_period(user, vehicle_id, period_id).await?;
        Ok(ApiResponse::message("Período removido"))
    }
}
