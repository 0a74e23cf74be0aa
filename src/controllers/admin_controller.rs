use uuid::Uuid;
use validator::Validate;

use crate::domain::verification::ReviewDecision;
use crate::dto::admin_dto::{CreateCouponRequest, UpdateSettingsRequest};
use crate::dto::document_dto::RejectDocumentRequest;
use crate::dto::vehicle_dto::ReviewVehicleRequest;
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::coupon::Coupon;
use crate::models::document::UserDocument;
use crate::models::settings::AdminSettings;
use crate::models::vehicle::Vehicle;
use crate::services::{CouponService, DocumentService, SettingsService, VehicleService};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct AdminController {
    settings: SettingsService,
    coupons: CouponService,
    vehicles: VehicleService,
    documents: DocumentService,
}

impl AdminController {
    pub fn new(state: &AppState) -> Self {
        Self {
            settings: SettingsService::new(state.pool.clone()),
            coupons: CouponService::new(state.pool.clone()),
            vehicles: VehicleService::new(state.pool.clone()),
            documents: DocumentService::new(state),
        }
    }

    pub async fn settings(&self) -> Result<ApiResponse<AdminSettings>, AppError> {
        Ok(ApiResponse::success(self.settings.current().await?))
    }

    pub async fn update_settings(&self, request: UpdateSettingsRequest) -> Result<ApiResponse<AdminSettings>, AppError> {
        request.validate()?;
        let settings = self.settings.update(request.into()).await?;
        Ok(ApiResponse::success_with_message(settings, "Configurações atualizadas"))
    }

    pub async fn coupons(&self) -> Result<ApiResponse<Vec<Coupon>>, AppError> {
        Ok(ApiResponse::success(self.coupons.list().await?))
    }

    pub async fn create_coupon(
        &self,
        admin: AuthenticatedUser,
        request: CreateCouponRequest,
    ) -> Result<ApiResponse<Coupon>, AppError> {
        request.validate()?;
        let coupon = self.coupons.create(admin, request).await?;
        Ok(ApiResponse::success_with_message(coupon, "Cupom criado"))
    }

    pub async fn set_coupon_active(&self, id: Uuid, is_active: bool) -> Result<ApiResponse<Coupon>, AppError> {
        Ok(ApiResponse::success(self.coupons.set_active(id, is_active).await?))
    }

    pub async fn pending_vehicles(&self) -> Result<ApiResponse<Vec<Vehicle>>, AppError> {
        Ok(ApiResponse::success(self.vehicles.list_pending().await?))
    }

    pub async fn approve_vehicle(&self, admin: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Vehicle>, AppError> {
        let vehicle = self.vehicles.approve(admin, id).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Veículo aprovado"))
    }

    pub async fn reject_vehicle(
        &self,
        admin: AuthenticatedUser,
        id: Uuid,
        request: ReviewVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;
        let vehicle = self.vehicles.reject(admin, id, request.reason.as_deref()).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Veículo rejeitado"))
    }

    pub async fn pending_documents(&self) -> Result<ApiResponse<Vec<UserDocument>>, AppError> {
        Ok(ApiResponse::success(self.documents.list_pending().await?))
    }

    pub async fn approve_document(&self, admin: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<UserDocument>, AppError> {
        let document = self.documents.review(admin, id, ReviewDecision::Approve).await?;
        Ok(ApiResponse::success_with_message(document, "Documento aprovado"))
    }

    pub async fn reject_document(
        &self,
        admin: AuthenticatedUser,
        id: Uuid,
        request: RejectDocumentRequest,
    ) -> Result<ApiResponse<UserDocument>, AppError> {
        request.validate()?;
        let document = self
            .documents
            .review(admin, id, ReviewDecision::Reject { reason: request.reason })
            .await?;
        Ok(ApiResponse::success_with_message(document, "Documento rejeitado"))
    }
}
