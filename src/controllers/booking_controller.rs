use uuid::Uuid;
use validator::Validate;

use crate::domain::pricing::BookingQuote;
use crate::dto::booking_dto::{BookingRequest, CancelBookingRequest, CheckoutResponse};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::booking::Booking;
use crate::models::contract::Contract;
use crate::services::BookingService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct BookingController {
    service: BookingService,
}

impl BookingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: BookingService::new(state),
        }
    }

    pub async fn quote(&self, request: BookingRequest) -> Result<ApiResponse<BookingQuote>, AppError> {
        request.validate()?;
        Ok(ApiResponse::success(self.service.quote(&request).await?))
    }

    pub async fn create(
        &self,
        user: AuthenticatedUser,
        request: BookingRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        request.validate()?;
        let booking = self.service.create(user, request).await?;
        Ok(ApiResponse::success_with_message(
            booking,
            "Reserva criada, aguardando pagamento",
        ))
    }

    pub async fn list_mine(&self, user: AuthenticatedUser) -> Result<ApiResponse<Vec<Booking>>, AppError> {
        Ok(ApiResponse::success(self.service.list_mine(user).await?))
    }

    pub async fn get(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Booking>, AppError> {
        Ok(ApiResponse::success(self.service.get(user, id).await?))
    }

    pub async fn checkout(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<CheckoutResponse>, AppError> {
        Ok(ApiResponse::success(self.service.checkout(user, id).await?))
    }

    pub async fn confirm_payment(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Booking>, AppError> {
        let booking = self.service.confirm_payment(user, id).await?;
        Ok(ApiResponse::success_with_message(booking, "Pagamento confirmado"))
    }

    pub async fn generate_contract(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Contract>, AppError> {
        let contract = self.service.generate_contract(user, id).await?;
        Ok(ApiResponse::success_with_message(contract, "Contrato gerado"))
    }

    pub async fn cancel(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
        request: CancelBookingRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        request.validate()?;
        let booking = self.service.cancel(user, id, request.reason.as_deref()).await?;
        Ok(ApiResponse::success_with_message(booking, "Reserva cancelada"))
    }

    pub async fn complete(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Booking>, AppError> {
        let booking = self.service.complete(user, id).await?;
        Ok(ApiResponse::success_with_message(booking, "Reserva concluída"))
    }
}
