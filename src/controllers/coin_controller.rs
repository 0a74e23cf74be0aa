use validator::Validate;

use crate::domain::contact_unlock::COIN_PACKAGES;
use crate::dto::booking_dto::CheckoutResponse;
use crate::dto::coin_dto::{ConfirmPurchaseRequest, PackageResponse, PurchaseCoinsRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::coins::{CoinTransaction, CoinWallet, ContactUnlock};
use crate::services::CoinService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct CoinController {
    service: CoinService,
}

impl CoinController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: CoinService::new(state.pool.clone(), state.providers.payments.clone()),
        }
    }

    pub fn packages() -> ApiResponse<Vec<PackageResponse>> {
        ApiResponse::success(COIN_PACKAGES.iter().copied().map(PackageResponse::from).collect())
    }

    pub async fn wallet(&self, user: AuthenticatedUser) -> Result<ApiResponse<CoinWallet>, AppError> {
        Ok(ApiResponse::success(self.service.wallet(user).await?))
    }

    pub async fn transactions(&self, user: AuthenticatedUser) -> Result<ApiResponse<Vec<CoinTransaction>>, AppError> {
        Ok(ApiResponse::success(self.service.transactions(user).await?))
    }

    pub async fn unlocks(&self, user: AuthenticatedUser) -> Result<ApiResponse<Vec<ContactUnlock>>, AppError> {
        Ok(ApiResponse::success(self.service.unlocks(user).await?))
    }

    pub async fn purchase(
        &self,
        user: AuthenticatedUser,
        request: PurchaseCoinsRequest,
    ) -> Result<ApiResponse<CheckoutResponse>, AppError> {
        request.validate()?;
        Ok(ApiResponse::success(self.service.purchase(user, request.package_id.trim()).await?))
    }

    pub async fn confirm_purchase(
        &self,
        user: AuthenticatedUser,
        request: ConfirmPurchaseRequest,
    ) -> Result<ApiResponse<CoinWallet>, AppError> {
        request.validate()?;
        let wallet = self
            .service
            .confirm_purchase(user, request.payment_intent_id.trim())
            .await?;
        Ok(ApiResponse::success_with_message(wallet, "Moedas creditadas"))
    }
}
