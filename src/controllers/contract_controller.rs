use uuid::Uuid;
use validator::Validate;

use crate::dto::contract_dto::CancelContractRequest;
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::contract::{Contract, ContractEvent, ContractFile};
use crate::services::ContractService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct ContractController {
    service: ContractService,
}

impl ContractController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: ContractService::new(state),
        }
    }

    pub async fn list_mine(&self, user: AuthenticatedUser) -> Result<ApiResponse<Vec<Contract>>, AppError> {
        Ok(ApiResponse::success(self.service.list_mine(user).await?))
    }

    pub async fn get(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Contract>, AppError> {
        Ok(ApiResponse::success(self.service.get(user, id).await?))
    }

    pub async fn get_by_booking(&self, user: AuthenticatedUser, booking_id: Uuid) -> Result<ApiResponse<Contract>, AppError> {
        Ok(ApiResponse::success(self.service.get_by_booking(user, booking_id).await?))
    }

    pub async fn send(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Contract>, AppError> {
        let contract = self.service.send(user, id).await?;
        Ok(ApiResponse::success_with_message(contract, "Contrato enviado para assinatura"))
    }

    pub async fn cancel(
        &self,
        user: AuthenticatedUser,
        id: Uuid,
        request: CancelContractRequest,
    ) -> Result<ApiResponse<Contract>, AppError> {
        request.validate()?;
        let contract = self.service.cancel(user, id, request.reason.trim()).await?;
        Ok(ApiResponse::success_with_message(contract, "Contrato cancelado"))
    }

    pub async fn reconcile(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Contract>, AppError> {
        Ok(ApiResponse::success(self.service.reconcile(user, id).await?))
    }

    pub async fn events(&self, user: AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Vec<ContractEvent>>, AppError> {
        Ok(ApiResponse::success(self.service.events(user, id).await?))
    }

    pub async fn pdf(&self, user: AuthenticatedUser, id: Uuid) -> Result<ContractFile, AppError> {
        self.service.unsigned_pdf(user, id).await
    }

    pub async fn signed_pdf(&self, user: AuthenticatedUser, id: Uuid) -> Result<ContractFile, AppError> {
        self.service.signed_pdf(user, id).await
    }
}
