use crate::services::payment_service::WebhookAck;
use crate::services::PaymentWebhookService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct WebhookController {
    service: PaymentWebhookService,
    state: AppState,
}

impl WebhookController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: PaymentWebhookService::new(state),
            state: state.clone(),
        }
    }

    pub async fn stripe(&self, payload: &[u8], signature: Option<&str>) -> Result<WebhookAck, AppError> {
        self.service
            .handle_stripe(&self.state.config, payload, signature)
            .await
    }

    pub async fn d4sign(&self, payload: &[u8], signature: Option<&str>) -> Result<WebhookAck, AppError> {
        self.service
            .handle_d4sign(&self.state.config, payload, signature)
            .await
    }
}
