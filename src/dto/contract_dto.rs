use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CancelContractRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}
