use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::contact_unlock::CoinPackage;

#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseCoinsRequest {
    #[validate(length(min = 1, max = 20))]
    pub package_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmPurchaseRequest {
    #[validate(length(min = 1, max = 255))]
    pub payment_intent_id: String,
}

#[derive(Debug, Serialize)]
pub struct PackageResponse {
    #[serde(flatten)]
    pub package: CoinPackage,
    pub price: rust_decimal::Decimal,
}

impl From<CoinPackage> for PackageResponse {
    fn from(package: CoinPackage) -> Self {
        Self {
            price: package.price(),
            package,
        }
    }
}
