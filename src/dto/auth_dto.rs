use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::{UserResponse, UserRole};
use crate::utils::validation::validate_phone;

// Cadastro de usuário
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 100))]
    pub password: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    /// `renter` (padrão) ou `owner`; administradores não se cadastram
    pub role: Option<UserRole>,
}

// Login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

// Token emitido no login/cadastro
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: UserResponse,
}
