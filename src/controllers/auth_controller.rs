use validator::Validate;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::user::UserResponse;
use crate::services::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

pub struct AuthController {
    service: AuthService,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: AuthService::new(state.pool.clone(), JwtConfig::from(state.config.as_ref())),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<ApiResponse<AuthResponse>, AppError> {
        request.validate()?;
        let response = self.service.register(request).await?;
        Ok(ApiResponse::success_with_message(response, "Cadastro realizado com sucesso"))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<ApiResponse<AuthResponse>, AppError> {
        request.validate()?;
        let response = self.service.login(request).await?;
        Ok(ApiResponse::success(response))
    }

    pub async fn me(&self, user: AuthenticatedUser) -> Result<ApiResponse<UserResponse>, AppError> {
        Ok(ApiResponse::success(self.service.me(user.user_id).await?))
    }
}
