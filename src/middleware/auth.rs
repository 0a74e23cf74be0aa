//! Autenticação JWT
//!
//! O usuário autenticado é extraído por request a partir do header
//! `Authorization: Bearer <token>`; handlers que o declaram como argumento
//! respondem 401 sem token válido.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    models::user::UserRole,
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token, JwtConfig},
    },
};

/// Usuário autenticado da request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if !self.is_admin() {
            return Err(AppError::Forbidden(
                "Permissão de administrador necessária".to_string(),
            ));
        }
        Ok(())
    }

    /// Proprietário do recurso ou administrador
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.user_id != owner_id && !self.is_admin() {
            return Err(AppError::Forbidden(
                "Você não tem permissão para alterar este recurso".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn authenticate(auth_header: Option<&str>, config: &JwtConfig) -> Result<AuthenticatedUser, AppError> {
    let auth_header = auth_header
        .ok_or_else(|| AppError::Unauthorized("Token de autorização obrigatório".to_string()))?;
    let token = extract_token_from_header(auth_header)?;

    let claims = verify_token(token, config)
        .map_err(|_| AppError::Unauthorized("Token inválido ou expirado".to_string()))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de usuário inválido no token".to_string()))?;
    let role = UserRole::parse(&claims.role)
        .ok_or_else(|| AppError::Unauthorized("Papel de usuário inválido no token".to_string()))?;

    Ok(AuthenticatedUser { user_id, role })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        authenticate(auth_header, &JwtConfig::from(state.config.as_ref()))
    }
}

/// Extrator que só aceita administradores
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        user.require_admin()?;
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::generate_token;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "segredo-de-teste".to_string(),
            expiration: 3600,
        }
    }

    #[test]
    fn test_authenticate_valid_token() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, UserRole::Owner, &config()).unwrap();
        let header = format!("Bearer {}", token);

        let user = authenticate(Some(&header), &config()).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, UserRole::Owner);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_authenticate_rejects_missing_and_foreign_tokens() {
        assert!(matches!(authenticate(None, &config()), Err(AppError::Unauthorized(_))));

        let other = JwtConfig {
            secret: "outro-segredo".to_string(),
            expiration: 3600,
        };
        let token = generate_token(Uuid::new_v4(), UserRole::Renter, &other).unwrap();
        let header = format!("Bearer {}", token);
        assert!(matches!(
            authenticate(Some(&header), &config()),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_owner_or_admin_rule() {
        let owner = Uuid::new_v4();
        let renter = AuthenticatedUser { user_id: Uuid::new_v4(), role: UserRole::Renter };
        let admin = AuthenticatedUser { user_id: Uuid::new_v4(), role: UserRole::Admin };
        let same = AuthenticatedUser { user_id: owner, role: UserRole::Owner };

        assert!(renter.require_owner_or_admin(owner).is_err());
        assert!(admin.require_owner_or_admin(owner).is_ok());
        assert!(same.require_owner_or_admin(owner).is_ok());
        assert!(same.require_admin().is_err());
    }
}
