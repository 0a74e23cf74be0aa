//! Cadastro e login
//!
//! Senhas com bcrypt; sessões stateless via JWT HS256.

use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::models::user::{UserResponse, UserRole};
use crate::repositories::UserRepository;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};

pub struct AuthService {
    users: UserRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        let role = request.role.unwrap_or(UserRole::Renter);
        if role == UserRole::Admin {
            return Err(AppError::Forbidden(
                "Não é possível se cadastrar como administrador".to_string(),
            ));
        }

        let email = request.email.trim().to_lowercase();
        if self.users.email_exists(&email).await? {
            return Err(AppError::Conflict("E-mail já cadastrado".to_string()));
        }

        let password_hash = hash_password(&request.password).await?;
        let user = self
            .users
            .create(
                request.name.trim(),
                &email,
                &password_hash,
                request.phone.as_deref(),
                role,
            )
            .await?;

        tracing::info!("👤 Novo usuário {} ({})", user.id, role.as_str());
        self.issue(user.into())
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let invalid = || AppError::Unauthorized("Credenciais inválidas".to_string());

        let user = self
            .users
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &user.password_hash).await? {
            tracing::warn!("🔒 Senha incorreta para o usuário {}", user.id);
            return Err(invalid());
        }

        tracing::info!("🔑 Login do usuário {}", user.id);
        self.issue(user.into())
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuário não encontrado".to_string()))?;
        Ok(user.into())
    }

    fn issue(&self, user: UserResponse) -> Result<AuthResponse, AppError> {
        let token = generate_token(user.id, user.role, &self.jwt)?;
        Ok(AuthResponse {
            token,
            token_type: "Bearer",
            expires_in: self.jwt.expiration,
            user,
        })
    }
}

/// bcrypt é CPU-bound; roda fora do executor assíncrono
async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("tarefa de hash abortada: {}", e)))?
        .map_err(|e| AppError::Hash(e.to_string()))
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("tarefa de hash abortada: {}", e)))?
        .map_err(|e| AppError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_password_hash_round_trip() {
        let hashed = hash_password("senha-forte-123").await.unwrap();
        assert!(verify_password("senha-forte-123", &hashed).await.unwrap());
        assert!(!verify_password("outra-senha", &hashed).await.unwrap());
    }
}
