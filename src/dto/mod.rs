pub mod admin_dto;
pub mod auth_dto;
pub mod availability_dto;
pub mod booking_dto;
pub mod coin_dto;
pub mod contract_dto;
pub mod document_dto;
pub mod vehicle_dto;
pub mod webhook_dto;

use serde::Serialize;

// Envelope padrão das respostas de sucesso
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}
