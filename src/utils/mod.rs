//! Utilitários do sistema
//!
//! Tratamento de erros, validação, JWT e verificação de assinaturas de webhook.

pub mod errors;
pub mod jwt;
pub mod signature;
pub mod validation;
