//! Configuração do projeto
//!
//! Este módulo contém a configuração do banco de dados, variáveis de ambiente
//! e credenciais das integrações.

pub mod database;
pub mod environment;

pub use environment::*;
