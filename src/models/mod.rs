//! Modelos do sistema
//!
//! Este módulo contém todos os modelos de dados que mapeiam exatamente
//! o schema PostgreSQL definido em `migrations/`.

pub mod availability;
pub mod booking;
pub mod coins;
pub mod contract;
pub mod coupon;
pub mod document;
pub mod settings;
pub mod user;
pub mod vehicle;
