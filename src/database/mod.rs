//! Módulo de banco de dados
//!
//! Conexão e migrations do PostgreSQL

pub mod connection;

pub use connection::{connect_and_migrate, mask_database_url};
