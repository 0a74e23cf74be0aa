//! Backend do alugae.mobi: aluguel de carros entre pessoas
//!
//! Reservas com disponibilidade e preço, contrato eletrônico via D4Sign,
//! verificação de documentos, pagamentos Stripe e desbloqueio de contato
//! com moedas.

pub mod clients;
pub mod config;
pub mod controllers;
pub mod database;
pub mod domain;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
