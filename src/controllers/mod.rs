pub mod admin_controller;
pub mod auth_controller;
pub mod availability_controller;
pub mod booking_controller;
pub mod coin_controller;
pub mod contract_controller;
pub mod document_controller;
pub mod vehicle_controller;
pub mod webhook_controller;
