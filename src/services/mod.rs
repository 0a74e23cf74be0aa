//! Services - regras de aplicação
//!
//! Orquestram repositórios, regras de domínio e provedores externos.

pub mod auth_service;
pub mod availability_service;
pub mod booking_service;
pub mod coin_service;
pub mod contract_service;
pub mod coupon_service;
pub mod document_service;
pub mod notification_service;
pub mod payment_service;
pub mod settings_service;
pub mod vehicle_service;

pub use auth_service::AuthService;
pub use availability_service::AvailabilityService;
pub use booking_service::BookingService;
pub use coin_service::CoinService;
pub use contract_service::ContractService;
pub use coupon_service::CouponService;
pub use document_service::DocumentService;
pub use notification_service::NotificationService;
pub use payment_service::PaymentWebhookService;
pub use settings_service::SettingsService;
pub use vehicle_service::VehicleService;
