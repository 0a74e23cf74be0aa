pub mod availability_repository;
pub mod booking_repository;
pub mod coin_repository;
pub mod contract_repository;
pub mod coupon_repository;
pub mod document_repository;
pub mod settings_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use availability_repository::AvailabilityRepository;
pub use booking_repository::BookingRepository;
pub use coin_repository::CoinRepository;
pub use contract_repository::ContractRepository;
pub use coupon_repository::CouponRepository;
pub use document_repository::DocumentRepository;
pub use settings_repository::SettingsRepository;
pub use user_repository::UserRepository;
pub use vehicle_repository::VehicleRepository;
