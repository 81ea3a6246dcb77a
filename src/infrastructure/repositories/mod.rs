//! Repository implementations using SeaORM

pub mod event_repository;
pub mod order_repository;
pub mod user_repository;

pub use event_repository::SeaOrmEventRepository;
pub use order_repository::SeaOrmOrderRepository;
pub use user_repository::SeaOrmUserRepository;
