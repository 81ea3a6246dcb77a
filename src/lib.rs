pub mod api;
pub mod api_docs;
pub mod assistant;
pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod modules;

pub use infrastructure::auth;
pub use infrastructure::config;
pub use infrastructure::db;
pub use infrastructure::seed;
pub use infrastructure::server;
