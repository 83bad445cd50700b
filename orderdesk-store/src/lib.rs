pub mod app_config;
pub mod database;
pub mod transaction;
pub mod customer_repo;
pub mod catalog_repo;
pub mod order_repo;
pub mod memory;

pub use database::DbClient;
pub use transaction::PgOrderTransaction;
pub use memory::InMemoryStore;
