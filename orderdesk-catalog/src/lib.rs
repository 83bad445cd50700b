pub mod product;
pub mod inventory;

pub use product::{Product, QuantityUpdate};
pub use inventory::{StockError, StockSnapshot, ReservedLine};
