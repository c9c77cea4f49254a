//! Storage traits the engine implements and callers consume.

pub mod catalog;
pub mod shopping;
pub mod stock;

pub use catalog::ICatalogStore;
pub use shopping::IShoppingStore;
pub use stock::{IStockStore, LowStockEntry, MoveReceipt};
