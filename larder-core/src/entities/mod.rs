//! Persisted entity types and the shared persistence contract.

pub mod audit;
pub mod location;
pub mod movement;
pub mod shopping;
pub mod stored_product;
pub mod template;

pub use audit::{AuditStamp, Persisted, Visibility};
pub use location::{LocationKind, NewStorageLocation, StorageLocation};
pub use movement::{MovementKind, NewMovement, ProductMovement};
pub use shopping::{
    NewShoppingList, NewShoppingListItem, ShoppingList, ShoppingListItem,
};
pub use stored_product::{validate_quantity, NewStoredProduct, StoredProduct};
pub use template::{NewProductTemplate, ProductKind, ProductTemplate};
