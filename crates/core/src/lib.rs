pub mod config;
pub mod domain;
pub mod errors;
pub mod store;

pub use domain::product::{
    Product, ProductCode, ProductDraft, ProductId, ProductPatch, ValidatedProduct,
};
pub use errors::{ApplicationError, DomainError};
pub use store::{CatalogStore, LoadOutcome};
