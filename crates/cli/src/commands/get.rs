use catalog_core::config::LoadOptions;
use catalog_core::{ApplicationError, ProductId};

use crate::commands::{open_store, CommandResult};

pub fn run(options: &LoadOptions, id: u64) -> CommandResult {
    let store = match open_store("get", options) {
        Ok(store) => store,
        Err(result) => return result,
    };

    match store.require(ProductId(id)) {
        Ok(product) => CommandResult::success_with_data("get", format!("product {id}"), product),
        Err(error) => CommandResult::from_error("get", &ApplicationError::from(error)),
    }
}
