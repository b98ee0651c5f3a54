use catalog_core::config::LoadOptions;
use catalog_core::ProductId;

use crate::commands::{open_store, CommandResult, ProductFields, EXIT_INVALID_INPUT};

pub fn run(options: &LoadOptions, id: u64, fields: ProductFields) -> CommandResult {
    let patch = match fields.into_patch() {
        Ok(patch) => patch,
        Err(error) => {
            return CommandResult::failure(
                "update",
                "invalid_input",
                format!("product JSON is not a valid patch (the id cannot be patched): {error}"),
                EXIT_INVALID_INPUT,
            );
        }
    };

    if patch.is_empty() {
        return CommandResult::failure(
            "update",
            "invalid_input",
            "nothing to update: pass at least one field",
            EXIT_INVALID_INPUT,
        );
    }

    let mut store = match open_store("update", options) {
        Ok(store) => store,
        Err(result) => return result,
    };

    match store.update_by_id(ProductId(id), patch) {
        Ok(product) => {
            CommandResult::success_with_data("update", format!("updated product {id}"), product)
        }
        Err(error) => CommandResult::from_error("update", &error),
    }
}
