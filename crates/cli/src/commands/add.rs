use catalog_core::config::LoadOptions;

use crate::commands::{open_store, CommandResult, ProductFields, EXIT_INVALID_INPUT};

pub fn run(options: &LoadOptions, fields: ProductFields) -> CommandResult {
    let draft = match fields.into_draft() {
        Ok(draft) => draft,
        Err(error) => {
            return CommandResult::failure(
                "add",
                "invalid_input",
                format!("product JSON is not a valid draft: {error}"),
                EXIT_INVALID_INPUT,
            );
        }
    };

    let mut store = match open_store("add", options) {
        Ok(store) => store,
        Err(result) => return result,
    };

    match store.add(draft) {
        Ok(product) => {
            CommandResult::success_with_data("add", format!("added product {}", product.id), product)
        }
        Err(error) => CommandResult::from_error("add", &error),
    }
}
