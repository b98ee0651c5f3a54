use catalog_core::config::LoadOptions;
use catalog_core::ProductId;

use crate::commands::{open_store, CommandResult};

pub fn run(options: &LoadOptions, id: u64) -> CommandResult {
    let mut store = match open_store("delete", options) {
        Ok(store) => store,
        Err(result) => return result,
    };

    match store.delete_by_id(ProductId(id)) {
        Ok(removed) => {
            CommandResult::success_with_data("delete", format!("deleted product {id}"), removed)
        }
        Err(error) => CommandResult::from_error("delete", &error),
    }
}
