use catalog_core::config::LoadOptions;

use crate::commands::{open_store, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let store = match open_store("list", options) {
        Ok(store) => store,
        Err(result) => return result,
    };

    let message = format!(
        "{} product(s) in {} (load: {})",
        store.len(),
        store.path().display(),
        store.load_outcome().as_str()
    );
    CommandResult::success_with_data("list", message, store.list())
}
