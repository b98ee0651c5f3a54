//! Replays the reference walkthrough against the configured catalog file:
//! three launches, one incomplete and one duplicate submission, two lookups,
//! a delete and an update.

use catalog_core::config::LoadOptions;
use catalog_core::{
    ApplicationError, CatalogStore, Product, ProductCode, ProductDraft, ProductId, ProductPatch,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{open_store, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum StepStatus {
    Ok,
    Rejected,
}

#[derive(Debug, Serialize)]
struct DemoStep {
    step: &'static str,
    status: StepStatus,
    product_id: Option<u64>,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DemoReport {
    path: String,
    steps: Vec<DemoStep>,
    products: Vec<Product>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let mut store = match open_store("demo", options) {
        Ok(store) => store,
        Err(result) => return result,
    };

    match replay(&mut store) {
        Ok(steps) => {
            let rejected = steps.iter().filter(|step| step.status == StepStatus::Rejected).count();
            let message =
                format!("demo replayed {} step(s), {rejected} rejected as expected", steps.len());
            let report = DemoReport {
                path: store.path().display().to_string(),
                steps,
                products: store.list().to_vec(),
            };
            CommandResult::success_with_data("demo", message, report)
        }
        Err(error) => CommandResult::from_error("demo", &error),
    }
}

fn replay(store: &mut CatalogStore) -> Result<Vec<DemoStep>, ApplicationError> {
    let mut steps = Vec::new();

    for (step, draft) in [
        ("add code 1", party("Code #4", "Fiesta electronica", 1, Some(50))),
        ("add code 2", party("Fabula", "Fiesta de fin de año", 2, Some(40))),
        ("add code 3", party("Lola Fest", "Fiesta de navidad", 3, Some(50))),
        ("add incomplete", party("Fabula", "Fiesta de fin de año", 2, None)),
        ("add duplicate code 1", party("Lola Fest", "Fiesta de navidad", 1, Some(50))),
    ] {
        steps.push(record(step, store.add(draft))?);
    }

    for (step, id) in [("get 1", ProductId(1)), ("get 4", ProductId(4))] {
        let found = store.require(id).cloned().map_err(ApplicationError::from);
        steps.push(record(step, found)?);
    }

    steps.push(record("delete 1", store.delete_by_id(ProductId(1)))?);

    let patch = ProductPatch {
        title: Some("Fabula".to_string()),
        description: Some("Fiesta de fin de año".to_string()),
        price: Some(Decimal::new(6000, 0)),
        thumbnail: Some("nueva ruta de imagen".to_string()),
        code: Some(ProductCode::new("2")),
        stock: Some(30),
    };
    steps.push(record("update 2", store.update_by_id(ProductId(2), patch))?);

    Ok(steps)
}

fn party(title: &str, description: &str, code: u32, stock: Option<u32>) -> ProductDraft {
    ProductDraft {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        price: Some(Decimal::new(5000, 0)),
        thumbnail: Some("ruta de imagen".to_string()),
        code: Some(ProductCode::new(code.to_string())),
        stock,
    }
}

// Domain rejections are part of the walkthrough; anything else aborts it.
fn record(
    step: &'static str,
    outcome: Result<Product, ApplicationError>,
) -> Result<DemoStep, ApplicationError> {
    match outcome {
        Ok(product) => Ok(DemoStep {
            step,
            status: StepStatus::Ok,
            product_id: Some(product.id.0),
            detail: format!("{} ({})", product.title, product.code),
        }),
        Err(ApplicationError::Domain(error)) => Ok(DemoStep {
            step,
            status: StepStatus::Rejected,
            product_id: None,
            detail: error.to_string(),
        }),
        Err(error) => Err(error),
    }
}
