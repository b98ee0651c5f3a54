use catalog_core::{
    CatalogStore, DomainError, LoadOutcome, ProductCode, ProductDraft, ProductId, ProductPatch,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;

type ScenarioResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
    ($left:expr, $right:expr, $($arg:tt)*) => {
        if $left != $right {
            return Err(format!($($arg)*));
        }
    };
}

fn event(title: &str, description: &str, code: u32, stock: Option<u32>) -> ProductDraft {
    ProductDraft {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        price: Some(Decimal::new(5000, 0)),
        thumbnail: Some("ruta de imagen".to_string()),
        code: Some(ProductCode::new(code.to_string())),
        stock,
    }
}

fn read_document(path: &std::path::Path) -> ScenarioResult<Value> {
    let raw = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&raw).map_err(|err| err.to_string())
}

#[test]
fn party_catalog_walkthrough() -> ScenarioResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("products.json");
    std::fs::write(&path, "").map_err(|err| err.to_string())?;

    let mut store = CatalogStore::open(&path);
    require_eq!(store.load_outcome(), &LoadOutcome::Empty);

    let first = store
        .add(event("Code #4", "Fiesta electronica", 1, Some(50)))
        .map_err(|err| err.to_string())?;
    require_eq!(first.id, ProductId(1));
    require_eq!(store.len(), 1);

    let second = store
        .add(event("Fabula", "Fiesta de fin de año", 2, Some(40)))
        .map_err(|err| err.to_string())?;
    require_eq!(second.id, ProductId(2));
    require_eq!(store.len(), 2);

    let incomplete = store.add(event("Fabula", "Fiesta de fin de año", 2, Some(0)));
    require!(
        matches!(
            incomplete.as_ref().map_err(|err| err.as_domain()),
            Err(Some(DomainError::MissingField { field: "stock" }))
        ),
        "zero stock should be rejected as a missing field, got {incomplete:?}"
    );
    require_eq!(store.len(), 2);

    let duplicate = store.add(event("Lola Fest", "Fiesta de navidad", 1, Some(50)));
    require!(
        matches!(&duplicate, Err(err) if err.error_class() == "duplicate_code"),
        "duplicate code should be rejected, got {duplicate:?}"
    );
    require_eq!(store.len(), 2);

    require_eq!(store.get_by_id(ProductId(1)).map(|product| &product.title), Some(&first.title));
    require!(store.get_by_id(ProductId(4)).is_none());

    store.delete_by_id(ProductId(1)).map_err(|err| err.to_string())?;
    require!(store.get_by_id(ProductId(1)).is_none());
    require_eq!(store.len(), 1);

    let updated = store
        .update_by_id(
            ProductId(2),
            ProductPatch {
                price: Some(Decimal::new(6000, 0)),
                stock: Some(30),
                ..ProductPatch::default()
            },
        )
        .map_err(|err| err.to_string())?;
    require_eq!(updated.price, Decimal::new(6000, 0));
    require_eq!(updated.stock, 30);
    require_eq!(updated.title, "Fabula");
    require_eq!(updated.code, ProductCode::new("2"));

    let document = read_document(&path)?;
    let records = document.as_array().ok_or("backing file should hold an array")?;
    require_eq!(records.len(), 1);
    require_eq!(records[0]["id"].as_u64(), Some(2));
    require_eq!(records[0]["code"].as_str(), Some("2"));
    require_eq!(records[0]["stock"].as_u64(), Some(30));
    require_eq!(records[0]["price"].as_f64(), Some(6000.0));

    Ok(())
}

#[test]
fn reopened_store_continues_the_id_sequence() -> ScenarioResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("products.json");

    {
        let mut store = CatalogStore::open(&path);
        for code in 1..=3 {
            store
                .add(event("Lola Fest", "Fiesta de navidad", code, Some(10)))
                .map_err(|err| err.to_string())?;
        }
    }

    let mut reopened = CatalogStore::open(&path);
    require_eq!(reopened.load_outcome(), &LoadOutcome::Loaded { records: 3, skipped: 0 });
    require_eq!(reopened.next_id(), ProductId(4));

    let ids: Vec<u64> = reopened.list().iter().map(|product| product.id.0).collect();
    require_eq!(ids, vec![1, 2, 3]);

    let added = reopened
        .add(event("Code #4", "Fiesta electronica", 4, Some(1)))
        .map_err(|err| err.to_string())?;
    require_eq!(added.id, ProductId(4));

    Ok(())
}

#[test]
fn malformed_backing_file_is_replaced_on_first_write() -> ScenarioResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("products.json");
    std::fs::write(&path, "{ not json").map_err(|err| err.to_string())?;

    let mut store = CatalogStore::open(&path);
    require!(matches!(store.load_outcome(), LoadOutcome::Malformed { .. }));
    require!(store.is_empty());

    store.add(event("Code #4", "Fiesta electronica", 1, Some(50))).map_err(|err| err.to_string())?;

    let document = read_document(&path)?;
    require_eq!(document.as_array().map(Vec::len), Some(1));
    Ok(())
}
