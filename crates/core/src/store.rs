//! JSON-file backed product catalog.
//!
//! The whole collection lives in memory and is rewritten to the backing file
//! after every successful mutation. A mutation whose write fails is rolled
//! back so the in-memory view never runs ahead of the file.
//!
//! Array entries that do not form a complete product are kept verbatim and
//! written back after the products, so a save never drops them.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::product::{Product, ProductCode, ProductDraft, ProductId, ProductPatch};
use crate::errors::{ApplicationError, DomainError};

/// What the store found in its backing file when it was opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Missing,
    Empty,
    Loaded { records: usize, skipped: usize },
    Unreadable { reason: String },
    Malformed { reason: String },
}

impl LoadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Empty => "empty",
            Self::Loaded { .. } => "loaded",
            Self::Unreadable { .. } => "unreadable",
            Self::Malformed { .. } => "malformed",
        }
    }
}

#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    products: Vec<Product>,
    unrecognized: Vec<Value>,
    next_id: u64,
    load_outcome: LoadOutcome,
}

impl CatalogStore {
    /// Opens the catalog at `path`. A missing, empty, unreadable or malformed
    /// file yields an empty catalog; the reason is kept in `load_outcome`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (products, unrecognized, load_outcome) = read_catalog(&path);
        let highest_id = products
            .iter()
            .map(|product| product.id.0)
            .chain(unrecognized.iter().filter_map(|entry| entry.get("id")?.as_u64()))
            .max();
        // saturates at u64::MAX; `add` refuses to hand that id out again
        let next_id = highest_id.map_or(1, |max| max.saturating_add(1));

        match &load_outcome {
            LoadOutcome::Unreadable { reason } | LoadOutcome::Malformed { reason } => warn!(
                event_name = "catalog.store.load_failed",
                path = %path.display(),
                outcome = load_outcome.as_str(),
                reason = %reason,
                "catalog file could not be loaded, starting empty"
            ),
            _ => info!(
                event_name = "catalog.store.loaded",
                path = %path.display(),
                outcome = load_outcome.as_str(),
                records = products.len(),
                next_id,
                "catalog opened"
            ),
        }
        warn_on_duplicates(&products);

        Self { path, products, unrecognized, next_id, load_outcome }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Id the next successful `add` will assign.
    pub fn next_id(&self) -> ProductId {
        ProductId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Validates `draft`, assigns the next id and persists the catalog.
    pub fn add(&mut self, draft: ProductDraft) -> Result<Product, ApplicationError> {
        let candidate = draft.validate().map_err(|error| rejected("add", error))?;

        if self.code_in_use(candidate.code(), None) {
            let code = candidate.code().clone();
            return Err(rejected("add", DomainError::DuplicateCode { code }).into());
        }

        let assigned = self.next_id;
        let following = assigned
            .checked_add(1)
            .ok_or_else(|| rejected("add", DomainError::IdSpaceExhausted))?;

        let product = candidate.into_product(ProductId(assigned));
        self.products.push(product.clone());
        self.next_id = following;

        if let Err(error) = self.persist() {
            self.products.pop();
            self.next_id = assigned;
            return Err(error);
        }

        info!(
            event_name = "catalog.product.added",
            product_id = product.id.0,
            code = %product.code,
            "product added"
        );
        Ok(product)
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn get_by_id(&self, id: ProductId) -> Option<&Product> {
        let found = self.products.iter().find(|product| product.id == id);
        if found.is_none() {
            debug!(event_name = "catalog.product.not_found", product_id = id.0, "product not found");
        }
        found
    }

    /// Like `get_by_id`, but absence is an error value.
    pub fn require(&self, id: ProductId) -> Result<&Product, DomainError> {
        self.get_by_id(id).ok_or(DomainError::NotFound { id })
    }

    pub fn delete_by_id(&mut self, id: ProductId) -> Result<Product, ApplicationError> {
        let index = self.position("delete", id)?;
        let removed = self.products.remove(index);

        if let Err(error) = self.persist() {
            self.products.insert(index, removed);
            return Err(error);
        }

        info!(event_name = "catalog.product.deleted", product_id = id.0, "product deleted");
        Ok(removed)
    }

    /// Shallow-merges `patch` onto the record with `id`. The merged record must
    /// still have every field present and keep its code unique.
    pub fn update_by_id(
        &mut self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ApplicationError> {
        let index = self.position("update", id)?;

        let mut updated = self.products[index].clone();
        updated.apply(&patch);
        updated.check_required().map_err(|error| rejected("update", error))?;

        if self.code_in_use(&updated.code, Some(id)) {
            let code = updated.code.clone();
            return Err(rejected("update", DomainError::DuplicateCode { code }).into());
        }

        let previous = std::mem::replace(&mut self.products[index], updated.clone());
        if let Err(error) = self.persist() {
            self.products[index] = previous;
            return Err(error);
        }

        info!(event_name = "catalog.product.updated", product_id = id.0, "product updated");
        Ok(updated)
    }

    fn code_in_use(&self, code: &ProductCode, except: Option<ProductId>) -> bool {
        let stored = self
            .products
            .iter()
            .any(|product| Some(product.id) != except && &product.code == code);
        stored || self.unrecognized.iter().any(|entry| entry_code(entry).as_ref() == Some(code))
    }

    fn position(&self, operation: &'static str, id: ProductId) -> Result<usize, DomainError> {
        self.products
            .iter()
            .position(|product| product.id == id)
            .ok_or_else(|| rejected(operation, DomainError::NotFound { id }))
    }

    fn persist(&self) -> Result<(), ApplicationError> {
        let entries: Vec<FileEntry<'_>> = self
            .products
            .iter()
            .map(FileEntry::Product)
            .chain(self.unrecognized.iter().map(FileEntry::Unrecognized))
            .collect();
        let document = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, document).map_err(|source| {
            warn!(
                event_name = "catalog.store.persist_failed",
                path = %self.path.display(),
                error = %source,
                "catalog write failed, mutation rolled back"
            );
            ApplicationError::Persistence { path: self.path.clone(), source }
        })?;

        debug!(
            event_name = "catalog.store.persisted",
            path = %self.path.display(),
            records = self.products.len(),
            "catalog written"
        );
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum FileEntry<'a> {
    Product(&'a Product),
    Unrecognized(&'a Value),
}

fn read_catalog(path: &Path) -> (Vec<Product>, Vec<Value>, LoadOutcome) {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return (Vec::new(), Vec::new(), LoadOutcome::Missing)
        }
        Err(error) => {
            let reason = error.to_string();
            return (Vec::new(), Vec::new(), LoadOutcome::Unreadable { reason });
        }
    };

    if raw.trim().is_empty() {
        return (Vec::new(), Vec::new(), LoadOutcome::Empty);
    }

    let entries = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            let reason = "top-level value is not an array".to_string();
            return (Vec::new(), Vec::new(), LoadOutcome::Malformed { reason });
        }
        Err(error) => {
            return (Vec::new(), Vec::new(), LoadOutcome::Malformed { reason: error.to_string() })
        }
    };

    let mut products = Vec::with_capacity(entries.len());
    let mut unrecognized = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        match Product::deserialize(&entry) {
            Ok(product) => products.push(product),
            Err(error) => {
                warn!(
                    event_name = "catalog.store.record_skipped",
                    index,
                    reason = %error,
                    "catalog entry is not a complete product, keeping it as-is"
                );
                unrecognized.push(entry);
            }
        }
    }

    let outcome = LoadOutcome::Loaded { records: products.len(), skipped: unrecognized.len() };
    (products, unrecognized, outcome)
}

fn entry_code(entry: &Value) -> Option<ProductCode> {
    ProductCode::deserialize(entry.get("code")?).ok()
}

fn warn_on_duplicates(products: &[Product]) {
    let mut ids = HashSet::new();
    let mut codes = HashSet::new();
    for product in products {
        if !ids.insert(product.id) {
            warn!(
                event_name = "catalog.store.duplicate_id",
                product_id = product.id.0,
                "catalog file contains a repeated id"
            );
        }
        if !codes.insert(&product.code) {
            warn!(
                event_name = "catalog.store.duplicate_code",
                code = %product.code,
                "catalog file contains a repeated code"
            );
        }
    }
}

fn rejected(operation: &'static str, error: DomainError) -> DomainError {
    warn!(event_name = "catalog.product.rejected", operation, reason = %error, "request rejected");
    error
}
