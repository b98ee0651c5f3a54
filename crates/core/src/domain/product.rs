use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied business key used for duplicate detection.
///
/// Older backing files carry numeric codes, so both JSON strings and integers
/// are accepted; the code is always written back as a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCode")]
pub struct ProductCode(pub String);

impl ProductCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_present(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<RawCode> for ProductCode {
    fn from(raw: RawCode) -> Self {
        match raw {
            RawCode::Text(text) => Self(text),
            // a zero code is falsy, same as an empty one
            RawCode::Unsigned(0) | RawCode::Signed(0) => Self(String::new()),
            RawCode::Unsigned(number) => Self(number.to_string()),
            RawCode::Signed(number) => Self(number.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub thumbnail: String,
    pub code: ProductCode,
    pub stock: u32,
    pub id: ProductId,
}

/// Candidate record for `CatalogStore::add`. Every field may be absent so that
/// incomplete submissions can be represented and rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub thumbnail: Option<String>,
    pub code: Option<ProductCode>,
    pub stock: Option<u32>,
}

/// Shallow patch for `CatalogStore::update_by_id`. The id is not patchable;
/// a JSON patch carrying an `id` key fails to deserialize.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub thumbnail: Option<String>,
    pub code: Option<ProductCode>,
    pub stock: Option<u32>,
}

/// A draft that passed validation and only lacks its store-assigned id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedProduct {
    title: String,
    description: String,
    price: Decimal,
    thumbnail: String,
    code: ProductCode,
    stock: u32,
}

impl ValidatedProduct {
    pub fn code(&self) -> &ProductCode {
        &self.code
    }

    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            title: self.title,
            description: self.description,
            price: self.price,
            thumbnail: self.thumbnail,
            code: self.code,
            stock: self.stock,
            id,
        }
    }
}

impl ProductDraft {
    /// Checks the six caller-facing fields in submission order and reports the
    /// first one that is absent or falsy.
    pub fn validate(self) -> Result<ValidatedProduct, DomainError> {
        let title = required_text("title", self.title)?;
        let description = required_text("description", self.description)?;
        let price = self
            .price
            .filter(|price| *price > Decimal::ZERO)
            .ok_or(DomainError::MissingField { field: "price" })?;
        if !survives_storage(price) {
            return Err(DomainError::UnstorablePrice { price });
        }
        let thumbnail = required_text("thumbnail", self.thumbnail)?;
        let code = self
            .code
            .filter(ProductCode::is_present)
            .ok_or(DomainError::MissingField { field: "code" })?;
        let stock = self
            .stock
            .filter(|stock| *stock > 0)
            .ok_or(DomainError::MissingField { field: "stock" })?;

        Ok(ValidatedProduct { title, description, price, thumbnail, code, stock })
    }
}

impl From<Product> for ProductDraft {
    fn from(product: Product) -> Self {
        Self {
            title: Some(product.title),
            description: Some(product.description),
            price: Some(product.price),
            thumbnail: Some(product.thumbnail),
            code: Some(product.code),
            stock: Some(product.stock),
        }
    }
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Product {
    /// Overwrites every field present in `patch`, keeping the rest.
    pub fn apply(&mut self, patch: &ProductPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(thumbnail) = &patch.thumbnail {
            self.thumbnail = thumbnail.clone();
        }
        if let Some(code) = &patch.code {
            self.code = code.clone();
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
    }

    pub fn check_required(&self) -> Result<(), DomainError> {
        ProductDraft::from(self.clone()).validate().map(|_| ())
    }
}

/// The backing file holds prices as JSON floats, so a price is only accepted
/// if it reads back unchanged.
fn survives_storage(price: Decimal) -> bool {
    #[derive(Serialize, Deserialize)]
    struct Stored(#[serde(with = "rust_decimal::serde::float")] Decimal);

    serde_json::to_string(&Stored(price))
        .ok()
        .and_then(|raw| serde_json::from_str::<Stored>(&raw).ok())
        .is_some_and(|Stored(read_back)| read_back == price)
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, DomainError> {
    value.filter(|text| !text.trim().is_empty()).ok_or(DomainError::MissingField { field })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Product, ProductCode, ProductDraft, ProductId, ProductPatch};
    use crate::errors::DomainError;

    fn complete_draft() -> ProductDraft {
        ProductDraft {
            title: Some("Code #4".to_string()),
            description: Some("Fiesta electronica".to_string()),
            price: Some(Decimal::new(5000, 0)),
            thumbnail: Some("ruta de imagen".to_string()),
            code: Some(ProductCode::new("1")),
            stock: Some(50),
        }
    }

    #[test]
    fn complete_draft_validates() {
        let validated = complete_draft().validate().expect("draft should validate");
        let product = validated.into_product(ProductId(7));

        assert_eq!(product.id, ProductId(7));
        assert_eq!(product.code, ProductCode::new("1"));
        assert_eq!(product.stock, 50);
    }

    #[test]
    fn zero_stock_is_reported_as_missing() {
        let draft = ProductDraft { stock: Some(0), ..complete_draft() };

        assert_eq!(draft.validate(), Err(DomainError::MissingField { field: "stock" }));
    }

    #[test]
    fn first_missing_field_wins() {
        let draft = ProductDraft {
            description: Some("   ".to_string()),
            thumbnail: None,
            ..complete_draft()
        };

        assert_eq!(draft.validate(), Err(DomainError::MissingField { field: "description" }));
    }

    #[test]
    fn non_positive_price_is_falsy() {
        let draft = ProductDraft { price: Some(Decimal::new(-5, 0)), ..complete_draft() };

        assert_eq!(draft.validate(), Err(DomainError::MissingField { field: "price" }));
    }

    #[test]
    fn price_beyond_float_precision_is_rejected() {
        let price: Decimal = "1.00000000000000000001".parse().expect("decimal literal");
        let draft = ProductDraft { price: Some(price), ..complete_draft() };

        assert_eq!(draft.validate(), Err(DomainError::UnstorablePrice { price }));
    }

    #[test]
    fn cents_survive_storage() {
        let draft = ProductDraft { price: Some(Decimal::new(1999, 2)), ..complete_draft() };
        let product = draft.validate().expect("valid").into_product(ProductId(1));

        let raw = serde_json::to_string(&product).expect("serialize");
        let read_back: Product = serde_json::from_str(&raw).expect("deserialize");

        assert!(raw.contains("\"price\":19.99"));
        assert_eq!(read_back, product);
    }

    #[test]
    fn patched_price_is_checked_like_an_added_one() {
        let mut product = complete_draft().validate().expect("valid").into_product(ProductId(1));
        let price: Decimal = "0.1234567890123456789".parse().expect("decimal literal");

        product.apply(&ProductPatch { price: Some(price), ..ProductPatch::default() });

        assert_eq!(product.check_required(), Err(DomainError::UnstorablePrice { price }));
    }

    #[test]
    fn numeric_codes_deserialize_as_text() {
        let product: Product = serde_json::from_str(
            r#"{"title":"Fabula","description":"Fiesta de fin de año","price":5000,
                "thumbnail":"ruta de imagen","code":2,"stock":40,"id":2}"#,
        )
        .expect("legacy record should parse");

        assert_eq!(product.code, ProductCode::new("2"));
        assert_eq!(product.price, Decimal::new(5000, 0));
    }

    #[test]
    fn numeric_zero_code_is_falsy() {
        let draft: ProductDraft = serde_json::from_str(
            r#"{"title":"a","description":"b","price":1,"thumbnail":"c","code":0,"stock":1}"#,
        )
        .expect("draft should parse");

        assert_eq!(draft.validate(), Err(DomainError::MissingField { field: "code" }));
    }

    #[test]
    fn draft_with_id_is_rejected_at_deserialization() {
        let result = serde_json::from_str::<ProductDraft>(r#"{"title":"a","id":9}"#);
        assert!(result.is_err());
    }

    #[test]
    fn patch_with_id_is_rejected_at_deserialization() {
        let result = serde_json::from_str::<ProductPatch>(r#"{"price":6000,"id":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn apply_overwrites_only_patched_fields() {
        let mut product = complete_draft().validate().expect("valid").into_product(ProductId(2));
        let patch = ProductPatch {
            price: Some(Decimal::new(6000, 0)),
            stock: Some(30),
            ..ProductPatch::default()
        };

        product.apply(&patch);

        assert_eq!(product.id, ProductId(2));
        assert_eq!(product.price, Decimal::new(6000, 0));
        assert_eq!(product.stock, 30);
        assert_eq!(product.title, "Code #4");
        assert_eq!(product.thumbnail, "ruta de imagen");
    }
}
