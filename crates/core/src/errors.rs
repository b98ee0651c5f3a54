use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::product::{ProductCode, ProductId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("all fields are required: `{field}` is missing or empty")]
    MissingField { field: &'static str },
    #[error("a product with code `{code}` already exists")]
    DuplicateCode { code: ProductCode },
    #[error("product {id} was not found")]
    NotFound { id: ProductId },
    #[error("price `{price}` cannot be stored without losing precision")]
    UnstorablePrice { price: Decimal },
    #[error("no product ids are left to assign")]
    IdSpaceExhausted,
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("could not write catalog file `{path}`: {source}")]
    Persistence { path: PathBuf, source: std::io::Error },
    #[error("could not serialize catalog: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApplicationError {
    /// Stable machine-readable class, used by operator tooling.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::MissingField { .. }) => "missing_field",
            Self::Domain(DomainError::DuplicateCode { .. }) => "duplicate_code",
            Self::Domain(DomainError::NotFound { .. }) => "not_found",
            Self::Domain(DomainError::UnstorablePrice { .. }) => "invalid_price",
            Self::Domain(DomainError::IdSpaceExhausted) => "id_space_exhausted",
            Self::Persistence { .. } => "persistence",
            Self::Serialization(_) => "serialization",
        }
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use crate::domain::product::{ProductCode, ProductId};
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn domain_errors_keep_their_class_through_application_layer() {
        let missing = ApplicationError::from(DomainError::MissingField { field: "stock" });
        let duplicate =
            ApplicationError::from(DomainError::DuplicateCode { code: ProductCode::new("1") });
        let not_found = ApplicationError::from(DomainError::NotFound { id: ProductId(4) });

        assert_eq!(missing.error_class(), "missing_field");
        assert_eq!(duplicate.error_class(), "duplicate_code");
        assert_eq!(not_found.error_class(), "not_found");
        assert_eq!(not_found.as_domain(), Some(&DomainError::NotFound { id: ProductId(4) }));
    }

    #[test]
    fn persistence_error_names_the_file() {
        let error = ApplicationError::Persistence {
            path: PathBuf::from("/readonly/products.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };

        assert_eq!(error.error_class(), "persistence");
        assert!(error.as_domain().is_none());
        assert!(error.to_string().contains("/readonly/products.json"));
    }

    #[test]
    fn missing_field_message_is_actionable() {
        let message = DomainError::MissingField { field: "thumbnail" }.to_string();
        assert_eq!(message, "all fields are required: `thumbnail` is missing or empty");
    }
}
