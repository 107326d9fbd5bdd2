//! Product entity and its unsaved payload.

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A stored product. The identifier is assigned by the durable store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(rename = "additionalInfo")]
    pub additional_info: String,
}

impl Product {
    /// Attach a store-assigned identifier to a payload.
    pub fn from_new(id: i64, product: &NewProduct) -> Self {
        Self {
            id,
            name: product.name.clone(),
            additional_info: product.additional_info.clone(),
        }
    }
}

/// Product payload submitted by a caller before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    pub name: String,
    #[serde(rename = "additionalInfo")]
    pub additional_info: String,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, additional_info: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            additional_info: additional_info.into(),
        }
    }

    /// Reject payloads with an empty name or empty additional info.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_empty() || self.additional_info.is_empty() {
            return Err(DomainError::validation(
                "product name or additional info is empty",
            ));
        }
        Ok(())
    }
}
