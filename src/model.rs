use serde::{Deserialize, Serialize};

/// A catalog entry as it exists in the store and on the wire.
///
/// `id` is assigned by the store on creation and immutable afterwards. The
/// grid controller keeps unsaved drafts out of this type entirely (see
/// [`crate::grid::RowKey`]); a `Product` always carries a committed id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub reference: String,
    pub price: f64,
    pub rating: u8,
}

/// Candidate body for a create. A supplied `id` is accepted but ignored; the
/// store always assigns its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub reference: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: u8,
}

/// Partial update body. Present fields overwrite, absent fields are retained.
/// There is deliberately no `id` field: the record id comes from the path and
/// cannot be rewritten by a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl ProductPatch {
    /// Shallow-merge this patch over `existing`, keeping its id.
    pub fn apply_to(&self, existing: &Product) -> Product {
        Product {
            id: existing.id,
            name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
            reference: self
                .reference
                .clone()
                .unwrap_or_else(|| existing.reference.clone()),
            price: self.price.unwrap_or(existing.price),
            rating: self.rating.unwrap_or(existing.rating),
        }
    }
}

impl From<Product> for ProductPatch {
    fn from(product: Product) -> Self {
        Self {
            name: Some(product.name),
            reference: Some(product.reference),
            price: Some(product.price),
            rating: Some(product.rating),
        }
    }
}
