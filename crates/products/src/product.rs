use serde::{Deserialize, Serialize};

use stockflow_core::{DomainResult, Entity, ProductId};

/// Entity: Product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    product_id: ProductId,
    name: String,
}

impl Product {
    pub fn new(product_id: ProductId, name: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply a partial update. Only fields present in the patch change; the
    /// identifier is never touched.
    pub fn apply(&mut self, patch: &ProductPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}

/// Input: add a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub product_id: ProductId,
    pub name: String,
}

impl NewProduct {
    /// Validate raw input. The id must be non-blank; the name is kept verbatim.
    pub fn parse(product_id: &str, name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            product_id: ProductId::parse(product_id)?,
            name: name.into(),
        })
    }

    pub fn into_product(self) -> Product {
        Product::new(self.product_id, self.name)
    }
}

/// Input: partial update of a product (currently only the display name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockflow_core::DomainError;

    fn widget() -> Product {
        NewProduct::parse("P1", "Widget").unwrap().into_product()
    }

    #[test]
    fn new_product_trims_identifier() {
        let p = NewProduct::parse("  P1  ", "Widget").unwrap().into_product();
        assert_eq!(p.product_id().as_str(), "P1");
        assert_eq!(p.name(), "Widget");
        assert_eq!(p.id(), p.product_id());
    }

    #[test]
    fn new_product_rejects_blank_identifier() {
        let err = NewProduct::parse("", "Widget").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank product_id"),
        }
    }

    #[test]
    fn patch_with_name_renames() {
        let mut p = widget();
        p.apply(&ProductPatch {
            name: Some("Gadget".to_string()),
        });
        assert_eq!(p.name(), "Gadget");
        assert_eq!(p.product_id().as_str(), "P1");
    }

    #[test]
    fn empty_patch_is_a_noop() {
        let mut p = widget();
        let before = p.clone();
        p.apply(&ProductPatch::default());
        assert_eq!(p, before);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: renaming never changes the product identity.
            #[test]
            fn rename_preserves_identity(names in prop::collection::vec(".*", 0..8)) {
                let mut p = widget();
                for name in names {
                    p.apply(&ProductPatch { name: Some(name.clone()) });
                    prop_assert_eq!(p.product_id().as_str(), "P1");
                    prop_assert_eq!(p.name(), name.as_str());
                }
            }
        }
    }
}
