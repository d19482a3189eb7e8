use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TryOnError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
    /// Path of the reference image, relative to the storefront origin.
    pub image_url: String,
}

impl Product {
    pub fn new(id: u32, name: impl Into<String>, price: f64, image_url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image_url: image_url.into(),
        }
    }

    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

/// The fixed product list a storefront offers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            Product::new(1, "T-shirt \"Cosmic Dream\"", 29.99, "/assets/01.jpeg"),
            Product::new(2, "T-shirt \"Retro Wave\"", 25.00, "/assets/02.jpg"),
            Product::new(3, "T-shirt \"Urban Jungle\"", 32.50, "/assets/03.jpeg"),
            Product::new(4, "T-shirt \"Minimalist\"", 22.00, "/assets/04.jpeg"),
        ])
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| TryOnError::Catalog(format!("invalid catalog JSON: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TryOnError::Catalog(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for product in &self.products {
            if !seen.insert(product.id) {
                return Err(TryOnError::Catalog(format!(
                    "duplicate product id {}",
                    product.id
                )));
            }
        }
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
