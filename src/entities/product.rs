//! Product catalog shown next to the viewer.
//!
//! A product's `kind` selects its frame assets (`images/360/{kind}/...`).
//! Catalogs load from JSON; `Catalog::builtin()` covers the three showcase
//! pieces when no file is given.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    pub label: String,
    pub value: String,
}

/// Annotation pinned to the viewer, position in percent of the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: f32,
    pub y: f32,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Hotspot {
    /// Position as 0..1 fractions, clamped to the surface
    pub fn anchor(&self) -> (f32, f32) {
        ((self.x / 100.0).clamp(0.0, 1.0), (self.y / 100.0).clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: String,
    /// Asset product type
    pub kind: String,
    #[serde(default)]
    pub details: Vec<Detail>,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid catalog JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse catalog: {}", path.display()))
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Lookup by id, falling back to the first product of that kind
    pub fn find(&self, key: &str) -> Option<&Product> {
        self.get(key).or_else(|| self.products.iter().find(|p| p.kind == key))
    }

    pub fn builtin() -> Self {
        fn detail(label: &str, value: &str) -> Detail {
            Detail { label: label.into(), value: value.into() }
        }
        Self {
            products: vec![
                Product {
                    id: "solitaire-ring".into(),
                    name: "Solitaire Ring".into(),
                    price: "€ 2,450.00".into(),
                    kind: "ring".into(),
                    details: vec![
                        detail("Material", "18k Gold"),
                        detail("Stone", "Diamond, 0.5 ct"),
                        detail("Clarity", "VS1"),
                    ],
                    hotspots: vec![Hotspot {
                        x: 50.0,
                        y: 35.0,
                        title: "Diamond".into(),
                        description: "Brilliant cut, hand set in a four-prong crown.".into(),
                    }],
                },
                Product {
                    id: "pearl-necklace".into(),
                    name: "Pearl Necklace".into(),
                    price: "€ 1,890.00".into(),
                    kind: "necklace".into(),
                    details: vec![detail("Material", "Akoya pearls"), detail("Length", "45 cm")],
                    hotspots: Vec::new(),
                },
                Product {
                    id: "tennis-bracelet".into(),
                    name: "Tennis Bracelet".into(),
                    price: "€ 3,200.00".into(),
                    kind: "bracelet".into(),
                    details: Vec::new(),
                    hotspots: Vec::new(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_product() {
        let json = r#"{ "products": [ { "id": "r1", "name": "Ring", "kind": "ring" } ] }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let p = catalog.get("r1").unwrap();
        assert_eq!(p.kind, "ring");
        assert!(p.details.is_empty());
        assert!(p.hotspots.is_empty());
        assert_eq!(p.price, "");
    }

    #[test]
    fn test_parse_hotspots() {
        let json = r#"{ "products": [ {
            "id": "r1", "name": "Ring", "kind": "ring",
            "hotspots": [ { "x": 120, "y": -5, "title": "Stone" } ]
        } ] }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let hs = &catalog.products[0].hotspots[0];
        assert_eq!(hs.anchor(), (1.0, 0.0));
        assert_eq!(hs.description, "");
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Catalog::from_json("{ not json").is_err());
    }

    #[test]
    fn test_find_by_kind() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.find("necklace").unwrap().id, "pearl-necklace");
        assert_eq!(catalog.find("solitaire-ring").unwrap().kind, "ring");
        assert!(catalog.find("earring").is_none());
    }
}
