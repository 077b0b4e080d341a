//! Points of interest and their sanitized identifiers.

use geo::Point;
use hashbrown::HashSet;
use itertools::Itertools;
use log::warn;

/// Point of interest: a raw category/identifier value and a point
/// geometry in projected coordinates. One id may cover many features,
/// which are then treated as a group.
#[derive(Debug, Clone)]
pub struct Poi {
    pub raw_id: String,
    pub geometry: Point<f64>,
}

/// One distinct POI identifier with its sanitized output key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// The raw value as it appears in the POI dataset.
    pub raw: String,
    /// Column/file-safe key derived from the raw value.
    pub key: String,
}

/// Sanitize a raw POI identifier into a column/file-safe key: lowercase,
/// then scrub out space, slash, dash and comma.
///
/// `sanitize_id("Food/Drink") == "fooddrink"`
pub fn sanitize_id(value: &str) -> String {
    let mut v = value.to_lowercase();
    for ch in [" ", "/", "-", ","] {
        v = v.replace(ch, "");
    }
    v
}

/// The distinct POI identifiers present in a POI set, sorted by raw value,
/// each with a sanitized key.
///
/// The raw-to-key mapping is kept injective: when two raw values sanitize
/// to the same key, the later one gets a numeric discriminator appended so
/// downstream column names never collide.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    pub fn from_pois(pois: &[Poi]) -> Self {
        let raw_ids: Vec<&str> = pois
            .iter()
            .map(|p| p.raw_id.as_str())
            .unique()
            .sorted()
            .collect();

        let mut used: HashSet<String> = HashSet::with_capacity(raw_ids.len());
        let mut categories = Vec::with_capacity(raw_ids.len());
        for raw in raw_ids {
            let base = sanitize_id(raw);
            let mut key = base.clone();
            let mut discriminator = 2;
            while !used.insert(key.clone()) {
                key = format!("{base}_{discriminator}");
                discriminator += 1;
            }
            if key != base {
                warn!("sanitized id collision: {raw:?} recorded as {key:?}");
            }
            categories.push(Category {
                raw: raw.to_string(),
                key,
            });
        }
        Self { categories }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Sanitized key for a raw id, if present.
    pub fn key_for(&self, raw: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.raw == raw)
            .map(|c| c.key.as_str())
    }
}
