//! Minimal client for the termination-of-transfer conclusion catalog.
//!
//! The catalog is a static JSON document (`results.json`) keyed by
//! conclusion category and then subkey. Each entry carries the user-facing
//! title and explanatory body for one terminal determination of the
//! questionnaire, plus a flag marking it as eligible for PDF export.
//!
//! The document is owned by the hosting site and fetched once, either over
//! HTTP or from a local file; after that it is read-only.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error (status {status}) fetching catalog from {url}")]
    Http { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Two-part key identifying a conclusion: category, then subkey.
///
/// Keys travel through the questionnaire engine as the `conclusion` value a
/// terminal rule stashes in the answer store. The dotted form
/// (`"s203.no_pub_right"`) matches how the catalog document is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConclusionKey {
    pub category: String,
    pub subkey: String,
}

impl ConclusionKey {
    pub fn new(category: impl Into<String>, subkey: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            subkey: subkey.into(),
        }
    }

    /// Parse a dotted specifier like `"s203.no_pub_right"`.
    pub fn parse(specifier: &str) -> Option<Self> {
        let (category, subkey) = specifier.split_once('.')?;
        if category.is_empty() || subkey.is_empty() {
            return None;
        }
        Some(Self::new(category, subkey))
    }
}

impl fmt::Display for ConclusionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.subkey)
    }
}

/// One terminal determination: title, explanatory body, export eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConclusionRecord {
    pub title: String,
    pub body: String,
    /// Whether reaching this conclusion should trigger the PDF collaborator.
    #[serde(default)]
    pub generate_pdf: bool,
}

/// The full conclusion catalog: category -> subkey -> record.
///
/// Matches the shape of `results.json`, whose top-level object holds the
/// conclusions under a single `"Conclusion"` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConclusionCatalog {
    #[serde(rename = "Conclusion")]
    conclusions: HashMap<String, HashMap<String, ConclusionRecord>>,
}

impl ConclusionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from its JSON document form.
    pub fn from_json(doc: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(doc)?)
    }

    /// Insert a record, replacing any existing entry for the key.
    pub fn insert(&mut self, key: ConclusionKey, record: ConclusionRecord) {
        self.conclusions
            .entry(key.category)
            .or_default()
            .insert(key.subkey, record);
    }

    /// Look up the record for a conclusion key.
    pub fn get(&self, key: &ConclusionKey) -> Option<&ConclusionRecord> {
        self.conclusions.get(&key.category)?.get(&key.subkey)
    }

    pub fn contains(&self, key: &ConclusionKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of records across all categories.
    pub fn len(&self) -> usize {
        self.conclusions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every key in the catalog.
    pub fn keys(&self) -> impl Iterator<Item = ConclusionKey> + '_ {
        self.conclusions.iter().flat_map(|(category, entries)| {
            entries
                .keys()
                .map(move |subkey| ConclusionKey::new(category.clone(), subkey.clone()))
        })
    }
}

/// Catalog fetch client.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
}

impl CatalogClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Fetch and parse the catalog from a URL.
    pub async fn fetch(&self, url: &str) -> Result<ConclusionCatalog, CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        ConclusionCatalog::from_json(&body)
    }

    /// Read and parse the catalog from a local file.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<ConclusionCatalog, CatalogError> {
        let doc = tokio::fs::read_to_string(path).await?;
        ConclusionCatalog::from_json(&doc)
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new()
    }
}
