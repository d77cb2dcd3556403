//! Readiness gate over the external conclusion catalog.
//!
//! The catalog is fetched asynchronously at session bootstrap and read
//! synchronously when a rule finishes the traversal. The gate makes that
//! ordering explicit: finishing before the catalog has been installed is
//! a reportable [`ConclusionError::CatalogNotReady`], never a stall.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tot_catalog::{ConclusionCatalog, ConclusionKey, ConclusionRecord};

/// Errors from resolving a terminal conclusion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConclusionError {
    /// The traversal finished before the catalog was installed.
    #[error("conclusion catalog has not been loaded yet")]
    CatalogNotReady,

    /// A terminal rule emitted a key the catalog does not contain. Every
    /// rule output must have a matching entry by construction, so this is
    /// a configuration defect.
    #[error("no catalog entry for conclusion '{0}'")]
    UnknownConclusion(ConclusionKey),
}

/// Shared handle to the catalog, installable exactly once.
///
/// Clones share the same cell, so a background fetch task can install the
/// catalog while the session keeps its own handle.
#[derive(Debug, Clone, Default)]
pub struct CatalogGate {
    inner: Arc<OnceCell<ConclusionCatalog>>,
}

impl CatalogGate {
    /// A gate with nothing installed yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A gate that is ready from the start.
    pub fn ready(catalog: ConclusionCatalog) -> Self {
        Self {
            inner: Arc::new(OnceCell::new_with(Some(catalog))),
        }
    }

    /// Install the fetched catalog. Returns false if one was already
    /// installed (the catalog is fetched once; a second install is a
    /// caller bug and is ignored).
    pub fn install(&self, catalog: ConclusionCatalog) -> bool {
        self.inner.set(catalog).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.initialized()
    }

    /// Look up the record for a terminal conclusion key.
    pub fn resolve(&self, key: &ConclusionKey) -> Result<&ConclusionRecord, ConclusionError> {
        let catalog = self.inner.get().ok_or(ConclusionError::CatalogNotReady)?;
        catalog
            .get(key)
            .ok_or_else(|| ConclusionError::UnknownConclusion(key.clone()))
    }
}
