//! Identifier resolver
//!
//! For one (document, row family) pair, tries candidate shapes on each of
//! the row family's endpoints and stops at the first shape that returns
//! rows. Endpoints found not to serve a document family are remembered in
//! the [`AvailabilityCache`] for the rest of the run.

use super::outcome::ShapeOutcome;
use super::shapes::candidate_shapes;
use crate::adapters::coverage::{CoverageApi, EndpointCatalog};
use crate::domain::{DocumentFamily, DocumentRef, ParameterShape, RawRow, Result, RowFamily};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Endpoints known not to serve a document family, scoped to one run
#[derive(Debug, Default)]
pub struct AvailabilityCache {
    unsupported: Mutex<HashSet<(DocumentFamily, String)>>,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_unsupported(&self, family: DocumentFamily, path: &str) -> bool {
        self.unsupported
            .lock()
            .await
            .contains(&(family, path.to_string()))
    }

    /// Record an endpoint as unsupported; returns true if it was new
    pub async fn mark_unsupported(&self, family: DocumentFamily, path: &str) -> bool {
        self.unsupported
            .lock()
            .await
            .insert((family, path.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.unsupported.lock().await.len()
    }
}

/// Result of resolving one row family for one document
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A shape returned rows
    Found {
        path: String,
        shape: ParameterShape,
        rows: Vec<RawRow>,
        attempts: usize,
    },
    /// Every shape on every available endpoint came back empty or rejected
    Exhausted { attempts: usize },
    /// No endpoint for this row family serves the document's family
    Unsupported { attempts: usize },
}

impl Resolution {
    /// Number of shapes sent to the API
    pub fn attempts(&self) -> usize {
        match self {
            Resolution::Found { attempts, .. }
            | Resolution::Exhausted { attempts }
            | Resolution::Unsupported { attempts } => *attempts,
        }
    }

    pub fn rows(&self) -> &[RawRow] {
        match self {
            Resolution::Found { rows, .. } => rows,
            _ => &[],
        }
    }

    pub fn into_rows(self) -> Vec<RawRow> {
        match self {
            Resolution::Found { rows, .. } => rows,
            _ => Vec::new(),
        }
    }
}

/// Shape-probing resolver over the endpoint catalog
pub struct IdentifierResolver {
    api: Arc<dyn CoverageApi>,
    catalog: EndpointCatalog,
    cache: AvailabilityCache,
}

impl IdentifierResolver {
    pub fn new(api: Arc<dyn CoverageApi>, catalog: EndpointCatalog) -> Self {
        Self {
            api,
            catalog,
            cache: AvailabilityCache::new(),
        }
    }

    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    pub fn availability(&self) -> &AvailabilityCache {
        &self.cache
    }

    /// Resolve `row_family` for `doc`
    ///
    /// # Errors
    ///
    /// Propagates transport failures (retries exhausted, authentication)
    /// for the caller to record against this row family. Rejected shapes and
    /// unsupported routes are handled here and never surface as errors.
    pub async fn resolve(&self, doc: &DocumentRef, row_family: RowFamily) -> Result<Resolution> {
        let family = doc.family();
        let mut attempts = 0usize;
        let mut any_available = false;

        for endpoint in self.catalog.endpoints(row_family, family) {
            if self.cache.is_unsupported(family, &endpoint.path).await {
                tracing::debug!(
                    family = %family,
                    path = %endpoint.path,
                    "Skipping endpoint known to be unsupported"
                );
                continue;
            }

            let mut unsupported = false;
            for shape in candidate_shapes(doc, endpoint) {
                attempts += 1;
                let response = self.api.get(&endpoint.path, &shape).await?;

                match ShapeOutcome::classify(response) {
                    ShapeOutcome::Rows(rows) => {
                        tracing::debug!(
                            document = %doc,
                            row_family = %row_family,
                            path = %endpoint.path,
                            shape = %shape,
                            rows = rows.len(),
                            attempts = attempts,
                            "Resolved identifier shape"
                        );
                        return Ok(Resolution::Found {
                            path: endpoint.path.clone(),
                            shape,
                            rows,
                            attempts,
                        });
                    }
                    ShapeOutcome::Empty => {}
                    ShapeOutcome::ShapeRejected { status, message } => {
                        tracing::debug!(
                            document = %doc,
                            path = %endpoint.path,
                            shape = %shape,
                            status = status,
                            message = %message,
                            "Shape rejected, trying next"
                        );
                    }
                    ShapeOutcome::EndpointUnsupported { status, message } => {
                        if self.cache.mark_unsupported(family, &endpoint.path).await {
                            tracing::info!(
                                family = %family,
                                path = %endpoint.path,
                                status = status,
                                message = %message,
                                "Endpoint unsupported for document family, skipping for the rest of the run"
                            );
                        }
                        unsupported = true;
                        break;
                    }
                }
            }

            if !unsupported {
                any_available = true;
            }
        }

        if any_available {
            Ok(Resolution::Exhausted { attempts })
        } else {
            Ok(Resolution::Unsupported { attempts })
        }
    }
}
