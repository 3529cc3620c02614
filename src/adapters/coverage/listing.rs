//! Document discovery through the report endpoints
//!
//! The report endpoints return one stub per document. Stub field names vary
//! between the Article and Determination reports, so identifiers are pulled
//! through fixed alias tables.

use super::transport::CoverageApi;
use crate::config::QueryConfig;
use crate::domain::rows::first_text;
use crate::domain::{
    CoverageApiError, DocumentFamily, DocumentRef, ParameterShape, RawRow, Result,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Final Determinations report
pub const DETERMINATION_REPORT_PATH: &str = "/v1/reports/local-coverage-final-lcds";

/// Articles report
pub const ARTICLE_REPORT_PATH: &str = "/v1/reports/local-coverage-articles";

/// Upper bound on pages followed per report
const MAX_PAGES: usize = 500;

const NUMERIC_ID_ALIASES: &[&str] = &["article_id", "lcd_id", "document_id", "id"];
const DISPLAY_ID_ALIASES: &[&str] = &[
    "article_display_id",
    "lcd_display_id",
    "document_display_id",
    "display_id",
];
const VERSION_ALIASES: &[&str] = &["article_version", "lcd_version", "document_version", "version"];
const TITLE_ALIASES: &[&str] = &["title", "name", "display_name"];

/// Source of the candidate document list for a run
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// List candidate documents in work order (Articles first)
    ///
    /// Fails when any report page answers with an error status.
    async fn list_documents(&self, query: &QueryConfig) -> Result<Vec<DocumentRef>>;
}

/// Map a report stub to a document reference
///
/// Returns `None` when the stub carries neither a numeric nor a display id.
pub fn stub_to_document(family: DocumentFamily, row: &RawRow) -> Option<DocumentRef> {
    let numeric = first_text(row, NUMERIC_ID_ALIASES);
    let display = first_text(row, DISPLAY_ID_ALIASES);

    let doc = DocumentRef::new(family, numeric.as_deref(), display.as_deref()).ok()?;
    let doc = match first_text(row, VERSION_ALIASES) {
        Some(version) => doc.with_version(version),
        None => doc,
    };
    Some(match first_text(row, TITLE_ALIASES) {
        Some(title) => doc.with_title(title),
        None => doc,
    })
}

/// [`DocumentSource`] backed by the coverage API report endpoints
pub struct ReportListing {
    api: Arc<dyn CoverageApi>,
}

impl ReportListing {
    pub fn new(api: Arc<dyn CoverageApi>) -> Self {
        Self { api }
    }

    /// Report query parameters; each filter is sent only when configured
    fn report_params(query: &QueryConfig) -> ParameterShape {
        let mut params = ParameterShape::new();
        if !query.states.is_empty() {
            params.insert("state", query.states.join(","));
        }
        if let Some(status) = query.status.as_deref().filter(|s| !s.trim().is_empty()) {
            params.insert("status", status.trim());
        }
        if !query.contractors.is_empty() {
            params.insert("contractor", query.contractors.join(","));
        }
        params
    }

    /// Walk every page of one report
    async fn list_report(
        &self,
        family: DocumentFamily,
        path: &str,
        query: &QueryConfig,
    ) -> Result<Vec<DocumentRef>> {
        let base_params = Self::report_params(query);
        let mut documents = Vec::new();
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut next_token: Option<String> = None;
        let mut skipped = 0usize;

        for page in 1..=MAX_PAGES {
            let mut params = base_params.clone();
            if let Some(token) = &next_token {
                params.insert("next_token", token.clone());
            }

            let response = self.api.get(path, &params).await?;
            if !response.is_success() {
                let message = response.body.server_message().unwrap_or_default();
                tracing::warn!(
                    family = %family,
                    path = %path,
                    page = page,
                    status = response.status,
                    message = %message,
                    "Report listing returned an error status"
                );
                return Err(CoverageApiError::rejected(path, response.status, message).into());
            }

            for row in response.rows() {
                match stub_to_document(family, row) {
                    Some(doc) => documents.push(doc),
                    None => skipped += 1,
                }
            }

            match response.body.next_token() {
                Some(token) if seen_tokens.insert(token.to_string()) => {
                    next_token = Some(token.to_string());
                }
                Some(token) => {
                    tracing::warn!(page = page, token = %token, "Repeated page token, ending listing");
                    break;
                }
                None => break,
            }

            if page == MAX_PAGES {
                tracing::warn!(path = %path, max_pages = MAX_PAGES, "Page limit reached");
            }
        }

        if skipped > 0 {
            tracing::warn!(
                family = %family,
                skipped = skipped,
                "Skipped report stubs without any identifier"
            );
        }

        tracing::info!(family = %family, count = documents.len(), "Listed documents");
        Ok(documents)
    }
}

#[async_trait]
impl DocumentSource for ReportListing {
    async fn list_documents(&self, query: &QueryConfig) -> Result<Vec<DocumentRef>> {
        let mut documents = Vec::new();

        if query.include_articles {
            documents.extend(
                self.list_report(DocumentFamily::Article, ARTICLE_REPORT_PATH, query)
                    .await?,
            );
        }
        if query.include_determinations {
            documents.extend(
                self.list_report(DocumentFamily::Determination, DETERMINATION_REPORT_PATH, query)
                    .await?,
            );
        }

        Ok(documents)
    }
}

/// Fixed in-memory document list
///
/// Used by `probe` to feed a single identifier through the pipeline and by
/// tests.
pub struct StaticDocuments {
    documents: Vec<DocumentRef>,
}

impl StaticDocuments {
    pub fn new(documents: Vec<DocumentRef>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl DocumentSource for StaticDocuments {
    async fn list_documents(&self, _query: &QueryConfig) -> Result<Vec<DocumentRef>> {
        Ok(self.documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::coverage::models::{ApiEnvelope, ApiMeta, ApiResponse};
    use crate::domain::HarvestError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves scripted pages per path and records every call
    struct PagedApi {
        pages: Vec<(String, Option<String>, ApiResponse)>,
        calls: Mutex<Vec<(String, ParameterShape)>>,
    }

    #[async_trait]
    impl CoverageApi for PagedApi {
        async fn get(&self, path: &str, params: &ParameterShape) -> Result<ApiResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), params.clone()));
            let token = params.get("next_token").map(str::to_string);
            Ok(self
                .pages
                .iter()
                .find(|(p, t, _)| p == path && *t == token)
                .map(|(_, _, r)| r.clone())
                .unwrap_or_else(|| ApiResponse::ok(Vec::new())))
        }

        fn base_url(&self) -> &str {
            "memory://"
        }
    }

    fn page(rows: serde_json::Value, next: Option<&str>) -> ApiResponse {
        let data = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        ApiResponse::new(
            200,
            ApiEnvelope {
                meta: ApiMeta {
                    status: None,
                    next_token: next.map(str::to_string),
                },
                data,
                message: None,
            },
        )
    }

    fn row(value: serde_json::Value) -> RawRow {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_stub_aliases() {
        let doc = stub_to_document(
            DocumentFamily::Article,
            &row(json!({"article_id": 59636, "display_id": "A59636", "version": 7, "title": "Glucose"})),
        )
        .unwrap();
        assert_eq!(doc.numeric_id().unwrap().as_str(), "59636");
        assert_eq!(doc.display_id().unwrap().as_str(), "A59636");
        assert_eq!(doc.version(), Some("7"));
        assert_eq!(doc.title(), Some("Glucose"));
    }

    #[test]
    fn test_stub_without_ids_skipped() {
        assert!(stub_to_document(
            DocumentFamily::Determination,
            &row(json!({"title": "orphan", "document_id": ""}))
        )
        .is_none());
    }

    #[test]
    fn test_stub_display_only_derives_numeric() {
        let doc = stub_to_document(
            DocumentFamily::Determination,
            &row(json!({"document_display_id": "L36668"})),
        )
        .unwrap();
        assert!(doc.numeric_id().is_none());
        assert_eq!(doc.effective_numeric_id(), Some("36668"));
    }

    #[test]
    fn test_report_params_only_configured_filters() {
        let query = QueryConfig {
            states: vec!["CA".into(), "NY".into()],
            status: Some("A".into()),
            ..Default::default()
        };
        let params = ReportListing::report_params(&query);
        assert_eq!(params.keys(), vec!["state", "status"]);
        assert_eq!(params.get("state"), Some("CA,NY"));
    }

    #[tokio::test]
    async fn test_listing_articles_first_and_follows_pages() {
        let api = Arc::new(PagedApi {
            pages: vec![
                (
                    ARTICLE_REPORT_PATH.to_string(),
                    None,
                    page(json!([{"article_id": "1", "display_id": "A1"}]), Some("p2")),
                ),
                (
                    ARTICLE_REPORT_PATH.to_string(),
                    Some("p2".to_string()),
                    page(json!([{"article_id": "2"}, {"title": "no ids"}]), None),
                ),
                (
                    DETERMINATION_REPORT_PATH.to_string(),
                    None,
                    page(json!([{"lcd_id": "9", "lcd_display_id": "L9"}]), None),
                ),
            ],
            calls: Mutex::new(Vec::new()),
        });

        let listing = ReportListing::new(api.clone());
        let docs = listing.list_documents(&QueryConfig::default()).await.unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.output_id()).collect();
        assert_eq!(ids, vec!["1", "2", "9"]);
        assert_eq!(docs[2].family(), DocumentFamily::Determination);
        assert_eq!(api.calls.lock().unwrap().len(), 3);
    }

    fn error_page(status: u16, message: &str) -> ApiResponse {
        ApiResponse::new(
            status,
            ApiEnvelope {
                meta: ApiMeta::default(),
                data: Vec::new(),
                message: Some(json!(message)),
            },
        )
    }

    #[tokio::test]
    async fn test_error_status_on_first_page_fails_listing() {
        let api = Arc::new(PagedApi {
            pages: vec![(
                ARTICLE_REPORT_PATH.to_string(),
                None,
                error_page(400, "Invalid parameter: state"),
            )],
            calls: Mutex::new(Vec::new()),
        });

        let listing = ReportListing::new(api.clone());
        let err = listing
            .list_documents(&QueryConfig::default())
            .await
            .unwrap_err();

        match err {
            HarvestError::CoverageApi(api_err) => assert_eq!(api_err.status(), Some(400)),
            other => panic!("unexpected error: {other:?}"),
        }
        // the Determination report is not attempted after a failure
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_on_later_page_fails_listing() {
        let api = Arc::new(PagedApi {
            pages: vec![
                (
                    ARTICLE_REPORT_PATH.to_string(),
                    None,
                    page(json!([{"article_id": "1"}]), Some("p2")),
                ),
                (
                    ARTICLE_REPORT_PATH.to_string(),
                    Some("p2".to_string()),
                    error_page(503, "Service Unavailable"),
                ),
            ],
            calls: Mutex::new(Vec::new()),
        });

        let listing = ReportListing::new(api);
        let result = listing.list_documents(&QueryConfig::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_repeated_token_ends_walk() {
        let api = Arc::new(PagedApi {
            pages: vec![
                (
                    ARTICLE_REPORT_PATH.to_string(),
                    None,
                    page(json!([{"article_id": "1"}]), Some("loop")),
                ),
                (
                    ARTICLE_REPORT_PATH.to_string(),
                    Some("loop".to_string()),
                    page(json!([{"article_id": "2"}]), Some("loop")),
                ),
            ],
            calls: Mutex::new(Vec::new()),
        });

        let listing = ReportListing::new(api.clone());
        let query = QueryConfig {
            include_determinations: false,
            ..Default::default()
        };
        let docs = listing.list_documents(&query).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(api.calls.lock().unwrap().len(), 2);
    }
}
