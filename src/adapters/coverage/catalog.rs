//! Endpoint catalog
//!
//! Static table mapping each [`RowFamily`] to the physical data endpoints
//! that serve it, scoped to the document families each endpoint supports.
//! Within a row family the Article template comes first and the
//! Determination template second.

use crate::domain::{DocumentFamily, RowFamily};

/// One physical endpoint serving a row family for one document family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    pub row_family: RowFamily,
    pub document_family: DocumentFamily,
    pub path: String,
    /// Whether the endpoint answers a call without any identifier filter
    pub accepts_unfiltered: bool,
}

impl EndpointTemplate {
    pub fn new(
        row_family: RowFamily,
        document_family: DocumentFamily,
        path: impl Into<String>,
    ) -> Self {
        Self {
            row_family,
            document_family,
            path: path.into(),
            accepts_unfiltered: false,
        }
    }

    pub fn unfiltered(mut self) -> Self {
        self.accepts_unfiltered = true;
        self
    }
}

const DATA_ENDPOINTS: &[(RowFamily, DocumentFamily, &str)] = &[
    (RowFamily::CodeTable, DocumentFamily::Article, "/v1/data/article/code-table"),
    (RowFamily::CodeTable, DocumentFamily::Determination, "/v1/data/lcd/code-table"),
    (RowFamily::IcdCovered, DocumentFamily::Article, "/v1/data/article/icd10-covered"),
    (RowFamily::IcdCovered, DocumentFamily::Determination, "/v1/data/lcd/icd10-covered"),
    (RowFamily::IcdNoncovered, DocumentFamily::Article, "/v1/data/article/icd10-noncovered"),
    (RowFamily::IcdNoncovered, DocumentFamily::Determination, "/v1/data/lcd/icd10-noncovered"),
    (RowFamily::ProcedureCode, DocumentFamily::Article, "/v1/data/article/hcpc-code"),
    (RowFamily::ProcedureModifier, DocumentFamily::Article, "/v1/data/article/hcpc-modifier"),
    (RowFamily::RevenueCode, DocumentFamily::Article, "/v1/data/article/revenue-code"),
    (RowFamily::BillType, DocumentFamily::Article, "/v1/data/article/bill-codes"),
];

/// RowFamily to endpoint lookup
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    templates: Vec<EndpointTemplate>,
}

impl Default for EndpointCatalog {
    fn default() -> Self {
        Self::new(
            DATA_ENDPOINTS
                .iter()
                .map(|(row, doc, path)| EndpointTemplate::new(*row, *doc, *path))
                .collect(),
        )
    }
}

impl EndpointCatalog {
    /// Catalog over an explicit template list (catalog order is list order)
    pub fn new(templates: Vec<EndpointTemplate>) -> Self {
        Self { templates }
    }

    /// Row families applicable to a document family, in catalog order
    ///
    /// A row family is included only when it both applies to the family and
    /// has at least one endpoint for it.
    pub fn families_for(&self, family: DocumentFamily) -> Vec<RowFamily> {
        RowFamily::ALL
            .iter()
            .copied()
            .filter(|row| row.applies_to(family))
            .filter(|row| !self.endpoints(*row, family).is_empty())
            .collect()
    }

    /// Endpoints to try for a row family and document family, in order
    pub fn endpoints(&self, row: RowFamily, family: DocumentFamily) -> Vec<&EndpointTemplate> {
        self.templates
            .iter()
            .filter(|t| t.row_family == row && t.document_family == family)
            .collect()
    }

    pub fn templates(&self) -> &[EndpointTemplate] {
        &self.templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_gets_all_families() {
        let catalog = EndpointCatalog::default();
        assert_eq!(catalog.families_for(DocumentFamily::Article), RowFamily::ALL.to_vec());
    }

    #[test]
    fn test_determination_restricted_to_applicable_families() {
        let catalog = EndpointCatalog::default();
        assert_eq!(
            catalog.families_for(DocumentFamily::Determination),
            vec![
                RowFamily::CodeTable,
                RowFamily::IcdCovered,
                RowFamily::IcdNoncovered
            ]
        );
    }

    #[test]
    fn test_endpoints_scoped_by_document_family() {
        let catalog = EndpointCatalog::default();
        let article = catalog.endpoints(RowFamily::IcdCovered, DocumentFamily::Article);
        let lcd = catalog.endpoints(RowFamily::IcdCovered, DocumentFamily::Determination);
        assert_eq!(article.len(), 1);
        assert_eq!(article[0].path, "/v1/data/article/icd10-covered");
        assert_eq!(lcd[0].path, "/v1/data/lcd/icd10-covered");
        assert!(catalog
            .endpoints(RowFamily::BillType, DocumentFamily::Determination)
            .is_empty());
    }

    #[test]
    fn test_no_default_endpoint_accepts_unfiltered() {
        let catalog = EndpointCatalog::default();
        assert!(catalog.templates().iter().all(|t| !t.accepts_unfiltered));
    }

    #[test]
    fn test_custom_catalog_without_endpoint_drops_family() {
        let catalog = EndpointCatalog::new(vec![EndpointTemplate::new(
            RowFamily::CodeTable,
            DocumentFamily::Article,
            "/code-table",
        )]);
        assert_eq!(
            catalog.families_for(DocumentFamily::Article),
            vec![RowFamily::CodeTable]
        );
        assert!(catalog.families_for(DocumentFamily::Determination).is_empty());
    }
}
