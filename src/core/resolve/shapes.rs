//! Candidate parameter shapes
//!
//! Shapes are generated most-specific first:
//!
//! 1. numeric id + version, for each id key of the document family
//! 2. numeric id alone, same key order
//! 3. display id + version, then display id alone
//! 4. the empty shape, only for endpoints that accept unfiltered calls

use crate::adapters::coverage::EndpointTemplate;
use crate::domain::{DocumentFamily, DocumentRef, ParameterShape};

/// Query key for the document version
pub const VERSION_KEY: &str = "document_version";

/// Query key for the display id
pub const DISPLAY_KEY: &str = "document_display_id";

/// Numeric id keys in try order: the family-specific key, then the generic one
pub fn id_keys(family: DocumentFamily) -> &'static [&'static str] {
    match family {
        DocumentFamily::Article => &["article_id", "document_id"],
        DocumentFamily::Determination => &["lcd_id", "document_id"],
    }
}

/// Ordered, de-duplicated shapes to try for one document on one endpoint
pub fn candidate_shapes(doc: &DocumentRef, endpoint: &EndpointTemplate) -> Vec<ParameterShape> {
    let keys = id_keys(endpoint.document_family);
    let numeric = doc.effective_numeric_id();
    let display = doc.display_id().map(|d| d.as_str());
    let version = doc.version();

    let mut shapes: Vec<ParameterShape> = Vec::new();
    let mut push = |shape: ParameterShape| {
        if !shapes.contains(&shape) {
            shapes.push(shape);
        }
    };

    if let Some(id) = numeric {
        if let Some(version) = version {
            for key in keys {
                push(ParameterShape::new().with(*key, id).with(VERSION_KEY, version));
            }
        }
        for key in keys {
            push(ParameterShape::new().with(*key, id));
        }
    }

    if let Some(display) = display {
        if let Some(version) = version {
            push(
                ParameterShape::new()
                    .with(DISPLAY_KEY, display)
                    .with(VERSION_KEY, version),
            );
        }
        push(ParameterShape::new().with(DISPLAY_KEY, display));
    }

    if endpoint.accepts_unfiltered {
        push(ParameterShape::new());
    }

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RowFamily;

    fn endpoint(family: DocumentFamily) -> EndpointTemplate {
        EndpointTemplate::new(RowFamily::CodeTable, family, "/code-table")
    }

    fn rendered(shapes: &[ParameterShape]) -> Vec<String> {
        shapes.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_full_article_order() {
        let doc = DocumentRef::new(DocumentFamily::Article, Some("59636"), Some("A59636"))
            .unwrap()
            .with_version("7");
        let shapes = candidate_shapes(&doc, &endpoint(DocumentFamily::Article));
        assert_eq!(
            rendered(&shapes),
            vec![
                "{article_id=59636, document_version=7}",
                "{document_id=59636, document_version=7}",
                "{article_id=59636}",
                "{document_id=59636}",
                "{document_display_id=A59636, document_version=7}",
                "{document_display_id=A59636}",
            ]
        );
    }

    #[test]
    fn test_determination_without_version() {
        let doc =
            DocumentRef::new(DocumentFamily::Determination, Some("36668"), Some("L36668")).unwrap();
        let shapes = candidate_shapes(&doc, &endpoint(DocumentFamily::Determination));
        assert_eq!(
            rendered(&shapes),
            vec!["{lcd_id=36668}", "{document_id=36668}", "{document_display_id=L36668}"]
        );
    }

    #[test]
    fn test_display_only_uses_derived_numeric_id() {
        let doc = DocumentRef::new(DocumentFamily::Article, None, Some("A100")).unwrap();
        let shapes = candidate_shapes(&doc, &endpoint(DocumentFamily::Article));
        assert_eq!(
            rendered(&shapes),
            vec!["{article_id=100}", "{document_id=100}", "{document_display_id=A100}"]
        );
    }

    #[test]
    fn test_empty_shape_only_when_unfiltered_accepted() {
        let doc = DocumentRef::new(DocumentFamily::Article, Some("1"), None).unwrap();
        let closed = candidate_shapes(&doc, &endpoint(DocumentFamily::Article));
        assert!(closed.iter().all(|s| !s.is_empty()));

        let open = candidate_shapes(&doc, &endpoint(DocumentFamily::Article).unfiltered());
        assert!(open.last().unwrap().is_empty());
        assert_eq!(open.len(), closed.len() + 1);
    }
}
