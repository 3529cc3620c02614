//! Row normalization
//!
//! Maps heterogeneous endpoint payloads onto [`NormalizedCodeRow`]. Every
//! concept (code, description, coverage flag, code system) is read through
//! a fixed alias table; values are stringified and trimmed.

pub mod aliases;

use crate::domain::rows::{first_text, FLAG_COVERED, FLAG_NONCOVERED};
use crate::domain::{DocumentRef, NormalizedCodeRow, RawRow, RowFamily};

/// Normalize one raw row returned for `doc` by a `row_family` endpoint
///
/// Returns `None` when the row carries no code.
///
/// Coverage flag: an explicit field wins; otherwise the covered and
/// non-covered endpoints imply their flag and every other family leaves it
/// empty. Boolean flags map to `covered`/`noncovered`.
///
/// # Examples
///
/// ```
/// use covharvest::core::normalize::normalize_row;
/// use covharvest::domain::{DocumentFamily, DocumentRef, RawRow, RowFamily};
///
/// let doc = DocumentRef::new(DocumentFamily::Article, Some("59636"), None).unwrap();
/// let raw: RawRow = serde_json::from_str(r#"{"icd10_code_id": "E11.9"}"#).unwrap();
///
/// let row = normalize_row(&doc, RowFamily::IcdCovered, &raw).unwrap();
/// assert_eq!(row.code_system, "ICD10-CM");
/// assert_eq!(row.coverage_flag, "covered");
/// ```
pub fn normalize_row(
    doc: &DocumentRef,
    row_family: RowFamily,
    raw: &RawRow,
) -> Option<NormalizedCodeRow> {
    let code = first_text(raw, aliases::CODE)?;

    let code_system = first_text(raw, aliases::CODE_SYSTEM)
        .unwrap_or_else(|| row_family.default_code_system().to_string());

    let coverage_flag = first_text(raw, aliases::COVERAGE_FLAG)
        .map(|flag| canonical_flag(&flag))
        .or_else(|| row_family.implied_flag().map(str::to_string))
        .unwrap_or_default();

    Some(NormalizedCodeRow {
        doc_family: doc.family().as_str().to_string(),
        doc_id: doc.output_id().to_string(),
        code_system,
        code,
        description: first_text(raw, aliases::DESCRIPTION).unwrap_or_default(),
        coverage_flag,
    })
}

/// Normalize a batch, dropping rows without a code
pub fn normalize_rows(
    doc: &DocumentRef,
    row_family: RowFamily,
    raw: &[RawRow],
) -> Vec<NormalizedCodeRow> {
    let rows: Vec<NormalizedCodeRow> = raw
        .iter()
        .filter_map(|r| normalize_row(doc, row_family, r))
        .collect();

    let dropped = raw.len() - rows.len();
    if dropped > 0 {
        tracing::debug!(
            document = %doc,
            row_family = %row_family,
            dropped = dropped,
            "Dropped rows without a code"
        );
    }
    rows
}

/// Booleans rendered by [`first_text`] become the canonical flag words
fn canonical_flag(flag: &str) -> String {
    match flag {
        "true" => FLAG_COVERED.to_string(),
        "false" => FLAG_NONCOVERED.to_string(),
        other => other.to_string(),
    }
}
