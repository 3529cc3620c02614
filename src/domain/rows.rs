//! Row families and normalized row records
//!
//! [`RowFamily`] enumerates the logical code-table kinds the catalog serves.
//! [`NormalizedCodeRow`] is the canonical unit that snapshots and the diff
//! engine operate on; [`ZeroYieldRecord`] reports documents that produced
//! no rows at all.

use super::document::DocumentFamily;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A field-named record returned by one endpoint call, opaque until normalized
pub type RawRow = serde_json::Map<String, serde_json::Value>;

/// First non-empty value among `aliases`, stringified and trimmed
///
/// Aliases are consulted in order. Numbers and booleans are rendered as
/// text; nulls, blank strings, arrays and objects count as absent.
pub fn first_text(row: &RawRow, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|key| match row.get(*key)? {
        serde_json::Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Coverage flag implied by the covered-conditions endpoints
pub const FLAG_COVERED: &str = "covered";

/// Coverage flag implied by the non-covered-conditions endpoints
pub const FLAG_NONCOVERED: &str = "noncovered";

/// Logical code-table kinds
///
/// Variant order is the catalog order: when two families disagree about a
/// row's coverage flag, the earlier family wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowFamily {
    CodeTable,
    IcdCovered,
    IcdNoncovered,
    ProcedureCode,
    ProcedureModifier,
    RevenueCode,
    BillType,
}

impl RowFamily {
    /// Every row family, in catalog order
    pub const ALL: [RowFamily; 7] = [
        RowFamily::CodeTable,
        RowFamily::IcdCovered,
        RowFamily::IcdNoncovered,
        RowFamily::ProcedureCode,
        RowFamily::ProcedureModifier,
        RowFamily::RevenueCode,
        RowFamily::BillType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RowFamily::CodeTable => "code-table",
            RowFamily::IcdCovered => "icd-covered",
            RowFamily::IcdNoncovered => "icd-noncovered",
            RowFamily::ProcedureCode => "procedure-code",
            RowFamily::ProcedureModifier => "procedure-modifier",
            RowFamily::RevenueCode => "revenue-code",
            RowFamily::BillType => "bill-type",
        }
    }

    /// Document families that support this row family
    pub fn applicability(&self) -> &'static [DocumentFamily] {
        const BOTH: &[DocumentFamily] = &[DocumentFamily::Article, DocumentFamily::Determination];
        const ARTICLE_ONLY: &[DocumentFamily] = &[DocumentFamily::Article];
        match self {
            RowFamily::CodeTable | RowFamily::IcdCovered | RowFamily::IcdNoncovered => BOTH,
            RowFamily::ProcedureCode
            | RowFamily::ProcedureModifier
            | RowFamily::RevenueCode
            | RowFamily::BillType => ARTICLE_ONLY,
        }
    }

    pub fn applies_to(&self, family: DocumentFamily) -> bool {
        self.applicability().contains(&family)
    }

    /// Code system used when the payload doesn't name one
    pub fn default_code_system(&self) -> &'static str {
        match self {
            RowFamily::CodeTable => "",
            RowFamily::IcdCovered | RowFamily::IcdNoncovered => "ICD10-CM",
            RowFamily::ProcedureCode => "HCPCS/CPT",
            RowFamily::ProcedureModifier => "HCPCS Modifier",
            RowFamily::RevenueCode => "Revenue",
            RowFamily::BillType => "Bill Type",
        }
    }

    /// Coverage flag implied by the endpoint itself, if any
    pub fn implied_flag(&self) -> Option<&'static str> {
        match self {
            RowFamily::IcdCovered => Some(FLAG_COVERED),
            RowFamily::IcdNoncovered => Some(FLAG_NONCOVERED),
            _ => None,
        }
    }
}

impl fmt::Display for RowFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RowFamily::ALL
            .iter()
            .copied()
            .find(|family| family.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown row family '{s}'"))
    }
}

/// Canonical code row
///
/// `(doc_family, doc_id, code_system, code)` is unique within one snapshot.
/// The serde aliases let older snapshot files be read as a diff baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCodeRow {
    #[serde(alias = "doc_type", alias = "document_type")]
    pub doc_family: String,
    #[serde(alias = "document_id", alias = "article_id")]
    pub doc_id: String,
    #[serde(default)]
    pub code_system: String,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub coverage_flag: String,
}

impl NormalizedCodeRow {
    pub fn key(&self) -> RowKey {
        RowKey {
            doc_family: self.doc_family.clone(),
            doc_id: self.doc_id.clone(),
            code_system: self.code_system.clone(),
            code: self.code.clone(),
        }
    }
}

/// Identity of a code row within a snapshot, ordered field by field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub doc_family: String,
    pub doc_id: String,
    pub code_system: String,
    pub code: String,
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.doc_family, self.doc_id, self.code_system, self.code
        )
    }
}

/// Why a document produced no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroYieldReason {
    /// Every applicable family answered, all empty
    NoRows,
    /// Some families failed, the rest were empty
    NoRowsPartialFailure,
    /// Every attempted family failed
    FetchFailed,
    /// No row family applies to the document's family
    NoApplicableFamilies,
}

impl ZeroYieldReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZeroYieldReason::NoRows => "no_rows",
            ZeroYieldReason::NoRowsPartialFailure => "no_rows_partial_failure",
            ZeroYieldReason::FetchFailed => "fetch_failed",
            ZeroYieldReason::NoApplicableFamilies => "no_applicable_families",
        }
    }

    /// True when the document's emptiness may be caused by fetch failures
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            ZeroYieldReason::NoRowsPartialFailure | ZeroYieldReason::FetchFailed
        )
    }
}

impl fmt::Display for ZeroYieldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document that produced zero normalized rows
///
/// `reason` is kept as text so that merged shard tables from older runs
/// with other reason labels still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroYieldRecord {
    #[serde(alias = "doc_type", alias = "document_type")]
    pub doc_family: String,
    #[serde(alias = "document_id")]
    pub doc_id: String,
    #[serde(default, alias = "document_display_id")]
    pub display_id: String,
    #[serde(default)]
    pub reason: String,
}

impl ZeroYieldRecord {
    pub fn new(
        doc_family: DocumentFamily,
        doc_id: impl Into<String>,
        display_id: impl Into<String>,
        reason: ZeroYieldReason,
    ) -> Self {
        Self {
            doc_family: doc_family.as_str().to_string(),
            doc_id: doc_id.into(),
            display_id: display_id.into(),
            reason: reason.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(RowFamily::CodeTable, true ; "code table")]
    #[test_case(RowFamily::IcdCovered, true ; "icd covered")]
    #[test_case(RowFamily::IcdNoncovered, true ; "icd noncovered")]
    #[test_case(RowFamily::ProcedureCode, false ; "procedure code")]
    #[test_case(RowFamily::ProcedureModifier, false ; "procedure modifier")]
    #[test_case(RowFamily::RevenueCode, false ; "revenue code")]
    #[test_case(RowFamily::BillType, false ; "bill type")]
    fn test_determination_applicability(family: RowFamily, expected: bool) {
        assert!(family.applies_to(DocumentFamily::Article));
        assert_eq!(family.applies_to(DocumentFamily::Determination), expected);
    }

    #[test_case(RowFamily::IcdCovered, "ICD10-CM", Some("covered") ; "covered")]
    #[test_case(RowFamily::IcdNoncovered, "ICD10-CM", Some("noncovered") ; "noncovered")]
    #[test_case(RowFamily::ProcedureCode, "HCPCS/CPT", None ; "procedure")]
    #[test_case(RowFamily::RevenueCode, "Revenue", None ; "revenue")]
    #[test_case(RowFamily::BillType, "Bill Type", None ; "bill type")]
    #[test_case(RowFamily::CodeTable, "", None ; "code table")]
    fn test_family_inference(family: RowFamily, system: &str, flag: Option<&str>) {
        assert_eq!(family.default_code_system(), system);
        assert_eq!(family.implied_flag(), flag);
    }

    #[test]
    fn test_row_family_round_trips_through_str() {
        for family in RowFamily::ALL {
            assert_eq!(RowFamily::from_str(family.as_str()).unwrap(), family);
        }
        assert!(RowFamily::from_str("hcpc").is_err());
    }

    #[test]
    fn test_row_key_ordering() {
        let a = RowKey {
            doc_family: "Article".into(),
            doc_id: "1".into(),
            code_system: "ICD10-CM".into(),
            code: "E11.9".into(),
        };
        let b = RowKey {
            code: "E11.65".into(),
            ..a.clone()
        };
        assert!(b < a);
    }

    #[test]
    fn test_normalized_row_reads_legacy_field_names() {
        let json = r#"{"doc_type":"Article","document_id":"59636","code":"E11.9"}"#;
        let row: NormalizedCodeRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.doc_family, "Article");
        assert_eq!(row.doc_id, "59636");
        assert_eq!(row.code_system, "");
        assert_eq!(row.coverage_flag, "");
    }

    #[test]
    fn test_first_text_alias_priority() {
        let row: RawRow = serde_json::from_str(
            r#"{"code": "  ", "Code": null, "hcpc_code_id": 97110, "icd10_code_id": "E11.9"}"#,
        )
        .unwrap();
        assert_eq!(
            first_text(&row, &["code", "Code", "hcpc_code_id", "icd10_code_id"]),
            Some("97110".to_string())
        );
        assert_eq!(first_text(&row, &["missing"]), None);
    }

    #[test]
    fn test_zero_yield_record_labels() {
        let record = ZeroYieldRecord::new(
            DocumentFamily::Determination,
            "36668",
            "L36668",
            ZeroYieldReason::FetchFailed,
        );
        assert_eq!(record.doc_family, "LCD");
        assert_eq!(record.reason, "fetch_failed");
        assert!(ZeroYieldReason::FetchFailed.is_degraded());
        assert!(!ZeroYieldReason::NoRows.is_degraded());
    }
}
