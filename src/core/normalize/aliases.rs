//! Field-name alias tables, consulted in the listed order

/// Code value
pub const CODE: &[&str] = &[
    "code",
    "Code",
    "hcpc_code_id",
    "icd10_code_id",
    "hcpc_modifier_code_id",
    "revenue_code_id",
    "bill_type_code_id",
];

/// Free-text description
pub const DESCRIPTION: &[&str] = &[
    "description",
    "Description",
    "long_description",
    "short_description",
];

/// Explicit coverage flag
pub const COVERAGE_FLAG: &[&str] = &["coverage_flag", "covered", "coverage"];

/// Explicit code system
pub const CODE_SYSTEM: &[&str] = &["code_system", "codeSystem"];
