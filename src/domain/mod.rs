//! Domain models and types for covharvest.
//!
//! This module contains the core domain types shared by every layer: document
//! references and their identifiers, row families, normalized rows, change
//! records and the error taxonomy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`DocumentId`], [`DisplayId`])
//! - **Document references** ([`DocumentRef`], [`DocumentFamily`])
//! - **Row models** ([`RowFamily`], [`NormalizedCodeRow`], [`ZeroYieldRecord`])
//! - **Change records** ([`ChangeRecord`], [`ChangeType`])
//! - **Error types** ([`HarvestError`], [`CoverageApiError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Numeric ids and display ids are distinct newtypes, so a display id can't be
//! passed where the catalog expects a numeric id:
//!
//! ```rust
//! use covharvest::domain::{DisplayId, DocumentFamily, DocumentRef};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let display = DisplayId::new("A59636")?;
//! assert_eq!(DocumentFamily::from_display_id(&display), Some(DocumentFamily::Article));
//!
//! let doc = DocumentRef::new(DocumentFamily::Article, None, Some("A59636"))?;
//! assert_eq!(doc.effective_numeric_id(), Some("59636"));
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, HarvestError>`]:
//!
//! ```rust,no_run
//! use covharvest::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = covharvest::config::load_config("covharvest.toml")?;
//!     config.validate().map_err(covharvest::domain::HarvestError::Configuration)?;
//!     Ok(())
//! }
//! ```

pub mod change;
pub mod document;
pub mod errors;
pub mod ids;
pub mod result;
pub mod rows;
pub mod shape;

// Re-export commonly used types for convenience
pub use change::{ChangeRecord, ChangeType};
pub use document::{DocumentFamily, DocumentRef};
pub use errors::{CoverageApiError, HarvestError};
pub use ids::{DisplayId, DocumentId};
pub use result::Result;
pub use rows::{NormalizedCodeRow, RawRow, RowFamily, RowKey, ZeroYieldReason, ZeroYieldRecord};
pub use shape::ParameterShape;
