//! Coverage API adapter
//!
//! Transport, license-token lifecycle, wire models, the static endpoint
//! catalog and the report listing that discovers candidate documents.

pub mod auth;
pub mod catalog;
pub mod listing;
pub mod models;
pub mod transport;

pub use catalog::{EndpointCatalog, EndpointTemplate};
pub use listing::{DocumentSource, ReportListing, StaticDocuments};
pub use models::{ApiEnvelope, ApiResponse};
pub use transport::{CoverageApi, CoverageTransport};
