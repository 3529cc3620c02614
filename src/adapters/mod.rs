//! External system integrations for covharvest.
//!
//! - [`coverage`] - Coverage API: transport, license token, endpoint catalog,
//!   document listing
//!
//! # Design Pattern
//!
//! Adapters isolate the HTTP client behind the [`coverage::CoverageApi`] and
//! [`coverage::DocumentSource`] traits so the core can be driven by in-memory
//! fakes in tests.
//!
//! ```rust,no_run
//! use covharvest::adapters::coverage::{CoverageApi, CoverageTransport};
//! use covharvest::config::ApiConfig;
//! use covharvest::domain::ParameterShape;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = CoverageTransport::new(ApiConfig::default())?;
//!
//! let shape = ParameterShape::new().with("article_id", "59636");
//! let response = transport.get("/v1/data/article/code-table", &shape).await?;
//! println!("status={} rows={}", response.status, response.rows().len());
//! # Ok(())
//! # }
//! ```

pub mod coverage;
