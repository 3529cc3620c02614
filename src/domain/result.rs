//! Result type alias for covharvest
//!
//! This module provides a convenient Result type alias that uses HarvestError
//! as the error type.

use super::errors::HarvestError;

/// Result type alias for covharvest operations
///
/// # Examples
///
/// ```
/// use covharvest::domain::result::Result;
/// use covharvest::domain::errors::HarvestError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HarvestError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HarvestError>;
