//! Identifier resolution
//!
//! The catalog's data endpoints accept several incompatible ways of naming a
//! document. The resolver generates candidate [`ParameterShape`]s
//! (most-specific first), classifies each response as a [`ShapeOutcome`],
//! and stops at the first shape that yields rows.
//!
//! [`ParameterShape`]: crate::domain::ParameterShape

pub mod outcome;
pub mod resolver;
pub mod shapes;

pub use outcome::ShapeOutcome;
pub use resolver::{AvailabilityCache, IdentifierResolver, Resolution};
pub use shapes::candidate_shapes;
