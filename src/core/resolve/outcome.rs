//! Per-shape outcomes
//!
//! A rejected shape or an unsupported route is an expected answer while
//! probing, not an error, so the transport response is folded into a tagged
//! outcome the resolver branches on.

use crate::adapters::coverage::ApiResponse;
use crate::domain::RawRow;

/// Server-message fragments that identify a route the document family
/// doesn't have
const UNSUPPORTED_ROUTE_MARKERS: &[&str] = &[
    "route not found",
    "no route",
    "not supported",
    "unknown endpoint",
    "invalid endpoint",
    "not found for this document type",
];

/// What one shape produced on one endpoint
#[derive(Debug, Clone)]
pub enum ShapeOutcome {
    /// Non-empty `data`
    Rows(Vec<RawRow>),
    /// Success with no rows
    Empty,
    /// Non-retryable client error for this shape; try the next one
    ShapeRejected { status: u16, message: String },
    /// The endpoint doesn't serve this document family at all
    EndpointUnsupported { status: u16, message: String },
}

impl ShapeOutcome {
    /// Classify a response the transport returned (2xx or passed-through 4xx)
    pub fn classify(response: ApiResponse) -> Self {
        if response.is_success() {
            let rows = response.into_rows();
            return if rows.is_empty() {
                ShapeOutcome::Empty
            } else {
                ShapeOutcome::Rows(rows)
            };
        }

        let status = response.status;
        let message = response.body.server_message().unwrap_or_default();
        if response.is_client_error() && is_unsupported_route(&message) {
            ShapeOutcome::EndpointUnsupported { status, message }
        } else {
            ShapeOutcome::ShapeRejected { status, message }
        }
    }
}

/// True when a server message says the route itself doesn't exist
pub fn is_unsupported_route(message: &str) -> bool {
    let lowered = message.to_lowercase();
    UNSUPPORTED_ROUTE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
