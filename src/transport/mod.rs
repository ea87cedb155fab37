//! Report delivery.
//!
//! The agent only needs one thing from a transport: take a finished report
//! and try once to deliver it. A failed report is dropped and the next cycle
//! sends fresh data.

mod https;

use async_trait::async_trait;

use crate::error::SubmitError;
use crate::models::Report;

pub use https::HttpsTransport;

/// Delivers reports to the metrics platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Attempt delivery exactly once.
    async fn submit(&self, report: &Report) -> Result<(), SubmitError>;
}
