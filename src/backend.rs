//! The REST contract reviews are persisted through.
//!
//! | Method | Path              | Body                   |
//! |--------|-------------------|------------------------|
//! | GET    | `/reviews`        | list of review summaries |
//! | GET    | `/reviews/{id}`   | one review             |
//! | POST   | `/reviews`        | create a review        |
//! | PUT    | `/reviews/{id}`   | create or replace      |
//! | GET    | `/reports/{kind}` | report download        |

use std::{fmt, future::Future, str::FromStr};

use crate::domain::{Review, ReviewSummary};

mod error;
pub use error::BackendError;

mod http;
pub use http::HttpBackend;

/// Persistence operations the controllers depend on.
///
/// Any non-2xx response is reported as [`BackendError::Status`]; callers only
/// distinguish success from failure.
pub trait Backend {
    /// Fetches the summaries of all stored reviews.
    fn list_reviews(
        &self,
    ) -> impl Future<Output = Result<Vec<ReviewSummary>, BackendError>> + Send;

    /// Fetches one review by id.
    fn fetch_review(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Review, BackendError>> + Send;

    /// Creates a review under its client-generated id.
    fn create_review(
        &self,
        review: &Review,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Creates or replaces a review.
    fn save_review(
        &self,
        review: &Review,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// A downloadable report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// One row per review.
    Reviews,
    /// One row per stored effect size.
    EffectSizes,
}

impl ReportKind {
    /// The last path segment of the report URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::EffectSizes => "effect_sizes",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reviews" => Ok(Self::Reviews),
            "effect-sizes" | "effect_sizes" => Ok(Self::EffectSizes),
            other => Err(format!(
                "unknown report '{other}', expected 'reviews' or 'effect-sizes'"
            )),
        }
    }
}
