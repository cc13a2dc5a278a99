//! Recommendation backend seam.
//!
//! The kiosk only consumes the backend; [`Backend`] is the trait the flow,
//! chat and routes depend on, and [`HttpBackend`] is the reqwest-backed
//! implementation used by the binary.

#[cfg(test)]
pub(crate) mod fake;
mod http;

use async_trait::async_trait;

use crate::api_types::{Passport, Product, RecommendationResult, SurveyRequest, VibeReply, VibeRequest};
use crate::errors::Error;

pub use http::HttpBackend;

/// Backend HTTP JSON API as seen from the kiosk.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Liveness probe. Callers ignore the outcome beyond logging.
    async fn health(&self) -> Result<(), Error>;

    /// Full catalog, in backend order.
    async fn products(&self) -> Result<Vec<Product>, Error>;

    /// Submit completed survey answers. Safe to resend the same body.
    async fn submit_survey(&self, request: &SurveyRequest) -> Result<RecommendationResult, Error>;

    /// Persisted result for a session, including the survey that produced it.
    async fn passport(&self, session_id: &str) -> Result<Passport, Error>;

    /// Vibe classification for a chat query.
    async fn ai_vibe(&self, request: &VibeRequest) -> Result<VibeReply, Error>;
}
