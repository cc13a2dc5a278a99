//! evol-kiosk - Evol Jewels in-store style-survey kiosk.
//!
//! The crate drives a four-step survey (style, occasion, budget, metal),
//! submits the answers to the recommendation backend, shows the picks, and
//! hands the session off to a phone through a passport QR code. An AI stylist
//! chat, a local wishlist, and idle handling (attract mode and auto-reset)
//! sit around that flow.
//!
//! # Example
//!
//! ```no_run
//! use evol_kiosk::{Config, FlowController, HttpBackend};
//!
//! # async fn demo() -> Result<(), evol_kiosk::Error> {
//! let config = Config::load()?;
//! let backend = HttpBackend::from_config(&config)?;
//!
//! let mut flow = FlowController::new();
//! flow.start()?;
//! for pick in [2, 1, 2, 1] {
//!     flow.choose(pick)?;
//!     if flow.state().name() != "metal" {
//!         flow.advance()?;
//!     }
//! }
//! flow.submit(&backend).await?;
//!
//! if let Some(result) = flow.state().result() {
//!     println!("{}: {} pieces", result.vibe, result.recommendations.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Stale responses
//!
//! Restarting, or leaving a screen while a submission is in flight, bumps the
//! flow epoch. Submissions carry the epoch they were started under and chat
//! replies carry their chat session, so results arriving after the user has
//! moved on are dropped.

pub mod api_types;
pub mod attract;
pub mod backend;
pub mod chat;
pub mod config;
pub mod errors;
pub mod flow;
pub mod kiosk;
pub mod passport;
pub mod render;
pub mod routes;
pub mod survey;
pub mod timers;
pub mod wishlist;

// Re-export public API
pub use api_types::{Passport, Product, Recommendation, RecommendationResult, SurveyRequest};
pub use backend::{Backend, HttpBackend};
pub use chat::{ChatSession, ParsedIntent, parse_intent};
pub use config::Config;
pub use errors::Error;
pub use flow::{FlowController, FlowState, SubmissionOutcome};
pub use kiosk::Kiosk;
pub use passport::{PassportQr, QrBitmap, encode_qr, passport_url};
pub use routes::{Route, RouteView, rehydrate};
pub use survey::{Budget, Metal, Occasion, Style, SurveyAnswers, SurveyStep};
pub use wishlist::{FileStorage, LocalStorage, MemoryStorage, Wishlist};
