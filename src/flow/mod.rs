//! Kiosk flow state machine.
//!
//! `Welcome → Style → Occasion → Budget → Metal → Recommendations →
//! ChatDetail → QR`, with restart reachable from everywhere. Survey
//! submission is split into [`FlowController::begin_submission`] and
//! [`FlowController::complete_submission`] so the runtime can await the
//! backend without holding the controller. Every completion carries the
//! epoch it was started under; restart and navigation away bump the epoch,
//! so a late response can never land on a newer flow.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api_types::{Product, RecommendationResult, SurveyRequest};
use crate::backend::Backend;
use crate::chat::ChatSession;
use crate::errors::Error;
use crate::survey::{SurveyAnswers, SurveyStep};

/// The screen the kiosk is showing, with the data that screen needs.
#[derive(Debug, Clone)]
pub enum FlowState {
    Welcome,
    Survey(SurveyStep),
    Recommendations {
        result: Arc<RecommendationResult>,
    },
    ChatDetail {
        result: Arc<RecommendationResult>,
        /// Product the shopper opened, if any; seeds the chat copy.
        product: Option<Product>,
        chat: ChatSession,
    },
    Qr {
        result: Arc<RecommendationResult>,
        product: Option<Product>,
    },
}

impl FlowState {
    /// Numbered step, 0 (welcome) through 7 (QR).
    pub fn step_index(&self) -> usize {
        match self {
            FlowState::Welcome => 0,
            FlowState::Survey(step) => step.position(),
            FlowState::Recommendations { .. } => 5,
            FlowState::ChatDetail { .. } => 6,
            FlowState::Qr { .. } => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Welcome => "welcome",
            FlowState::Survey(step) => step.field_name(),
            FlowState::Recommendations { .. } => "recommendations",
            FlowState::ChatDetail { .. } => "chat",
            FlowState::Qr { .. } => "qr",
        }
    }

    pub fn result(&self) -> Option<&Arc<RecommendationResult>> {
        match self {
            FlowState::Recommendations { result }
            | FlowState::ChatDetail { result, .. }
            | FlowState::Qr { result, .. } => Some(result),
            FlowState::Welcome | FlowState::Survey(_) => None,
        }
    }

    /// Session id of the active result; drives the passport QR.
    pub fn session_id(&self) -> Option<&str> {
        self.result().map(|r| r.session_id.as_str())
    }
}

/// A survey body cleared for sending, tagged with the epoch it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub epoch: u64,
    pub request: SurveyRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionOutcome {
    /// The result was current and the flow moved to recommendations.
    Applied,
    /// The flow moved on while the request was out; nothing changed.
    Stale,
}

/// Owns the flow state, the survey answers and the epoch guard.
#[derive(Debug)]
pub struct FlowController {
    state: FlowState,
    answers: SurveyAnswers,
    epoch: u64,
    in_flight: bool,
    rng: StdRng,
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowController {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Controller with a fixed seed for the greeting picker.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: FlowState::Welcome,
            answers: SurveyAnswers::default(),
            epoch: 0,
            in_flight: false,
            rng,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn answers(&self) -> &SurveyAnswers {
        &self.answers
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn step_index(&self) -> usize {
        self.state.step_index()
    }

    /// True while a survey submission is outstanding; the submit action is disabled.
    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Whether "continue" is enabled on the current survey step.
    pub fn can_advance(&self) -> bool {
        match self.state {
            FlowState::Survey(step) => self.answers.is_answered(step),
            _ => false,
        }
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        match &self.state {
            FlowState::ChatDetail { chat, .. } => Some(chat),
            _ => None,
        }
    }

    pub fn chat_mut(&mut self) -> Option<&mut ChatSession> {
        match &mut self.state {
            FlowState::ChatDetail { chat, .. } => Some(chat),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }

    /// Move to `next`. Leaving a screen orphans any outstanding submission.
    fn transition(&mut self, next: FlowState) {
        if self.in_flight {
            self.epoch += 1;
            self.in_flight = false;
            debug!(epoch = self.epoch, "abandoned in-flight submission");
        }
        debug!(from = self.state.name(), to = next.name(), "flow transition");
        self.state = next;
    }

    pub fn start(&mut self) -> Result<(), Error> {
        match self.state {
            FlowState::Welcome => {
                self.transition(FlowState::Survey(SurveyStep::Style));
                Ok(())
            }
            _ => Err(self.invalid("start")),
        }
    }

    /// Pick the option at a 1-based `position` on the current survey step.
    pub fn choose(&mut self, position: usize) -> Result<(), Error> {
        match self.state {
            FlowState::Survey(step) => self.answers.choose(step, position),
            _ => Err(self.invalid("choose an option")),
        }
    }

    /// Continue to the next survey step. The metal step submits instead.
    pub fn advance(&mut self) -> Result<(), Error> {
        let FlowState::Survey(step) = self.state else {
            return Err(self.invalid("continue"));
        };
        if !self.answers.is_answered(step) {
            return Err(Error::SelectionRequired(step.field_name()));
        }
        match step.next() {
            Some(next) => {
                self.transition(FlowState::Survey(next));
                Ok(())
            }
            None => Err(self.invalid("continue without submitting")),
        }
    }

    /// Validate the metal step and mark a survey submission as in flight.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, Error> {
        if !matches!(self.state, FlowState::Survey(SurveyStep::Metal)) {
            return Err(self.invalid("submit the survey"));
        }
        if self.in_flight {
            return Err(Error::SubmissionInFlight);
        }
        let request = self.answers.to_request().ok_or_else(|| {
            let missing = [
                SurveyStep::Metal,
                SurveyStep::Style,
                SurveyStep::Occasion,
                SurveyStep::Budget,
            ]
            .into_iter()
            .find(|step| !self.answers.is_answered(*step))
            .unwrap_or(SurveyStep::Metal);
            Error::SelectionRequired(missing.field_name())
        })?;
        Ok(self.mark_in_flight(request))
    }

    /// Submit the stylist's pick (chips or last query) from the chat screen.
    pub fn begin_chat_submission(&mut self) -> Result<PendingSubmission, Error> {
        let FlowState::ChatDetail { chat, .. } = &self.state else {
            return Err(self.invalid("find pieces"));
        };
        if self.in_flight {
            return Err(Error::SubmissionInFlight);
        }
        let request = chat.recommendation_request().ok_or_else(|| {
            Error::InvalidInput(
                "Ask the stylist a question or pick an occasion, style and budget first"
                    .to_string(),
            )
        })?;
        Ok(self.mark_in_flight(request))
    }

    fn mark_in_flight(&mut self, request: SurveyRequest) -> PendingSubmission {
        self.in_flight = true;
        info!(
            epoch = self.epoch,
            style = %request.style,
            occasion = %request.occasion,
            budget = %request.budget,
            "submitting survey"
        );
        PendingSubmission {
            epoch: self.epoch,
            request,
        }
    }

    /// Apply a backend response. Responses from an older epoch are dropped.
    ///
    /// On failure the flow stays where it is and the error is returned so the
    /// caller can let the shopper retry.
    pub fn complete_submission(
        &mut self,
        epoch: u64,
        result: Result<RecommendationResult, Error>,
    ) -> Result<SubmissionOutcome, Error> {
        if epoch != self.epoch || !self.in_flight {
            debug!(epoch, current = self.epoch, "ignoring stale survey response");
            return Ok(SubmissionOutcome::Stale);
        }
        self.in_flight = false;
        match result {
            Ok(result) => {
                info!(
                    session_id = %result.session_id,
                    vibe = %result.vibe,
                    count = result.recommendations.len(),
                    "recommendations received"
                );
                self.state = FlowState::Recommendations {
                    result: Arc::new(result),
                };
                Ok(SubmissionOutcome::Applied)
            }
            Err(e) => {
                warn!(error = %e, "survey submission failed");
                Err(e)
            }
        }
    }

    /// Submit the survey and wait for the response.
    pub async fn submit(&mut self, backend: &dyn Backend) -> Result<SubmissionOutcome, Error> {
        let pending = self.begin_submission()?;
        let result = backend.submit_survey(&pending.request).await;
        self.complete_submission(pending.epoch, result)
    }

    /// Product on recommendation card `position` (1-based).
    pub fn product_at(&self, position: usize) -> Result<&Product, Error> {
        let FlowState::Recommendations { result } = &self.state else {
            return Err(self.invalid("pick a product"));
        };
        position
            .checked_sub(1)
            .and_then(|i| result.recommendations.get(i))
            .map(|r| &r.product)
            .ok_or_else(|| {
                Error::InvalidInput(format!("There is no recommendation {position}"))
            })
    }

    /// Open the stylist chat about the product on card `position`.
    pub fn view_details(&mut self, position: usize) -> Result<(), Error> {
        let product = self.product_at(position)?.clone();
        self.open_chat(Some(product))
    }

    /// Open the stylist chat without a product.
    pub fn ask_stylist(&mut self) -> Result<(), Error> {
        if !matches!(self.state, FlowState::Recommendations { .. }) {
            return Err(self.invalid("ask the stylist"));
        }
        self.open_chat(None)
    }

    fn open_chat(&mut self, product: Option<Product>) -> Result<(), Error> {
        let Some(result) = self.state.result().cloned() else {
            return Err(self.invalid("ask the stylist"));
        };
        let chat = ChatSession::new(product.clone(), &mut self.rng);
        self.transition(FlowState::ChatDetail {
            result,
            product,
            chat,
        });
        Ok(())
    }

    /// Jump from recommendations straight to the QR hand-off.
    pub fn get_on_phone(&mut self) -> Result<(), Error> {
        let FlowState::Recommendations { result } = &self.state else {
            return Err(self.invalid("get results on your phone"));
        };
        let result = Arc::clone(result);
        self.transition(FlowState::Qr {
            result,
            product: None,
        });
        Ok(())
    }

    pub fn continue_to_qr(&mut self) -> Result<(), Error> {
        let FlowState::ChatDetail {
            result, product, ..
        } = &self.state
        else {
            return Err(self.invalid("continue"));
        };
        let next = FlowState::Qr {
            result: Arc::clone(result),
            product: product.clone(),
        };
        self.transition(next);
        Ok(())
    }

    /// One step back. From the chat screen this returns to recommendations
    /// when a product was opened, otherwise to the metal step.
    pub fn back(&mut self) -> Result<(), Error> {
        let next = match &self.state {
            FlowState::Welcome => return Err(self.invalid("go back")),
            FlowState::Survey(step) => step.prev().map_or(FlowState::Welcome, FlowState::Survey),
            FlowState::Recommendations { .. } => FlowState::Survey(SurveyStep::Metal),
            FlowState::ChatDetail {
                result,
                product: Some(_),
                ..
            } => FlowState::Recommendations {
                result: Arc::clone(result),
            },
            FlowState::ChatDetail { product: None, .. } => FlowState::Survey(SurveyStep::Metal),
            FlowState::Qr { result, product } => FlowState::ChatDetail {
                result: Arc::clone(result),
                product: product.clone(),
                chat: ChatSession::new(product.clone(), &mut self.rng),
            },
        };
        self.transition(next);
        Ok(())
    }

    /// Discard answers, result and chat and return to the welcome screen.
    pub fn restart(&mut self) {
        self.answers = SurveyAnswers::default();
        self.epoch += 1;
        self.in_flight = false;
        self.state = FlowState::Welcome;
        info!(epoch = self.epoch, "flow restarted");
    }

    /// Show an existing result, e.g. one rehydrated from a shareable link.
    pub fn resume(&mut self, result: RecommendationResult) {
        self.transition(FlowState::Recommendations {
            result: Arc::new(result),
        });
    }
}
