//! In-memory backend and fixtures for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::Backend;
use crate::api_types::{
    Engine, Passport, Product, Recommendation, RecommendationResult, SurveyRequest, VibeReply,
    VibeRequest,
};
use crate::errors::Error;

pub(crate) fn product(id: &str, name: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        image_url: format!("https://images.example/{id}.jpg"),
        description: Some(format!("{name} in polished metal.")),
        style_tags: vec!["modern".to_string()],
        occasion_tags: vec!["everyday".to_string()],
    }
}

pub(crate) fn catalog() -> Vec<Product> {
    vec![
        product("p1", "Classic Diamond Solitaire Ring", 950.0),
        product("p2", "Minimal Gold Bar Necklace", 180.0),
        product("p3", "Pearl Drop Earrings", 240.0),
        product("p4", "Stackable Rose Gold Band", 120.0),
    ]
}

pub(crate) fn result(session_id: &str, count: usize) -> RecommendationResult {
    RecommendationResult {
        session_id: session_id.to_string(),
        vibe: "Minimal Modern".to_string(),
        explanation: "Clean lines for everyday wear".to_string(),
        engine: Engine::Rules,
        moodboard_image: None,
        recommendations: catalog()
            .into_iter()
            .take(count)
            .map(|product| Recommendation {
                reason: format!("{} suits a modern look", product.name),
                product,
            })
            .collect(),
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
    }
}

pub(crate) fn passport(session_id: &str, count: usize) -> Passport {
    let result = result(session_id, count);
    Passport {
        session_id: result.session_id,
        survey: SurveyRequest {
            occasion: "Everyday".to_string(),
            style: "Modern".to_string(),
            budget: "₹8,000–₹25,000".to_string(),
            vibe_preference: None,
            metal: Some("Gold".to_string()),
        },
        vibe: result.vibe,
        explanation: result.explanation,
        recommendations: result.recommendations,
        created_at: result.created_at,
    }
}

fn unavailable() -> Error {
    Error::Backend {
        status: 503,
        message: "Service unavailable".to_string(),
    }
}

/// Scripted backend. `None` responses answer with a 503.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub survey: Option<RecommendationResult>,
    pub vibe: Option<VibeReply>,
    pub passports: HashMap<String, Passport>,
    pub products: Option<Vec<Product>>,
    pub survey_calls: AtomicUsize,
    pub last_survey: Mutex<Option<SurveyRequest>>,
}

impl FakeBackend {
    pub fn returning(result: RecommendationResult) -> Self {
        Self {
            survey: Some(result),
            ..Self::default()
        }
    }

    pub fn survey_calls(&self) -> usize {
        self.survey_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn health(&self) -> Result<(), Error> {
        Ok(())
    }

    async fn products(&self) -> Result<Vec<Product>, Error> {
        self.products.clone().ok_or_else(unavailable)
    }

    async fn submit_survey(&self, request: &SurveyRequest) -> Result<RecommendationResult, Error> {
        self.survey_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_survey.lock() {
            *last = Some(request.clone());
        }
        self.survey.clone().ok_or_else(unavailable)
    }

    async fn passport(&self, session_id: &str) -> Result<Passport, Error> {
        self.passports
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(session_id.to_string()))
    }

    async fn ai_vibe(&self, _request: &VibeRequest) -> Result<VibeReply, Error> {
        self.vibe.clone().ok_or_else(unavailable)
    }
}
