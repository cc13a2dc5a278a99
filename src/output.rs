//! JSON response types and formatting for CLI output.

use evol_kiosk::api_types::RecommendationResult;
use evol_kiosk::chat::ParsedIntent;
use serde::Serialize;

/// Response for a survey submission.
#[derive(Serialize)]
pub struct SurveyResponse {
    #[serde(flatten)]
    pub result: RecommendationResult,
    pub passport_url: String,
}

/// Response for a stylist question.
#[derive(Serialize)]
pub struct AskResponse {
    pub intent: ParsedIntent,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<SurveyResponse>,
}

/// Response for QR generation.
#[derive(Serialize)]
pub struct QrResponse {
    pub url: String,
    pub modules: usize,
    pub pixel_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pbm_path: Option<String>,
}

/// Response for backend health.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend_url: String,
}

/// Response for wishlist commands.
#[derive(Serialize)]
pub struct WishlistResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub ids: Vec<String>,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}
