//! Backend wire types shared by the flow, the passport view and the CLI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// USD → INR conversion rate used for on-screen prices.
pub const INR_PER_USD: f64 = 83.0;

/// A catalog item. Owned by the backend and treated as immutable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Price in USD.
    pub price: f64,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub style_tags: Vec<String>,
    #[serde(default)]
    pub occasion_tags: Vec<String>,
}

impl Product {
    pub fn price_usd(&self) -> String {
        format!("${:.2}", self.price)
    }

    pub fn price_inr(&self) -> String {
        format_inr(self.price)
    }

    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or("Beautifully crafted piece for your look.")
    }
}

/// A product together with the backend's reason for picking it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product: Product,
    pub reason: String,
}

/// Which classifier produced the vibe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Rules,
    Ai,
}

/// Response of the survey endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub session_id: String,
    pub vibe: String,
    pub explanation: String,
    #[serde(default, alias = "source")]
    pub engine: Engine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moodboard_image: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
}

/// Body of the survey endpoint. Chat intents and the picker flow both produce this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRequest {
    pub occasion: String,
    pub style: String,
    pub budget: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibe_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal: Option<String>,
}

/// Persisted recommendation result plus the survey that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passport {
    pub session_id: String,
    pub survey: SurveyRequest,
    pub vibe: String,
    pub explanation: String,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
}

impl Passport {
    /// Recommendation view of this passport, for screens that rehydrate from a URL.
    pub fn to_result(&self) -> RecommendationResult {
        RecommendationResult {
            session_id: self.session_id.clone(),
            vibe: self.vibe.clone(),
            explanation: self.explanation.clone(),
            engine: Engine::default(),
            moodboard_image: None,
            recommendations: self.recommendations.clone(),
            created_at: self.created_at,
        }
    }
}

/// Body of the AI vibe endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeRequest {
    pub occasion: String,
    pub style: String,
    pub budget: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeReply {
    pub vibe: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, alias = "source")]
    pub engine: Engine,
}

/// Convert a USD amount to a rounded rupee string with Indian digit grouping.
pub fn format_inr(usd: f64) -> String {
    let rupees = (usd * INR_PER_USD).round().max(0.0) as u64;
    let digits = rupees.to_string();
    if digits.len() <= 3 {
        return format!("₹{digits}");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("₹{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_inr_grouping() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(10.0), "₹830");
        assert_eq!(format_inr(95.0), "₹7,885");
        assert_eq!(format_inr(950.0), "₹78,850");
        assert_eq!(format_inr(1487.42), "₹1,23,456");
        assert_eq!(format_inr(120482.0), "₹1,00,00,006");
    }

    #[test]
    fn test_price_usd_two_decimals() {
        let product = sample_product();
        assert_eq!(product.price_usd(), "$180.00");
    }

    #[test]
    fn test_result_accepts_source_alias_and_missing_engine() {
        let json = r#"{
            "session_id": "s1",
            "vibe": "Minimal Modern",
            "explanation": "Clean lines",
            "source": "ai",
            "recommendations": [],
            "created_at": "2025-01-01T10:00:00+00:00"
        }"#;
        let result: RecommendationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.engine, Engine::Ai);
        assert!(result.moodboard_image.is_none());

        let json = r#"{
            "session_id": "s2",
            "vibe": "Boho Luxe",
            "explanation": "Relaxed layers",
            "recommendations": [],
            "created_at": "2025-01-01T10:00:00Z"
        }"#;
        let result: RecommendationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.engine, Engine::Rules);
    }

    #[test]
    fn test_survey_request_omits_absent_optionals() {
        let request = SurveyRequest {
            occasion: "Wedding".to_string(),
            style: "Minimal".to_string(),
            budget: "₹8,000–₹25,000".to_string(),
            vibe_preference: None,
            metal: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert!(!object.contains_key("metal"));
    }

    #[test]
    fn test_product_defaults_for_missing_tags() {
        let json = r#"{"id":"p1","name":"Hoops","price":95.0,"image_url":"http://img"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.style_tags.is_empty());
        assert_eq!(
            product.description_or_default(),
            "Beautifully crafted piece for your look."
        );
    }

    fn sample_product() -> Product {
        Product {
            id: "p1".to_string(),
            name: "Minimal Gold Bar Necklace".to_string(),
            price: 180.0,
            image_url: "http://img".to_string(),
            description: None,
            style_tags: vec!["minimal".to_string()],
            occasion_tags: vec!["everyday".to_string()],
        }
    }
}
