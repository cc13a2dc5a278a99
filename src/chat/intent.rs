//! Keyword intent parser for free-text stylist queries.
//!
//! Lower-cases the text and tests substring membership against fixed
//! vocabularies. The result is always fully populated so it can be sent
//! straight to the survey endpoint.

use serde::Serialize;

use crate::api_types::{SurveyRequest, VibeRequest};
use crate::survey::Budget;

/// Occasion keywords, first match wins.
pub(crate) const OCCASION_VOCABULARY: &[(&[&str], &str)] = &[
    (&["wedding", "bridal"], "Wedding"),
    (&["red carpet", "gala", "premiere"], "Red Carpet"),
    (&["office", "work", "meeting"], "Office"),
    (&["party"], "Party"),
    (&["festival"], "Festival"),
    (&["date"], "Date Night"),
    (&["everyday", "daily", "casual"], "Everyday"),
];

/// Style keywords, first match wins.
pub(crate) const STYLE_VOCABULARY: &[(&[&str], &str)] = &[
    (&["minimal"], "Minimal"),
    (&["bold", "statement"], "Bold"),
    (&["glam"], "Glam"),
    (&["editorial"], "Editorial"),
    (&["vintage", "retro"], "Vintage"),
    (&["boho", "bohemian"], "Boho"),
    (&["classic", "timeless"], "Classic"),
    (&["modern"], "Modern"),
];

/// Material hints consulted only when no style keyword matched.
const STYLE_MATERIAL_HINTS: &[(&str, &str)] = &[("diamond", "Glam"), ("pearl", "Classic")];

/// Budget cascade. Order matters: wider and higher bands come first so a
/// narrower band's token (e.g. "300" in "$300–$800") cannot shadow them.
const BUDGET_CASCADE: &[(&[&str], Budget)] = &[
    (&["800+", "65,000+", "65000+", "65k+"], Budget::Luxury),
    (&["800", "65,000", "65000", "65k"], Budget::Premium),
    (&["300", "25,000", "25000", "25k"], Budget::Popular),
];

pub const DEFAULT_OCCASION: &str = "Everyday";
pub const DEFAULT_STYLE: &str = "Minimal";
pub const DEFAULT_BUDGET: Budget = Budget::Entry;

/// Occasion, style and budget extracted from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedIntent {
    pub occasion: &'static str,
    pub style: &'static str,
    pub budget: Budget,
}

impl ParsedIntent {
    pub fn to_survey_request(&self) -> SurveyRequest {
        SurveyRequest {
            occasion: self.occasion.to_string(),
            style: self.style.to_string(),
            budget: self.budget.to_string(),
            vibe_preference: None,
            metal: None,
        }
    }

    pub fn to_vibe_request(&self, query: Option<&str>) -> VibeRequest {
        VibeRequest {
            occasion: self.occasion.to_string(),
            style: self.style.to_string(),
            budget: self.budget.to_string(),
            query: query.map(str::to_string),
        }
    }
}

fn first_match<T: Copy>(text: &str, table: &[(&[&str], T)]) -> Option<T> {
    table
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, value)| *value)
}

/// Classify free text into a complete intent.
pub fn parse_intent(text: &str) -> ParsedIntent {
    let text = text.to_lowercase();

    let occasion = first_match(&text, OCCASION_VOCABULARY).unwrap_or(DEFAULT_OCCASION);
    let style = first_match(&text, STYLE_VOCABULARY)
        .or_else(|| {
            STYLE_MATERIAL_HINTS
                .iter()
                .find(|(hint, _)| text.contains(hint))
                .map(|(_, style)| *style)
        })
        .unwrap_or(DEFAULT_STYLE);
    let budget = first_match(&text, BUDGET_CASCADE).unwrap_or(DEFAULT_BUDGET);

    ParsedIntent {
        occasion,
        style,
        budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_query() {
        let intent = parse_intent("wedding, minimal style, budget $100–$300");
        assert_eq!(intent.occasion, "Wedding");
        assert_eq!(intent.style, "Minimal");
        assert_eq!(intent.budget.to_string(), "₹8,000–₹25,000");
    }

    #[test]
    fn test_wider_band_checked_first() {
        let intent = parse_intent("something between $300 and $800");
        assert_eq!(intent.budget, Budget::Premium);
        assert_eq!(intent.budget.to_string(), "₹25,000–₹65,000");
    }

    #[test]
    fn test_open_ended_band_beats_premium() {
        assert_eq!(parse_intent("anything $800+").budget, Budget::Luxury);
        assert_eq!(parse_intent("budget ₹65,000+ is fine").budget, Budget::Luxury);
        assert_eq!(parse_intent("₹25,000–₹65,000").budget, Budget::Premium);
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let intent = parse_intent("show me something nice");
        assert_eq!(intent.occasion, DEFAULT_OCCASION);
        assert_eq!(intent.style, DEFAULT_STYLE);
        assert_eq!(intent.budget, Budget::Entry);
    }

    #[test]
    fn test_material_hints_only_apply_without_style_keyword() {
        assert_eq!(parse_intent("a diamond for the gala").style, "Glam");
        assert_eq!(parse_intent("pearl earrings").style, "Classic");
        assert_eq!(parse_intent("bold pearl necklace").style, "Bold");
    }

    #[test]
    fn test_case_insensitive() {
        let intent = parse_intent("RED CARPET look, VINTAGE please");
        assert_eq!(intent.occasion, "Red Carpet");
        assert_eq!(intent.style, "Vintage");
    }

    #[test]
    fn test_requests_are_fully_populated() {
        let intent = parse_intent("");
        let survey = intent.to_survey_request();
        assert!(!survey.occasion.is_empty());
        assert!(!survey.style.is_empty());
        assert_eq!(survey.budget, "Under ₹8,000");

        let vibe = intent.to_vibe_request(Some("hi"));
        assert_eq!(vibe.query.as_deref(), Some("hi"));
    }
}
