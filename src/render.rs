//! Plain-text views of each kiosk screen.

use crate::api_types::{Passport, Product, Recommendation, RecommendationResult};
use crate::attract::AttractOverlay;
use crate::chat::{ChatSession, ChipRow, Role};
use crate::flow::{FlowController, FlowState};
use crate::passport::QrBitmap;
use crate::survey::{SurveyAnswers, SurveyStep};

const RULE: &str = "────────────────────────────────────────────────────────";

/// Everything outside the flow that a screen may show.
#[derive(Debug, Default)]
pub struct Extras<'a> {
    pub wishlist: &'a [String],
    pub qr: Option<&'a QrBitmap>,
    pub qr_url: Option<&'a str>,
    pub countdown: Option<u64>,
    pub notice: Option<&'a str>,
}

/// The current screen with its action hints.
pub fn screen(flow: &FlowController, extras: &Extras<'_>) -> String {
    let mut lines = match flow.state() {
        FlowState::Welcome => welcome(),
        FlowState::Survey(step) => survey_step(*step, flow.answers(), flow.is_submitting()),
        FlowState::Recommendations { result } => recommendations(result, extras),
        FlowState::ChatDetail { chat, .. } => chat_screen(chat, extras),
        FlowState::Qr { .. } => qr_screen(extras),
    };
    if let Some(notice) = extras.notice {
        lines.push(String::new());
        lines.push(format!("! {notice}"));
    }
    lines.join("\n")
}

fn welcome() -> Vec<String> {
    vec![
        RULE.to_string(),
        "EVOL JEWELS".to_string(),
        "Discover jewelry that matches your style in under a minute.".to_string(),
        RULE.to_string(),
        "[enter] start   [q] quit".to_string(),
    ]
}

fn survey_step(step: SurveyStep, answers: &SurveyAnswers, submitting: bool) -> Vec<String> {
    let selected = answers.selected_position(step);
    let mut lines = vec![
        format!("Step {} of 4 · {}", step.position(), step.title()),
        step.prompt().to_string(),
        String::new(),
    ];
    for (i, card) in step.options().iter().enumerate() {
        let marker = if selected == Some(i + 1) { "●" } else { "○" };
        let popular = if card.popular { "  ★ Most Popular" } else { "" };
        lines.push(format!("  {marker} {}. {}{popular}", i + 1, card.label));
        lines.push(format!("       {}", card.description));
    }
    lines.push(String::new());
    let action = match (step.next(), submitting) {
        (Some(_), _) => "[enter] continue",
        (None, true) => "finding your pieces…",
        (None, false) => "[enter] see my recommendations",
    };
    lines.push(format!("[1-4] choose   {action}   [b] back   [r] restart"));
    lines
}

fn product_card(index: usize, rec: &Recommendation, wishlisted: bool) -> Vec<String> {
    let heart = if wishlisted { "♥" } else { "♡" };
    vec![
        format!(
            "  {index}. {heart} {}  {}  ({})",
            rec.product.name,
            rec.product.price_inr(),
            rec.product.price_usd()
        ),
        format!("     {}", rec.reason),
    ]
}

fn recommendations(result: &RecommendationResult, extras: &Extras<'_>) -> Vec<String> {
    let mut lines = vec![
        format!("Your vibe: {}", result.vibe),
        result.explanation.clone(),
        String::new(),
    ];
    for (i, rec) in result.recommendations.iter().enumerate() {
        let wishlisted = extras.wishlist.contains(&rec.product.id);
        lines.extend(product_card(i + 1, rec, wishlisted));
    }
    if let Some(url) = extras.qr_url {
        lines.push(String::new());
        lines.push(format!("Scan to continue on your phone: {url}"));
    }
    if let Some(qr) = extras.qr {
        lines.extend(qr.render_terminal().lines().map(str::to_string));
    }
    lines.push(String::new());
    lines.push(
        "[d N] details   [w N] wishlist   [s] ask stylist   [p] get these results on your phone   [b] back   [r] restart"
            .to_string(),
    );
    lines
}

fn chat_screen(chat: &ChatSession, extras: &Extras<'_>) -> Vec<String> {
    let mut lines = vec!["AI Jewelry Stylist".to_string()];
    if let Some(product) = chat.product() {
        lines.push(format!(
            "{} · {} · {}",
            product.name,
            product.price_inr(),
            product.description_or_default()
        ));
    }
    lines.push(RULE.to_string());
    for message in chat.messages() {
        let who = match message.role {
            Role::User => "You",
            Role::Assistant => "Stylist",
        };
        lines.push(format!("{who}: {}", message.content));
    }
    if chat.is_awaiting_reply() {
        lines.push("Stylist is typing…".to_string());
    }

    let questions = chat.quick_questions();
    if !questions.is_empty() {
        lines.push(String::new());
        lines.push("Quick questions:".to_string());
        for (i, question) in questions.iter().enumerate() {
            lines.push(format!("  [q{}] {question}", i + 1));
        }
    }

    if chat.product().is_none() {
        lines.push(String::new());
        for (key, row) in [("o", ChipRow::Occasion), ("t", ChipRow::Style), ("m", ChipRow::Budget)] {
            let picked = chat.chips().selected(row);
            let chips: Vec<String> = row
                .labels()
                .iter()
                .enumerate()
                .map(|(i, label)| {
                    if picked.as_deref() == Some(label.as_str()) {
                        format!("[{}:{label}]", i + 1)
                    } else {
                        format!("{}:{label}", i + 1)
                    }
                })
                .collect();
            lines.push(format!("  {} ({key} N): {}", row.name(), chips.join("  ")));
        }
    }

    if let Some(url) = extras.qr_url {
        lines.push(String::new());
        lines.push(format!("Passport: {url}"));
    }
    if let Some(qr) = extras.qr {
        lines.extend(qr.render_terminal().lines().map(str::to_string));
    }
    lines.push(String::new());
    lines.push(
        "type a question   [f] find pieces   [c] continue   [b] back   [r] restart".to_string(),
    );
    lines
}

fn qr_screen(extras: &Extras<'_>) -> Vec<String> {
    let mut lines = vec!["Take your picks with you".to_string(), String::new()];
    match extras.qr {
        Some(qr) => lines.extend(qr.render_terminal().lines().map(str::to_string)),
        None => lines.push("(QR code unavailable)".to_string()),
    }
    if let Some(url) = extras.qr_url {
        lines.push(url.to_string());
    }
    if let Some(remaining) = extras.countdown {
        lines.push(format!("Starting over in {remaining}s"));
    }
    lines.push(String::new());
    lines.push("[r] Start Over Now   [b] back".to_string());
    lines
}

/// Full-screen attract overlay.
pub fn attract(overlay: &AttractOverlay) -> String {
    let board = overlay.current();
    [
        RULE.to_string(),
        format!("{} · {}", board.celebrity, board.style),
        board.description.to_string(),
        format!("\u{201c}{}\u{201d}", board.quote),
        format!("Featured: {}", board.products.join(", ")),
        board.vibe.to_string(),
        RULE.to_string(),
        "Tap anywhere to begin".to_string(),
    ]
    .join("\n")
}

/// Passport page for a shared session.
pub fn passport(passport: &Passport, wishlist: &[String]) -> String {
    let mut lines = vec![
        format!("Style Passport · {}", passport.session_id),
        format!(
            "{} · {} · {}{}",
            passport.survey.style,
            passport.survey.occasion,
            passport.survey.budget,
            passport
                .survey
                .metal
                .as_deref()
                .map(|m| format!(" · {m}"))
                .unwrap_or_default()
        ),
        format!("Your vibe: {}", passport.vibe),
        passport.explanation.clone(),
        String::new(),
    ];
    for (i, rec) in passport.recommendations.iter().enumerate() {
        lines.extend(product_card(i + 1, rec, wishlist.contains(&rec.product.id)));
    }
    lines.push(format!(
        "Created {}",
        passport.created_at.format("%d %b %Y %H:%M UTC")
    ));
    lines.join("\n")
}

pub fn catalog(products: &[Product], wishlist: &[String]) -> String {
    products
        .iter()
        .map(|p| {
            let heart = if wishlist.contains(&p.id) { "♥" } else { "♡" };
            format!("{heart} {:<6} {:<36} {:>10}  {}", p.id, p.name, p.price_inr(), p.price_usd())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake;

    #[test]
    fn test_recommendations_screen_shows_every_card() {
        let mut flow = FlowController::with_seed(1);
        flow.resume(fake::result("abc123", 3));
        let wishlist = vec!["p2".to_string()];
        let text = screen(
            &flow,
            &Extras {
                wishlist: &wishlist,
                ..Extras::default()
            },
        );
        assert!(text.contains("1. ♡ Classic Diamond Solitaire Ring  ₹78,850  ($950.00)"));
        assert!(text.contains("2. ♥ Minimal Gold Bar Necklace"));
        assert!(text.contains("3. ♡ Pearl Drop Earrings"));
        assert!(!text.contains("4. "));
    }

    #[test]
    fn test_survey_screen_marks_selection_and_popular_band() {
        let mut flow = FlowController::with_seed(1);
        flow.start().unwrap();
        flow.choose(1).unwrap();
        flow.advance().unwrap();
        flow.choose(1).unwrap();
        flow.advance().unwrap();
        flow.choose(2).unwrap();

        let text = screen(&flow, &Extras::default());
        assert!(text.starts_with("Step 3 of 4"));
        assert!(text.contains("● 2. ₹8,000–₹25,000  ★ Most Popular"));
        assert!(text.contains("○ 1. Under ₹8,000"));
    }

    #[test]
    fn test_qr_screen_shows_countdown() {
        let text = qr_screen(&Extras {
            countdown: Some(12),
            qr_url: Some("http://localhost:3000/passport/abc123"),
            ..Extras::default()
        })
        .join("\n");
        assert!(text.contains("Starting over in 12s"));
        assert!(text.contains("(QR code unavailable)"));
        assert!(text.contains("Start Over Now"));
    }

    #[test]
    fn test_attract_overlay_text() {
        let text = attract(&AttractOverlay::new());
        assert!(text.contains("Emma Stone · Editorial Chic"));
        assert!(text.contains("Diamond Studs, Delicate Necklaces"));
    }

    #[test]
    fn test_passport_page() {
        let text = passport(&fake::passport("abc123", 2), &[]);
        assert!(text.contains("Modern · Everyday · ₹8,000–₹25,000 · Gold"));
        assert!(text.contains("Created 01 Jan 2025 10:00 UTC"));
    }
}
